//! Immutable points with a total order, used as keys for hull bookkeeping.

use nalgebra::DVector;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Point in R^d with value semantics.
///
/// Invariants:
/// - `-0.0` is stored as `0.0`, so equal coordinates always hash equally.
/// - Ordering is lexicographic over components (`f64::total_cmp`); it only
///   canonicalises vertex lists and carries no geometric meaning.
#[derive(Clone, Debug)]
pub struct Vertex {
    values: DVector<f64>,
}

impl Vertex {
    pub fn new(values: DVector<f64>) -> Self {
        let values = values.map(|x| if x == 0.0 { 0.0 } else { x });
        Self { values }
    }

    #[inline]
    pub fn from_slice(values: &[f64]) -> Self {
        Self::new(DVector::from_column_slice(values))
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Vertex {}

impl PartialOrd for Vertex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Vertex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a.total_cmp(b))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| self.dim().cmp(&other.dim()))
    }
}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dim().hash(state);
        for x in self.values.iter() {
            x.to_bits().hash(state);
        }
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, x) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, ")")
    }
}

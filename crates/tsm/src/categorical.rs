//! One-hot categorical subspaces.
//!
//! A categorical group is a block of one-hot columns. Each index seen active
//! in a positive point becomes a truth line, each index seen in a negative
//! point a false line; the two sets stay disjoint.

use nalgebra::DVector;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::TsmError;
use crate::label::Label;

#[derive(Clone, Debug, Default)]
pub struct CatTsm {
    truth_lines: BTreeSet<usize>,
    false_lines: BTreeSet<usize>,
}

impl CatTsm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every active index of `values` as a truth or false line.
    ///
    /// An index already claimed by the opposite set is a region violation;
    /// indices earlier in `values` stay marked.
    pub fn update(&mut self, values: &DVector<f64>, label: Label) -> Result<(), TsmError> {
        let (own, other) = match label {
            Label::Positive => (&mut self.truth_lines, &self.false_lines),
            Label::Negative => (&mut self.false_lines, &self.truth_lines),
        };
        for i in active(values) {
            if other.contains(&i) {
                return Err(TsmError::region(format!(
                    "category {i} is already a {} line",
                    if label.is_positive() { "false" } else { "truth" }
                )));
            }
            own.insert(i);
        }
        Ok(())
    }

    pub fn is_on_truth_lines(&self, values: &DVector<f64>) -> Result<bool, TsmError> {
        on_lines(&self.truth_lines, values)
    }

    pub fn is_on_false_lines(&self, values: &DVector<f64>) -> Result<bool, TsmError> {
        on_lines(&self.false_lines, values)
    }

    #[inline]
    pub fn truth_lines(&self) -> &BTreeSet<usize> {
        &self.truth_lines
    }

    #[inline]
    pub fn false_lines(&self) -> &BTreeSet<usize> {
        &self.false_lines
    }
}

fn active(values: &DVector<f64>) -> impl Iterator<Item = usize> + '_ {
    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > 0.0)
        .map(|(i, _)| i)
}

fn on_lines(lines: &BTreeSet<usize>, values: &DVector<f64>) -> Result<bool, TsmError> {
    if lines.is_empty() {
        return Ok(false);
    }
    let hits = active(values).filter(|i| lines.contains(i)).count();
    if hits > 1 {
        return Err(TsmError::MalformedCategorical {
            reason: format!("{hits} active indices match one line set"),
        });
    }
    Ok(hits == 1)
}

impl fmt::Display for CatTsm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "truth lines {:?}, false lines {:?}",
            self.truth_lines, self.false_lines
        )
    }
}

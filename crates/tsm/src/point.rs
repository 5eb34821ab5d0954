//! Data points and labeled points fed to the learners.

use nalgebra::DVector;

use crate::error::TsmError;
use crate::label::{Label, UserLabel};

/// Unlabeled point with a caller-assigned id.
#[derive(Clone, Debug, PartialEq)]
pub struct DataPoint {
    pub id: usize,
    pub values: DVector<f64>,
}

impl DataPoint {
    #[inline]
    pub fn new(id: usize, values: &[f64]) -> Self {
        Self {
            id,
            values: DVector::from_column_slice(values),
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Coordinates restricted to `indices`, in that order.
    ///
    /// Callers check `indices` against `dim()` first.
    #[inline]
    pub fn select(&self, indices: &[usize]) -> DVector<f64> {
        DVector::from_iterator(indices.len(), indices.iter().map(|&i| self.values[i]))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabeledPoint {
    pub point: DataPoint,
    pub label: UserLabel,
}

impl LabeledPoint {
    pub fn new(point: DataPoint, label: impl Into<UserLabel>) -> Self {
        Self {
            point,
            label: label.into(),
        }
    }

    /// Shorthand for a point with a global label.
    pub fn global(id: usize, values: &[f64], label: Label) -> Self {
        Self::new(DataPoint::new(id, values), label)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.point.dim()
    }

    /// Projection onto one feature group, carrying that group's label.
    pub fn project(
        &self,
        indices: &[usize],
        group: usize,
        n_groups: usize,
    ) -> Result<LabeledPoint, TsmError> {
        let label = self.label.for_subspace(group, n_groups)?;
        Ok(LabeledPoint {
            point: DataPoint {
                id: self.point.id,
                values: self.point.select(indices),
            },
            label: UserLabel::Global(label),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelGroup;
    use nalgebra::dvector;

    #[test]
    fn projection_selects_columns_and_partial_label() {
        let group = LabelGroup::new(vec![Label::Positive, Label::Negative]).unwrap();
        let p = LabeledPoint::new(DataPoint::new(3, &[1.0, 2.0, 3.0, 4.0]), group);
        let q = p.project(&[3, 1], 1, 2).unwrap();
        assert_eq!(q.point.id, 3);
        assert_eq!(q.point.values, dvector![4.0, 2.0]);
        assert_eq!(q.label, UserLabel::Global(Label::Negative));
    }
}

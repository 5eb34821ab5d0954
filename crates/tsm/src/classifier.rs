//! Three-way classifier interface used by the exploration loop.

use crate::error::TsmError;
use crate::label::ExtendedLabel;
use crate::point::{DataPoint, LabeledPoint};

/// A classifier that may abstain with `ExtendedLabel::Unknown`.
pub trait ExtendedClassifier {
    fn update(&mut self, points: &[LabeledPoint]) -> Result<(), TsmError>;

    fn update_one(&mut self, point: &LabeledPoint) -> Result<(), TsmError> {
        self.update(std::slice::from_ref(point))
    }

    fn predict(&self, point: &DataPoint) -> Result<ExtendedLabel, TsmError>;

    fn predict_all(&self, points: &[DataPoint]) -> Result<Vec<ExtendedLabel>, TsmError> {
        points.iter().map(|p| self.predict(p)).collect()
    }

    /// False once the classifier can no longer certify anything.
    fn is_running(&self) -> bool;

    /// True once earlier inferred labels may be stale and need re-evaluation.
    fn trigger_relabeling(&self) -> bool;
}

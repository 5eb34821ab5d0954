//! Factorized learner over a partition of the features.
//!
//! Purpose
//! - One `TsmLearner` per feature group, combined conjunctively: a point is
//!   positive when every group certifies it positive and negative when any
//!   group certifies it negative.
//! - Numeric groups train two learners, `standard` (positives convex) and
//!   `backup` (negatives convex); the group predicts with whichever has made
//!   fewer region violations.
//!
//! State machine (per group)
//! - `Active(o)` with `o` the orientation used for prediction.
//! - A learner dies once its violation count reaches the threshold.
//!   Standard alive and (backup dead or `errors <= backup_errors`) gives
//!   `PositiveConvex`; only backup alive gives `NegativeConvex`; both dead
//!   gives `Frozen`.
//! - Categorical groups have a single learner and freeze on its death.
//! - `Frozen` is terminal; frozen groups are skipped by updates and
//!   predictions.
//!
//! Conventions
//! - Groups are processed in index order.
//! - Only `TsmError::RegionViolation` is counted; every other error aborts the
//!   update and reaches the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::classifier::ExtendedClassifier;
use crate::error::TsmError;
use crate::label::ExtendedLabel;
use crate::learner::{Orientation, TsmLearner};
use crate::point::{DataPoint, LabeledPoint};

/// Violations tolerated before a learner is discarded.
pub const DEFAULT_ERROR_THRESHOLD: usize = 1;

/// Per-group construction flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupFlags {
    /// Initial orientation: positive class assumed convex.
    pub positive_convex: bool,
    pub categorical: bool,
}

impl Default for GroupFlags {
    fn default() -> Self {
        Self {
            positive_convex: true,
            categorical: false,
        }
    }
}

impl GroupFlags {
    pub fn numeric(positive_convex: bool) -> Self {
        Self {
            positive_convex,
            categorical: false,
        }
    }

    pub fn categorical() -> Self {
        Self {
            positive_convex: true,
            categorical: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupState {
    Active(Orientation),
    Frozen,
}

impl GroupState {
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active(_))
    }
}

impl fmt::Display for GroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active(o) => write!(f, "active ({o})"),
            Self::Frozen => write!(f, "frozen"),
        }
    }
}

#[derive(Clone, Debug)]
struct Group {
    indices: Vec<usize>,
    categorical: bool,
    state: GroupState,
    standard: Option<TsmLearner>,
    backup: Option<TsmLearner>,
    errors: usize,
    backup_errors: usize,
    orientation_changed: bool,
}

impl Group {
    fn new(indices: Vec<usize>, flags: GroupFlags) -> Result<Self, TsmError> {
        let dim = indices.len();
        let (standard, backup) = if flags.categorical {
            (TsmLearner::categorical(dim)?, None)
        } else {
            (TsmLearner::new(dim)?, Some(TsmLearner::new(dim)?))
        };
        Ok(Self {
            indices,
            categorical: flags.categorical,
            state: GroupState::Active(if flags.categorical {
                Orientation::PositiveConvex
            } else {
                Orientation::from_positive_convex(flags.positive_convex)
            }),
            standard: Some(standard),
            backup,
            errors: 0,
            backup_errors: 0,
            orientation_changed: false,
        })
    }

    /// Learner backing predictions and the orientation to query it with.
    fn predictor(&self) -> Option<(&TsmLearner, Orientation)> {
        let GroupState::Active(o) = self.state else {
            return None;
        };
        let learner = match o {
            _ if self.categorical => self.standard.as_ref(),
            Orientation::PositiveConvex => self.standard.as_ref(),
            Orientation::NegativeConvex => self.backup.as_ref(),
        };
        learner.map(|l| (l, o))
    }
}

/// Runs one learner update; a recoverable violation comes back as `Ok(Some(_))`.
fn train(
    learner: &mut TsmLearner,
    points: &[LabeledPoint],
    orientation: Orientation,
) -> Result<Option<TsmError>, TsmError> {
    match learner.update(points, orientation) {
        Ok(()) => Ok(None),
        Err(e) if e.is_recoverable() => Ok(Some(e)),
        Err(e) => Err(e),
    }
}

/// Conjunctive three-set learner over feature groups.
#[derive(Clone, Debug)]
pub struct MultiTsmLearner {
    groups: Vec<Group>,
    threshold: usize,
    required_dim: usize,
}

impl MultiTsmLearner {
    /// `partition[i]` lists the column indices of group `i`.
    pub fn new(partition: Vec<Vec<usize>>, flags: Vec<GroupFlags>) -> Result<Self, TsmError> {
        if partition.is_empty() {
            return Err(TsmError::config("at least one feature group is required"));
        }
        if partition.len() != flags.len() {
            return Err(TsmError::config(format!(
                "{} feature groups but {} flag pairs",
                partition.len(),
                flags.len()
            )));
        }
        let required_dim = partition
            .iter()
            .flatten()
            .map(|&i| i + 1)
            .max()
            .unwrap_or(0);
        let groups = partition
            .into_iter()
            .zip(flags)
            .map(|(indices, f)| Group::new(indices, f))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            groups,
            threshold: DEFAULT_ERROR_THRESHOLD,
            required_dim,
        })
    }

    pub fn with_threshold(mut self, threshold: usize) -> Result<Self, TsmError> {
        if threshold == 0 {
            return Err(TsmError::config("error threshold must be at least 1"));
        }
        self.threshold = threshold;
        Ok(self)
    }

    fn check_point(&self, values_len: usize) -> Result<(), TsmError> {
        if values_len < self.required_dim {
            return Err(TsmError::DimensionMismatch {
                expected: self.required_dim,
                found: values_len,
            });
        }
        Ok(())
    }

    fn update_group(&mut self, i: usize, points: &[LabeledPoint]) -> Result<(), TsmError> {
        let n = self.groups.len();
        let threshold = self.threshold;
        let group = &mut self.groups[i];
        if !group.state.is_active() {
            return Ok(());
        }
        let part = points
            .iter()
            .map(|p| p.project(&group.indices, i, n))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(learner) = group.standard.as_mut() {
            if let Some(e) = train(learner, &part, Orientation::PositiveConvex)? {
                group.errors += 1;
                warn!(group = i, errors = group.errors, reason = %e, "region violation");
                if group.errors >= threshold {
                    group.standard = None;
                }
            }
        }
        if let Some(learner) = group.backup.as_mut() {
            if let Some(e) = train(learner, &part, Orientation::NegativeConvex)? {
                group.backup_errors += 1;
                warn!(group = i, errors = group.backup_errors, reason = %e, "backup region violation");
                if group.backup_errors >= threshold {
                    group.backup = None;
                }
            }
        }

        let next = match (&group.standard, &group.backup) {
            (None, None) => GroupState::Frozen,
            (Some(_), _) if group.categorical => GroupState::Active(Orientation::PositiveConvex),
            (Some(_), None) => GroupState::Active(Orientation::PositiveConvex),
            (None, Some(_)) => GroupState::Active(Orientation::NegativeConvex),
            (Some(_), Some(_)) if group.errors <= group.backup_errors => {
                GroupState::Active(Orientation::PositiveConvex)
            }
            (Some(_), Some(_)) => GroupState::Active(Orientation::NegativeConvex),
        };
        match (group.state, next) {
            (GroupState::Active(_), GroupState::Frozen) => {
                info!(group = i, "feature group frozen");
            }
            (GroupState::Active(old), GroupState::Active(new)) if old != new => {
                info!(group = i, from = %old, to = %new, "orientation flipped");
                // Set only when a dead learner forces the flip.
                if group.standard.is_none() != group.backup.is_none() {
                    group.orientation_changed = true;
                }
            }
            _ => {}
        }
        group.state = next;
        Ok(())
    }

    /// Every active group certifies `point` positive; vacuously true when no
    /// group is active.
    pub fn is_in_positive_region(&self, point: &DataPoint) -> Result<bool, TsmError> {
        self.check_point(point.dim())?;
        for g in &self.groups {
            if let Some((learner, o)) = g.predictor() {
                if !learner.is_in_convex_region(&point.select(&g.indices), o)? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Some active group certifies `point` negative.
    pub fn is_in_negative_region(&self, point: &DataPoint) -> Result<bool, TsmError> {
        self.check_point(point.dim())?;
        for g in &self.groups {
            if let Some((learner, o)) = g.predictor() {
                if learner.is_in_concave_region(&point.select(&g.indices), o)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    #[inline]
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn group_state(&self, i: usize) -> Option<GroupState> {
        self.groups.get(i).map(|g| g.state)
    }

    /// `(standard, backup)` violation counts of group `i`.
    pub fn error_counts(&self, i: usize) -> Option<(usize, usize)> {
        self.groups.get(i).map(|g| (g.errors, g.backup_errors))
    }

    /// Whether a dead learner has forced group `i` to flip orientation.
    pub fn orientation_changed(&self, i: usize) -> Option<bool> {
        self.groups.get(i).map(|g| g.orientation_changed)
    }

    pub fn standard_learner(&self, i: usize) -> Option<&TsmLearner> {
        self.groups.get(i).and_then(|g| g.standard.as_ref())
    }

    pub fn backup_learner(&self, i: usize) -> Option<&TsmLearner> {
        self.groups.get(i).and_then(|g| g.backup.as_ref())
    }
}

impl ExtendedClassifier for MultiTsmLearner {
    /// Labels are validated against every group before any learner moves.
    fn update(&mut self, points: &[LabeledPoint]) -> Result<(), TsmError> {
        let n = self.groups.len();
        for p in points {
            self.check_point(p.dim())?;
            for i in 0..n {
                p.label.for_subspace(i, n)?;
            }
        }
        for i in 0..n {
            self.update_group(i, points)?;
        }
        Ok(())
    }

    fn predict(&self, point: &DataPoint) -> Result<ExtendedLabel, TsmError> {
        self.check_point(point.dim())?;
        if !self.is_running() {
            return Ok(ExtendedLabel::Unknown);
        }
        if self.is_in_positive_region(point)? {
            Ok(ExtendedLabel::Positive)
        } else if self.is_in_negative_region(point)? {
            Ok(ExtendedLabel::Negative)
        } else {
            Ok(ExtendedLabel::Unknown)
        }
    }

    fn is_running(&self) -> bool {
        self.groups.iter().any(|g| g.state.is_active())
    }

    fn trigger_relabeling(&self) -> bool {
        self.groups.iter().any(|g| g.orientation_changed)
    }
}

impl fmt::Display for MultiTsmLearner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, g) in self.groups.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "group {i} {:?}: {}, errors {}/{}",
                g.indices, g.state, g.errors, g.backup_errors
            )?;
            if let Some((learner, _)) = g.predictor() {
                write!(f, ", {learner}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;

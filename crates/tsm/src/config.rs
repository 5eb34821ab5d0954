//! Session configuration for the factorized learner.
//!
//! Feature groups are given by column name and resolved against `columns`.
//! An empty `flags` list means default flags (positive convex, numeric) for
//! every group.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::error::TsmError;
use crate::multi::{GroupFlags, MultiTsmLearner, DEFAULT_ERROR_THRESHOLD};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TsmConfig {
    pub has_tsm: bool,
    /// Chance of sampling from the unknown region instead of the whole pool.
    pub search_unknown_region_probability: f64,
    pub columns: Vec<String>,
    pub feature_groups: Vec<Vec<String>>,
    pub flags: Vec<GroupFlags>,
    pub error_threshold: usize,
}

impl Default for TsmConfig {
    fn default() -> Self {
        Self {
            has_tsm: true,
            search_unknown_region_probability: 0.0,
            columns: Vec::new(),
            feature_groups: Vec::new(),
            flags: Vec::new(),
            error_threshold: DEFAULT_ERROR_THRESHOLD,
        }
    }
}

impl TsmConfig {
    /// Configured probability, or 0 when the learner is disabled.
    #[inline]
    pub fn unknown_region_probability(&self) -> f64 {
        if self.has_tsm {
            self.search_unknown_region_probability
        } else {
            0.0
        }
    }

    pub fn column_index(&self, column: &str) -> Result<usize, TsmError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| {
                TsmError::config(format!(
                    "column {column} not in columns list {:?}",
                    self.columns
                ))
            })
    }

    /// Feature groups as column indices.
    pub fn column_partition(&self) -> Result<Vec<Vec<usize>>, TsmError> {
        self.feature_groups
            .iter()
            .map(|g| g.iter().map(|c| self.column_index(c)).collect())
            .collect()
    }

    /// Flags per group, defaulted when none are configured.
    pub fn group_flags(&self) -> Result<Vec<GroupFlags>, TsmError> {
        if self.flags.is_empty() {
            info!(
                groups = self.feature_groups.len(),
                "no flags configured, using positive-convex numeric groups"
            );
            return Ok(vec![GroupFlags::default(); self.feature_groups.len()]);
        }
        if self.flags.len() != self.feature_groups.len() {
            return Err(TsmError::config(format!(
                "{} flags for {} feature groups",
                self.flags.len(),
                self.feature_groups.len()
            )));
        }
        Ok(self.flags.clone())
    }

    pub fn validate(&self) -> Result<(), TsmError> {
        let p = self.search_unknown_region_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(TsmError::config(format!(
                "search_unknown_region_probability must lie in [0, 1], got {p}"
            )));
        }
        if self.error_threshold == 0 {
            return Err(TsmError::config("error_threshold must be at least 1"));
        }
        Ok(())
    }

    /// Learner for this session, or `None` when disabled.
    pub fn build(&self) -> Result<Option<MultiTsmLearner>, TsmError> {
        self.validate()?;
        if !self.has_tsm {
            return Ok(None);
        }
        let learner = MultiTsmLearner::new(self.column_partition()?, self.group_flags()?)?
            .with_threshold(self.error_threshold)?;
        Ok(Some(learner))
    }
}

impl fmt::Display for TsmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TsmConfig {{ has_tsm: {}, search_unknown_region_probability: {}, feature_groups: {:?} }}",
            self.has_tsm, self.search_unknown_region_probability, self.feature_groups
        )
    }
}

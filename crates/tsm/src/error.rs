//! Error taxonomy for the geometry layer and the learners.
//!
//! Three kinds of failure flow through the engine and callers must be able to
//! tell them apart:
//! - dimension mismatches and malformed inputs are precondition violations;
//! - region violations (a label contradicting a certified region) are expected
//!   with noisy labels and are counted by `MultiTsmLearner`;
//! - structural violations mean a geometric invariant broke after the region
//!   checks passed.
//!
//! Only `TsmError::RegionViolation` is recoverable.

use std::fmt;

/// Failures raised by hull and cone construction.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryError {
    /// Input points do not span the required affine dimension.
    Degenerate { reason: String },
    DimensionMismatch { expected: usize, found: usize },
    /// Cone apex lies inside (or on) the polytope it should see from outside.
    ApexInside,
    /// Point strictly inside a cone, so no facet can be replaced.
    PointInsideCone,
}

impl GeometryError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate {
            reason: reason.into(),
        }
    }

    pub(crate) fn check_dim(expected: usize, found: usize) -> Result<(), Self> {
        if expected == found {
            Ok(())
        } else {
            Err(Self::DimensionMismatch { expected, found })
        }
    }
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degenerate { reason } => write!(f, "degenerate simplex: {reason}"),
            Self::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Self::ApexInside => write!(f, "cone apex is not outside the polytope"),
            Self::PointInsideCone => write!(f, "point lies strictly inside the cone"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Failures raised by the learners.
#[derive(Clone, Debug, PartialEq)]
pub enum TsmError {
    DimensionMismatch { expected: usize, found: usize },
    /// A labeled point contradicts a region certified by earlier labels.
    RegionViolation { reason: String },
    /// Geometry invariant broken despite passing the region checks.
    Structural { reason: String },
    MalformedLabel { reason: String },
    /// Categorical point with more than one active index in a line set.
    MalformedCategorical { reason: String },
    Config { reason: String },
}

impl TsmError {
    pub(crate) fn region(reason: impl Into<String>) -> Self {
        Self::RegionViolation {
            reason: reason.into(),
        }
    }

    pub(crate) fn structural(reason: impl Into<String>) -> Self {
        Self::Structural {
            reason: reason.into(),
        }
    }

    pub(crate) fn label(reason: impl Into<String>) -> Self {
        Self::MalformedLabel {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub(crate) fn check_dim(expected: usize, found: usize) -> Result<(), Self> {
        if expected == found {
            Ok(())
        } else {
            Err(Self::DimensionMismatch { expected, found })
        }
    }

    /// True for errors that degrade a group's trust instead of aborting.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RegionViolation { .. })
    }
}

impl fmt::Display for TsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Self::RegionViolation { reason } => write!(f, "region violation: {reason}"),
            Self::Structural { reason } => write!(f, "structural violation: {reason}"),
            Self::MalformedLabel { reason } => write!(f, "malformed label: {reason}"),
            Self::MalformedCategorical { reason } => {
                write!(f, "malformed categorical point: {reason}")
            }
            Self::Config { reason } => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl std::error::Error for TsmError {}

impl From<GeometryError> for TsmError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::DimensionMismatch { expected, found } => {
                Self::DimensionMismatch { expected, found }
            }
            other => Self::structural(other.to_string()),
        }
    }
}

//! Three-set metric: certify labels from geometry so an exploration loop
//! only asks the user about points whose label cannot be inferred.
//!
//! Layers
//! - `geometry`: incremental convex hulls and complement cones in R^d.
//! - `one_dim`, `categorical`, `learner`: per-feature-group learners.
//! - `multi`: conjunctive combination over a feature partition, with
//!   per-group orientation switching and freezing.
//! - `config`: session options that build a `MultiTsmLearner`.
//!
//! The crate does no I/O; callers own datasets and persistence.

pub mod categorical;
pub mod classifier;
pub mod config;
pub mod error;
pub mod geometry;
pub mod label;
pub mod learner;
pub mod multi;
pub mod one_dim;
pub mod point;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use classifier::ExtendedClassifier;
pub use config::TsmConfig;
pub use error::{GeometryError, TsmError};
pub use label::{ExtendedLabel, Label, LabelGroup, UserLabel};
pub use learner::{Orientation, TsmLearner};
pub use multi::{GroupFlags, GroupState, MultiTsmLearner};
pub use point::{DataPoint, LabeledPoint};

/// Common exports for callers driving a session.
pub mod prelude {
    pub use crate::classifier::ExtendedClassifier;
    pub use crate::config::TsmConfig;
    pub use crate::error::TsmError;
    pub use crate::label::{ExtendedLabel, Label, LabelGroup, UserLabel};
    pub use crate::multi::{GroupFlags, GroupState, MultiTsmLearner};
    pub use crate::point::{DataPoint, LabeledPoint};
    pub use nalgebra::DVector;
}

//! Tolerance defaults for hull maintenance (internal).
//!
//! Policy
//! - Fixed constants; the learners never tune them per session.
//! - Visibility is an absolute threshold on the unnormalised facet equation,
//!   matching how labeled coordinates arrive (raw, unscaled columns).

/// Band around a facet hyperplane treated as "on the boundary".
pub(crate) const VISIBILITY_EPS: f64 = 1e-11;
/// Relative threshold on the cofactor norm below which a facet is flat.
pub(crate) const DEGENERACY_EPS: f64 = 1e-12;
/// Relative residual below which an edge adds no affine rank.
pub(crate) const AFFINE_RANK_EPS: f64 = 1e-9;

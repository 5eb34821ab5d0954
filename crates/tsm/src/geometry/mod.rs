//! Incremental hull geometry in R^d (d >= 2).
//!
//! Purpose
//! - `ConvexPolytope`: boundary of the convex hull of a growing point set.
//! - `ComplementCone`: cone at an exterior apex, pointing away from the hull;
//!   a union of these certifies the non-convex class.
//!
//! Why this design
//! - Vertices are shared as `Arc<Vertex>` with value equality, so ridges and
//!   facets built independently from the same points compare and hash equal.
//!   Hull updates look facets up by value, never by identity.
//! - Facets store an unnormalised hyperplane; visibility uses a fixed absolute
//!   tolerance (`cfg::VISIBILITY_EPS`).
//!
//! Conventions
//! - `is_visible(p) > 0` means outside, `0` boundary, `< 0` inside.
//! - Containment is closed: boundary points are contained.

mod affine;
mod cfg;
mod cone;
mod facet;
mod polytope;
mod ridge;
mod vertex;

pub use affine::{affine_rank, is_affinely_independent};
pub use cone::ComplementCone;
pub use facet::Facet;
pub use polytope::ConvexPolytope;
pub use ridge::Ridge;
pub use vertex::Vertex;

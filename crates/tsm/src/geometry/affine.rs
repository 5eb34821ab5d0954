//! Affine-rank tests for simplex admission.

use nalgebra::DVector;
use std::sync::Arc;

use super::cfg::AFFINE_RANK_EPS;
use super::vertex::Vertex;

/// Affine rank of a point set (dimension of its affine hull).
///
/// Gram–Schmidt over the edges `p_i - p_0`; an edge contributes rank when its
/// residual keeps more than `AFFINE_RANK_EPS` of its original length.
pub fn affine_rank(points: &[Arc<Vertex>]) -> usize {
    let Some(first) = points.first() else {
        return 0;
    };
    let p0 = first.values();
    let mut basis: Vec<DVector<f64>> = Vec::new();
    for p in &points[1..] {
        let mut e = p.values() - p0;
        let len = e.norm();
        if len == 0.0 {
            continue;
        }
        for b in &basis {
            let c = e.dot(b);
            e -= b * c;
        }
        let residual = e.norm();
        if residual > AFFINE_RANK_EPS * len {
            basis.push(e / residual);
        }
    }
    basis.len()
}

/// True when the points are affinely independent (rank `len - 1`).
#[inline]
pub fn is_affinely_independent(points: &[Arc<Vertex>]) -> bool {
    points.is_empty() || affine_rank(points) + 1 == points.len()
}

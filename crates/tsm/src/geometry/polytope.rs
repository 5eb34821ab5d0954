//! Incremental convex hull (beneath–beyond).
//!
//! Purpose
//! - Maintain the facet boundary of the convex hull of every point inserted so
//!   far, starting from a full-dimensional simplex.
//!
//! Algorithm (`add_vertex`)
//! - Collect the facets that see the new point.
//! - XOR-toggle their ridges in a ridge → opposite-vertex map; what survives is
//!   the horizon (ridges shared by exactly one visible facet).
//! - Drop the visible facets and cone the horizon to the new point, orienting
//!   each new facet with the ridge's old opposite vertex as inside reference.
//!
//! Invariants
//! - Every inserted point satisfies `contains_point` afterwards.
//! - Facet set only changes when some facet strictly sees the new point.

use nalgebra::DVector;
use rand::Rng;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use super::affine::is_affinely_independent;
use super::facet::Facet;
use super::ridge::Ridge;
use super::vertex::Vertex;
use crate::error::GeometryError;

/// Convex polytope in R^d stored as its facet set plus a bounding box.
#[derive(Clone, Debug)]
pub struct ConvexPolytope {
    dim: usize,
    facets: HashSet<Facet>,
    lower: DVector<f64>,
    upper: DVector<f64>,
}

impl ConvexPolytope {
    /// Hull of a d-simplex given as `d + 1` affinely independent vertices.
    pub fn new(simplex: &[Arc<Vertex>]) -> Result<Self, GeometryError> {
        if simplex.len() < 3 {
            return Err(GeometryError::degenerate(format!(
                "need at least 3 simplex vertices, got {}",
                simplex.len()
            )));
        }
        let dim = simplex.len() - 1;
        for v in simplex {
            GeometryError::check_dim(dim, v.dim())?;
        }
        if !is_affinely_independent(simplex) {
            return Err(GeometryError::degenerate(
                "simplex vertices are affinely dependent",
            ));
        }

        let mut facets = HashSet::with_capacity(dim + 1);
        for (skip, inside) in simplex.iter().enumerate() {
            let others = simplex
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, v)| Arc::clone(v))
                .collect();
            facets.insert(Facet::new(others, inside, true)?);
        }

        let mut lower = simplex[0].values().clone();
        let mut upper = lower.clone();
        for v in &simplex[1..] {
            lower = lower.inf(v.values());
            upper = upper.sup(v.values());
        }
        Ok(Self {
            dim,
            facets,
            lower,
            upper,
        })
    }

    /// Insert `p`; returns `true` when the hull grew.
    pub fn add_vertex(&mut self, p: Arc<Vertex>) -> Result<bool, GeometryError> {
        GeometryError::check_dim(self.dim, p.dim())?;
        let visible: Vec<Facet> = self
            .facets
            .iter()
            .filter(|f| f.is_visible(p.values()) > 0)
            .cloned()
            .collect();
        if visible.is_empty() {
            return Ok(false);
        }

        let mut horizon: HashMap<Ridge, Arc<Vertex>> = HashMap::new();
        for f in &visible {
            self.facets.remove(f);
            toggle_ridges(&mut horizon, f, |_| true);
        }
        for (ridge, opposite) in &horizon {
            self.facets
                .insert(Facet::from_ridge(ridge, Arc::clone(&p), opposite, true)?);
        }

        self.lower = self.lower.inf(p.values());
        self.upper = self.upper.sup(p.values());
        Ok(true)
    }

    /// No facet strictly sees `p` (boundary points count as inside).
    #[inline]
    pub fn contains_point(&self, p: &DVector<f64>) -> bool {
        self.facets.iter().all(|f| f.is_visible(p) <= 0)
    }

    /// Volume via a fan of simplices from one hull vertex.
    pub fn volume(&self) -> f64 {
        let Some(anchor) = self
            .facets
            .iter()
            .next()
            .and_then(|f| f.vertices().first().cloned())
        else {
            return 0.0;
        };
        let d = self.dim;
        let total: f64 = self
            .facets
            .iter()
            .filter(|f| !f.contains_vertex(&anchor))
            .map(|f| {
                let m = nalgebra::DMatrix::from_fn(d, d, |i, j| {
                    f.vertices()[i].values()[j] - anchor.values()[j]
                });
                m.determinant().abs()
            })
            .sum();
        let factorial: f64 = (1..=d).map(|k| k as f64).product();
        total / factorial
    }

    /// Rejection-sample a point inside the hull from its bounding box.
    ///
    /// Returns `None` if `max_attempts` draws all miss.
    pub fn random_sample<R: Rng>(
        &self,
        rng: &mut R,
        max_attempts: usize,
    ) -> Option<DVector<f64>> {
        for _ in 0..max_attempts {
            let x = DVector::from_fn(self.dim, |i, _| {
                let (lo, hi) = (self.lower[i], self.upper[i]);
                lo + (hi - lo) * rng.gen::<f64>()
            });
            if self.contains_point(&x) {
                return Some(x);
            }
        }
        None
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn facets(&self) -> &HashSet<Facet> {
        &self.facets
    }

    /// Distinct vertices appearing on any facet.
    pub fn vertices(&self) -> BTreeSet<Arc<Vertex>> {
        self.facets
            .iter()
            .flat_map(|f| f.vertices().iter().cloned())
            .collect()
    }

    /// Axis-aligned bounding box `(lower, upper)` of the inserted points.
    #[inline]
    pub fn bounding_box(&self) -> (&DVector<f64>, &DVector<f64>) {
        (&self.lower, &self.upper)
    }
}

/// XOR-toggle the ridges of `facet` accepted by `keep` into `horizon`.
pub(crate) fn toggle_ridges(
    horizon: &mut HashMap<Ridge, Arc<Vertex>>,
    facet: &Facet,
    keep: impl Fn(&Ridge) -> bool,
) {
    for (ridge, opposite) in facet.ridges() {
        if !keep(&ridge) {
            continue;
        }
        if horizon.remove(&ridge).is_none() {
            horizon.insert(ridge, opposite);
        }
    }
}

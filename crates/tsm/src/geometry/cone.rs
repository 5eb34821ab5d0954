//! Convex cones anchored at an exterior apex ("point-wise complement hull").
//!
//! Purpose
//! - Certify the concave class: if the convex class is convex and `apex`
//!   belongs to the other class, every point whose segment to some convex
//!   point passes "behind" the apex is also in the other class. That region is
//!   the cone spanned at `apex` away from the convex hull.
//!
//! Why this design
//! - Every facet passes through the apex, so growing the convex hull by a new
//!   point only replaces apex-adjacent facets that the point sees from the
//!   cone side; the apex never moves.
//! - Orientation uses the dropped convex vertex as the *outside* reference.
//!
//! Invariants
//! - All facets contain `apex`.
//! - Convex-class vertices used to build or grow the cone are never strictly
//!   inside it.

use nalgebra::DVector;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use super::affine::is_affinely_independent;
use super::facet::Facet;
use super::polytope::{toggle_ridges, ConvexPolytope};
use super::ridge::Ridge;
use super::vertex::Vertex;
use crate::error::GeometryError;

/// Cone at `apex` bounded by hyperplanes through the apex and convex vertices.
#[derive(Clone, Debug)]
pub struct ComplementCone {
    dim: usize,
    apex: Arc<Vertex>,
    facets: HashSet<Facet>,
}

impl ComplementCone {
    /// Cone from the apex and at least `d` convex vertices.
    ///
    /// The first `d` candidates seed one facet each (apex plus all seeds but
    /// one); the remaining candidates are folded in with `add_vertex`. Fails
    /// with `Degenerate` unless the apex and the seeds span a simplex.
    pub fn from_vertices(
        apex: Arc<Vertex>,
        candidates: &[Arc<Vertex>],
    ) -> Result<Self, GeometryError> {
        let dim = apex.dim();
        if dim < 2 {
            return Err(GeometryError::degenerate("cones need dimension >= 2"));
        }
        if candidates.len() < dim {
            return Err(GeometryError::degenerate(format!(
                "need {dim} cone seeds, got {}",
                candidates.len()
            )));
        }
        for c in candidates {
            GeometryError::check_dim(dim, c.dim())?;
        }

        let seeds = &candidates[..dim];
        let mut spanning = Vec::with_capacity(dim + 1);
        spanning.push(Arc::clone(&apex));
        spanning.extend(seeds.iter().cloned());
        if !is_affinely_independent(&spanning) {
            return Err(GeometryError::degenerate(
                "apex is affinely dependent on the cone seeds",
            ));
        }
        let mut facets = HashSet::with_capacity(dim);
        for (skip, outside) in seeds.iter().enumerate() {
            let mut vertices = Vec::with_capacity(dim);
            vertices.push(Arc::clone(&apex));
            vertices.extend(
                seeds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip)
                    .map(|(_, v)| Arc::clone(v)),
            );
            let facet = Facet::new(vertices, outside, false)?;
            if facet.is_degenerate() {
                return Err(GeometryError::degenerate(
                    "apex is affinely dependent on the cone seeds",
                ));
            }
            facets.insert(facet);
        }

        let mut cone = Self { dim, apex, facets };
        for c in &candidates[dim..] {
            cone.add_vertex(Arc::clone(c))?;
        }
        Ok(cone)
    }

    /// Cone from the apex and an existing polytope (left untouched).
    ///
    /// The polytope's horizon as seen from the apex becomes the cone's ridge
    /// set; fails with `ApexInside` when no polytope facet sees the apex.
    pub fn from_polytope(
        apex: Arc<Vertex>,
        polytope: &ConvexPolytope,
    ) -> Result<Self, GeometryError> {
        let dim = polytope.dim();
        GeometryError::check_dim(dim, apex.dim())?;

        let mut horizon: HashMap<Ridge, Arc<Vertex>> = HashMap::new();
        for f in polytope
            .facets()
            .iter()
            .filter(|f| f.is_visible(apex.values()) > 0)
        {
            toggle_ridges(&mut horizon, f, |_| true);
        }
        if horizon.is_empty() {
            return Err(GeometryError::ApexInside);
        }

        let mut facets = HashSet::with_capacity(horizon.len());
        for (ridge, opposite) in &horizon {
            facets.insert(Facet::from_ridge(ridge, Arc::clone(&apex), opposite, false)?);
        }
        Ok(Self { dim, apex, facets })
    }

    /// Fold a new convex vertex into the cone; returns `true` if it changed.
    ///
    /// Facets with `p` on their inner side are replaced by facets through the
    /// apex-adjacent part of their horizon and `p`. A point strictly inside
    /// the whole cone is rejected with `PointInsideCone`.
    pub fn add_vertex(&mut self, p: Arc<Vertex>) -> Result<bool, GeometryError> {
        GeometryError::check_dim(self.dim, p.dim())?;
        let behind: Vec<Facet> = self
            .facets
            .iter()
            .filter(|f| f.is_visible(p.values()) < 0)
            .cloned()
            .collect();
        if behind.is_empty() {
            return Ok(false);
        }
        if behind.len() == self.facets.len() {
            return Err(GeometryError::PointInsideCone);
        }

        let apex = Arc::clone(&self.apex);
        let mut horizon: HashMap<Ridge, Arc<Vertex>> = HashMap::new();
        for f in &behind {
            self.facets.remove(f);
            toggle_ridges(&mut horizon, f, |r| r.contains(&apex));
        }
        for (ridge, opposite) in &horizon {
            self.facets
                .insert(Facet::from_ridge(ridge, Arc::clone(&p), opposite, false)?);
        }
        Ok(true)
    }

    #[inline]
    pub fn contains_point(&self, p: &DVector<f64>) -> bool {
        self.facets.iter().all(|f| f.is_visible(p) <= 0)
    }

    #[inline]
    pub fn apex(&self) -> &Arc<Vertex> {
        &self.apex
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn facets(&self) -> &HashSet<Facet> {
        &self.facets
    }

    pub fn vertices(&self) -> BTreeSet<Arc<Vertex>> {
        self.facets
            .iter()
            .flat_map(|f| f.vertices().iter().cloned())
            .collect()
    }
}

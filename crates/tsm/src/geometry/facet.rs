//! Oriented hyperplanes through d vertices.
//!
//! Orientation convention
//! - `⟨coef, x⟩ + offset > 0` means `x` sees the facet from outside the body.
//! - Values within `VISIBILITY_EPS` of zero are on the boundary.
//!
//! The normal is the signed cofactor expansion of the (d-1)×d edge matrix
//! `[v_i - v_0]`, so no normalisation or SVD is needed.

use nalgebra::{DMatrix, DVector};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::cfg::{DEGENERACY_EPS, VISIBILITY_EPS};
use super::ridge::Ridge;
use super::vertex::Vertex;
use crate::error::GeometryError;

/// (d-1)-face of a polytope or cone.
///
/// Invariants:
/// - `vertices` is sorted; equality and hashing use the vertex tuple only.
/// - `coef` and `offset` are fixed at construction.
#[derive(Clone, Debug)]
pub struct Facet {
    vertices: Vec<Arc<Vertex>>,
    coef: DVector<f64>,
    offset: f64,
    degenerate: bool,
}

impl Facet {
    /// Build the facet through `vertices`, oriented so that `reference` lies
    /// inside when `reference_is_inside`, outside otherwise.
    pub fn new(
        mut vertices: Vec<Arc<Vertex>>,
        reference: &Vertex,
        reference_is_inside: bool,
    ) -> Result<Self, GeometryError> {
        let d = vertices.len();
        if d < 2 {
            return Err(GeometryError::degenerate("facets need dimension >= 2"));
        }
        for v in &vertices {
            GeometryError::check_dim(d, v.dim())?;
        }
        GeometryError::check_dim(d, reference.dim())?;
        vertices.sort();

        let v0 = vertices[0].values();
        let edges = DMatrix::from_fn(d - 1, d, |i, j| vertices[i + 1].values()[j] - v0[j]);
        let coef = DVector::from_fn(d, |j, _| {
            let minor = edges.clone().remove_column(j).determinant();
            if j % 2 == 0 {
                minor
            } else {
                -minor
            }
        });
        let offset = -coef.dot(v0);

        let scale: f64 = edges.row_iter().map(|r| r.norm()).product();
        let degenerate = scale == 0.0 || coef.norm() <= DEGENERACY_EPS * scale;

        let mut facet = Self {
            vertices,
            coef,
            offset,
            degenerate,
        };
        let side = facet.is_visible(reference.values());
        if (side > 0 && reference_is_inside) || (side <= 0 && !reference_is_inside) {
            facet.coef.neg_mut();
            facet.offset = -facet.offset;
        }
        Ok(facet)
    }

    /// Facet spanned by `ridge` plus `apex`, used when a hull grows.
    pub fn from_ridge(
        ridge: &Ridge,
        apex: Arc<Vertex>,
        reference: &Vertex,
        reference_is_inside: bool,
    ) -> Result<Self, GeometryError> {
        let mut vertices = ridge.vertices().to_vec();
        vertices.push(apex);
        Self::new(vertices, reference, reference_is_inside)
    }

    #[inline]
    pub fn signed_distance(&self, p: &DVector<f64>) -> f64 {
        self.coef.dot(p) + self.offset
    }

    /// Side test: `1` outside, `-1` inside, `0` on the boundary.
    #[inline]
    pub fn is_visible(&self, p: &DVector<f64>) -> i8 {
        let x = self.signed_distance(p);
        if x.abs() <= VISIBILITY_EPS {
            0
        } else if x > 0.0 {
            1
        } else {
            -1
        }
    }

    /// The d ridges obtained by dropping each vertex, paired with the dropped
    /// (opposite) vertex.
    pub fn ridges(&self) -> Vec<(Ridge, Arc<Vertex>)> {
        (0..self.vertices.len())
            .map(|skip| {
                let rest = self
                    .vertices
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip)
                    .map(|(_, v)| Arc::clone(v))
                    .collect();
                (Ridge::new(rest), Arc::clone(&self.vertices[skip]))
            })
            .collect()
    }

    #[inline]
    pub fn vertices(&self) -> &[Arc<Vertex>] {
        &self.vertices
    }

    #[inline]
    pub fn contains_vertex(&self, v: &Vertex) -> bool {
        self.vertices
            .binary_search_by(|x| x.as_ref().cmp(v))
            .is_ok()
    }

    #[inline]
    pub fn coef(&self) -> &DVector<f64> {
        &self.coef
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// True when the vertices are (numerically) affinely dependent.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

impl PartialEq for Facet {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
    }
}

impl Eq for Facet {}

impl Hash for Facet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vertices.hash(state);
    }
}

//! Per-subspace three-set learner.
//!
//! Purpose
//! - Certify regions of one feature group from its labeled points: the
//!   convex class as a `ConvexPolytope`, the other class as a union of
//!   `ComplementCone`s (one per exterior point not already covered).
//! - `Orientation` says which label is assumed convex; the same geometry
//!   serves both orientations, only the label-to-side mapping changes.
//!
//! Why this design
//! - One backend per group kind (`Line` for d = 1, `Hull` for d >= 2,
//!   `Categorical` for one-hot blocks) behind a single query surface.
//! - Before the polytope exists, convex points are admitted to the seed
//!   simplex only when they raise its affine rank; dependent ones are
//!   deferred. Concave points wait until `dim` seeds exist, then become cones.
//!
//! Invariants
//! - Regions only grow. A labeled point certified by the opposite region is
//!   rejected with `RegionViolation` before any geometry changes.
//! - Convex-side points equal to a known hull or cone vertex are skipped.

use nalgebra::DVector;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::categorical::CatTsm;
use crate::error::{GeometryError, TsmError};
use crate::geometry::{is_affinely_independent, ComplementCone, ConvexPolytope, Vertex};
use crate::label::Label;
use crate::one_dim::OneDimTsm;
use crate::point::LabeledPoint;

/// Which class is assumed to be convex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    PositiveConvex,
    NegativeConvex,
}

impl Orientation {
    /// `label` belongs to the convex side under this orientation.
    #[inline]
    pub fn is_convex_side(self, label: Label) -> bool {
        match self {
            Self::PositiveConvex => label.is_positive(),
            Self::NegativeConvex => label.is_negative(),
        }
    }

    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Self::PositiveConvex => Self::NegativeConvex,
            Self::NegativeConvex => Self::PositiveConvex,
        }
    }

    #[inline]
    pub fn from_positive_convex(positive_convex: bool) -> Self {
        if positive_convex {
            Self::PositiveConvex
        } else {
            Self::NegativeConvex
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PositiveConvex => write!(f, "positive-convex"),
            Self::NegativeConvex => write!(f, "negative-convex"),
        }
    }
}

/// Polytope plus cones for a numeric group of dimension `dim >= 2`.
#[derive(Clone, Debug)]
pub struct HullRegions {
    dim: usize,
    /// Affinely independent convex points seeding the polytope.
    simplex: Vec<Arc<Vertex>>,
    /// Convex points dependent on `simplex`, folded in once the polytope exists.
    deferred: Vec<Arc<Vertex>>,
    /// Concave points waiting for enough seeds to span a cone.
    pending: Vec<Arc<Vertex>>,
    polytope: Option<ConvexPolytope>,
    cones: Vec<ComplementCone>,
    known: BTreeSet<Arc<Vertex>>,
}

impl HullRegions {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            simplex: Vec::with_capacity(dim + 1),
            deferred: Vec::new(),
            pending: Vec::new(),
            polytope: None,
            cones: Vec::new(),
            known: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn is_in_convex_region(&self, p: &DVector<f64>) -> bool {
        self.polytope.as_ref().is_some_and(|h| h.contains_point(p))
    }

    #[inline]
    pub fn is_in_concave_region(&self, p: &DVector<f64>) -> bool {
        self.cones.iter().any(|c| c.contains_point(p))
    }

    /// Route one point to the convex or the concave side.
    pub fn update(&mut self, p: Arc<Vertex>, convex_side: bool) -> Result<(), TsmError> {
        TsmError::check_dim(self.dim, p.dim())?;
        if convex_side {
            if self.is_in_concave_region(p.values()) {
                return Err(TsmError::region(format!(
                    "convex point {p} lies in a concave cone"
                )));
            }
        } else if self.is_in_convex_region(p.values()) {
            return Err(TsmError::region(format!(
                "concave point {p} lies in the convex polytope"
            )));
        }
        let outcome = if convex_side {
            self.update_convex(p)
        } else {
            self.update_concave(p)
        };
        self.refresh_known();
        outcome
    }

    fn update_convex(&mut self, p: Arc<Vertex>) -> Result<(), TsmError> {
        if let Some(polytope) = self.polytope.as_mut() {
            if self.known.contains(&p) {
                return Ok(());
            }
            polytope.add_vertex(Arc::clone(&p))?;
            for c in &mut self.cones {
                c.add_vertex(Arc::clone(&p))?;
            }
            return Ok(());
        }

        if self.simplex.contains(&p) || self.deferred.contains(&p) {
            return Ok(());
        }
        for c in &mut self.cones {
            c.add_vertex(Arc::clone(&p))?;
        }
        self.simplex.push(Arc::clone(&p));
        if !is_affinely_independent(&self.simplex) {
            self.simplex.pop();
            self.deferred.push(p);
            return Ok(());
        }

        if self.simplex.len() == self.dim + 1 {
            let mut polytope = ConvexPolytope::new(&self.simplex)?;
            for q in self.deferred.drain(..) {
                polytope.add_vertex(q)?;
            }
            debug!(
                dim = self.dim,
                facets = polytope.facets().len(),
                "convex polytope initialised"
            );
            self.polytope = Some(polytope);
            self.drain_pending()?;
        } else if self.simplex.len() == self.dim {
            self.drain_pending()?;
        }
        Ok(())
    }

    fn update_concave(&mut self, p: Arc<Vertex>) -> Result<(), TsmError> {
        if self.polytope.is_none() && self.simplex.len() < self.dim {
            if !self.pending.contains(&p) {
                self.pending.push(p);
            }
            return Ok(());
        }
        self.add_cone(p)
    }

    /// Turn every pending point into a cone (or keep it pending).
    ///
    /// A violating point does not stop the drain; the first violation is
    /// returned once all other points are placed.
    fn drain_pending(&mut self) -> Result<(), TsmError> {
        let mut queue = std::mem::take(&mut self.pending).into_iter();
        let mut violation = None;
        while let Some(q) = queue.next() {
            match self.add_cone(q) {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => {
                    violation.get_or_insert(e);
                }
                Err(e) => {
                    self.pending.extend(queue);
                    return Err(e);
                }
            }
        }
        violation.map_or(Ok(()), Err)
    }

    /// New cone at `apex` unless an existing cone already covers it.
    fn add_cone(&mut self, apex: Arc<Vertex>) -> Result<(), TsmError> {
        if self.is_in_concave_region(apex.values()) {
            return Ok(());
        }
        let cone = match &self.polytope {
            Some(polytope) => match ComplementCone::from_polytope(Arc::clone(&apex), polytope) {
                Err(GeometryError::ApexInside) => {
                    return Err(TsmError::region(format!(
                        "concave point {apex} lies in the convex polytope"
                    )))
                }
                other => other?,
            },
            None => {
                let seeds: Vec<Arc<Vertex>> =
                    self.simplex.iter().chain(&self.deferred).cloned().collect();
                match ComplementCone::from_vertices(Arc::clone(&apex), &seeds) {
                    Err(GeometryError::Degenerate { .. }) => {
                        self.pending.push(apex);
                        return Ok(());
                    }
                    other => other?,
                }
            }
        };
        debug!(apex = %apex, facets = cone.facets().len(), "complement cone created");
        self.cones.push(cone);
        Ok(())
    }

    fn refresh_known(&mut self) {
        let mut known = self
            .polytope
            .as_ref()
            .map(ConvexPolytope::vertices)
            .unwrap_or_default();
        for c in &self.cones {
            known.extend(c.vertices());
        }
        self.known = known;
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn polytope(&self) -> Option<&ConvexPolytope> {
        self.polytope.as_ref()
    }

    #[inline]
    pub fn cones(&self) -> &[ComplementCone] {
        &self.cones
    }

    /// Concave points not yet turned into cones.
    #[inline]
    pub fn pending(&self) -> &[Arc<Vertex>] {
        &self.pending
    }
}

impl fmt::Display for HullRegions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.polytope {
            Some(h) => write!(f, "polytope with {} facets", h.facets().len())?,
            None => write!(f, "no polytope ({} seeds)", self.simplex.len())?,
        }
        write!(f, ", {} cones, {} pending", self.cones.len(), self.pending.len())
    }
}

#[derive(Clone, Debug)]
enum Backend {
    Line(OneDimTsm),
    Hull(HullRegions),
    Categorical(CatTsm),
}

/// Three-set learner for one feature group.
#[derive(Clone, Debug)]
pub struct TsmLearner {
    dim: usize,
    backend: Backend,
}

impl TsmLearner {
    /// Numeric learner; `dim == 1` uses the interval/ray backend.
    pub fn new(dim: usize) -> Result<Self, TsmError> {
        let backend = match dim {
            0 => return Err(TsmError::config("feature group must not be empty")),
            1 => Backend::Line(OneDimTsm::new()),
            _ => Backend::Hull(HullRegions::new(dim)),
        };
        Ok(Self { dim, backend })
    }

    /// Learner over a block of `dim` one-hot columns.
    pub fn categorical(dim: usize) -> Result<Self, TsmError> {
        if dim == 0 {
            return Err(TsmError::config("feature group must not be empty"));
        }
        Ok(Self {
            dim,
            backend: Backend::Categorical(CatTsm::new()),
        })
    }

    /// Points carry the label of this subspace (global, or a one-entry group).
    pub fn update(
        &mut self,
        points: &[LabeledPoint],
        orientation: Orientation,
    ) -> Result<(), TsmError> {
        for lp in points {
            TsmError::check_dim(self.dim, lp.dim())?;
            let label = lp.label.for_subspace(0, 1)?;
            let values = &lp.point.values;
            match &mut self.backend {
                Backend::Line(line) => {
                    line.update(values[0], orientation.is_convex_side(label))?
                }
                Backend::Hull(hull) => hull.update(
                    Arc::new(Vertex::new(values.clone())),
                    orientation.is_convex_side(label),
                )?,
                Backend::Categorical(cat) => cat.update(values, label)?,
            }
        }
        Ok(())
    }

    /// Update assuming the positive class is convex.
    pub fn update_pos_ratio(&mut self, points: &[LabeledPoint]) -> Result<(), TsmError> {
        self.update(points, Orientation::PositiveConvex)
    }

    /// Update assuming the negative class is convex.
    pub fn update_neg_ratio(&mut self, points: &[LabeledPoint]) -> Result<(), TsmError> {
        self.update(points, Orientation::NegativeConvex)
    }

    /// Certified positive under `orientation`: the polytope when positives
    /// are convex, the cones otherwise. Categorical groups use truth lines.
    pub fn is_in_convex_region(
        &self,
        values: &DVector<f64>,
        orientation: Orientation,
    ) -> Result<bool, TsmError> {
        TsmError::check_dim(self.dim, values.len())?;
        let convex = orientation == Orientation::PositiveConvex;
        Ok(match &self.backend {
            Backend::Line(line) if convex => line.is_in_convex_segment(values[0]),
            Backend::Line(line) => line.is_in_concave_ray(values[0]),
            Backend::Hull(hull) if convex => hull.is_in_convex_region(values),
            Backend::Hull(hull) => hull.is_in_concave_region(values),
            Backend::Categorical(cat) => cat.is_on_truth_lines(values)?,
        })
    }

    /// Certified negative under `orientation`; mirror of `is_in_convex_region`.
    pub fn is_in_concave_region(
        &self,
        values: &DVector<f64>,
        orientation: Orientation,
    ) -> Result<bool, TsmError> {
        match &self.backend {
            Backend::Categorical(cat) => {
                TsmError::check_dim(self.dim, values.len())?;
                cat.is_on_false_lines(values)
            }
            _ => self.is_in_convex_region(values, orientation.flipped()),
        }
    }

    /// Neither region certifies `values`, so its label is worth asking for.
    pub fn is_useful_sample(
        &self,
        values: &DVector<f64>,
        orientation: Orientation,
    ) -> Result<bool, TsmError> {
        Ok(!self.is_in_convex_region(values, orientation)?
            && !self.is_in_concave_region(values, orientation)?)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn is_categorical(&self) -> bool {
        matches!(self.backend, Backend::Categorical(_))
    }

    pub fn hull(&self) -> Option<&HullRegions> {
        match &self.backend {
            Backend::Hull(h) => Some(h),
            _ => None,
        }
    }

    pub fn line(&self) -> Option<&OneDimTsm> {
        match &self.backend {
            Backend::Line(l) => Some(l),
            _ => None,
        }
    }

    pub fn lines(&self) -> Option<&CatTsm> {
        match &self.backend {
            Backend::Categorical(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for TsmLearner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.backend {
            Backend::Line(l) => write!(f, "1-d: {l}"),
            Backend::Hull(h) => write!(f, "{}-d: {h}", self.dim),
            Backend::Categorical(c) => write!(f, "categorical: {c}"),
        }
    }
}

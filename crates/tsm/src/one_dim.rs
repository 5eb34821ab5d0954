//! Three-set partition of the real line.
//!
//! With one feature the convex class is an interval `[lo, hi]` and the other
//! class is the pair of rays `(-∞, left] ∪ [right, +∞)`; no facet machinery is
//! needed. Concave points seen before the interval exists are buffered; the
//! rays are seeded from the two buffered points nearest the interval.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use crate::error::TsmError;

/// Interval plus rays; `None` until the first point of each kind arrives.
///
/// Invariants:
/// - `lo <= hi`; `left < lo` and `right > hi` (with ±∞ sentinels).
/// - No buffered concave point lies inside the interval.
#[derive(Clone, Debug, Default)]
pub struct OneDimTsm {
    segment: Option<(f64, f64)>,
    rays: Option<(f64, f64)>,
    pending: Vec<f64>,
}

impl OneDimTsm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `x` to the interval (`convex_side`) or to the rays.
    pub fn update(&mut self, x: f64, convex_side: bool) -> Result<(), TsmError> {
        if convex_side {
            self.update_convex(x)
        } else {
            self.update_concave(x)
        }
    }

    /// Widen the interval to cover `x`.
    pub fn update_convex(&mut self, x: f64) -> Result<(), TsmError> {
        if self.is_in_concave_ray(x) {
            return Err(TsmError::region(format!("convex point {x} lies in a concave ray")));
        }
        let (lo, hi) = match self.segment {
            Some((lo, hi)) => (lo.min(x), hi.max(x)),
            None => (x, x),
        };
        if let Some(q) = self.pending.iter().find(|&&q| lo <= q && q <= hi) {
            return Err(TsmError::region(format!(
                "interval [{lo}, {hi}] would cover concave point {q}"
            )));
        }
        self.segment = Some((lo, hi));
        Ok(())
    }

    /// Record a concave point: buffer it, seed the rays, or tighten them.
    pub fn update_concave(&mut self, x: f64) -> Result<(), TsmError> {
        if self.is_in_convex_segment(x) {
            return Err(TsmError::region(format!("concave point {x} lies in the interval")));
        }
        let Some((lo, hi)) = self.segment else {
            if !self.pending.contains(&x) {
                self.pending.push(x);
            }
            return Ok(());
        };

        if self.rays.is_some() {
            self.tighten(x);
            return Ok(());
        }

        if self.pending.is_empty() {
            self.rays = Some(if x > hi {
                (f64::NEG_INFINITY, x)
            } else {
                (x, f64::INFINITY)
            });
            return Ok(());
        }

        let mut candidates = std::mem::take(&mut self.pending);
        if !candidates.contains(&x) {
            candidates.push(x);
        }
        let nearest = nearest_k(&candidates, 2, lo);
        let left = nearest
            .iter()
            .copied()
            .filter(|&c| c < lo)
            .fold(f64::NEG_INFINITY, f64::max);
        let right = nearest
            .iter()
            .copied()
            .filter(|&c| c > hi)
            .fold(f64::INFINITY, f64::min);
        self.rays = Some((left, right));
        for c in candidates {
            self.tighten(c);
        }
        Ok(())
    }

    fn tighten(&mut self, x: f64) {
        let (Some((lo, hi)), Some((left, right))) = (self.segment, self.rays.as_mut()) else {
            return;
        };
        if hi < x && x < *right {
            *right = x;
        } else if *left < x && x < lo {
            *left = x;
        }
    }

    #[inline]
    pub fn is_in_convex_segment(&self, x: f64) -> bool {
        matches!(self.segment, Some((lo, hi)) if lo <= x && x <= hi)
    }

    #[inline]
    pub fn is_in_concave_ray(&self, x: f64) -> bool {
        matches!(self.rays, Some((left, right)) if x <= left || x >= right)
    }

    #[inline]
    pub fn segment(&self) -> Option<(f64, f64)> {
        self.segment
    }

    /// `(left upper bound, right lower bound)`.
    #[inline]
    pub fn rays(&self) -> Option<(f64, f64)> {
        self.rays
    }

    #[inline]
    pub fn pending(&self) -> &[f64] {
        &self.pending
    }
}

impl fmt::Display for OneDimTsm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.segment {
            Some((lo, hi)) => write!(f, "segment [{lo}, {hi}]")?,
            None => write!(f, "segment none")?,
        }
        match self.rays {
            Some((left, right)) => write!(f, ", rays (-inf, {left}] u [{right}, +inf)"),
            None => write!(f, ", rays none"),
        }
    }
}

#[derive(PartialEq)]
struct ByDistance {
    distance: f64,
    value: f64,
}

impl Eq for ByDistance {}

impl PartialOrd for ByDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.value.total_cmp(&other.value))
    }
}

/// The `k` values closest to `reference` (absolute distance), ascending.
///
/// Bounded max-heap: O(n log k).
pub fn nearest_k(points: &[f64], k: usize, reference: f64) -> Vec<f64> {
    if k == 0 {
        return Vec::new();
    }
    let mut heap = BinaryHeap::with_capacity(k + 1);
    for &value in points {
        heap.push(ByDistance {
            distance: (value - reference).abs(),
            value,
        });
        if heap.len() > k {
            heap.pop();
        }
    }
    let mut out: Vec<f64> = heap.into_iter().map(|e| e.value).collect();
    out.sort_by(f64::total_cmp);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn fixture(seed: u64) -> OneDimTsm {
        let mut xs: Vec<(f64, bool)> = (-10..=10).map(|i| (i as f64, (i as f64) < -3.2)).collect();
        xs.shuffle(&mut StdRng::seed_from_u64(seed));
        let mut t = OneDimTsm::new();
        t.update(-3.5, true).unwrap();
        t.update(1.5, false).unwrap();
        for (x, convex) in xs {
            t.update(x, convex).unwrap();
        }
        t
    }

    #[test]
    fn fixture_segment_and_rays() {
        let t = fixture(0);
        assert_eq!(t.segment(), Some((-10.0, -3.5)));
        assert_eq!(t.rays(), Some((f64::NEG_INFINITY, -3.0)));
        assert!(t.is_in_convex_segment(-5.0));
        assert!(t.is_in_convex_segment(-10.0));
        assert!(!t.is_in_convex_segment(-20.0));
        assert!(!t.is_in_convex_segment(20.0));
        assert!(t.is_in_concave_ray(20.0));
        assert!(t.is_in_concave_ray(-3.0));
        assert!(!t.is_in_concave_ray(-5.0));
    }

    #[test]
    fn fixture_is_order_independent() {
        for seed in 1..10 {
            let t = fixture(seed);
            assert_eq!(t.segment(), Some((-10.0, -3.5)));
            assert_eq!(t.rays(), Some((f64::NEG_INFINITY, -3.0)));
        }
    }

    #[test]
    fn nearest_k_selects_closest() {
        let pts: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        assert_eq!(nearest_k(&pts, 2, 5.3), vec![5.0, 6.0]);
        assert_eq!(nearest_k(&pts, 3, 11.0), vec![8.0, 9.0, 10.0]);
        assert_eq!(nearest_k(&pts[..1], 2, 3.0), vec![0.0]);
    }

    #[test]
    fn buffered_points_seed_both_rays() {
        let mut t = OneDimTsm::new();
        t.update_concave(-4.0).unwrap();
        t.update_concave(7.0).unwrap();
        t.update_concave(-9.0).unwrap();
        t.update_convex(0.0).unwrap();
        t.update_concave(3.0).unwrap();
        assert_eq!(t.rays(), Some((-4.0, 3.0)));
        assert!(t.pending().is_empty());
        assert!(t.is_in_concave_ray(-9.0));
        assert!(t.is_in_concave_ray(7.0));
    }

    #[test]
    fn one_sided_buffer_recovers_far_side() {
        let mut t = OneDimTsm::new();
        t.update_concave(1.0).unwrap();
        t.update_concave(2.0).unwrap();
        t.update_concave(-8.0).unwrap();
        t.update_convex(0.0).unwrap();
        t.update_concave(1.5).unwrap();
        assert_eq!(t.rays(), Some((-8.0, 1.0)));
    }

    #[test]
    fn conflicts_are_region_violations() {
        let mut t = OneDimTsm::new();
        t.update_convex(0.0).unwrap();
        t.update_convex(2.0).unwrap();
        assert!(t.update_concave(1.0).unwrap_err().is_recoverable());
        t.update_concave(5.0).unwrap();
        assert!(t.update_convex(6.0).unwrap_err().is_recoverable());
    }

    #[test]
    fn widening_over_buffered_point_is_rejected() {
        let mut t = OneDimTsm::new();
        t.update_concave(1.0).unwrap();
        t.update_convex(0.0).unwrap();
        assert!(t.update_convex(2.0).unwrap_err().is_recoverable());
        assert_eq!(t.segment(), Some((0.0, 0.0)));
    }

    proptest! {
        #[test]
        fn segment_and_rays_are_disjoint(
            xs in prop::collection::vec((-50i32..50, any::<bool>()), 1..40),
            probe in -60i32..60,
        ) {
            let mut t = OneDimTsm::new();
            for (x, convex) in xs {
                let _ = t.update(x as f64, convex);
            }
            let p = probe as f64;
            prop_assert!(!(t.is_in_convex_segment(p) && t.is_in_concave_ray(p)));
        }
    }
}

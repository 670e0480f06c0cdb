//! Hidden-interval algebra over one edge's `[0, 1]` parametrization.
//!
//! Each candidate edge gets a scratch [`HiddenIntervals`]: occlusion
//! results are inserted as `(t0, t1)` sub-ranges, compressed into a
//! minimal disjoint cover, and finally complemented into the edge's
//! visible pieces. The set is cleared and reused between edges.

use hlr_math::Segment3;

/// Parametric tolerance: values this close to 0 or 1 snap to the ends so
/// "fully hidden" is detectable as exactly `[0, 1]`.
pub const PARAM_EPS: f64 = 1e-6;

/// A sub-range of an edge's parametrization known to be hidden.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Range start, `0 <= t0 <= t1`.
    pub t0: f64,
    /// Range end, `t1 <= 1`.
    pub t1: f64,
}

/// Sorted, pairwise-disjoint set of hidden intervals for one edge.
#[derive(Debug, Clone, Default)]
pub struct HiddenIntervals {
    spans: Vec<Interval>,
}

impl HiddenIntervals {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all intervals, keeping the allocation for the next edge.
    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// The current (compressed) intervals.
    pub fn spans(&self) -> &[Interval] {
        &self.spans
    }

    /// Convert an overlap sub-segment to an interval on `edge`'s own
    /// parametrization and add it. Returns whether the set changed.
    ///
    /// The set is left unsorted; call [`compress`](Self::compress) before
    /// reading it back.
    pub fn insert(&mut self, edge: &Segment3, overlap: &Segment3) -> bool {
        let mut t0 = snap(edge.project_param(&overlap.start).clamp(0.0, 1.0));
        let mut t1 = snap(edge.project_param(&overlap.end).clamp(0.0, 1.0));
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t1 - t0 <= PARAM_EPS {
            return false;
        }
        self.spans.push(Interval { t0, t1 });
        true
    }

    /// Sort by `t0` and merge intervals that overlap or touch, producing
    /// the minimal disjoint cover.
    pub fn compress(&mut self) {
        if self.spans.len() < 2 {
            return;
        }
        self.spans.sort_by(|a, b| a.t0.total_cmp(&b.t0));
        let mut merged: Vec<Interval> = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            match merged.last_mut() {
                Some(last) if span.t0 <= last.t1 + PARAM_EPS => {
                    last.t1 = last.t1.max(span.t1);
                }
                _ => merged.push(span),
            }
        }
        self.spans = merged;
    }

    /// True once the compressed set covers exactly `[0, 1]`: the edge is
    /// fully hidden and no further occluder can change the result.
    pub fn is_full(&self) -> bool {
        self.spans.len() == 1 && self.spans[0].t0 == 0.0 && self.spans[0].t1 == 1.0
    }

    /// Emit the visible complement of the (compressed) hidden set: the
    /// gaps between 0, the intervals, and 1, as sub-segments of `edge`.
    pub fn visible_segments(&self, edge: &Segment3, out: &mut Vec<Segment3>) {
        let mut cursor = 0.0;
        for span in &self.spans {
            if span.t0 - cursor > PARAM_EPS {
                out.push(edge.slice(cursor, span.t0));
            }
            cursor = cursor.max(span.t1);
        }
        if 1.0 - cursor > PARAM_EPS {
            out.push(edge.slice(cursor, 1.0));
        }
    }
}

fn snap(t: f64) -> f64 {
    if t < PARAM_EPS {
        0.0
    } else if t > 1.0 - PARAM_EPS {
        1.0
    } else {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hlr_math::Point3;

    fn unit_edge() -> Segment3 {
        Segment3::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0))
    }

    fn sub(edge: &Segment3, t0: f64, t1: f64) -> Segment3 {
        edge.slice(t0, t1)
    }

    #[test]
    fn test_insert_and_complement() {
        let edge = unit_edge();
        let mut set = HiddenIntervals::new();
        assert!(set.insert(&edge, &sub(&edge, 0.2, 0.4)));
        assert!(set.insert(&edge, &sub(&edge, 0.6, 0.8)));
        set.compress();
        let mut visible = Vec::new();
        set.visible_segments(&edge, &mut visible);
        assert_eq!(visible.len(), 3);
        assert_relative_eq!(visible[0].end.x, 0.2, epsilon = 1e-9);
        assert_relative_eq!(visible[1].start.x, 0.4, epsilon = 1e-9);
        assert_relative_eq!(visible[2].start.x, 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_merge_overlapping() {
        let edge = unit_edge();
        let mut set = HiddenIntervals::new();
        set.insert(&edge, &sub(&edge, 0.1, 0.5));
        set.insert(&edge, &sub(&edge, 0.4, 0.7));
        set.insert(&edge, &sub(&edge, 0.7, 0.9));
        set.compress();
        assert_eq!(set.spans().len(), 1);
        assert_relative_eq!(set.spans()[0].t0, 0.1, epsilon = 1e-9);
        assert_relative_eq!(set.spans()[0].t1, 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_full_cover_yields_no_output() {
        let edge = unit_edge();
        let mut set = HiddenIntervals::new();
        set.insert(&edge, &sub(&edge, 0.0, 0.55));
        set.insert(&edge, &sub(&edge, 0.5, 1.0));
        set.compress();
        assert!(set.is_full());
        let mut visible = Vec::new();
        set.visible_segments(&edge, &mut visible);
        assert!(visible.is_empty());
    }

    #[test]
    fn test_near_end_values_snap() {
        let edge = unit_edge();
        let mut set = HiddenIntervals::new();
        set.insert(&edge, &sub(&edge, 1e-9, 1.0 - 1e-9));
        set.compress();
        assert!(set.is_full());
    }

    #[test]
    fn test_zero_width_insert_is_noop() {
        let edge = unit_edge();
        let mut set = HiddenIntervals::new();
        assert!(!set.insert(&edge, &sub(&edge, 0.5, 0.5)));
        assert!(set.spans().is_empty());
    }

    #[test]
    fn test_random_merge_is_disjoint_and_covers_union() {
        // Deterministic pseudo-random intervals; merged output must be
        // sorted, pairwise disjoint, and preserve the union.
        let edge = unit_edge();
        let mut set = HiddenIntervals::new();
        let mut state: u64 = 0x9e3779b97f4a7c15;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        };
        let mut inputs = Vec::new();
        for _ in 0..200 {
            let (a, b) = (next(), next());
            let (t0, t1) = if a < b { (a, b) } else { (b, a) };
            inputs.push((t0, t1));
            set.insert(&edge, &sub(&edge, t0, t1));
        }
        set.compress();
        let spans = set.spans();
        for w in spans.windows(2) {
            assert!(w[0].t1 < w[1].t0, "spans must be sorted and disjoint");
        }
        // Sampled union equality.
        for i in 0..=1000 {
            let t = i as f64 / 1000.0;
            let in_inputs = inputs
                .iter()
                .any(|&(a, b)| t >= a + PARAM_EPS && t <= b - PARAM_EPS);
            let in_merged = spans.iter().any(|s| t >= s.t0 - PARAM_EPS && t <= s.t1 + PARAM_EPS);
            if in_inputs {
                assert!(in_merged, "point {t} lost by merge");
            }
        }
    }
}

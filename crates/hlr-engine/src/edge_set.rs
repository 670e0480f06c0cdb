//! The output edge set of a generation run.

use hlr_math::{Axis, Segment3};

/// Ordered collection of visible segments produced by one generation run.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    /// The visible line segments, in 3D.
    pub segments: Vec<Segment3>,
}

impl EdgeSet {
    /// Create an empty edge set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if no segments were produced.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterate over the segments.
    pub fn iter(&self) -> impl Iterator<Item = &Segment3> {
        self.segments.iter()
    }

    /// Append a segment.
    pub fn push(&mut self, seg: Segment3) {
        self.segments.push(seg);
    }

    /// Sort segments deterministically in the plane perpendicular to
    /// `axis`, orienting each segment's endpoints canonically first.
    pub fn sort_by_axis(&mut self, axis: Axis) {
        for seg in &mut self.segments {
            let ka = point_key(&seg.start, axis);
            let kb = point_key(&seg.end, axis);
            if compare(&kb, &ka).is_lt() {
                std::mem::swap(&mut seg.start, &mut seg.end);
            }
        }
        self.segments.sort_by(|a, b| {
            compare(&point_key(&a.start, axis), &point_key(&b.start, axis))
                .then_with(|| compare(&point_key(&a.end, axis), &point_key(&b.end, axis)))
        });
    }

    /// Flatten to a coordinate buffer for display or export.
    ///
    /// Emits `[x, y, z]` per endpoint, two endpoints per segment, with the
    /// component along `axis` replaced by `plane_value`; the caller picks
    /// how to embed the inherently 2D drawing back into 3D space.
    pub fn to_coordinate_buffer(&self, axis: Axis, plane_value: f32) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.segments.len() * 6);
        for seg in &self.segments {
            for p in [&seg.start, &seg.end] {
                let mut coords = [p.x as f32, p.y as f32, p.z as f32];
                coords[axis.index()] = plane_value;
                out.extend_from_slice(&coords);
            }
        }
        out
    }
}

/// Key ordering the two in-plane coordinates first, depth last.
fn point_key(p: &hlr_math::Point3, axis: Axis) -> [f64; 3] {
    let [u, v] = axis.others();
    [u.of_point(p), v.of_point(p), axis.of_point(p)]
}

fn compare(a: &[f64; 3], b: &[f64; 3]) -> std::cmp::Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(std::cmp::Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlr_math::Point3;

    #[test]
    fn test_coordinate_buffer_collapses_axis() {
        let mut set = EdgeSet::new();
        set.push(Segment3::new(
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(4.0, 5.0, 6.0),
        ));
        let buf = set.to_coordinate_buffer(Axis::Y, 0.5);
        assert_eq!(buf, vec![1.0, 0.5, 3.0, 4.0, 0.5, 6.0]);
    }

    #[test]
    fn test_sort_is_deterministic() {
        let a = Segment3::new(Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0));
        let b = Segment3::new(Point3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 2.0));
        let mut s1 = EdgeSet {
            segments: vec![a, b],
        };
        let mut s2 = EdgeSet {
            segments: vec![b, a],
        };
        s1.sort_by_axis(Axis::Y);
        s2.sort_by_axis(Axis::Y);
        assert_eq!(
            s1.to_coordinate_buffer(Axis::Y, 0.0),
            s2.to_coordinate_buffer(Axis::Y, 0.0)
        );
    }
}

//! Shortest connecting segment between two line segments.
//!
//! Intersecting segments connect with a zero-length segment at the
//! intersection point. Otherwise the shortest connector always touches
//! at least one endpoint of one of the segments, so projecting each of
//! the four endpoints onto the opposite segment and keeping the shortest
//! result is exact.

use crate::types::{Point, Segment};

/// Find the shortest segment from a point on `from` to a point on `to`.
///
/// The returned segment's `a` lies on `from` and its `b` lies on `to`.
/// Parallel, colinear, overlapping, and zero-length inputs are all
/// handled by the endpoint projection fallback and never produce NaN.
///
/// # Examples
///
/// ```
/// use unistroke_core::{Point, Segment};
/// use unistroke_core::connect::shortest_connecting_segment;
///
/// let from = Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
/// let to = Segment::new(Point::new(3.0, -1.0), Point::new(3.0, 1.0));
/// let link = shortest_connecting_segment(&from, &to);
/// assert_eq!(link.a, Point::new(1.0, 0.0));
/// assert_eq!(link.b, Point::new(3.0, 0.0));
/// ```
#[must_use]
pub fn shortest_connecting_segment(from: &Segment, to: &Segment) -> Segment {
    if let Some(p) = intersection(from, to) {
        return Segment::degenerate(p);
    }
    closest_endpoint_link(from, to)
}

/// Proper intersection point of two segments, if any.
///
/// Uses the signed distances of each segment's endpoints from the other
/// segment's supporting line. When either pair of distances is equal the
/// segments are (numerically) parallel and no crossing is reported.
fn intersection(s1: &Segment, s2: &Segment) -> Option<Point> {
    let v1 = s1.direction();
    let v1_norm = v1.normalize();
    let v2_norm = s2.direction().normalize();

    let a_dist = v2_norm.cross(s1.a - s2.a);
    let b_dist = v2_norm.cross(s1.b - s2.a);
    let ab = a_dist - b_dist;
    if ab == 0.0 {
        return None;
    }
    let t = a_dist / ab;

    let c_dist = v1_norm.cross(s2.a - s1.a);
    let d_dist = v1_norm.cross(s2.b - s1.a);
    let cd = c_dist - d_dist;
    if cd == 0.0 {
        return None;
    }
    let u = c_dist / cd;

    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then(|| s1.a + v1 * t)
}

/// Closest point on `seg` to `p`.
///
/// Projections that fall outside the segment snap to whichever endpoint
/// is nearer to `p`.
fn closest_point_on(p: Point, seg: &Segment) -> Point {
    let d = seg.direction();
    let len_sq = d.dot(d);
    if len_sq > 0.0 {
        let t = (p - seg.a).dot(d) / len_sq;
        if (0.0..=1.0).contains(&t) {
            return seg.a + d * t;
        }
    }
    if p.distance_squared(seg.a) < p.distance_squared(seg.b) {
        seg.a
    } else {
        seg.b
    }
}

/// Four-way endpoint scan for non-intersecting segments.
fn closest_endpoint_link(from: &Segment, to: &Segment) -> Segment {
    let candidates = [
        Segment::new(from.a, closest_point_on(from.a, to)),
        Segment::new(from.b, closest_point_on(from.b, to)),
        Segment::new(closest_point_on(to.a, from), to.a),
        Segment::new(closest_point_on(to.b, from), to.b),
    ];

    let mut best = candidates[0];
    let mut best_dist = best.length();
    for candidate in &candidates[1..] {
        let dist = candidate.length();
        if dist < best_dist {
            best = *candidate;
            best_dist = dist;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use geo::line_measures::Distance;
    use geo::{Euclidean, Line};

    use super::*;

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> Segment {
        Segment::new(Point::new(ax, ay), Point::new(bx, by))
    }

    /// Distance from `p` to the closest point of `s`.
    fn distance_to_segment(p: Point, s: &Segment) -> f64 {
        p.distance(closest_point_on(p, s))
    }

    /// Small deterministic generator so the sampled tests are repeatable.
    struct Lcg(u64);

    impl Lcg {
        fn next_f64(&mut self) -> f64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            #[allow(clippy::cast_precision_loss)]
            let unit = (self.0 >> 11) as f64 / (1_u64 << 53) as f64;
            unit.mul_add(20.0, -10.0)
        }

        fn segment(&mut self) -> Segment {
            seg(
                self.next_f64(),
                self.next_f64(),
                self.next_f64(),
                self.next_f64(),
            )
        }
    }

    fn to_line(s: &Segment) -> Line<f64> {
        Line::new(
            geo::Coord { x: s.a.x, y: s.a.y },
            geo::Coord { x: s.b.x, y: s.b.y },
        )
    }

    #[test]
    fn crossing_segments_meet_at_intersection() {
        let s1 = seg(-1.0, 0.0, 1.0, 0.0);
        let s2 = seg(0.0, -1.0, 0.0, 1.0);
        let link = shortest_connecting_segment(&s1, &s2);
        assert!(link.length() < 1e-12);
        assert!(link.a.distance(Point::new(0.0, 0.0)) < 1e-12);
        assert!(link.b.distance(Point::new(0.0, 0.0)) < 1e-12);
    }

    #[test]
    fn skewed_crossing_point() {
        let s1 = seg(0.0, 0.0, 4.0, 4.0);
        let s2 = seg(0.0, 4.0, 4.0, 0.0);
        let link = shortest_connecting_segment(&s1, &s2);
        assert!(link.length() < 1e-12);
        assert!(link.a.distance(Point::new(2.0, 2.0)) < 1e-12);
    }

    #[test]
    fn shared_endpoint_has_zero_length() {
        let s1 = seg(0.0, 0.0, 1.0, 0.0);
        let s2 = seg(1.0, 0.0, 1.0, 1.0);
        let link = shortest_connecting_segment(&s1, &s2);
        assert!(link.length() < 1e-12);
        assert!(link.a.distance(Point::new(1.0, 0.0)) < 1e-12);
    }

    #[test]
    fn parallel_segments_use_projection() {
        let s1 = seg(0.0, 0.0, 10.0, 0.0);
        let s2 = seg(4.0, 2.0, 6.0, 2.0);
        let link = shortest_connecting_segment(&s1, &s2);
        assert!((link.length() - 2.0).abs() < 1e-12);
        assert!(link.a.y.abs() < 1e-12);
        assert!((link.b.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn colinear_disjoint_segments_join_nearest_endpoints() {
        let s1 = seg(0.0, 0.0, 1.0, 0.0);
        let s2 = seg(10.0, 0.0, 11.0, 0.0);
        let link = shortest_connecting_segment(&s1, &s2);
        assert_eq!(link.a, Point::new(1.0, 0.0));
        assert_eq!(link.b, Point::new(10.0, 0.0));
    }

    #[test]
    fn colinear_overlapping_segments_touch() {
        let s1 = seg(0.0, 0.0, 2.0, 0.0);
        let s2 = seg(1.0, 0.0, 3.0, 0.0);
        let link = shortest_connecting_segment(&s1, &s2);
        assert!(link.length() < 1e-12);
    }

    #[test]
    fn endpoint_near_interior_projects_onto_segment() {
        let s1 = seg(0.0, 0.0, 10.0, 0.0);
        let s2 = seg(5.0, 3.0, 5.0, 8.0);
        let link = shortest_connecting_segment(&s1, &s2);
        assert_eq!(link.a, Point::new(5.0, 0.0));
        assert_eq!(link.b, Point::new(5.0, 3.0));
    }

    #[test]
    fn zero_length_segments_do_not_produce_nan() {
        let p = seg(1.0, 1.0, 1.0, 1.0);
        let q = seg(4.0, 5.0, 4.0, 5.0);
        let link = shortest_connecting_segment(&p, &q);
        assert!(link.a.is_finite() && link.b.is_finite());
        assert!((link.length() - 5.0).abs() < 1e-12);

        let line = seg(0.0, 0.0, 10.0, 0.0);
        let link = shortest_connecting_segment(&p, &line);
        assert!(link.a.is_finite() && link.b.is_finite());
        assert_eq!(link.a, Point::new(1.0, 1.0));
        assert_eq!(link.b, Point::new(1.0, 0.0));
    }

    #[test]
    fn zero_length_segment_on_line_connects_with_zero_length() {
        let dot = seg(3.0, 0.0, 3.0, 0.0);
        let line = seg(0.0, 0.0, 10.0, 0.0);
        let link = shortest_connecting_segment(&line, &dot);
        assert!(link.length() < 1e-12);
    }

    #[test]
    fn direction_follows_argument_order() {
        let s1 = seg(0.0, 0.0, 1.0, 0.0);
        let s2 = seg(0.0, 3.0, 1.0, 3.0);
        let forward = shortest_connecting_segment(&s1, &s2);
        let backward = shortest_connecting_segment(&s2, &s1);
        assert!(forward.a.y.abs() < 1e-12 && (forward.b.y - 3.0).abs() < 1e-12);
        assert!((backward.a.y - 3.0).abs() < 1e-12 && backward.b.y.abs() < 1e-12);
    }

    #[test]
    fn no_sampled_pair_is_shorter() {
        const SAMPLES: u32 = 64;
        let mut rng = Lcg(0x5eed);
        for _ in 0..200 {
            let s1 = rng.segment();
            let s2 = rng.segment();
            let link = shortest_connecting_segment(&s1, &s2);

            // Endpoints lie on their segments.
            assert!(distance_to_segment(link.a, &s1) < 1e-9);
            assert!(distance_to_segment(link.b, &s2) < 1e-9);

            let mut sampled_min = f64::INFINITY;
            for i in 0..=SAMPLES {
                let p = s1.a + s1.direction() * (f64::from(i) / f64::from(SAMPLES));
                for j in 0..=SAMPLES {
                    let q = s2.a + s2.direction() * (f64::from(j) / f64::from(SAMPLES));
                    sampled_min = sampled_min.min(p.distance(q));
                }
            }
            assert!(
                link.length() <= sampled_min + 1e-9,
                "connector {} longer than sampled pair {sampled_min} for {s1:?} / {s2:?}",
                link.length(),
            );
        }
    }

    #[test]
    fn length_matches_geo_line_distance() {
        let mut rng = Lcg(42);
        for _ in 0..500 {
            let s1 = rng.segment();
            let s2 = rng.segment();
            let link = shortest_connecting_segment(&s1, &s2);
            let expected = Euclidean.distance(&to_line(&s1), &to_line(&s2));
            assert!(
                (link.length() - expected).abs() < 1e-9,
                "got {} expected {expected} for {s1:?} / {s2:?}",
                link.length(),
            );
        }
    }
}

//! Boundary validation and segmentation of input paths.
//!
//! Every consecutive point pair of every path becomes one [`Segment`].
//! A segment's index in the returned list is its identity for the rest
//! of the core.

use crate::types::{Polyline, Segment, UnifyError};

/// Split paths into two-point segments, preserving per-path point order.
///
/// A path with a single point contributes no segments. Zero-length
/// segments (repeated points) are kept; the core handles them.
///
/// # Errors
///
/// Returns [`UnifyError::MalformedInput`] if a path has no points or a
/// coordinate is NaN or infinite.
pub fn segments_from_paths(paths: &[Polyline]) -> Result<Vec<Segment>, UnifyError> {
    let total: usize = paths.iter().map(|p| p.len().saturating_sub(1)).sum();
    let mut segments = Vec::with_capacity(total);

    for (path_idx, path) in paths.iter().enumerate() {
        let pts = path.points();
        if pts.is_empty() {
            return Err(UnifyError::MalformedInput {
                path: path_idx,
                point: 0,
                reason: "path has no points".to_string(),
            });
        }
        if let Some(point_idx) = pts.iter().position(|p| !p.is_finite()) {
            return Err(UnifyError::MalformedInput {
                path: path_idx,
                point: point_idx,
                reason: format!(
                    "coordinate is not finite ({}, {})",
                    pts[point_idx].x, pts[point_idx].y
                ),
            });
        }
        segments.extend(pts.windows(2).map(|w| Segment::new(w[0], w[1])));
    }

    Ok(segments)
}

/// Number of zero-length segments.
#[must_use]
pub fn degenerate_count(segments: &[Segment]) -> usize {
    segments.iter().filter(|s| s.a == s.b).count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(segments_from_paths(&[]).unwrap().is_empty());
    }

    #[test]
    fn single_point_path_contributes_nothing() {
        let paths = vec![Polyline::new(vec![Point::new(1.0, 1.0)])];
        assert!(segments_from_paths(&paths).unwrap().is_empty());
    }

    #[test]
    fn consecutive_pairs_become_segments_in_order() {
        let paths = vec![
            Polyline::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
            ]),
            Polyline::new(vec![Point::new(5.0, 5.0), Point::new(6.0, 5.0)]),
        ];
        let segments = segments_from_paths(&paths).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
                Segment::new(Point::new(1.0, 0.0), Point::new(1.0, 1.0)),
                Segment::new(Point::new(5.0, 5.0), Point::new(6.0, 5.0)),
            ]
        );
    }

    #[test]
    fn empty_path_is_rejected() {
        let paths = vec![
            Polyline::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]),
            Polyline::new(vec![]),
        ];
        let err = segments_from_paths(&paths).unwrap_err();
        assert!(matches!(
            err,
            UnifyError::MalformedInput { path: 1, point: 0, .. }
        ));
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let paths = vec![Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(f64::NAN, 0.0),
        ])];
        let err = segments_from_paths(&paths).unwrap_err();
        assert!(matches!(
            err,
            UnifyError::MalformedInput { path: 0, point: 2, .. }
        ));
    }

    #[test]
    fn repeated_points_are_kept_as_degenerate_segments() {
        let paths = vec![Polyline::new(vec![
            Point::new(2.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(3.0, 2.0),
        ])];
        let segments = segments_from_paths(&paths).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(degenerate_count(&segments), 1);
    }
}

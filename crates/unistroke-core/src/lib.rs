//! unistroke-core: Pure path unification core (sans-IO).
//!
//! Merges many independent polyline paths into one continuous path, for
//! devices that cannot lift the pen (sand tables, Etch-A-Sketch style
//! plotters, single-stroke cutters):
//!
//! paths -> segments -> BVH -> greedy spanning tree -> depth-first walk.
//!
//! Every consecutive point pair becomes a segment. A bounding volume
//! hierarchy indexes the segments so the spanning tree builder can
//! repeatedly find the unvisited segment closest to everything visited
//! so far. Walking the tree, entering each child along its connector and
//! retracing the connector on the way out, yields a single unbroken
//! stroke that draws every segment.
//!
//! This crate has **no I/O dependencies**. It operates on in-memory
//! documents and returns structured data; file handling lives in the
//! `unistroke` CLI and serialization formats in `unistroke-export`.

pub mod bvh;
pub mod connect;
pub mod diagnostics;
pub mod linearize;
pub mod nearest;
pub mod pipeline;
pub mod segments;
pub mod spanning;
pub mod types;

pub use bvh::Bvh;
pub use diagnostics::{Clock, UnifyDiagnostics, WebClock, unify_with_diagnostics};
pub use pipeline::Pipeline;
pub use spanning::SpanningTree;
pub use types::{
    Aabb, PathDocument, PathsDocument, Point, Polyline, Segment, TransitionInfo, UnifyConfig,
    UnifyError, UnifyResult,
};

/// Unify all paths of `document` into one continuous path.
///
/// # Pipeline steps
///
/// 1. Validate the config and split paths into segments
/// 2. Build a BVH over the segments
/// 3. Grow a greedy spanning tree from segment 0
/// 4. Walk the tree depth-first into a single polyline
///
/// Input without any segments (no paths, or only single-point paths)
/// yields an empty path.
///
/// # Errors
///
/// Returns [`UnifyError::InvalidConfig`] for an unusable config.
/// Returns [`UnifyError::MalformedInput`] for an empty path or a
/// non-finite coordinate.
/// Returns [`UnifyError::InvariantViolation`] only on internal bugs.
///
/// # Examples
///
/// ```
/// use unistroke_core::{PathsDocument, Point, Polyline, UnifyConfig};
///
/// let document = PathsDocument {
///     paths: vec![
///         Polyline::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]),
///         Polyline::new(vec![Point::new(1.0, 0.0), Point::new(1.0, 1.0)]),
///     ],
/// };
/// let result = unistroke_core::unify(document, UnifyConfig::default())?;
/// assert_eq!(result.transitions.len(), 1);
/// assert_eq!(result.path.first(), Some(&Point::new(0.0, 0.0)));
/// # Ok::<(), unistroke_core::UnifyError>(())
/// ```
pub fn unify(document: PathsDocument, config: UnifyConfig) -> Result<UnifyResult, UnifyError> {
    Ok(Pipeline::new(document, config)
        .segment()?
        .index()?
        .span()?
        .linearize()?
        .into_result())
}

/// Unify a segment list directly, skipping path validation.
///
/// # Errors
///
/// Returns [`UnifyError::InvalidConfig`] for an unusable config, or
/// [`UnifyError::InvariantViolation`] on internal bugs.
pub fn unify_segments(segments: &[Segment], config: &UnifyConfig) -> Result<Polyline, UnifyError> {
    config.validate()?;
    if segments.is_empty() {
        return Ok(Polyline::default());
    }
    let bvh = Bvh::build(segments)?;
    let tree = SpanningTree::build(&bvh)?;
    linearize::linearize(&tree, segments, config)
}

/// Document-level convenience: `{"paths": ...}` in, `{"path": ...}` out.
///
/// # Errors
///
/// Same as [`unify`].
pub fn unify_document(
    document: PathsDocument,
    config: UnifyConfig,
) -> Result<PathDocument, UnifyError> {
    unify(document, config).map(|result| PathDocument { path: result.path })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unify_segments_matches_document_pipeline() {
        let paths = vec![
            Polyline::new(vec![
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(2.0, 2.0),
            ]),
            Polyline::new(vec![Point::new(5.0, 1.0), Point::new(7.0, 1.0)]),
        ];
        let segments = segments::segments_from_paths(&paths).unwrap();
        let direct = unify_segments(&segments, &UnifyConfig::default()).unwrap();
        let staged = unify(PathsDocument { paths }, UnifyConfig::default()).unwrap();
        assert_eq!(direct, staged.path);
    }

    #[test]
    fn unify_segments_of_nothing_is_empty() {
        assert!(
            unify_segments(&[], &UnifyConfig::default())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn unify_document_wraps_path() {
        let doc = PathsDocument {
            paths: vec![Polyline::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
            ])],
        };
        let out = unify_document(doc, UnifyConfig::default()).unwrap();
        assert_eq!(out.path.len(), 2);
    }
}

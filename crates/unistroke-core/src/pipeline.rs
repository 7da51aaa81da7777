//! Incremental unification: advance stage by stage, inspecting each
//! intermediate result before continuing.
//!
//! ```rust
//! # use unistroke_core::{Pipeline, PathsDocument, UnifyConfig, UnifyError};
//! # fn run(doc: PathsDocument) -> Result<(), UnifyError> {
//! let result = Pipeline::new(doc, UnifyConfig::default())
//!     .segment()?
//!     .index()?
//!     .span()?
//!     .linearize()?
//!     .into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage consumes `self` and carries the intermediates forward. An
//! input without any segments flows through every stage with no BVH and
//! no tree, and yields an empty path.

use crate::bvh::Bvh;
use crate::diagnostics::StageMetrics;
use crate::linearize::linearize;
use crate::segments::{degenerate_count, segments_from_paths};
use crate::spanning::SpanningTree;
use crate::types::{PathsDocument, Polyline, Segment, UnifyConfig, UnifyError, UnifyResult};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Unification state before the input has been looked at.
#[must_use = "pipeline stages are consumed by advancing; call .segment() to continue"]
pub struct Pending {
    config: UnifyConfig,
    document: PathsDocument,
}

/// Entry point for the staged pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Start a pipeline over `document`.
    pub const fn new(document: PathsDocument, config: UnifyConfig) -> Pending {
        Pending { config, document }
    }
}

impl Pending {
    /// The input paths.
    #[must_use]
    pub fn paths(&self) -> &[Polyline] {
        &self.document.paths
    }

    /// Validate the config and input, then split paths into segments.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::InvalidConfig`] or
    /// [`UnifyError::MalformedInput`].
    pub fn segment(self) -> Result<Segmented, UnifyError> {
        self.config.validate()?;
        let segments = segments_from_paths(&self.document.paths)?;
        Ok(Segmented {
            config: self.config,
            path_count: self.document.paths.len(),
            input_point_count: self.document.paths.iter().map(Polyline::len).sum(),
            segments,
        })
    }
}

// ───────────────────────── Stage 1: Segmented ────────────────────────

/// Unification state after segmentation.
#[must_use = "pipeline stages are consumed by advancing; call .index() to continue"]
pub struct Segmented {
    config: UnifyConfig,
    path_count: usize,
    input_point_count: usize,
    segments: Vec<Segment>,
}

impl Segmented {
    /// The flattened segment list.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segmentation metrics.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::Segmentation {
            path_count: self.path_count,
            input_point_count: self.input_point_count,
            segment_count: self.segments.len(),
            degenerate_segment_count: degenerate_count(&self.segments),
        }
    }

    /// Build the BVH over the segments (skipped when there are none).
    ///
    /// # Errors
    ///
    /// Propagates [`UnifyError::InvariantViolation`] from the builder.
    pub fn index(self) -> Result<Indexed, UnifyError> {
        let bvh = if self.segments.is_empty() {
            None
        } else {
            Some(Bvh::build(&self.segments)?)
        };
        Ok(Indexed {
            config: self.config,
            segments: self.segments,
            bvh,
        })
    }
}

// ───────────────────────── Stage 2: Indexed ──────────────────────────

/// Unification state after the BVH has been built.
#[must_use = "pipeline stages are consumed by advancing; call .span() to continue"]
pub struct Indexed {
    config: UnifyConfig,
    segments: Vec<Segment>,
    bvh: Option<Bvh>,
}

impl Indexed {
    /// The BVH, `None` for input without segments.
    #[must_use]
    pub const fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    /// BVH build metrics.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::BvhBuild {
            segment_count: self.segments.len(),
            node_count: self.bvh.as_ref().map_or(0, Bvh::node_count),
            depth: self.bvh.as_ref().map_or(0, Bvh::depth),
        }
    }

    /// Grow the spanning tree.
    ///
    /// # Errors
    ///
    /// Propagates [`UnifyError::InvariantViolation`] from the search.
    pub fn span(self) -> Result<Spanned, UnifyError> {
        let tree = self.bvh.as_ref().map(SpanningTree::build).transpose()?;
        Ok(Spanned {
            config: self.config,
            segments: self.segments,
            tree,
        })
    }
}

// ───────────────────────── Stage 3: Spanned ──────────────────────────

/// Unification state after the spanning tree has been grown.
#[must_use = "pipeline stages are consumed by advancing; call .linearize() to continue"]
pub struct Spanned {
    config: UnifyConfig,
    segments: Vec<Segment>,
    tree: Option<SpanningTree>,
}

impl Spanned {
    /// The spanning tree, `None` for input without segments.
    #[must_use]
    pub const fn tree(&self) -> Option<&SpanningTree> {
        self.tree.as_ref()
    }

    /// Spanning tree metrics.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        let transitions = self
            .tree
            .as_ref()
            .map(SpanningTree::transitions)
            .unwrap_or_default();
        let stats = self
            .tree
            .as_ref()
            .map(SpanningTree::search_stats)
            .unwrap_or_default();
        StageMetrics::SpanningTree {
            transition_count: transitions.len(),
            total_transition_length: transitions.iter().map(|t| t.length).sum(),
            max_transition_length: transitions.iter().map(|t| t.length).fold(0.0, f64::max),
            zero_length_transitions: transitions
                .iter()
                .filter(|t| t.length <= self.config.move_epsilon)
                .count(),
            leaf_pairs: stats.leaf_pairs,
            pruned: stats.pruned,
        }
    }

    /// Walk the tree into the final path.
    ///
    /// # Errors
    ///
    /// Propagates [`UnifyError::InvariantViolation`] from the walk.
    pub fn linearize(self) -> Result<Linearized, UnifyError> {
        let path = match &self.tree {
            Some(tree) => linearize(tree, &self.segments, &self.config)?,
            None => Polyline::default(),
        };
        Ok(Linearized {
            config: self.config,
            tree: self.tree,
            path,
        })
    }
}

// ───────────────────────── Stage 4: Linearized ───────────────────────

/// Final unification state.
#[must_use = "call .into_result() to extract the UnifyResult"]
pub struct Linearized {
    config: UnifyConfig,
    tree: Option<SpanningTree>,
    path: Polyline,
}

impl Linearized {
    /// The unified path.
    #[must_use]
    pub const fn path(&self) -> &Polyline {
        &self.path
    }

    /// Linearization metrics.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::Linearize {
            output_point_count: self.path.len(),
            drawn_length: self.path.length(),
            return_to_start: self.config.return_to_start,
        }
    }

    /// Consume the pipeline and return the path with its transitions.
    #[must_use]
    pub fn into_result(self) -> UnifyResult {
        UnifyResult {
            transitions: self
                .tree
                .as_ref()
                .map(SpanningTree::transitions)
                .unwrap_or_default(),
            path: self.path,
        }
    }
}

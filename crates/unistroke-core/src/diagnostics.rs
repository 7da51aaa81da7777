//! Unification diagnostics: timing, counts, and search work per stage.
//!
//! Every call to [`unify_with_diagnostics`] collects diagnostics
//! alongside the result. Timestamps come from a caller-supplied
//! [`Clock`], so the core stays usable where `std::time::Instant` is
//! unavailable; [`WebClock`] works on native and WASM targets.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;
use crate::types::{PathsDocument, UnifyConfig, UnifyError, UnifyResult};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by `web_time::Instant` (`performance.now()` on WASM).
#[derive(Debug, Clone, Copy, Default)]
pub struct WebClock;

impl Clock for WebClock {
    type Instant = web_time::Instant;

    fn now(&self) -> web_time::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: &web_time::Instant) -> Duration {
        since.elapsed()
    }
}

/// Diagnostics collected from a single unification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifyDiagnostics {
    /// Stage 1: validation and segmentation.
    pub segmentation: StageDiagnostics,
    /// Stage 2: BVH construction.
    pub bvh_build: StageDiagnostics,
    /// Stage 3: spanning tree growth.
    pub spanning_tree: StageDiagnostics,
    /// Stage 4: tree walk.
    pub linearize: StageDiagnostics,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: UnifySummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Segmentation metrics.
    Segmentation {
        /// Number of input paths.
        path_count: usize,
        /// Total points across all input paths.
        input_point_count: usize,
        /// Segments produced.
        segment_count: usize,
        /// Segments whose endpoints coincide.
        degenerate_segment_count: usize,
    },
    /// BVH construction metrics.
    BvhBuild {
        /// Leaves in the hierarchy.
        segment_count: usize,
        /// All nodes (`2 * segments - 1`, or 0 when empty).
        node_count: usize,
        /// Levels from root to deepest leaf.
        depth: usize,
    },
    /// Spanning tree metrics.
    SpanningTree {
        /// Tree edges (`segments - 1`).
        transition_count: usize,
        /// Sum of all connector lengths.
        total_transition_length: f64,
        /// Longest single connector.
        max_transition_length: f64,
        /// Connectors no longer than the move epsilon.
        zero_length_transitions: usize,
        /// Leaf pairs evaluated across all searches.
        leaf_pairs: usize,
        /// Node pairs pruned across all searches.
        pruned: usize,
    },
    /// Linearization metrics.
    Linearize {
        /// Points in the output path.
        output_point_count: usize,
        /// Length of the output path, retraces included.
        drawn_length: f64,
        /// Whether the path closes back at its start.
        return_to_start: bool,
    },
}

/// High-level summary for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifySummary {
    /// Number of input paths.
    pub path_count: usize,
    /// Number of segments.
    pub segment_count: usize,
    /// Points in the output path.
    pub output_point_count: usize,
    /// Length of the output path.
    pub drawn_length: f64,
}

/// Run the full pipeline, timing each stage with `clock`.
///
/// # Errors
///
/// Same as [`crate::unify`].
pub fn unify_with_diagnostics<C: Clock>(
    document: PathsDocument,
    config: UnifyConfig,
    clock: &C,
) -> Result<(UnifyResult, UnifyDiagnostics), UnifyError> {
    let total_start = clock.now();
    let path_count = document.paths.len();

    let start = clock.now();
    let segmented = Pipeline::new(document, config).segment()?;
    let segmentation = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: segmented.metrics(),
    };
    let segment_count = segmented.segments().len();

    let start = clock.now();
    let indexed = segmented.index()?;
    let bvh_build = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: indexed.metrics(),
    };

    let start = clock.now();
    let spanned = indexed.span()?;
    let spanning_tree = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: spanned.metrics(),
    };

    let start = clock.now();
    let linearized = spanned.linearize()?;
    let linearize = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: linearized.metrics(),
    };

    let result = linearized.into_result();
    let diagnostics = UnifyDiagnostics {
        segmentation,
        bvh_build,
        spanning_tree,
        linearize,
        total_duration: clock.elapsed(&total_start),
        summary: UnifySummary {
            path_count,
            segment_count,
            output_point_count: result.path.len(),
            drawn_length: result.path.length(),
        },
    };

    Ok((result, diagnostics))
}

impl UnifyDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Unify Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Input: {} paths, {} segments",
            self.summary.path_count, self.summary.segment_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Segmentation", &self.segmentation),
            ("BVH Build", &self.bvh_build),
            ("Spanning Tree", &self.spanning_tree),
            ("Linearize", &self.linearize),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Output points: {}  |  Drawn length: {:.3}",
            self.summary.output_point_count, self.summary.drawn_length,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Segmentation {
            path_count,
            input_point_count,
            segment_count,
            degenerate_segment_count,
        } => format!(
            "{path_count} paths, {input_point_count} pts -> {segment_count} segments ({degenerate_segment_count} zero-length)",
        ),
        StageMetrics::BvhBuild {
            segment_count,
            node_count,
            depth,
        } => format!("{segment_count} leaves, {node_count} nodes, depth={depth}"),
        StageMetrics::SpanningTree {
            transition_count,
            total_transition_length,
            max_transition_length,
            zero_length_transitions,
            leaf_pairs,
            pruned,
        } => format!(
            "{transition_count} jumps ({zero_length_transitions} touching) total={total_transition_length:.3} max={max_transition_length:.3} pairs={leaf_pairs} pruned={pruned}",
        ),
        StageMetrics::Linearize {
            output_point_count,
            drawn_length,
            return_to_start,
        } => {
            let closed = if *return_to_start { " closed" } else { "" };
            format!("{output_point_count} pts, length={drawn_length:.3}{closed}")
        }
    }
}

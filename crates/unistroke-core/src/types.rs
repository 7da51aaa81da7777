//! Shared types for the unistroke path unification core.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A 2D point (or vector) in drawing coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// The origin / zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Dot product, treating both points as vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    /// 2D cross product (z component of the 3D cross product).
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x.mul_add(other.y, -(other.x * self.y))
    }

    /// Vector length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction.
    ///
    /// The zero vector normalizes to itself rather than to NaN.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 { self } else { self * (1.0 / len) }
    }

    /// Per-axis minimum.
    #[must_use]
    pub const fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Per-axis maximum.
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// A sequence of connected points forming a path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Total length of all consecutive point-to-point moves.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Bounding box of all points, or `None` for an empty polyline.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        if self.0.is_empty() {
            return None;
        }
        Some(
            self.0
                .iter()
                .fold(Aabb::EMPTY, |acc, &p| acc.include_point(p)),
        )
    }
}

/// One straight two-point piece of an input path.
///
/// Segments are identified throughout the core by their position in the
/// flattened segment list; the type itself carries only geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint.
    pub a: Point,
    /// Second endpoint.
    pub b: Point,
}

impl Segment {
    /// Create a new segment.
    #[must_use]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// A zero-length segment at `p`.
    #[must_use]
    pub const fn degenerate(p: Point) -> Self {
        Self { a: p, b: p }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.a.distance(self.b)
    }

    /// Direction vector from `a` to `b` (not normalized).
    #[must_use]
    pub fn direction(&self) -> Point {
        self.b - self.a
    }

    /// The same segment traversed from `b` to `a`.
    #[must_use]
    pub const fn reversed(&self) -> Self {
        Self {
            a: self.b,
            b: self.a,
        }
    }

    /// Bounding box of both endpoints.
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        Aabb::new(self.a.min(self.b), self.a.max(self.b))
    }
}

/// An axis-aligned bounding box.
///
/// For any box covering at least one point, `min.x <= max.x` and
/// `min.y <= max.y`. [`Aabb::EMPTY`] inverts these so that it acts as
/// the identity for [`Aabb::union`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Lower-left corner.
    pub min: Point,
    /// Upper-right corner.
    pub max: Point,
}

impl Aabb {
    /// Accumulation seed: contains nothing.
    pub const EMPTY: Self = Self {
        min: Point::new(f64::INFINITY, f64::INFINITY),
        max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    /// Create a box from its corners.
    #[must_use]
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Returns `true` for the accumulation sentinel (or any inverted box).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Smallest box containing this box and `p`.
    #[must_use]
    pub const fn include_point(self, p: Point) -> Self {
        Self::new(self.min.min(p), self.max.max(p))
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    /// Width and height.
    #[must_use]
    pub fn size(&self) -> Point {
        self.max - self.min
    }

    /// Returns `true` if `other` lies entirely inside this box.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    /// Lower bound on the distance between any point of this box and any
    /// point of `other`.
    ///
    /// Per axis the gap is zero when the intervals overlap; the two gaps
    /// are combined as a Euclidean length.
    #[must_use]
    pub fn min_distance(&self, other: &Self) -> f64 {
        let dx = (self.min.x - other.max.x)
            .max(other.min.x - self.max.x)
            .max(0.0);
        let dy = (self.min.y - other.max.y)
            .max(other.min.y - self.max.y)
            .max(0.0);
        dx.hypot(dy)
    }
}

/// Input document: independent paths to be merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathsDocument {
    /// Ordered polygonal line paths.
    pub paths: Vec<Polyline>,
}

/// Output document: the single unified path in draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathDocument {
    /// Unified polyline.
    pub path: Polyline,
}

/// Configuration for path unification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnifyConfig {
    /// Moves shorter than this are collapsed during linearization so the
    /// output has no zero-length strokes.
    pub move_epsilon: f64,

    /// Whether to finish the drawing back at its first point.
    ///
    /// When `false` the drawing ends where the last segment finished,
    /// saving the return trip.
    pub return_to_start: bool,
}

impl UnifyConfig {
    /// Default collapse distance for consecutive output points.
    pub const DEFAULT_MOVE_EPSILON: f64 = 1e-7;

    /// Default for [`return_to_start`](Self::return_to_start).
    pub const DEFAULT_RETURN_TO_START: bool = false;

    /// Check the configuration for values the core cannot honor.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::InvalidConfig`] if `move_epsilon` is
    /// negative or not finite.
    pub fn validate(&self) -> Result<(), UnifyError> {
        if !self.move_epsilon.is_finite() || self.move_epsilon < 0.0 {
            return Err(UnifyError::InvalidConfig(format!(
                "move_epsilon must be finite and non-negative, got {}",
                self.move_epsilon
            )));
        }
        Ok(())
    }
}

impl Default for UnifyConfig {
    fn default() -> Self {
        Self {
            move_epsilon: Self::DEFAULT_MOVE_EPSILON,
            return_to_start: Self::DEFAULT_RETURN_TO_START,
        }
    }
}

/// Errors that can occur during path unification.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnifyError {
    /// An input path cannot be turned into segments.
    #[error("malformed input at path {path}, point {point}: {reason}")]
    MalformedInput {
        /// Index of the offending path.
        path: usize,
        /// Index of the offending point within the path.
        point: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Configuration is invalid.
    #[error("invalid unify configuration: {0}")]
    InvalidConfig(String),

    /// The core was driven outside its contract (a bug, not a user error).
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

/// Output of a unification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifyResult {
    /// The single continuous path.
    pub path: Polyline,

    /// Connective jumps inserted between segments, one per spanning-tree
    /// edge, in discovery order.
    pub transitions: Vec<TransitionInfo>,
}

/// A connective jump between two segments, for diagnostics and overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionInfo {
    /// Segment index the jump leaves from (already drawn).
    pub parent: usize,
    /// Segment index the jump arrives at.
    pub child: usize,
    /// Start of the jump, on the parent segment.
    pub from: Point,
    /// End of the jump, on the child segment.
    pub to: Point,
    /// Jump length.
    pub length: f64,
}

//! Bounding volume hierarchy over path segments.
//!
//! Each leaf holds exactly one segment; each internal node has exactly
//! two children and a box that is the union of theirs. Nodes live in a
//! flat arena addressed by [`NodeId`], with children always stored after
//! their parent, so a reverse scan of the arena visits children before
//! parents.
//!
//! # Split heuristic
//!
//! At every internal node:
//!
//! 1. Take the **mean** of the box centers per axis (a true median of
//!    unsorted boxes is not worth the cost here).
//! 2. Score each axis by how evenly the mean separates boxes that lie
//!    entirely on one side: `min(l/r, r/l) * (l + r)`. The higher score
//!    wins; ties go to the y axis.
//! 3. Partition in place with one frontier-swap pass. Boxes straddling
//!    the split position take a default side that flips on every
//!    scanned element, which keeps straddlers spread over both sides.
//! 4. Clamp the split so no side is empty and, for more than three
//!    elements, each side has at least two.
//!
//! Construction uses an explicit work stack, so degenerate inputs
//! cannot overflow the call stack.

use crate::types::{Aabb, Point, Segment, UnifyError};

/// Arena index of a BVH node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A BVH node.
#[derive(Debug, Clone, PartialEq)]
pub enum BvhNode {
    /// Exactly one segment.
    Leaf {
        /// The segment's own bounding box.
        bounds: Aabb,
        /// Stable index of the segment in the flattened segment list.
        index: usize,
        /// The segment geometry.
        segment: Segment,
    },
    /// Exactly two children.
    Internal {
        /// Union of both children's boxes.
        bounds: Aabb,
        /// First child.
        left: NodeId,
        /// Second child.
        right: NodeId,
    },
}

impl BvhNode {
    /// Bounding box of everything under this node.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        match self {
            Self::Leaf { bounds, .. } | Self::Internal { bounds, .. } => bounds,
        }
    }

    /// Both children of an internal node, `None` for a leaf.
    #[must_use]
    pub const fn children(&self) -> Option<(NodeId, NodeId)> {
        match self {
            Self::Leaf { .. } => None,
            Self::Internal { left, right, .. } => Some((*left, *right)),
        }
    }
}

/// Split axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    X,
    Y,
}

impl Axis {
    const fn coord(self, p: Point) -> f64 {
        match self {
            Self::X => p.x,
            Self::Y => p.y,
        }
    }
}

/// An immutable BVH built once from the full segment list.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    /// Leaf node of each segment, by segment index.
    leaf_of: Vec<NodeId>,
    depth: usize,
}

/// A pending range of the partition array awaiting a node.
struct PendingRange {
    slot: usize,
    start: usize,
    end: usize,
    depth: usize,
}

impl Bvh {
    /// Build a BVH over `segments`.
    ///
    /// Leaf `index` values are positions in `segments`.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::InvariantViolation`] if `segments` is empty;
    /// callers must skip construction when there is nothing to index.
    pub fn build(segments: &[Segment]) -> Result<Self, UnifyError> {
        if segments.is_empty() {
            return Err(UnifyError::InvariantViolation(
                "cannot build a BVH over zero segments".to_string(),
            ));
        }

        let mut items: Vec<(usize, Aabb)> = segments
            .iter()
            .enumerate()
            .map(|(i, s)| (i, s.bounds()))
            .collect();

        let mut slots: Vec<Option<BvhNode>> = Vec::with_capacity(2 * segments.len() - 1);
        slots.push(None);
        let mut stack = vec![PendingRange {
            slot: 0,
            start: 0,
            end: items.len(),
            depth: 1,
        }];
        let mut max_depth = 0;

        while let Some(range) = stack.pop() {
            max_depth = max_depth.max(range.depth);
            let run = &mut items[range.start..range.end];

            if let [(index, bounds)] = *run {
                slots[range.slot] = Some(BvhNode::Leaf {
                    bounds,
                    index,
                    segment: segments[index],
                });
                continue;
            }

            let bounds = run.iter().fold(Aabb::EMPTY, |acc, (_, b)| acc.union(*b));
            let split = range.start + partition_range(run);

            let left = slots.len();
            slots.push(None);
            let right = slots.len();
            slots.push(None);
            slots[range.slot] = Some(BvhNode::Internal {
                bounds,
                left: NodeId(left),
                right: NodeId(right),
            });

            stack.push(PendingRange {
                slot: right,
                start: split,
                end: range.end,
                depth: range.depth + 1,
            });
            stack.push(PendingRange {
                slot: left,
                start: range.start,
                end: split,
                depth: range.depth + 1,
            });
        }

        let nodes = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                UnifyError::InvariantViolation("BVH build left an unfilled node".to_string())
            })?;

        let mut leaf_of = vec![NodeId(0); segments.len()];
        for (i, node) in nodes.iter().enumerate() {
            if let BvhNode::Leaf { index, .. } = node {
                leaf_of[*index] = NodeId(i);
            }
        }

        Ok(Self {
            nodes,
            leaf_of,
            depth: max_depth,
        })
    }

    /// The root node's id.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Look up a node.
    ///
    /// Ids handed out by this BVH are always valid.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &BvhNode {
        &self.nodes[id.0]
    }

    /// All nodes in arena order (parents before children).
    #[must_use]
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Number of indexed segments (equals the number of leaves).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.leaf_of.len()
    }

    /// Always `false`: a BVH indexes at least one segment.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.leaf_of.is_empty()
    }

    /// Geometry of the segment with the given index.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<&Segment> {
        match self.nodes.get(self.leaf_of.get(index)?.0)? {
            BvhNode::Leaf { segment, .. } => Some(segment),
            BvhNode::Internal { .. } => None,
        }
    }

    /// Total number of nodes (`2 * len() - 1`).
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of levels from the root to the deepest leaf, inclusive.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Segment indices of all leaves in arena order.
    pub fn leaf_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().filter_map(|n| match n {
            BvhNode::Leaf { index, .. } => Some(*index),
            BvhNode::Internal { .. } => None,
        })
    }
}

/// Balance-weighted count of boxes cleanly separated by a split.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn partition_score(left: usize, right: usize) -> f64 {
    if left == 0 || right == 0 {
        return 0.0;
    }
    let (l, r) = (left as f64, right as f64);
    (l / r).min(r / l) * (l + r)
}

/// Pick the split axis for `items` around the mean center `mean`.
pub(crate) fn split_axis(items: &[(usize, Aabb)], mean: Point) -> Axis {
    let (mut left_x, mut left_y, mut right_x, mut right_y) = (0, 0, 0, 0);
    for (_, b) in items {
        if b.max.x < mean.x {
            left_x += 1;
        }
        if b.max.y < mean.y {
            left_y += 1;
        }
        if b.min.x > mean.x {
            right_x += 1;
        }
        if b.min.y > mean.y {
            right_y += 1;
        }
    }
    if partition_score(left_x, right_x) > partition_score(left_y, right_y) {
        Axis::X
    } else {
        Axis::Y
    }
}

/// Clamp a split position for a run of `len` elements.
pub(crate) fn clamp_split(split: usize, len: usize) -> usize {
    debug_assert!(len >= 2, "cannot split fewer than two elements");
    if len <= 3 {
        split.clamp(1, len - 1)
    } else {
        split.clamp(2, len - 2)
    }
}

/// Partition `items` in place; returns the number of elements that go
/// to the left child.
pub(crate) fn partition_range(items: &mut [(usize, Aabb)]) -> usize {
    let len = items.len();

    #[allow(clippy::cast_precision_loss)]
    let mean = items
        .iter()
        .fold(Point::ZERO, |acc, (_, b)| acc + b.center())
        * (1.0 / len as f64);
    let axis = split_axis(items, mean);
    let pivot = axis.coord(mean);

    // Elements before `left` are placed left, elements from `right` on
    // are placed right; the frontier elements themselves are unsorted.
    let mut left = 0;
    let mut right = len;
    let mut default_left = true;
    while left < right {
        let bounds = items[left].1;
        let mut sort_left = default_left;
        default_left = !default_left;
        if axis.coord(bounds.max) < pivot {
            sort_left = true;
        } else if axis.coord(bounds.min) > pivot {
            sort_left = false;
        }

        if sort_left {
            left += 1;
        } else {
            right -= 1;
            items.swap(left, right);
        }
    }

    clamp_split(left, len)
}

//! Greedy spanning tree over segments.
//!
//! Prim-style growth: start from segment 0, then repeatedly attach the
//! unvisited segment nearest to anything already in the tree, hanging it
//! under the visited segment it connects to. Each edge carries the
//! shortest connector that realizes that distance.

use crate::bvh::Bvh;
use crate::nearest::{NearestSearch, SearchStats, VisitedSet};
use crate::types::{Segment, TransitionInfo, UnifyError};

/// One segment's place in the spanning tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Index of the segment this node represents.
    pub segment: usize,
    /// How the pen gets from the parent segment onto this one: `a` on
    /// the parent, `b` on this segment. Degenerate for the root.
    pub transition: Segment,
    /// Parent segment index; `None` for the root.
    pub parent: Option<usize>,
    /// Child segment indices in attachment order.
    pub children: Vec<usize>,
}

/// Spanning tree over every segment of a [`Bvh`].
///
/// Nodes are stored by segment index, so `node(i).segment == i`.
#[derive(Debug, Clone)]
pub struct SpanningTree {
    nodes: Vec<TreeNode>,
    order: Vec<usize>,
    stats: SearchStats,
}

impl SpanningTree {
    /// Index of the root segment.
    pub const ROOT: usize = 0;

    /// Grow the tree from segment 0 until every segment is attached.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::InvariantViolation`] if a query fails or
    /// reports a segment that is already attached. Neither happens for
    /// a well-formed BVH.
    pub fn build(bvh: &Bvh) -> Result<Self, UnifyError> {
        let n = bvh.len();
        let root_segment = bvh.segment(Self::ROOT).ok_or_else(|| {
            UnifyError::InvariantViolation("spanning tree needs at least one segment".to_string())
        })?;

        let mut slots: Vec<Option<TreeNode>> = vec![None; n];
        slots[Self::ROOT] = Some(TreeNode {
            segment: Self::ROOT,
            transition: Segment::degenerate(root_segment.a),
            parent: None,
            children: Vec::new(),
        });

        let mut order = Vec::with_capacity(n);
        order.push(Self::ROOT);
        let mut visited = VisitedSet::new(n);
        visited.insert(Self::ROOT);

        let mut search = NearestSearch::new(bvh);
        let mut stats = SearchStats::default();

        while !visited.is_full() {
            let (found, query_stats) = search.query(&visited)?;
            stats += query_stats;

            if !visited.insert(found.unvisited) {
                return Err(UnifyError::InvariantViolation(format!(
                    "segment {} was returned by the search twice",
                    found.unvisited
                )));
            }

            let parent = slots
                .get_mut(found.visited)
                .and_then(Option::as_mut)
                .ok_or_else(|| {
                    UnifyError::InvariantViolation(format!(
                        "segment {} attaches to segment {}, which is not in the tree",
                        found.unvisited, found.visited
                    ))
                })?;
            parent.children.push(found.unvisited);

            slots[found.unvisited] = Some(TreeNode {
                segment: found.unvisited,
                transition: found.transition,
                parent: Some(found.visited),
                children: Vec::new(),
            });
            order.push(found.unvisited);
        }

        let nodes = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                UnifyError::InvariantViolation("spanning tree left a segment unattached".to_string())
            })?;

        Ok(Self {
            nodes,
            order,
            stats,
        })
    }

    /// Node for segment `index`.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &TreeNode {
        &self.nodes[Self::ROOT]
    }

    /// Number of nodes (equals the number of segments).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the tree has at least its root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Segment indices in the order they were attached, root first.
    #[must_use]
    pub fn discovery_order(&self) -> &[usize] {
        &self.order
    }

    /// Search work summed over all queries.
    #[must_use]
    pub const fn search_stats(&self) -> SearchStats {
        self.stats
    }

    /// All tree edges as transitions, in discovery order.
    #[must_use]
    pub fn transitions(&self) -> Vec<TransitionInfo> {
        self.order
            .iter()
            .filter_map(|&i| {
                let node = &self.nodes[i];
                node.parent.map(|parent| TransitionInfo {
                    parent,
                    child: node.segment,
                    from: node.transition.a,
                    to: node.transition.b,
                    length: node.transition.length(),
                })
            })
            .collect()
    }
}

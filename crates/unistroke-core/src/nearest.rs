//! Nearest free-node search.
//!
//! Given the set of already-visited segments, find the unvisited segment
//! that can be reached from any visited segment with the shortest
//! connector. The search walks the BVH against itself: one side is
//! restricted to subtrees holding unvisited segments, the other to
//! subtrees holding visited ones, and any pair whose boxes are already
//! farther apart than the best connector found so far is pruned.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::bvh::{Bvh, BvhNode, NodeId};
use crate::connect::shortest_connecting_segment;
use crate::types::{Aabb, Segment, UnifyError};

/// Dense set of visited segment indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedSet {
    words: Vec<u64>,
    len: usize,
    count: usize,
}

impl VisitedSet {
    /// An empty set over indices `0..len`.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
            count: 0,
        }
    }

    /// Mark `index` visited. Returns `true` if it was not visited before.
    ///
    /// Indices outside `0..len` are ignored and return `false`.
    pub fn insert(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        let (word, bit) = (index / 64, 1_u64 << (index % 64));
        if self.words[word] & bit != 0 {
            return false;
        }
        self.words[word] |= bit;
        self.count += 1;
        true
    }

    /// Returns `true` if `index` has been visited.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        index < self.len && self.words[index / 64] & (1_u64 << (index % 64)) != 0
    }

    /// Number of visited indices.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Size of the index universe.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been visited.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` if every index has been visited.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.count == self.len
    }
}

/// Result of one nearest free-node query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestConnection {
    /// The unvisited segment to attach next.
    pub unvisited: usize,
    /// The visited segment it attaches to.
    pub visited: usize,
    /// Shortest connector: `a` lies on the visited segment, `b` on the
    /// unvisited one.
    pub transition: Segment,
    /// Length of `transition`.
    pub distance: f64,
}

/// Work counters for one or more queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Leaf pairs evaluated with the exact connector.
    pub leaf_pairs: usize,
    /// Node pairs discarded by the box distance bound.
    pub pruned: usize,
}

impl Add for SearchStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            leaf_pairs: self.leaf_pairs + rhs.leaf_pairs,
            pruned: self.pruned + rhs.pruned,
        }
    }
}

impl AddAssign for SearchStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Reusable search state for repeated queries against one BVH.
///
/// Holds the per-node annotations and the work stack so the spanning
/// tree builder does not reallocate them for every query.
#[derive(Debug)]
pub struct NearestSearch<'a> {
    bvh: &'a Bvh,
    has_unvisited: Vec<bool>,
    contains_visited: Vec<bool>,
    stack: Vec<(NodeId, NodeId, f64)>,
}

impl<'a> NearestSearch<'a> {
    /// Prepare a search over `bvh`.
    #[must_use]
    pub fn new(bvh: &'a Bvh) -> Self {
        let n = bvh.node_count();
        Self {
            bvh,
            has_unvisited: vec![false; n],
            contains_visited: vec![false; n],
            stack: Vec::new(),
        }
    }

    /// Find the nearest unvisited segment to the visited set.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::InvariantViolation`] if the visited set does
    /// not match the BVH, or is empty or full.
    pub fn query(
        &mut self,
        visited: &VisitedSet,
    ) -> Result<(NearestConnection, SearchStats), UnifyError> {
        if visited.len() != self.bvh.len() {
            return Err(UnifyError::InvariantViolation(format!(
                "visited set covers {} segments but the BVH indexes {}",
                visited.len(),
                self.bvh.len()
            )));
        }
        if visited.is_empty() {
            return Err(UnifyError::InvariantViolation(
                "nearest free-node search needs at least one visited segment".to_string(),
            ));
        }
        if visited.is_full() {
            return Err(UnifyError::InvariantViolation(
                "nearest free-node search needs at least one unvisited segment".to_string(),
            ));
        }

        self.annotate(visited);
        self.search()
    }

    /// Bottom-up pass: children sit after their parent in the arena.
    fn annotate(&mut self, visited: &VisitedSet) {
        for (i, node) in self.bvh.nodes().iter().enumerate().rev() {
            let (free, target) = match node {
                BvhNode::Leaf { index, .. } => {
                    let seen = visited.contains(*index);
                    (!seen, seen)
                }
                BvhNode::Internal { left, right, .. } => (
                    self.has_unvisited[left.index()] || self.has_unvisited[right.index()],
                    self.contains_visited[left.index()] || self.contains_visited[right.index()],
                ),
            };
            self.has_unvisited[i] = free;
            self.contains_visited[i] = target;
        }
    }

    fn search(&mut self) -> Result<(NearestConnection, SearchStats), UnifyError> {
        let bvh = self.bvh;
        let mut stats = SearchStats::default();
        let mut best: Option<NearestConnection> = None;
        let mut best_dist = f64::INFINITY;

        self.stack.clear();
        self.stack.push((bvh.root(), bvh.root(), 0.0));

        while let Some((free_id, visited_id, bound)) = self.stack.pop() {
            if bound >= best_dist {
                stats.pruned += 1;
                continue;
            }

            let free = bvh.node(free_id);
            let target = bvh.node(visited_id);

            if let (
                BvhNode::Leaf {
                    index: free_index,
                    segment: free_segment,
                    ..
                },
                BvhNode::Leaf {
                    index: visited_index,
                    segment: visited_segment,
                    ..
                },
            ) = (free, target)
            {
                stats.leaf_pairs += 1;
                let transition = shortest_connecting_segment(visited_segment, free_segment);
                let distance = transition.length();
                if distance < best_dist {
                    best_dist = distance;
                    best = Some(NearestConnection {
                        unvisited: *free_index,
                        visited: *visited_index,
                        transition,
                        distance,
                    });
                }
                continue;
            }

            // Split the larger box; ties go to the free side.
            let descend_free = match (free.children(), target.children()) {
                (Some(_), None) => true,
                (None, _) => false,
                (Some(_), Some(_)) => extent(free.bounds()) >= extent(target.bounds()),
            };

            if descend_free {
                if let Some((left, right)) = free.children() {
                    let against = target.bounds();
                    let candidates = [left, right].map(|child| {
                        let d = bvh.node(child).bounds().min_distance(against);
                        (child, visited_id, d, self.has_unvisited[child.index()])
                    });
                    push_nearer_last(&mut self.stack, candidates, best_dist, &mut stats);
                }
            } else if let Some((left, right)) = target.children() {
                let own = free.bounds();
                let candidates = [left, right].map(|child| {
                    let d = own.min_distance(bvh.node(child).bounds());
                    (free_id, child, d, self.contains_visited[child.index()])
                });
                push_nearer_last(&mut self.stack, candidates, best_dist, &mut stats);
            }
        }

        best.map(|connection| (connection, stats)).ok_or_else(|| {
            UnifyError::InvariantViolation(
                "nearest free-node search found no connection".to_string(),
            )
        })
    }
}

/// Half perimeter of a box, used to pick which side of a pair to split.
fn extent(bounds: &Aabb) -> f64 {
    let size = bounds.size();
    size.x + size.y
}

/// Push eligible child pairs so the nearer one is popped first.
fn push_nearer_last(
    stack: &mut Vec<(NodeId, NodeId, f64)>,
    mut candidates: [(NodeId, NodeId, f64, bool); 2],
    best_dist: f64,
    stats: &mut SearchStats,
) {
    if candidates[0].2 < candidates[1].2 {
        candidates.swap(0, 1);
    }
    for (free, visited, bound, eligible) in candidates {
        if !eligible {
            continue;
        }
        if bound >= best_dist {
            stats.pruned += 1;
            continue;
        }
        stack.push((free, visited, bound));
    }
}

/// One-shot nearest free-node query.
///
/// # Errors
///
/// Returns [`UnifyError::InvariantViolation`] if `visited` is empty,
/// full, or sized for a different BVH.
pub fn nearest_free(bvh: &Bvh, visited: &VisitedSet) -> Result<NearestConnection, UnifyError> {
    NearestSearch::new(bvh)
        .query(visited)
        .map(|(connection, _)| connection)
}

//! Depth-first linearization of the spanning tree into one polyline.
//!
//! For every node the pen travels in along the node's transition, draws
//! all child subtrees, draws the node's own segment starting from
//! whichever endpoint is closer, then retraces the transition back to
//! where it entered. Retracing keeps the pen in the right place for the
//! parent's next child, so the whole drawing is one unbroken stroke.

use crate::spanning::SpanningTree;
use crate::types::{Point, Polyline, Segment, UnifyConfig, UnifyError};

enum Frame {
    Enter(usize),
    Exit(usize),
}

/// Pen position tracker that drops moves shorter than epsilon.
struct Pen {
    head: Option<Point>,
    epsilon: f64,
    points: Vec<Point>,
}

impl Pen {
    fn move_to(&mut self, p: Point) {
        if self.head.is_none_or(|h| h.distance(p) > self.epsilon) {
            self.points.push(p);
        }
        self.head = Some(p);
    }

    /// Draw `segment` starting from the endpoint nearer the head.
    fn draw(&mut self, segment: &Segment) {
        let head = self.head.unwrap_or(segment.a);
        if head.distance(segment.a) < head.distance(segment.b) {
            self.move_to(segment.a);
            self.move_to(segment.b);
        } else {
            self.move_to(segment.b);
            self.move_to(segment.a);
        }
    }
}

/// Walk `tree` and emit the unified path.
///
/// `segments` must be the list the tree was built over. The first
/// emitted point is always kept; later points within
/// [`UnifyConfig::move_epsilon`] of the previous pen position are
/// dropped. The root's closing retrace back to the start point is only
/// emitted when [`UnifyConfig::return_to_start`] is set.
///
/// # Errors
///
/// Returns [`UnifyError::InvariantViolation`] if `segments` does not
/// match the tree or the tree references a missing node.
pub fn linearize(
    tree: &SpanningTree,
    segments: &[Segment],
    config: &UnifyConfig,
) -> Result<Polyline, UnifyError> {
    if segments.len() != tree.len() {
        return Err(UnifyError::InvariantViolation(format!(
            "spanning tree has {} nodes but {} segments were supplied",
            tree.len(),
            segments.len()
        )));
    }

    let mut pen = Pen {
        head: None,
        epsilon: config.move_epsilon,
        // At most six points per node.
        points: Vec::with_capacity(segments.len() * 6),
    };
    let mut stack = vec![Frame::Enter(SpanningTree::ROOT)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(index) => {
                let node = tree.node(index).ok_or_else(|| missing(index))?;
                pen.move_to(node.transition.a);
                pen.move_to(node.transition.b);
                stack.push(Frame::Exit(index));
                stack.extend(node.children.iter().rev().map(|&c| Frame::Enter(c)));
            }
            Frame::Exit(index) => {
                let node = tree.node(index).ok_or_else(|| missing(index))?;
                pen.draw(&segments[index]);
                if node.parent.is_some() || config.return_to_start {
                    pen.move_to(node.transition.b);
                    pen.move_to(node.transition.a);
                }
            }
        }
    }

    Ok(Polyline::new(pen.points))
}

fn missing(index: usize) -> UnifyError {
    UnifyError::InvariantViolation(format!("spanning tree references missing node {index}"))
}

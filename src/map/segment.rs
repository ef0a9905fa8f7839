//! Curved connectors between nodes

use crate::layout::Point;

use super::NodeId;

/// A directed connector from one node to another
///
/// `b1` is the bezier control point near `from`, `b2` the one near `to`.
/// Without control points the connector is drawn as a straight line.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: NodeId,
    pub to: NodeId,
    pub b1: Option<Point>,
    pub b2: Option<Point>,
}

impl Segment {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            b1: None,
            b2: None,
        }
    }

    pub fn with_controls(mut self, b1: Option<Point>, b2: Option<Point>) -> Self {
        self.b1 = b1;
        self.b2 = b2;
        self
    }
}

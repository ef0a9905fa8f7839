//! Diagram nodes

use crate::layout::Point;

use super::NodeId;

/// Node kind tag used by the Escher format
pub const METABOLITE: &str = "metabolite";
pub const MID_MARKER: &str = "midmarker";
pub const MULTI_MARKER: &str = "multimarker";

/// Data carried only by metabolite nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Metabolite {
    /// Stable chemical identifier
    pub bigg_id: String,
    /// Display name
    pub name: String,
    /// Label anchor, computed during placement when absent
    pub label: Option<Point>,
    /// Primary metabolites get full-length connectors
    pub is_primary: bool,
}

/// The variants a node can take
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Metabolite(Metabolite),
    /// Anchors the center of a reaction
    MidMarker,
    /// Collects the metabolites of one side of a reaction
    MultiMarker,
}

/// A node of the diagram
///
/// The identifier is handed out by the [`Map`](super::Map) the node is
/// registered in and never changes afterwards. The position stays `None`
/// until the node has been placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: Option<NodeId>,
    pub position: Option<Point>,
    pub kind: NodeKind,
}

impl Node {
    /// Create an unplaced, non-primary metabolite node
    pub fn metabolite(bigg_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            position: None,
            kind: NodeKind::Metabolite(Metabolite {
                bigg_id: bigg_id.into(),
                name: name.into(),
                label: None,
                is_primary: false,
            }),
        }
    }

    pub fn mid_marker(position: Point) -> Self {
        Self {
            id: None,
            position: Some(position),
            kind: NodeKind::MidMarker,
        }
    }

    pub fn multi_marker(position: Point) -> Self {
        Self {
            id: None,
            position: Some(position),
            kind: NodeKind::MultiMarker,
        }
    }

    /// Set the position
    pub fn at(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    /// Mark a metabolite node as primary (no-op for markers)
    pub fn primary(mut self, is_primary: bool) -> Self {
        if let NodeKind::Metabolite(m) = &mut self.kind {
            m.is_primary = is_primary;
        }
        self
    }

    /// Set the label anchor of a metabolite node (no-op for markers)
    pub fn with_label(mut self, label: Point) -> Self {
        if let NodeKind::Metabolite(m) = &mut self.kind {
            m.label = Some(label);
        }
        self
    }

    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: NodeId) {
        debug_assert!(
            self.id.is_none() || self.id == Some(id),
            "node identifier assigned twice"
        );
        self.id = Some(id);
    }

    /// The kind tag as written to the Escher format
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Metabolite(_) => METABOLITE,
            NodeKind::MidMarker => MID_MARKER,
            NodeKind::MultiMarker => MULTI_MARKER,
        }
    }

    pub fn as_metabolite(&self) -> Option<&Metabolite> {
        match &self.kind {
            NodeKind::Metabolite(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_metabolite_mut(&mut self) -> Option<&mut Metabolite> {
        match &mut self.kind {
            NodeKind::Metabolite(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_mid_marker(&self) -> bool {
        matches!(self.kind, NodeKind::MidMarker)
    }

    pub fn is_multi_marker(&self) -> bool {
        matches!(self.kind, NodeKind::MultiMarker)
    }

    /// Whether this is a primary metabolite
    pub fn is_primary(&self) -> bool {
        self.as_metabolite().is_some_and(|m| m.is_primary)
    }

    pub fn bigg_id(&self) -> Option<&str> {
        self.as_metabolite().map(|m| m.bigg_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metabolite_builder() {
        let node = Node::metabolite("atp_c", "ATP")
            .at(Point::new(1.0, 2.0))
            .primary(true);
        assert_eq!(node.position, Some(Point::new(1.0, 2.0)));
        assert!(node.is_primary());
        assert_eq!(node.bigg_id(), Some("atp_c"));
        assert_eq!(node.kind_name(), METABOLITE);
        assert_eq!(node.id(), None);
    }

    #[test]
    fn test_markers_ignore_metabolite_setters() {
        let node = Node::mid_marker(Point::new(0.0, 0.0))
            .primary(true)
            .with_label(Point::new(5.0, 5.0));
        assert!(node.is_mid_marker());
        assert!(!node.is_primary());
        assert!(node.as_metabolite().is_none());
        assert_eq!(Node::multi_marker(Point::default()).kind_name(), MULTI_MARKER);
    }
}

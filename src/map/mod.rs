//! Diagram data model
//!
//! The [`Map`] is the single owner of every node, segment, reaction and text
//! label of a diagram. Everything else refers to them by identifier.
//! Identifiers are handed out on insertion: the first unused value at or
//! above a running counter, so they are never reused while the map lives.

pub mod node;
pub mod reaction;
pub mod segment;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::{Canvas, LayoutError, PerSide, Point};

pub use node::{Metabolite, Node, NodeKind};
pub use reaction::{
    AutoReaction, Gene, MultiMarker, OptionalMetabolite, Reaction, ReactionMetabolite,
    ReactionOptions, StagedNode, StagedSegment,
};
pub use segment::Segment;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

identifier!(
    /// Identifier of a node within its map
    NodeId
);
identifier!(
    /// Identifier of a segment within its map
    SegmentId
);
identifier!(
    /// Identifier of a reaction within its map
    ReactionId
);
identifier!(
    /// Identifier of a text label within its map
    LabelId
);

pub const DEFAULT_HOMEPAGE: &str = "https://escher.github.io";
pub const DEFAULT_SCHEMA: &str = "https://escher.github.io/escher/jsonschema/1-0-0#";

/// Free-standing text on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Running counter for one kind of identifier
#[derive(Debug, Clone, Copy, Default)]
struct Counter(u64);

impl Counter {
    /// Take the first value at or above the counter for which `taken` is false
    fn allocate(&mut self, taken: impl Fn(u64) -> bool) -> u64 {
        while taken(self.0) {
            self.0 += 1;
        }
        let id = self.0;
        self.0 += 1;
        id
    }
}

/// A complete diagram
#[derive(Debug, Clone)]
pub struct Map {
    pub name: String,
    pub description: String,
    pub homepage: String,
    pub schema: String,
    pub canvas: Canvas,
    nodes: BTreeMap<NodeId, Node>,
    segments: BTreeMap<SegmentId, Segment>,
    reactions: BTreeMap<ReactionId, Reaction>,
    text_labels: BTreeMap<LabelId, TextLabel>,
    node_counter: Counter,
    segment_counter: Counter,
    reaction_counter: Counter,
    label_counter: Counter,
}

impl Map {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            homepage: DEFAULT_HOMEPAGE.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            canvas: Canvas::default(),
            nodes: BTreeMap::new(),
            segments: BTreeMap::new(),
            reactions: BTreeMap::new(),
            text_labels: BTreeMap::new(),
            node_counter: Counter::default(),
            segment_counter: Counter::default(),
            reaction_counter: Counter::default(),
            label_counter: Counter::default(),
        }
    }

    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = homepage.into();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    /// Register a node and return its identifier
    ///
    /// A node that already carries an identifier keeps it: registering it
    /// again is a no-op, and a node coming from another session is stored
    /// under its existing identifier.
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        if let Some(id) = node.id() {
            self.nodes.entry(id).or_insert(node);
            return id;
        }
        let nodes = &self.nodes;
        let id = NodeId(self.node_counter.allocate(|n| nodes.contains_key(&NodeId(n))));
        node.assign_id(id);
        self.nodes.insert(id, node);
        id
    }

    pub fn add_segment(&mut self, segment: Segment) -> SegmentId {
        let segments = &self.segments;
        let id = SegmentId(
            self.segment_counter
                .allocate(|n| segments.contains_key(&SegmentId(n))),
        );
        self.segments.insert(id, segment);
        id
    }

    pub fn add_label(&mut self, label: TextLabel) -> LabelId {
        let labels = &self.text_labels;
        let id = LabelId(self.label_counter.allocate(|n| labels.contains_key(&LabelId(n))));
        self.text_labels.insert(id, label);
        id
    }

    /// Commit a reaction draft
    ///
    /// Either everything the draft staged is registered, or nothing is: the
    /// draft is validated before the map is touched. Staged nodes that
    /// already belong to this map are updated in place (position and label),
    /// all others are inserted.
    pub fn add_reaction(&mut self, draft: AutoReaction) -> Result<ReactionId, LayoutError> {
        for (_, node) in draft.staged_nodes() {
            if let Some(id) = node.id() {
                if !self.nodes.contains_key(&id) {
                    return Err(LayoutError::UnregisteredNode {
                        reaction: draft.bigg_id.clone(),
                        node: id,
                    });
                }
            }
        }

        let AutoReaction {
            bigg_id,
            name,
            label,
            reversibility,
            gene_reaction_rule,
            genes,
            nodes,
            multi_markers,
            metabolites,
            segments,
            ..
        } = draft;

        // Register metabolites first, then the markers, in staging order
        let mut order: Vec<usize> = metabolites.iter().map(|(_, staged)| staged.0).collect();
        order.push(0);
        order.extend(multi_markers.minus.iter().map(|staged| staged.0));
        order.extend(multi_markers.plus.iter().map(|staged| staged.0));
        order.extend(0..nodes.len());

        let mut ids = vec![NodeId(0); nodes.len()];
        let mut nodes: Vec<Option<Node>> = nodes.into_iter().map(Some).collect();
        for index in order {
            if let Some(node) = nodes[index].take() {
                ids[index] = self.register_staged(node);
            }
        }
        let resolve = |staged: StagedNode| ids[staged.0];

        let segment_ids = segments
            .into_iter()
            .map(|s| {
                let segment = Segment::new(resolve(s.from), resolve(s.to));
                self.add_segment(segment.with_controls(s.b1, s.b2))
            })
            .collect();

        let reaction = Reaction {
            name,
            bigg_id,
            label,
            reversibility,
            mid_marker: resolve(StagedNode(0)),
            multi_markers: PerSide::new(
                multi_markers.minus.map(resolve),
                multi_markers.plus.map(resolve),
            ),
            metabolites: metabolites
                .iter()
                .map(|&(coefficient, staged)| ReactionMetabolite {
                    coefficient,
                    node: resolve(staged),
                })
                .collect(),
            segments: segment_ids,
            gene_reaction_rule,
            genes,
        };

        let reactions = &self.reactions;
        let id = ReactionId(
            self.reaction_counter
                .allocate(|n| reactions.contains_key(&ReactionId(n))),
        );
        tracing::debug!(reaction = %reaction.bigg_id, id = id.0, "registered reaction");
        self.reactions.insert(id, reaction);
        Ok(id)
    }

    fn register_staged(&mut self, node: Node) -> NodeId {
        let Some(id) = node.id() else {
            return self.add_node(node);
        };
        if let Some(existing) = self.nodes.get_mut(&id) {
            if node.position.is_some() {
                existing.position = node.position;
            }
            if let (Some(target), Some(source)) = (existing.as_metabolite_mut(), node.as_metabolite())
            {
                if source.label.is_some() {
                    target.label = source.label;
                }
            }
        }
        id
    }

    pub(crate) fn insert_node_at(&mut self, id: NodeId, mut node: Node) {
        node.assign_id(id);
        self.nodes.insert(id, node);
    }

    pub(crate) fn insert_segment_at(&mut self, id: SegmentId, segment: Segment) {
        self.segments.insert(id, segment);
    }

    pub(crate) fn insert_reaction_at(&mut self, id: ReactionId, reaction: Reaction) {
        self.reactions.insert(id, reaction);
    }

    pub(crate) fn insert_label_at(&mut self, id: LabelId, label: TextLabel) {
        self.text_labels.insert(id, label);
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Mutable access to a registered node, e.g. to refine its position
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    pub fn reaction(&self, id: ReactionId) -> Option<&Reaction> {
        self.reactions.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &Segment)> + '_ {
        self.segments.iter().map(|(id, segment)| (*id, segment))
    }

    pub fn reactions(&self) -> impl Iterator<Item = (ReactionId, &Reaction)> + '_ {
        self.reactions.iter().map(|(id, reaction)| (*id, reaction))
    }

    pub fn text_labels(&self) -> impl Iterator<Item = (LabelId, &TextLabel)> + '_ {
        self.text_labels.iter().map(|(id, label)| (*id, label))
    }

    /// Positions of every registered mid-marker
    pub fn mid_marker_positions(&self) -> Vec<Point> {
        self.nodes
            .values()
            .filter(|node| node.is_mid_marker())
            .filter_map(|node| node.position)
            .collect()
    }

    /// Grow the canvas to fit every placed node plus `spacing` on each side
    ///
    /// Without `expand_only` the bounds start from the origin, so the canvas
    /// always covers (0, 0); with it they start from the current canvas.
    pub fn fit_canvas(&mut self, spacing: f64, expand_only: bool) {
        let (mut min_x, mut min_y, mut max_x, mut max_y) = if expand_only {
            (
                self.canvas.x,
                self.canvas.y,
                self.canvas.right(),
                self.canvas.bottom(),
            )
        } else {
            (0.0, 0.0, 0.0, 0.0)
        };
        for position in self.nodes.values().filter_map(|node| node.position) {
            min_x = min_x.min(position.x);
            min_y = min_y.min(position.y);
            max_x = max_x.max(position.x);
            max_y = max_y.max(position.y);
        }
        min_x -= spacing;
        min_y -= spacing;
        max_x += spacing;
        max_y += spacing;
        self.canvas = Canvas::new(min_x, min_y, max_x - min_x, max_y - min_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Side;

    #[test]
    fn test_node_ids_are_monotonic() {
        let mut map = Map::new("test", "test");
        let a = map.add_node(Node::mid_marker(Point::default()));
        let b = map.add_node(Node::mid_marker(Point::default()));
        assert_eq!(a, NodeId(0));
        assert_eq!(b, NodeId(1));
    }

    #[test]
    fn test_allocation_skips_taken_ids() {
        let mut map = Map::new("test", "test");
        map.insert_node_at(NodeId(0), Node::mid_marker(Point::default()));
        map.insert_node_at(NodeId(1), Node::mid_marker(Point::default()));
        let id = map.add_node(Node::mid_marker(Point::default()));
        assert_eq!(id, NodeId(2));
    }

    #[test]
    fn test_registering_twice_is_noop() {
        let mut map = Map::new("test", "test");
        let id = map.add_node(Node::metabolite("atp_c", "ATP").at(Point::new(1.0, 1.0)));
        let copy = map.node(id).cloned().unwrap();
        assert_eq!(map.add_node(copy), id);
        assert_eq!(map.nodes().count(), 1);
    }

    #[test]
    fn test_commit_registers_everything() {
        let mut map = Map::new("test", "test");
        let draft =
            AutoReaction::at("PGI", Point::new(0.0, 0.0), 0.0, ReactionOptions::default()).unwrap();
        let id = map.add_reaction(draft).unwrap();

        let reaction = map.reaction(id).unwrap();
        assert_eq!(map.nodes().count(), 3);
        assert_eq!(map.segments().count(), 2);
        assert!(map.node(reaction.mid_marker).unwrap().is_mid_marker());
        assert!(reaction.multi_markers.get(Side::Minus).is_some());
        assert_eq!(reaction.segments.len(), 2);
    }

    #[test]
    fn test_commit_rejects_foreign_node() {
        let mut other = Map::new("other", "other");
        let foreign = other.add_node(Node::mid_marker(Point::new(5.0, 5.0)));
        let mid = other.node(foreign).cloned().unwrap();

        let mut map = Map::new("test", "test");
        let draft = AutoReaction::new("PGI", mid, 0.0, ReactionOptions::default()).unwrap();
        let err = map.add_reaction(draft).unwrap_err();

        assert!(matches!(err, LayoutError::UnregisteredNode { .. }));
        assert_eq!(map.nodes().count(), 0);
        assert_eq!(map.segments().count(), 0);
        assert_eq!(map.reactions().count(), 0);
    }

    #[test]
    fn test_fit_canvas_includes_origin() {
        let mut map = Map::new("test", "test");
        map.add_node(Node::mid_marker(Point::new(200.0, 300.0)));
        map.add_node(Node::metabolite("x", "x"));
        map.fit_canvas(100.0, false);
        assert_eq!(map.canvas, Canvas::new(-100.0, -100.0, 400.0, 500.0));
    }

    #[test]
    fn test_fit_canvas_expand_only() {
        let mut map = Map::new("test", "test").with_canvas(Canvas::new(0.0, 0.0, 50.0, 50.0));
        map.add_node(Node::mid_marker(Point::new(-20.0, 10.0)));
        map.fit_canvas(10.0, true);
        assert_eq!(map.canvas, Canvas::new(-30.0, -10.0, 90.0, 70.0));
    }

    #[test]
    fn test_labels_have_own_counter() {
        let mut map = Map::new("test", "test");
        map.add_node(Node::mid_marker(Point::default()));
        let id = map.add_label(TextLabel {
            text: "Glycolysis".to_string(),
            x: 0.0,
            y: 0.0,
        });
        assert_eq!(id, LabelId(0));
    }
}

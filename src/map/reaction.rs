//! Reactions: registered records and drafts under construction

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::layout::{LayoutError, PerSide, Point, Side};

use super::{Node, NodeId, SegmentId};

/// Gene associated with a reaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub bigg_id: String,
    pub name: String,
}

/// One participant of a registered reaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionMetabolite {
    pub coefficient: f64,
    pub node: NodeId,
}

/// A reaction registered in a [`Map`](super::Map)
///
/// All nodes and segments are referenced by identifier; the map owns them.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub name: String,
    pub bigg_id: String,
    pub label: Point,
    pub reversibility: bool,
    pub mid_marker: NodeId,
    pub multi_markers: PerSide<Option<NodeId>>,
    pub metabolites: Vec<ReactionMetabolite>,
    pub segments: Vec<SegmentId>,
    pub gene_reaction_rule: Option<String>,
    pub genes: Option<Vec<Gene>>,
}

/// Handle to a node staged on an [`AutoReaction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StagedNode(pub(crate) usize);

/// A segment staged on an [`AutoReaction`], between two staged nodes
#[derive(Debug, Clone, PartialEq)]
pub struct StagedSegment {
    pub from: StagedNode,
    pub to: StagedNode,
    pub b1: Option<Point>,
    pub b2: Option<Point>,
}

/// How the multi-marker of one reaction side is obtained
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MultiMarker {
    /// Place it on the reaction axis, one unit away from the mid-marker
    #[default]
    Auto,
    /// Create it at an explicit position
    At(Point),
    /// Reuse a node, typically one loaded from a saved map
    Existing(Node),
    /// No multi-marker: metabolites attach straight to the mid-marker
    MidMarker,
}

/// Optional construction parameters of an [`AutoReaction`]
#[derive(Debug, Clone)]
pub struct ReactionOptions {
    /// Display name, defaults to the reaction identifier
    pub name: Option<String>,
    /// Length unit all radii are expressed in
    pub unit: f64,
    /// Vertical correction of the default reaction label
    pub text_y_correction: f64,
    /// Explicit reaction label anchor
    pub label: Option<Point>,
    pub minus_multi_marker: MultiMarker,
    pub plus_multi_marker: MultiMarker,
    pub reversibility: bool,
    pub gene_reaction_rule: Option<String>,
    pub genes: Option<Vec<Gene>>,
}

impl Default for ReactionOptions {
    fn default() -> Self {
        Self {
            name: None,
            unit: 50.0,
            text_y_correction: 8.0,
            label: None,
            minus_multi_marker: MultiMarker::Auto,
            plus_multi_marker: MultiMarker::Auto,
            reversibility: true,
            gene_reaction_rule: None,
            genes: None,
        }
    }
}

impl ReactionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_unit(mut self, unit: f64) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_label(mut self, label: Point) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_multi_marker(mut self, side: Side, marker: MultiMarker) -> Self {
        match side {
            Side::Minus => self.minus_multi_marker = marker,
            Side::Plus => self.plus_multi_marker = marker,
        }
        self
    }

    pub fn with_reversibility(mut self, reversibility: bool) -> Self {
        self.reversibility = reversibility;
        self
    }

    pub fn with_genes(mut self, rule: impl Into<String>, genes: Vec<Gene>) -> Self {
        self.gene_reaction_rule = Some(rule.into());
        self.genes = Some(genes);
        self
    }
}

/// A metabolite kept aside on a draft until it is explicitly included
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalMetabolite {
    pub coefficient: f64,
    pub node: Node,
    pub controls: Option<(Option<Point>, Option<Point>)>,
}

/// Reaction-centered label offset used for the default reaction label
const REACTION_LABEL_OFFSET: f64 = 16.0;

/// A reaction under construction with automatic metabolite placement
///
/// The draft owns every node and segment it creates. Nothing touches a map
/// until the draft is committed with [`Map::add_reaction`](super::Map::add_reaction),
/// which registers everything at once.
#[derive(Debug, Clone)]
pub struct AutoReaction {
    pub(crate) bigg_id: String,
    pub(crate) name: String,
    pub(crate) label: Point,
    pub(crate) reversibility: bool,
    pub(crate) gene_reaction_rule: Option<String>,
    pub(crate) genes: Option<Vec<Gene>>,
    /// Principal axis, pointing from substrates to products
    pub(crate) angle: f64,
    pub(crate) unit: f64,
    /// Index 0 is always the mid-marker
    pub(crate) nodes: Vec<Node>,
    pub(crate) multi_markers: PerSide<Option<StagedNode>>,
    pub(crate) metabolites: Vec<(f64, StagedNode)>,
    pub(crate) segments: Vec<StagedSegment>,
    /// Effective angular deltas already taken on each side
    pub(crate) used_deltas: PerSide<Vec<f64>>,
    pub(crate) optional_metabolites: BTreeMap<String, OptionalMetabolite>,
}

const MID_MARKER_SLOT: StagedNode = StagedNode(0);

impl AutoReaction {
    /// Create a draft around a mid-marker node
    ///
    /// Multi-markers are created (or reused) according to the options and
    /// connected to the mid-marker right away.
    pub fn new(
        bigg_id: impl Into<String>,
        mid_marker: Node,
        angle: f64,
        options: ReactionOptions,
    ) -> Result<Self, LayoutError> {
        let bigg_id = bigg_id.into();
        let mid = mid_marker
            .position
            .ok_or_else(|| LayoutError::unplaced(bigg_id.clone(), "mid-marker"))?;
        let unit = options.unit;

        let label = options.label.unwrap_or_else(|| {
            let perpendicular = angle - 0.5 * PI;
            Point::new(
                mid.x + REACTION_LABEL_OFFSET * perpendicular.cos().abs(),
                mid.y + REACTION_LABEL_OFFSET * perpendicular.sin() + options.text_y_correction,
            )
        });

        let mut reaction = Self {
            name: options.name.unwrap_or_else(|| bigg_id.clone()),
            bigg_id,
            label,
            reversibility: options.reversibility,
            gene_reaction_rule: options.gene_reaction_rule,
            genes: options.genes,
            angle,
            unit,
            nodes: vec![mid_marker],
            multi_markers: PerSide::default(),
            metabolites: Vec::new(),
            segments: Vec::new(),
            used_deltas: PerSide::default(),
            optional_metabolites: BTreeMap::new(),
        };

        for (side, marker) in [
            (Side::Minus, options.minus_multi_marker),
            (Side::Plus, options.plus_multi_marker),
        ] {
            let node = match marker {
                MultiMarker::Auto => Some(Node::multi_marker(
                    mid.polar_offset(unit, angle + side.axis_offset()),
                )),
                MultiMarker::At(position) => Some(Node::multi_marker(position)),
                MultiMarker::Existing(node) => {
                    if node.position.is_none() {
                        return Err(LayoutError::unplaced(reaction.bigg_id, "multi-marker"));
                    }
                    Some(node)
                }
                MultiMarker::MidMarker => None,
            };
            if let Some(node) = node {
                let staged = reaction.stage(node);
                *reaction.multi_markers.get_mut(side) = Some(staged);
                let (from, to) = match side {
                    Side::Minus => (staged, MID_MARKER_SLOT),
                    Side::Plus => (MID_MARKER_SLOT, staged),
                };
                reaction.push_segment(from, to, None, None);
            }
        }

        Ok(reaction)
    }

    /// Create a draft around a new mid-marker at `position`
    pub fn at(
        bigg_id: impl Into<String>,
        position: Point,
        angle: f64,
        options: ReactionOptions,
    ) -> Result<Self, LayoutError> {
        Self::new(bigg_id, Node::mid_marker(position), angle, options)
    }

    pub(crate) fn stage(&mut self, node: Node) -> StagedNode {
        self.nodes.push(node);
        StagedNode(self.nodes.len() - 1)
    }

    pub(crate) fn push_segment(
        &mut self,
        from: StagedNode,
        to: StagedNode,
        b1: Option<Point>,
        b2: Option<Point>,
    ) {
        self.segments.push(StagedSegment { from, to, b1, b2 });
    }

    pub fn bigg_id(&self) -> &str {
        &self.bigg_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn unit(&self) -> f64 {
        self.unit
    }

    pub fn label(&self) -> Point {
        self.label
    }

    pub fn node(&self, staged: StagedNode) -> &Node {
        &self.nodes[staged.0]
    }

    pub fn mid_marker(&self) -> &Node {
        self.node(MID_MARKER_SLOT)
    }

    pub fn multi_marker(&self, side: Side) -> Option<&Node> {
        self.multi_markers.get(side).map(|staged| self.node(staged))
    }

    /// Node metabolites of `side` connect to
    pub(crate) fn reference(&self, side: Side) -> StagedNode {
        self.multi_markers.get(side).unwrap_or(MID_MARKER_SLOT)
    }

    /// Metabolites in insertion order
    pub fn metabolites(&self) -> impl Iterator<Item = (f64, &Node)> + '_ {
        self.metabolites
            .iter()
            .map(|&(coefficient, staged)| (coefficient, self.node(staged)))
    }

    pub fn segments(&self) -> &[StagedSegment] {
        &self.segments
    }

    /// Effective angular deltas already used on one side
    pub fn used_deltas(&self, side: Side) -> &[f64] {
        self.used_deltas.get(side)
    }

    /// Keep a metabolite aside without placing it
    pub fn add_optional_metabolite(
        &mut self,
        node: Node,
        coefficient: f64,
        controls: Option<(Option<Point>, Option<Point>)>,
    ) {
        let key = node.bigg_id().unwrap_or_default().to_string();
        self.optional_metabolites.insert(
            key,
            OptionalMetabolite {
                coefficient,
                node,
                controls,
            },
        );
    }

    pub fn optional_metabolites(&self) -> &BTreeMap<String, OptionalMetabolite> {
        &self.optional_metabolites
    }

    pub(crate) fn staged_nodes(&self) -> impl Iterator<Item = (StagedNode, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (StagedNode(index), node))
    }
}

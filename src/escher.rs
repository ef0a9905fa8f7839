//! Escher map documents
//!
//! An Escher document is a two-element JSON array: a header describing the
//! map and a body holding nodes, reactions (with their segments), text labels
//! and the canvas, all keyed by identifier. [`Map::to_escher`] and
//! [`Map::from_escher`] convert between that shape and a [`Map`], keeping
//! every identifier.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::layout::{Canvas, PerSide, Point};
use crate::map::{
    node, Gene, LabelId, Map, Node, NodeId, Reaction, ReactionId, ReactionMetabolite, Segment,
    SegmentId, TextLabel, DEFAULT_HOMEPAGE, DEFAULT_SCHEMA,
};

/// Errors that can occur when reading an Escher document
#[derive(Error, Debug)]
pub enum EscherError {
    #[error("node {node} has unknown node type '{node_type}'")]
    UnknownNodeVariant { node: NodeId, node_type: String },

    #[error("reaction '{reaction}' refers to missing node {node}")]
    MissingNode { reaction: String, node: NodeId },

    #[error("reaction '{reaction}' has no mid-marker")]
    MissingMidMarker { reaction: String },

    #[error("invalid Escher JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A complete Escher document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscherMap(pub Header, pub Body);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub map_name: String,
    #[serde(default)]
    pub map_description: String,
    #[serde(default = "default_homepage")]
    pub homepage: String,
    #[serde(default = "default_schema")]
    pub schema: String,
}

fn default_homepage() -> String {
    DEFAULT_HOMEPAGE.to_string()
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub reactions: BTreeMap<ReactionId, ReactionRecord>,
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, NodeRecord>,
    #[serde(default)]
    pub text_labels: BTreeMap<LabelId, TextLabel>,
    #[serde(default)]
    pub canvas: Canvas,
}

/// A node as stored in the document; which fields are set depends on
/// `node_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bigg_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_is_primary: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub name: String,
    pub bigg_id: String,
    #[serde(default = "default_reversibility")]
    pub reversibility: bool,
    pub label_x: f64,
    pub label_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_reaction_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genes: Option<Vec<Gene>>,
    #[serde(default)]
    pub metabolites: Vec<MetaboliteRecord>,
    #[serde(default)]
    pub segments: BTreeMap<SegmentId, SegmentRecord>,
}

fn default_reversibility() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaboliteRecord {
    pub bigg_id: String,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    #[serde(default)]
    pub b1: Option<Point>,
    #[serde(default)]
    pub b2: Option<Point>,
}

impl EscherMap {
    pub fn from_json(content: &str) -> Result<Self, EscherError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String, EscherError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, EscherError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn header(&self) -> &Header {
        &self.0
    }

    pub fn body(&self) -> &Body {
        &self.1
    }
}

impl NodeRecord {
    fn from_node(node: &Node) -> Self {
        let mut record = Self {
            node_type: node.kind_name().to_string(),
            x: node.position.map(|p| p.x),
            y: node.position.map(|p| p.y),
            bigg_id: None,
            name: None,
            label_x: None,
            label_y: None,
            node_is_primary: None,
        };
        if let Some(metabolite) = node.as_metabolite() {
            record.bigg_id = Some(metabolite.bigg_id.clone());
            record.name = Some(metabolite.name.clone());
            record.label_x = metabolite.label.map(|p| p.x);
            record.label_y = metabolite.label.map(|p| p.y);
            record.node_is_primary = Some(metabolite.is_primary);
        }
        record
    }

    /// Rebuild the node variant named by `node_type`
    pub fn to_node(&self, id: NodeId) -> Result<Node, EscherError> {
        let position = match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        };
        let mut node = match self.node_type.as_str() {
            node::METABOLITE => {
                let bigg_id = self.bigg_id.clone().unwrap_or_default();
                let name = self.name.clone().unwrap_or_else(|| bigg_id.clone());
                let mut node =
                    Node::metabolite(bigg_id, name).primary(self.node_is_primary.unwrap_or(false));
                if let (Some(x), Some(y)) = (self.label_x, self.label_y) {
                    node = node.with_label(Point::new(x, y));
                }
                node
            }
            node::MID_MARKER => Node::mid_marker(Point::default()),
            node::MULTI_MARKER => Node::multi_marker(Point::default()),
            other => {
                return Err(EscherError::UnknownNodeVariant {
                    node: id,
                    node_type: other.to_string(),
                })
            }
        };
        node.position = position;
        Ok(node)
    }
}

impl Map {
    /// Export the map as an Escher document
    pub fn to_escher(&self) -> EscherMap {
        let header = Header {
            map_name: self.name.clone(),
            map_description: self.description.clone(),
            homepage: self.homepage.clone(),
            schema: self.schema.clone(),
        };

        let reactions = self
            .reactions()
            .map(|(id, reaction)| (id, self.reaction_record(reaction)))
            .collect();
        let nodes = self
            .nodes()
            .map(|(id, node)| (id, NodeRecord::from_node(node)))
            .collect();
        let text_labels = self
            .text_labels()
            .map(|(id, label)| (id, label.clone()))
            .collect();

        EscherMap(
            header,
            Body {
                reactions,
                nodes,
                text_labels,
                canvas: self.canvas,
            },
        )
    }

    fn reaction_record(&self, reaction: &Reaction) -> ReactionRecord {
        let metabolites = reaction
            .metabolites
            .iter()
            .filter_map(|m| {
                let bigg_id = self.node(m.node)?.bigg_id()?;
                Some(MetaboliteRecord {
                    bigg_id: bigg_id.to_string(),
                    coefficient: m.coefficient,
                })
            })
            .collect();
        let segments = reaction
            .segments
            .iter()
            .filter_map(|&id| {
                let segment = self.segment(id)?;
                Some((
                    id,
                    SegmentRecord {
                        from_node_id: segment.from,
                        to_node_id: segment.to,
                        b1: segment.b1,
                        b2: segment.b2,
                    },
                ))
            })
            .collect();

        ReactionRecord {
            name: reaction.name.clone(),
            bigg_id: reaction.bigg_id.clone(),
            reversibility: reaction.reversibility,
            label_x: reaction.label.x,
            label_y: reaction.label.y,
            gene_reaction_rule: reaction.gene_reaction_rule.clone(),
            genes: reaction.genes.clone(),
            metabolites,
            segments,
        }
    }

    /// Rebuild a map from an Escher document, keeping every identifier
    ///
    /// Records that cannot be rebuilt are skipped and returned alongside the
    /// map: nodes of an unknown type, and reactions that refer to a missing
    /// node or have no mid-marker.
    pub fn from_escher(escher: &EscherMap) -> (Map, Vec<EscherError>) {
        let EscherMap(header, body) = escher;
        let mut map = Map::new(header.map_name.clone(), header.map_description.clone())
            .with_homepage(header.homepage.clone())
            .with_schema(header.schema.clone())
            .with_canvas(body.canvas);
        let mut issues = Vec::new();

        for (&id, record) in &body.nodes {
            match record.to_node(id) {
                Ok(node) => map.insert_node_at(id, node),
                Err(err) => {
                    warn!(%err, "skipping node");
                    issues.push(err);
                }
            }
        }

        for (&id, label) in &body.text_labels {
            map.insert_label_at(id, label.clone());
        }

        for (&id, record) in &body.reactions {
            match map.reaction_from_record(record) {
                Ok((reaction, segments)) => {
                    for (segment_id, segment) in segments {
                        map.insert_segment_at(segment_id, segment);
                    }
                    map.insert_reaction_at(id, reaction);
                }
                Err(err) => {
                    warn!(%err, "skipping reaction");
                    issues.push(err);
                }
            }
        }

        (map, issues)
    }

    fn reaction_from_record(
        &self,
        record: &ReactionRecord,
    ) -> Result<(Reaction, Vec<(SegmentId, Segment)>), EscherError> {
        let missing = |node| EscherError::MissingNode {
            reaction: record.bigg_id.clone(),
            node,
        };

        let mut segments = Vec::with_capacity(record.segments.len());
        for (&id, s) in &record.segments {
            for end in [s.from_node_id, s.to_node_id] {
                if !self.contains_node(end) {
                    return Err(missing(end));
                }
            }
            segments.push((
                id,
                Segment::new(s.from_node_id, s.to_node_id).with_controls(s.b1, s.b2),
            ));
        }

        let is_mid_marker =
            |id: NodeId| self.node(id).is_some_and(|node| node.is_mid_marker());
        let is_multi_marker =
            |id: NodeId| self.node(id).is_some_and(|node| node.is_multi_marker());

        let mid_marker = segments
            .iter()
            .flat_map(|(_, s)| [s.from, s.to])
            .find(|&id| is_mid_marker(id))
            .ok_or_else(|| EscherError::MissingMidMarker {
                reaction: record.bigg_id.clone(),
            })?;

        // multi-marker -> mid-marker on the minus side, mid-marker -> multi-marker on the plus side
        let minus = segments
            .iter()
            .find(|(_, s)| s.to == mid_marker && is_multi_marker(s.from))
            .map(|(_, s)| s.from);
        let plus = segments
            .iter()
            .find(|(_, s)| s.from == mid_marker && is_multi_marker(s.to))
            .map(|(_, s)| s.to);

        let mut metabolites = Vec::with_capacity(record.metabolites.len());
        for m in &record.metabolites {
            let node = segments
                .iter()
                .flat_map(|(_, s)| [s.from, s.to])
                .find(|&id| {
                    self.node(id)
                        .and_then(Node::bigg_id)
                        .is_some_and(|bigg_id| bigg_id == m.bigg_id)
                });
            match node {
                Some(node) => metabolites.push(ReactionMetabolite {
                    coefficient: m.coefficient,
                    node,
                }),
                None => warn!(
                    reaction = %record.bigg_id,
                    metabolite = %m.bigg_id,
                    "metabolite has no node among the reaction segments"
                ),
            }
        }

        let reaction = Reaction {
            name: record.name.clone(),
            bigg_id: record.bigg_id.clone(),
            label: Point::new(record.label_x, record.label_y),
            reversibility: record.reversibility,
            mid_marker,
            multi_markers: PerSide::new(minus, plus),
            metabolites,
            segments: segments.iter().map(|(id, _)| *id).collect(),
            gene_reaction_rule: record.gene_reaction_rule.clone(),
            genes: record.genes.clone(),
        };
        Ok((reaction, segments))
    }
}

//! Laying out a whole reaction network
//!
//! The input is a network already extracted from a pathway diagram:
//! metabolites with their drawn positions, and reactions with their
//! participants and, optionally, the polylines the diagram draws for them.
//! Reactions with polylines get their axis from the drawing; the others are
//! placed between two of their metabolites.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::layout::{
    extract_backbone, place_reaction_on_backbone, LayoutConfig, LayoutError, Point,
};
use crate::map::{AutoReaction, Map, Node, NodeId, ReactionId, ReactionOptions};

/// A network to lay out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Factor the diagram coordinates were scaled by
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    pub metabolites: Vec<MetaboliteInput>,
    pub reactions: Vec<ReactionInput>,
}

fn default_scale_factor() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// One drawn occurrence of a metabolite
///
/// The same compound may be drawn several times; `id` tells the occurrences
/// apart while `bigg_id` names the compound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaboliteInput {
    pub id: String,
    pub bigg_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_true")]
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantInput {
    /// `id` of a [`MetaboliteInput`]
    pub metabolite: String,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionInput {
    pub bigg_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub reversibility: bool,
    pub metabolites: Vec<ParticipantInput>,
    /// Drawn polylines, already scaled by `scale_factor`
    #[serde(default)]
    pub lines: Vec<Vec<Point>>,
}

/// Result of laying out a network
#[derive(Debug, Clone)]
pub struct NetworkLayout {
    pub map: Map,
    /// Committed reactions, in input order
    pub reactions: Vec<(String, ReactionId)>,
    /// Reactions that could not be laid out
    pub skipped: Vec<LayoutError>,
    /// Problems that were worked around
    pub issues: Vec<LayoutError>,
}

/// Lay out every reaction of a network
///
/// Reactions are handled in input order, each committed before the next is
/// placed so later reactions avoid the mid-markers of earlier ones. A
/// reaction that fails is skipped; a later reaction with an already used
/// `bigg_id` is ignored.
pub fn layout_network(input: &NetworkInput, config: &LayoutConfig) -> NetworkLayout {
    let mut map = Map::new(input.name.clone(), input.description.clone());

    let mut registered: HashMap<&str, NodeId> = HashMap::new();
    for metabolite in &input.metabolites {
        if registered.contains_key(metabolite.id.as_str()) {
            warn!(metabolite = %metabolite.id, "duplicate metabolite id, keeping the first");
            continue;
        }
        let name = metabolite
            .name
            .clone()
            .unwrap_or_else(|| metabolite.bigg_id.clone());
        let node = Node::metabolite(metabolite.bigg_id.clone(), name)
            .at(Point::new(metabolite.x, metabolite.y))
            .primary(metabolite.primary);
        registered.insert(metabolite.id.as_str(), map.add_node(node));
    }

    let mut seen = HashSet::new();
    let mut layout = NetworkLayout {
        map,
        reactions: Vec::new(),
        skipped: Vec::new(),
        issues: Vec::new(),
    };

    for reaction in &input.reactions {
        if !seen.insert(reaction.bigg_id.as_str()) {
            continue;
        }
        let placed = build_reaction(&layout.map, &registered, reaction, input.scale_factor, config)
            .and_then(|(draft, issues)| {
                let id = layout.map.add_reaction(draft)?;
                Ok((id, issues))
            });
        match placed {
            Ok((id, issues)) => {
                layout.issues.extend(issues);
                layout.reactions.push((reaction.bigg_id.clone(), id));
            }
            Err(err) => {
                warn!(reaction = %reaction.bigg_id, %err, "skipping reaction");
                layout.skipped.push(err);
            }
        }
    }

    layout.map.fit_canvas(config.canvas_margin, false);
    info!(
        reactions = layout.reactions.len(),
        skipped = layout.skipped.len(),
        issues = layout.issues.len(),
        "network layout finished"
    );
    layout
}

fn build_reaction(
    map: &Map,
    registered: &HashMap<&str, NodeId>,
    reaction: &ReactionInput,
    scale_factor: f64,
    config: &LayoutConfig,
) -> Result<(AutoReaction, Vec<LayoutError>), LayoutError> {
    let mut participants = Vec::with_capacity(reaction.metabolites.len());
    for participant in &reaction.metabolites {
        let node = registered
            .get(participant.metabolite.as_str())
            .and_then(|&id| map.node(id))
            .ok_or_else(|| LayoutError::UnknownMetabolite {
                reaction: reaction.bigg_id.clone(),
                metabolite: participant.metabolite.clone(),
            })?;
        participants.push((participant.coefficient, node.clone()));
    }

    let options = ReactionOptions::new()
        .with_name(reaction.name.clone().unwrap_or_else(|| reaction.bigg_id.clone()))
        .with_unit(config.unit)
        .with_reversibility(reaction.reversibility);

    if reaction.lines.is_empty() {
        let draft = place_reaction_on_backbone(
            map,
            &reaction.bigg_id,
            &participants,
            &config.pathway,
            &config.placement,
            options,
            &[],
        )?;
        return Ok((draft, Vec::new()));
    }

    let positions: Vec<(f64, Point)> = participants
        .iter()
        .filter_map(|(coefficient, node)| Some((*coefficient, node.position?)))
        .collect();
    let backbone = extract_backbone(
        &reaction.bigg_id,
        &reaction.lines,
        &positions,
        scale_factor,
        &config.backbone,
    )?;

    let mut draft = AutoReaction::at(
        reaction.bigg_id.clone(),
        backbone.midpoint,
        backbone.angle,
        options,
    )?;
    for (coefficient, node) in participants {
        draft.add_metabolite(node, coefficient, None, &config.placement)?;
    }
    Ok((draft, backbone.issues))
}

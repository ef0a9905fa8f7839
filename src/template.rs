//! Saved Escher maps as templates for a new layout
//!
//! A template keeps every node of the saved map where it was and turns each
//! saved reaction back into an [`AutoReaction`] draft. Primary metabolites are
//! placed again with their saved curves; the others are kept aside as
//! optional metabolites and only placed on request.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::escher::{EscherError, EscherMap, ReactionRecord};
use crate::layout::geometry::normalize_angle;
use crate::layout::{Controls, LayoutConfig, LayoutError, Point, Side};
use crate::map::{AutoReaction, Map, MultiMarker, Node, NodeId, ReactionOptions};
use crate::Error;

/// A map rebuilt from a saved document, with one draft per saved reaction
#[derive(Debug)]
pub struct Template {
    /// Header, nodes and text labels of the saved map; no reactions yet
    pub map: Map,
    /// Drafts in the order of their saved identifiers
    pub reactions: Vec<AutoReaction>,
    /// Records that could not be turned into nodes or drafts
    pub issues: Vec<Error>,
}

impl Template {
    /// Commit every draft to the template map
    ///
    /// Drafts that fail to commit are left out and their errors returned.
    pub fn commit(self) -> (Map, Vec<LayoutError>) {
        let mut map = self.map;
        let mut errors = Vec::new();
        for draft in self.reactions {
            if let Err(err) = map.add_reaction(draft) {
                warn!(%err, "skipping reaction");
                errors.push(err);
            }
        }
        (map, errors)
    }
}

/// Turn a saved Escher document into a template
pub fn load_as_template(escher: &EscherMap, config: &LayoutConfig) -> Template {
    let EscherMap(header, body) = escher;
    let mut map = Map::new(header.map_name.clone(), header.map_description.clone())
        .with_homepage(header.homepage.clone())
        .with_schema(header.schema.clone())
        .with_canvas(body.canvas);
    let mut issues = Vec::new();

    for (&id, record) in &body.nodes {
        match record.to_node(id) {
            Ok(node) => map.insert_node_at(id, node),
            Err(err) => issues.push(err.into()),
        }
    }
    for (&id, label) in &body.text_labels {
        map.insert_label_at(id, label.clone());
    }

    let mut reactions = Vec::new();
    for record in body.reactions.values() {
        match reaction_draft(&map, record, config) {
            Ok(draft) => reactions.push(draft),
            Err(err) => {
                warn!(reaction = %record.bigg_id, %err, "skipping reaction");
                issues.push(err);
            }
        }
    }

    Template {
        map,
        reactions,
        issues,
    }
}

/// A metabolite found on one of the saved segments
struct SavedMetabolite {
    node: NodeId,
    /// Control points oriented from the reference node to the metabolite
    controls: Controls,
}

fn reaction_draft(
    map: &Map,
    record: &ReactionRecord,
    config: &LayoutConfig,
) -> Result<AutoReaction, Error> {
    let node = |id: NodeId| {
        map.node(id).ok_or_else(|| EscherError::MissingNode {
            reaction: record.bigg_id.clone(),
            node: id,
        })
    };
    let coefficient_of = |bigg_id: &str| {
        record
            .metabolites
            .iter()
            .find(|m| m.bigg_id == bigg_id)
            .map(|m| m.coefficient)
    };

    let mut mid_marker = None;
    let mut angle = 0.0;
    let mut markers: [Option<MultiMarker>; 2] = [None, None];
    let mut saved: BTreeMap<String, SavedMetabolite> = BTreeMap::new();

    for segment in record.segments.values() {
        for (id, other, is_source) in [
            (segment.from_node_id, segment.to_node_id, true),
            (segment.to_node_id, segment.from_node_id, false),
        ] {
            let current = node(id)?;
            if current.is_mid_marker() {
                mid_marker = Some(current.clone());
                continue;
            }
            let Some(metabolite) = current.as_metabolite() else {
                continue;
            };

            let controls = if is_source {
                (segment.b2, segment.b1)
            } else {
                (segment.b1, segment.b2)
            };
            saved.insert(
                metabolite.bigg_id.clone(),
                SavedMetabolite { node: id, controls },
            );

            if !metabolite.is_primary {
                continue;
            }
            let Some(coefficient) = coefficient_of(&metabolite.bigg_id) else {
                continue;
            };
            let reference = node(other)?;
            if let (Some(position), Some(from)) = (current.position, reference.position) {
                angle = from.angle_to(position);
                if coefficient < 0.0 {
                    angle = normalize_angle(angle + std::f64::consts::PI);
                }
            }
            let side = Side::of(coefficient);
            if reference.is_multi_marker() {
                markers[side.index()] = Some(MultiMarker::Existing(reference.clone()));
            } else if reference.is_mid_marker() {
                markers[side.index()] = Some(MultiMarker::MidMarker);
            }
        }
    }

    let mid_marker = mid_marker.ok_or_else(|| EscherError::MissingMidMarker {
        reaction: record.bigg_id.clone(),
    })?;

    // sides without a primary metabolite keep the multi-marker wired to the mid-marker
    for segment in record.segments.values() {
        let from = node(segment.from_node_id)?;
        let to = node(segment.to_node_id)?;
        if from.is_multi_marker() && to.is_mid_marker() && markers[Side::Minus.index()].is_none() {
            markers[Side::Minus.index()] = Some(MultiMarker::Existing(from.clone()));
        } else if from.is_mid_marker()
            && to.is_multi_marker()
            && markers[Side::Plus.index()].is_none()
        {
            markers[Side::Plus.index()] = Some(MultiMarker::Existing(to.clone()));
        }
    }
    let [minus, plus] = markers;

    let mut options = ReactionOptions::new()
        .with_name(record.name.clone())
        .with_unit(config.unit)
        .with_label(Point::new(record.label_x, record.label_y))
        .with_reversibility(record.reversibility)
        .with_multi_marker(Side::Minus, minus.unwrap_or_default())
        .with_multi_marker(Side::Plus, plus.unwrap_or_default());
    options.gene_reaction_rule = record.gene_reaction_rule.clone();
    options.genes = record.genes.clone();

    let mut draft = AutoReaction::new(record.bigg_id.clone(), mid_marker, angle, options)?;
    debug!(reaction = %record.bigg_id, angle, "loaded reaction from template");

    for m in &record.metabolites {
        let Some(found) = saved.get(&m.bigg_id) else {
            warn!(
                reaction = %record.bigg_id,
                metabolite = %m.bigg_id,
                "metabolite has no node among the reaction segments"
            );
            continue;
        };
        let metabolite: Node = node(found.node)?.clone();
        if metabolite.is_primary() {
            draft.add_metabolite(metabolite, m.coefficient, Some(found.controls), &config.placement)?;
        } else {
            draft.add_optional_metabolite(metabolite, m.coefficient, Some(found.controls));
        }
    }

    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PlacementOptions;

    fn saved_map() -> EscherMap {
        let mut map = Map::new("glycolysis", "test");
        let options = ReactionOptions::new().with_name("Phosphoglucose isomerase");
        let mut draft = AutoReaction::at("PGI", Point::new(500.0, 200.0), 0.0, options).unwrap();
        let placement = PlacementOptions::default();
        draft
            .add_metabolite(Node::metabolite("g6p_c", "G6P").primary(true), -1.0, None, &placement)
            .unwrap();
        draft
            .add_metabolite(Node::metabolite("f6p_c", "F6P").primary(true), 1.0, None, &placement)
            .unwrap();
        draft
            .add_metabolite(Node::metabolite("h_c", "H+"), 1.0, None, &placement)
            .unwrap();
        map.add_reaction(draft).unwrap();
        map.to_escher()
    }

    #[test]
    fn test_angle_inferred_from_primary_metabolites() {
        let saved = saved_map();
        let template = load_as_template(&saved, &LayoutConfig::default());
        assert!(template.issues.is_empty());
        assert_eq!(template.reactions.len(), 1);

        let draft = &template.reactions[0];
        let record = saved.body().reactions.values().next().unwrap();
        assert!(draft.angle().abs() < 1e-9);
        assert_eq!(draft.name(), "Phosphoglucose isomerase");
        assert_eq!(draft.label(), Point::new(record.label_x, record.label_y));
    }

    #[test]
    fn test_non_primary_metabolites_become_optional() {
        let template = load_as_template(&saved_map(), &LayoutConfig::default());
        let draft = &template.reactions[0];
        assert_eq!(draft.metabolites().count(), 2);
        assert!(draft.optional_metabolites().contains_key("h_c"));
    }

    #[test]
    fn test_existing_markers_are_reused() {
        let saved = saved_map();
        let template = load_as_template(&saved, &LayoutConfig::default());
        let draft = &template.reactions[0];

        let minus = draft.multi_marker(Side::Minus).unwrap();
        let plus = draft.multi_marker(Side::Plus).unwrap();
        assert!(minus.id().is_some());
        assert!(plus.id().is_some());
        assert!(draft.mid_marker().id().is_some());
    }

    #[test]
    fn test_commit_keeps_positions() {
        let saved = saved_map();
        let template = load_as_template(&saved, &LayoutConfig::default());
        let (map, errors) = template.commit();
        assert!(errors.is_empty());

        let (reloaded, _) = Map::from_escher(&saved);
        for (id, node) in reloaded.nodes() {
            let committed = map.node(id).unwrap();
            let (a, b) = (node.position.unwrap(), committed.position.unwrap());
            assert!(a.distance(b) < 1e-9, "node {id} moved");
        }
        assert_eq!(map.reactions().count(), 1);
    }

    #[test]
    fn test_broken_reaction_is_reported() {
        let mut saved = saved_map();
        saved
            .1
            .nodes
            .retain(|_, record| record.node_type != "midmarker");
        let template = load_as_template(&saved, &LayoutConfig::default());
        assert!(template.reactions.is_empty());
        assert_eq!(template.issues.len(), 1);
        assert!(matches!(
            template.issues[0],
            Error::Escher(EscherError::MissingNode { .. })
        ));
    }
}

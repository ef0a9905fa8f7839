//! Placing a reaction between two metabolites already on the map
//!
//! Used when no drawn geometry exists for a reaction: two of its metabolites
//! on opposite sides of the reaction form the backbone, and the mid-marker is
//! put on the perpendicular bisector between them, away from the mid-markers
//! of other reactions.

use tracing::debug;

use crate::map::{AutoReaction, Map, Node, ReactionOptions};

use super::config::{MidMarkerPlacement, MidMarkerQuery, PathwayOptions, PlacementOptions};
use super::error::LayoutError;
use super::types::{Point, Side};

impl MidMarkerPlacement {
    pub fn position(&self, query: &MidMarkerQuery<'_>) -> Point {
        match self {
            MidMarkerPlacement::AlternatingSides => alternating_pathway_sides(query),
            MidMarkerPlacement::Custom(place) => place(query),
        }
    }
}

/// Walk the perpendicular bisector of the backbone outwards, alternating
/// sides, until a point is found that keeps `0.99 * spacing` from every
/// placed mid-marker
///
/// Centered search starts on the backbone itself, otherwise half a spacing
/// beside it. The search always ends since the offset grows every step.
pub fn alternating_pathway_sides(query: &MidMarkerQuery<'_>) -> Point {
    let delta = query.minus - query.plus;
    let length = query.plus.distance(query.minus);
    let center = query.plus.midpoint(query.minus);
    let normal = Point::new(-delta.y / length, delta.x / length);
    let clearance = 0.99 * query.spacing;

    let mut step: u64 = if query.centered { 1 } else { 0 };
    loop {
        let mut factor = (step / 2) as f64;
        if !query.centered {
            factor += 0.5;
        }
        let sign = if step % 2 == 1 { 1.0 } else { -1.0 };
        let candidate = center + normal * (sign * factor * query.spacing);
        if !query
            .placed
            .iter()
            .any(|placed| placed.distance(candidate) < clearance)
        {
            return candidate;
        }
        step += 1;
    }
}

/// Build a reaction around two of its metabolites that are already on `map`
///
/// The first map-resident metabolite and the first following one of the
/// opposite side form the backbone. The axis points from the minus to the
/// plus node. Every metabolite in `reaction_info` is then placed in order;
/// the returned draft still has to be committed with [`Map::add_reaction`].
///
/// `additional_mid_markers` are avoided on top of the mid-markers already on
/// the map, typically those of reactions that are not committed yet.
pub fn place_reaction_on_backbone(
    map: &Map,
    bigg_id: &str,
    reaction_info: &[(f64, Node)],
    pathway: &PathwayOptions,
    placement: &PlacementOptions,
    options: ReactionOptions,
    additional_mid_markers: &[Point],
) -> Result<AutoReaction, LayoutError> {
    let resident: Vec<(f64, Point)> = reaction_info
        .iter()
        .filter_map(|(coefficient, node)| {
            let registered = map.node(node.id()?)?;
            Some((*coefficient, registered.position?))
        })
        .collect();

    let Some(&(first_coefficient, first)) = resident.first() else {
        return Err(insufficient(bigg_id, 0));
    };
    let first_side = Side::of(first_coefficient);
    let Some(&(_, second)) = resident
        .iter()
        .skip(1)
        .find(|(coefficient, _)| Side::of(*coefficient) != first_side)
    else {
        return Err(if resident.len() < 2 {
            insufficient(bigg_id, resident.len())
        } else {
            LayoutError::SameSideBackbone {
                reaction: bigg_id.to_string(),
            }
        });
    };

    let (plus, minus) = match first_side {
        Side::Plus => (first, second),
        Side::Minus => (second, first),
    };
    if plus == minus {
        return Err(LayoutError::degenerate(
            bigg_id,
            "backbone metabolites share one position",
        ));
    }
    let angle = minus.angle_to(plus);

    let mut placed = map.mid_marker_positions();
    placed.extend_from_slice(additional_mid_markers);
    let mid = pathway.placement.position(&MidMarkerQuery {
        plus,
        minus,
        placed: &placed,
        spacing: pathway.spacing,
        centered: pathway.centered,
    });
    debug!(reaction = bigg_id, x = mid.x, y = mid.y, angle, "placed mid-marker on backbone");

    let mut reaction = AutoReaction::at(bigg_id, mid, angle, options)?;
    for (coefficient, node) in reaction_info {
        reaction.add_metabolite(node.clone(), *coefficient, None, placement)?;
    }
    Ok(reaction)
}

fn insufficient(reaction: &str, found: usize) -> LayoutError {
    LayoutError::InsufficientBackboneNodes {
        reaction: reaction.to_string(),
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with(positions: &[Point]) -> (Map, Vec<Node>) {
        let mut map = Map::new("test", "");
        let nodes = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let node = Node::metabolite(format!("m{i}"), format!("M{i}"))
                    .at(position)
                    .primary(true);
                let id = map.add_node(node);
                map.node(id).unwrap().clone()
            })
            .collect();
        (map, nodes)
    }

    fn place(
        map: &Map,
        info: &[(f64, Node)],
        pathway: &PathwayOptions,
        others: &[Point],
    ) -> Result<AutoReaction, LayoutError> {
        place_reaction_on_backbone(
            map,
            "R1",
            info,
            pathway,
            &PlacementOptions::default(),
            ReactionOptions::default(),
            others,
        )
    }

    #[test]
    fn test_centered_mid_marker_on_bisector() {
        let (map, nodes) = map_with(&[Point::new(0.0, 0.0), Point::new(300.0, 0.0)]);
        let info = vec![(-1.0, nodes[0].clone()), (1.0, nodes[1].clone())];
        let reaction = place(&map, &info, &PathwayOptions::default(), &[]).unwrap();

        assert_eq!(reaction.mid_marker().position, Some(Point::new(150.0, 0.0)));
        assert_eq!(reaction.angle(), 0.0);
        assert_eq!(reaction.metabolites().count(), 2);
    }

    #[test]
    fn test_uncentered_starts_half_a_spacing_out() {
        let (map, nodes) = map_with(&[Point::new(0.0, 0.0), Point::new(300.0, 0.0)]);
        let info = vec![(1.0, nodes[1].clone()), (-1.0, nodes[0].clone())];
        let pathway = PathwayOptions::default().with_centered(false);
        let reaction = place(&map, &info, &pathway, &[]).unwrap();

        let mid = reaction.mid_marker().position.unwrap();
        assert!((mid.x - 150.0).abs() < 1e-9);
        assert!((mid.y.abs() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_avoids_other_mid_markers() {
        let (map, nodes) = map_with(&[Point::new(0.0, 0.0), Point::new(300.0, 0.0)]);
        let info = vec![(-1.0, nodes[0].clone()), (1.0, nodes[1].clone())];
        let others = [Point::new(150.0, 0.0), Point::new(150.0, 100.0)];
        let reaction = place(&map, &info, &PathwayOptions::default(), &others).unwrap();

        let mid = reaction.mid_marker().position.unwrap();
        assert!((mid.x - 150.0).abs() < 1e-9);
        assert!((mid.y + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_side_metabolites_are_skipped() {
        let (map, nodes) = map_with(&[
            Point::new(0.0, 0.0),
            Point::new(0.0, 200.0),
            Point::new(300.0, 0.0),
        ]);
        let info = vec![
            (-1.0, nodes[0].clone()),
            (-1.0, nodes[1].clone()),
            (1.0, nodes[2].clone()),
        ];
        let reaction = place(&map, &info, &PathwayOptions::default(), &[]).unwrap();
        assert_eq!(reaction.angle(), 0.0);
    }

    #[test]
    fn test_one_resident_metabolite() {
        let (map, nodes) = map_with(&[Point::new(0.0, 0.0)]);
        let info = vec![
            (-1.0, nodes[0].clone()),
            (1.0, Node::metabolite("new_c", "New")),
        ];
        let err = place(&map, &info, &PathwayOptions::default(), &[]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::InsufficientBackboneNodes {
                reaction: "R1".to_string(),
                found: 1
            }
        );
    }

    #[test]
    fn test_all_resident_on_one_side() {
        let (map, nodes) = map_with(&[Point::new(0.0, 0.0), Point::new(300.0, 0.0)]);
        let info = vec![(1.0, nodes[0].clone()), (2.0, nodes[1].clone())];
        let err = place(&map, &info, &PathwayOptions::default(), &[]).unwrap_err();
        assert!(matches!(err, LayoutError::SameSideBackbone { .. }));
    }

    #[test]
    fn test_custom_placement() {
        fn at_minus(query: &MidMarkerQuery<'_>) -> Point {
            query.minus + Point::new(0.0, 10.0)
        }
        let pathway = PathwayOptions {
            placement: MidMarkerPlacement::Custom(at_minus),
            ..PathwayOptions::default()
        };
        let query = MidMarkerQuery {
            plus: Point::new(100.0, 0.0),
            minus: Point::new(0.0, 0.0),
            placed: &[],
            spacing: 100.0,
            centered: true,
        };
        assert_eq!(pathway.placement.position(&query), Point::new(0.0, 10.0));
    }
}

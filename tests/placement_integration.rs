//! Integration tests for metabolite placement and pathway placement

use std::f64::consts::PI;

use pathway_layout::layout::{
    place_reaction_on_backbone, PathwayOptions, PlacementOptions, Point, Side, SlotStrategy,
};
use pathway_layout::map::{AutoReaction, Map, MultiMarker, Node, ReactionOptions};

fn direct_options() -> ReactionOptions {
    ReactionOptions::new()
        .with_multi_marker(Side::Minus, MultiMarker::MidMarker)
        .with_multi_marker(Side::Plus, MultiMarker::MidMarker)
}

fn assert_deltas_apart(deltas: &[f64], min_distance: f64) {
    for (i, a) in deltas.iter().enumerate() {
        for b in &deltas[i + 1..] {
            assert!(
                (a - b).abs() >= min_distance,
                "deltas {a} and {b} are closer than {min_distance}"
            );
        }
    }
}

#[test]
fn test_two_node_backbone_scenario() {
    let mut map = Map::new("scenario", "");
    let a = map.add_node(Node::metabolite("a_c", "A").at(Point::new(0.0, 0.0)).primary(true));
    let b = map.add_node(Node::metabolite("b_c", "B").at(Point::new(100.0, 0.0)).primary(true));
    let info = vec![
        (-1.0, map.node(a).cloned().unwrap()),
        (1.0, map.node(b).cloned().unwrap()),
    ];

    let placement = PlacementOptions::default();
    let mut reaction = place_reaction_on_backbone(
        &map,
        "R1",
        &info,
        &PathwayOptions::default(),
        &placement,
        direct_options(),
        &[],
    )
    .unwrap();

    assert_eq!(reaction.angle(), 0.0);
    assert_eq!(reaction.mid_marker().position, Some(Point::new(50.0, 0.0)));
    assert!(reaction.used_deltas(Side::Minus)[0].abs() < 1e-12);

    reaction
        .add_metabolite(Node::metabolite("c_c", "C").primary(true), -1.0, None, &placement)
        .unwrap();
    let second = reaction.used_deltas(Side::Minus)[1];
    assert!(second < 0.0);
    assert!(second.abs() > 0.5 * 0.15 * PI && second.abs() <= 0.15 * PI);

    map.add_reaction(reaction).unwrap();
    assert_eq!(map.nodes().count(), 4);
    assert_eq!(map.segments().count(), 3);
}

#[test]
fn test_collision_avoidance_holds_per_side() {
    let placement = PlacementOptions::default();
    let mut reaction =
        AutoReaction::at("R1", Point::new(500.0, 500.0), 0.3, ReactionOptions::default()).unwrap();
    for i in 0..6 {
        for coefficient in [-1.0, 1.0] {
            let node = Node::metabolite(format!("m{i}_{coefficient}"), "M").primary(true);
            reaction
                .add_metabolite(node, coefficient, None, &placement)
                .unwrap();
        }
    }

    let min_distance = placement.collision_distance();
    assert_eq!(reaction.used_deltas(Side::Minus).len(), 6);
    assert_eq!(reaction.used_deltas(Side::Plus).len(), 6);
    assert_deltas_apart(reaction.used_deltas(Side::Minus), min_distance);
    assert_deltas_apart(reaction.used_deltas(Side::Plus), min_distance);
}

#[test]
fn test_same_side_strategy_keeps_one_side() {
    let placement = PlacementOptions::default().with_slot_strategy(SlotStrategy::SameSide {
        absolute_side: true,
    });
    let mut reaction =
        AutoReaction::at("R1", Point::new(0.0, 0.0), 0.0, direct_options()).unwrap();
    for i in 0..4 {
        let node = Node::metabolite(format!("m{i}"), "M").primary(true);
        reaction.add_metabolite(node, 1.0, None, &placement).unwrap();
    }

    let deltas = reaction.used_deltas(Side::Plus);
    assert!(deltas[0].abs() < 1e-12);
    assert!(deltas[1..].iter().all(|d| *d > 0.0));
    assert_deltas_apart(deltas, placement.collision_distance());
}

#[test]
fn test_custom_slot_strategy() {
    fn straight(_: &pathway_layout::layout::SlotQuery) -> pathway_layout::layout::Slot {
        pathway_layout::layout::Slot {
            rank: 0.0,
            positive: true,
            delta: 0.0,
        }
    }
    let placement = PlacementOptions::default()
        .with_slot_strategy(SlotStrategy::Custom(straight))
        .with_delta_tolerance(0.0);
    let mut reaction =
        AutoReaction::at("R1", Point::new(0.0, 0.0), 0.0, direct_options()).unwrap();
    let first = reaction
        .add_metabolite(Node::metabolite("a", "A").primary(true), 1.0, None, &placement)
        .unwrap();
    let second = reaction
        .add_metabolite(Node::metabolite("b", "B").primary(true), 1.0, None, &placement)
        .unwrap();

    assert_eq!(
        reaction.node(first).position,
        reaction.node(second).position
    );
}

#[test]
fn test_label_is_computed_once() {
    let placement = PlacementOptions::default();
    let mut map = Map::new("labels", "");

    let mut first =
        AutoReaction::at("R1", Point::new(0.0, 0.0), 0.0, direct_options()).unwrap();
    let staged = first
        .add_metabolite(Node::metabolite("atp_c", "ATP").primary(true), 1.0, None, &placement)
        .unwrap();
    let label = first.node(staged).as_metabolite().unwrap().label;
    map.add_reaction(first).unwrap();

    let (id, shared) = map
        .nodes()
        .find(|(_, node)| node.bigg_id() == Some("atp_c"))
        .map(|(id, node)| (id, node.clone()))
        .unwrap();

    let mut second =
        AutoReaction::at("R2", Point::new(150.0, 300.0), PI, direct_options()).unwrap();
    second.add_metabolite(shared, -1.0, None, &placement).unwrap();
    map.add_reaction(second).unwrap();

    assert!(label.is_some());
    assert_eq!(map.node(id).unwrap().as_metabolite().unwrap().label, label);
}

#[test]
fn test_failed_reaction_leaves_map_untouched() {
    let placement = PlacementOptions::default();
    let mut map = Map::new("atomic", "");
    let resident = map.add_node(Node::metabolite("a", "A").at(Point::new(0.0, 0.0)));
    let node = map.node(resident).cloned().unwrap();

    let mut reaction =
        AutoReaction::at("R1", Point::new(0.0, 0.0), 0.0, direct_options()).unwrap();
    let err = reaction.add_metabolite(node, 1.0, None, &placement).unwrap_err();

    assert_eq!(err.reaction(), "R1");
    assert_eq!(map.nodes().count(), 1);
    assert_eq!(map.reactions().count(), 0);
}

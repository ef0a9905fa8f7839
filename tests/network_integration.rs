//! Integration tests for laying out whole networks

use pathway_layout::layout::{LayoutError, Point};
use pathway_layout::map::Map;
use pathway_layout::{layout_json, layout_with_config, Error, LayoutConfig, NetworkLayout};

const TOLERANCE: f64 = 1e-9;

fn two_metabolites(reactions: &str) -> String {
    format!(
        r#"{{
            "name": "upper glycolysis",
            "metabolites": [
                {{"id": "1", "bigg_id": "glc__D_c", "name": "D-Glucose", "x": 0.0, "y": 0.0}},
                {{"id": "2", "bigg_id": "g6p_c", "x": 600.0, "y": 0.0}}
            ],
            "reactions": [{reactions}]
        }}"#
    )
}

fn hexokinase(lines: &str) -> String {
    format!(
        r#"{{
            "bigg_id": "HEX1",
            "name": "hexokinase",
            "reversibility": false,
            "metabolites": [
                {{"metabolite": "1", "coefficient": -1}},
                {{"metabolite": "2", "coefficient": 1}}
            ],
            "lines": {lines}
        }}"#
    )
}

fn point_of(map: &Map, id: pathway_layout::map::NodeId) -> Point {
    map.node(id).unwrap().position.unwrap()
}

fn markers(layout: &NetworkLayout, bigg_id: &str) -> (Point, Point, Point) {
    let (_, id) = layout
        .reactions
        .iter()
        .find(|(name, _)| name == bigg_id)
        .unwrap();
    let reaction = layout.map.reaction(*id).unwrap();
    (
        point_of(&layout.map, reaction.mid_marker),
        point_of(&layout.map, reaction.multi_markers.minus.unwrap()),
        point_of(&layout.map, reaction.multi_markers.plus.unwrap()),
    )
}

#[test]
fn test_layout_json_produces_escher_map() {
    let source = two_metabolites(&hexokinase(r#"[[{"x": 0, "y": 0}, {"x": 600, "y": 0}]]"#));
    let escher = layout_json(&source).unwrap();

    assert_eq!(escher.header().map_name, "upper glycolysis");
    let body = escher.body();
    assert_eq!(body.reactions.len(), 1);
    // two metabolites, the mid-marker and two multi-markers
    assert_eq!(body.nodes.len(), 5);

    let record = body.reactions.values().next().unwrap();
    assert_eq!(record.bigg_id, "HEX1");
    assert!(!record.reversibility);
    assert_eq!(record.segments.len(), 4);
}

#[test]
fn test_disjoint_lines_fall_back_to_first_line() {
    let lines = r#"[
        [{"x": 0, "y": 0}, {"x": 600, "y": 0}],
        [{"x": 0, "y": 300}, {"x": 600, "y": 300}]
    ]"#;
    let layout =
        layout_with_config(&two_metabolites(&hexokinase(lines)), &LayoutConfig::default()).unwrap();

    assert_eq!(
        layout.issues,
        vec![LayoutError::NoBackboneOverlap {
            reaction: "HEX1".to_string()
        }]
    );
    assert!(layout.skipped.is_empty());
    let (mid, _, _) = markers(&layout, "HEX1");
    assert!(mid.distance(Point::new(300.0, 0.0)) < TOLERANCE);
}

#[test]
fn test_reversed_drawing_is_flipped() {
    let lines = r#"[[{"x": 600, "y": 0}, {"x": 0, "y": 0}]]"#;
    let layout =
        layout_with_config(&two_metabolites(&hexokinase(lines)), &LayoutConfig::default()).unwrap();

    let (mid, minus, plus) = markers(&layout, "HEX1");
    assert!(mid.distance(Point::new(300.0, 0.0)) < TOLERANCE);
    assert!(minus.x < mid.x);
    assert!(plus.x > mid.x);
}

#[test]
fn test_unit_from_toml_config() {
    let config = LayoutConfig::from_toml("unit = 40.0\ncanvas_margin = 10.0").unwrap();
    let source = two_metabolites(&hexokinase(r#"[[{"x": 0, "y": 0}, {"x": 600, "y": 0}]]"#));
    let layout = layout_with_config(&source, &config).unwrap();

    let (mid, minus, plus) = markers(&layout, "HEX1");
    assert!((mid.distance(minus) - 40.0).abs() < TOLERANCE);
    assert!((mid.distance(plus) - 40.0).abs() < TOLERANCE);
    assert!((layout.map.canvas.x + 10.0).abs() < TOLERANCE);
}

#[test]
fn test_parallel_reactions_keep_apart() {
    let undrawn = |bigg_id: &str| {
        format!(
            r#"{{
                "bigg_id": "{bigg_id}",
                "metabolites": [
                    {{"metabolite": "1", "coefficient": -1}},
                    {{"metabolite": "2", "coefficient": 1}}
                ]
            }}"#
        )
    };
    let source = two_metabolites(&format!("{}, {}", undrawn("R1"), undrawn("R2")));
    let layout = layout_with_config(&source, &LayoutConfig::default()).unwrap();

    let (first, _, _) = markers(&layout, "R1");
    let (second, _, _) = markers(&layout, "R2");
    assert!(first.distance(Point::new(300.0, 0.0)) < TOLERANCE);
    assert!((first.distance(second) - 100.0).abs() < TOLERANCE);
    assert!((second.x - 300.0).abs() < TOLERANCE);
}

#[test]
fn test_invalid_input_is_rejected() {
    let err = layout_with_config("{\"name\": 1}", &LayoutConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Input(_)));
}

//! Configuration for the layout engine
//!
//! Every section can be loaded from TOML. Missing keys keep their defaults,
//! so a configuration file only needs to name what it changes:
//!
//! ```toml
//! unit = 40.0
//!
//! [placement]
//! delta = 0.5
//! slot_strategy = { kind = "same_side", absolute_side = true }
//!
//! [pathway]
//! spacing = 150.0
//! ```

use std::f64::consts::PI;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::types::{Point, Side};

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read layout configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse layout configuration TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One candidate angular slot for a metabolite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Distance rank of the slot; drives the non-primary length
    pub rank: f64,
    /// Whether the slot turns to the positive side of the axis
    pub positive: bool,
    /// Angular offset from the reaction axis
    pub delta: f64,
}

/// What a slot strategy gets to see
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotQuery {
    /// Attempt number, starting at 0
    pub index: usize,
    /// Base angular step
    pub delta: f64,
    /// Side of the metabolite being placed
    pub side: Side,
    /// Principal axis of the reaction
    pub axis_angle: f64,
}

pub type SlotFn = fn(&SlotQuery) -> Slot;

/// How candidate slots are enumerated
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotStrategy {
    /// Straight ahead first, then alternate sides, moving one step further
    /// out every two slots
    #[default]
    AlternatingSides,
    /// Keep every metabolite on one visual side of the axis
    SameSide {
        #[serde(default)]
        absolute_side: bool,
    },
    #[serde(skip)]
    Custom(SlotFn),
}

/// Length multiplier for non-primary metabolites, by slot rank
///
/// Decreases from 0.8 at rank 1 to 0.5 at rank 6 and stays there.
pub fn non_primary_scaling(rank: f64) -> f64 {
    (1.0 - (rank - 1.0).min(5.0) / 5.0) * 0.3 + 0.5
}

/// Distance of a metabolite label from its node, by approximate label width
pub fn default_text_offset(width: f64) -> f64 {
    20.0 + width * 12.0
}

/// Options for placing metabolites around a reaction
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlacementOptions {
    /// Base angular step between slots (radians)
    pub delta: f64,
    /// Fraction of `delta` two effective deltas must be apart
    pub delta_tolerance: f64,
    /// Radius of placed metabolites, in units
    pub scale: f64,
    /// Control point distance near the reference node, relative to the radius
    pub b1_scale: f64,
    /// Control point distance near the metabolite, relative to the radius
    pub b2_scale: f64,
    /// Vertical correction applied to metabolite labels
    pub text_y_correction: f64,
    /// Number of slots tried before giving up on avoiding collisions
    pub max_attempts: usize,
    pub slot_strategy: SlotStrategy,
    #[serde(skip)]
    pub non_primary_length: fn(f64) -> f64,
    #[serde(skip)]
    pub text_offset: fn(f64) -> f64,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            delta: 0.15 * PI,
            delta_tolerance: 0.5,
            scale: 3.0,
            b1_scale: 0.3,
            b2_scale: 0.8,
            text_y_correction: 6.0,
            max_attempts: 10,
            slot_strategy: SlotStrategy::AlternatingSides,
            non_primary_length: non_primary_scaling,
            text_offset: default_text_offset,
        }
    }
}

impl PlacementOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_delta_tolerance(mut self, tolerance: f64) -> Self {
        self.delta_tolerance = tolerance;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_slot_strategy(mut self, strategy: SlotStrategy) -> Self {
        self.slot_strategy = strategy;
        self
    }

    pub fn with_text_offset(mut self, text_offset: fn(f64) -> f64) -> Self {
        self.text_offset = text_offset;
        self
    }

    pub fn with_non_primary_length(mut self, length: fn(f64) -> f64) -> Self {
        self.non_primary_length = length;
        self
    }

    /// Smallest allowed distance between two effective deltas of one side
    pub fn collision_distance(&self) -> f64 {
        self.delta_tolerance * self.delta
    }
}

/// How the representative edge of a backbone chain is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMetric {
    /// True squared length
    #[default]
    Squared,
    /// `dx² + dy` with an unsquared height term, as older saved layouts used
    Legacy,
}

impl EdgeMetric {
    pub fn measure(self, from: Point, to: Point) -> f64 {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        match self {
            EdgeMetric::Squared => dx * dx + dy * dy,
            EdgeMetric::Legacy => dx * dx + dy,
        }
    }
}

/// Options for deriving a reaction backbone from drawn polylines
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackboneOptions {
    /// Radius around the first drawn point that detects a reversed drawing,
    /// before multiplying by the coordinate scale factor
    pub flip_radius: f64,
    pub edge_metric: EdgeMetric,
}

impl Default for BackboneOptions {
    fn default() -> Self {
        Self {
            flip_radius: 25.0,
            edge_metric: EdgeMetric::Squared,
        }
    }
}

/// What a mid-marker placement function gets to see
#[derive(Debug, Clone, Copy)]
pub struct MidMarkerQuery<'a> {
    pub plus: Point,
    pub minus: Point,
    /// Mid-markers placed so far
    pub placed: &'a [Point],
    pub spacing: f64,
    pub centered: bool,
}

pub type MidMarkerFn = fn(&MidMarkerQuery<'_>) -> Point;

/// How a mid-marker is positioned between two backbone metabolites
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidMarkerPlacement {
    /// Walk the perpendicular bisector, alternating sides
    #[default]
    AlternatingSides,
    #[serde(skip)]
    Custom(MidMarkerFn),
}

/// Options for placing reactions between already placed metabolites
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathwayOptions {
    /// Minimum distance between mid-markers
    pub spacing: f64,
    /// Start on the connecting line instead of half a spacing beside it
    pub centered: bool,
    pub placement: MidMarkerPlacement,
}

impl Default for PathwayOptions {
    fn default() -> Self {
        Self {
            spacing: 100.0,
            centered: true,
            placement: MidMarkerPlacement::AlternatingSides,
        }
    }
}

impl PathwayOptions {
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }
}

/// Configuration options for layout computation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Length unit of every reaction
    pub unit: f64,
    /// Margin added around the nodes when fitting the canvas
    pub canvas_margin: f64,
    pub placement: PlacementOptions,
    pub backbone: BackboneOptions,
    pub pathway: PathwayOptions,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            unit: 50.0,
            canvas_margin: 100.0,
            placement: PlacementOptions::default(),
            backbone: BackboneOptions::default(),
            pathway: PathwayOptions::default(),
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_unit(mut self, unit: f64) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_canvas_margin(mut self, margin: f64) -> Self {
        self.canvas_margin = margin;
        self
    }

    pub fn with_placement(mut self, placement: PlacementOptions) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_backbone(mut self, backbone: BackboneOptions) -> Self {
        self.backbone = backbone;
        self
    }

    pub fn with_pathway(mut self, pathway: PathwayOptions) -> Self {
        self.pathway = pathway;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.unit, 50.0);
        assert_eq!(config.canvas_margin, 100.0);
        assert!((config.placement.delta - 0.15 * PI).abs() < 1e-12);
        assert_eq!(config.placement.delta_tolerance, 0.5);
        assert_eq!(config.placement.scale, 3.0);
        assert_eq!(config.placement.b1_scale, 0.3);
        assert_eq!(config.placement.b2_scale, 0.8);
        assert_eq!(config.placement.max_attempts, 10);
        assert_eq!(config.backbone.flip_radius, 25.0);
        assert_eq!(config.pathway.spacing, 100.0);
        assert!(config.pathway.centered);
    }

    #[test]
    fn test_builder_pattern() {
        let config = LayoutConfig::new()
            .with_unit(40.0)
            .with_pathway(PathwayOptions::default().with_spacing(200.0));
        assert_eq!(config.unit, 40.0);
        assert_eq!(config.pathway.spacing, 200.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LayoutConfig::from_toml(
            r#"
            unit = 40.0

            [placement]
            delta = 0.5
            slot_strategy = { kind = "same_side", absolute_side = true }

            [backbone]
            edge_metric = "legacy"
            "#,
        )
        .unwrap();

        assert_eq!(config.unit, 40.0);
        assert_eq!(config.placement.delta, 0.5);
        assert_eq!(config.placement.scale, 3.0);
        assert!(matches!(
            config.placement.slot_strategy,
            SlotStrategy::SameSide {
                absolute_side: true
            }
        ));
        assert_eq!(config.backbone.edge_metric, EdgeMetric::Legacy);
        assert_eq!(config.pathway.spacing, 100.0);
        assert_eq!((config.placement.text_offset)(1.0), 32.0);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = LayoutConfig::from_toml("unit = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_non_primary_scaling_decreases_to_half() {
        assert!((non_primary_scaling(1.0) - 0.8).abs() < 1e-12);
        assert!(non_primary_scaling(2.0) < non_primary_scaling(1.0));
        assert!((non_primary_scaling(6.0) - 0.5).abs() < 1e-12);
        assert!((non_primary_scaling(9.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_edge_metrics() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(EdgeMetric::Squared.measure(a, b), 25.0);
        assert_eq!(EdgeMetric::Legacy.measure(a, b), 13.0);
    }
}

//! Layout engine for reaction diagrams
//!
//! Two algorithms live here: placing metabolites around a reaction
//! ([`AutoReaction::add_metabolite`](crate::map::AutoReaction::add_metabolite))
//! and deriving a reaction axis, either from drawn polylines
//! ([`extract_backbone`]) or from two metabolites already on the map
//! ([`place_reaction_on_backbone`]).

pub mod backbone;
pub mod config;
pub mod error;
pub mod geometry;
pub mod pathway;
pub mod placement;
pub mod types;

pub use backbone::{extract_backbone, Backbone};
pub use config::{
    BackboneOptions, ConfigError, EdgeMetric, LayoutConfig, MidMarkerPlacement, MidMarkerQuery,
    PathwayOptions, PlacementOptions, Slot, SlotQuery, SlotStrategy,
};
pub use error::LayoutError;
pub use pathway::{alternating_pathway_sides, place_reaction_on_backbone};
pub use placement::{Controls, Placement};
pub use types::*;

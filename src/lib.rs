//! Pathway Layout - automatic layout of biochemical reaction diagrams
//!
//! This library lays out reaction networks as Escher maps: every reaction
//! gets an axis and a mid-marker, every metabolite a position, a curved
//! connector and a label.
//!
//! # Example
//!
//! ```rust
//! use pathway_layout::layout::{PlacementOptions, Point};
//! use pathway_layout::map::{AutoReaction, Map, Node, ReactionOptions};
//!
//! let mut map = Map::new("example", "");
//! let options = PlacementOptions::default();
//! let mut reaction =
//!     AutoReaction::at("PGI", Point::new(0.0, 0.0), 0.0, ReactionOptions::default()).unwrap();
//! reaction
//!     .add_metabolite(Node::metabolite("g6p_c", "G6P").primary(true), -1.0, None, &options)
//!     .unwrap();
//! reaction
//!     .add_metabolite(Node::metabolite("f6p_c", "F6P").primary(true), 1.0, None, &options)
//!     .unwrap();
//! map.add_reaction(reaction).unwrap();
//!
//! let json = map.to_escher().to_json().unwrap();
//! assert!(json.starts_with(r#"[{"map_name":"example""#));
//! ```

pub mod escher;
pub mod layout;
pub mod map;
pub mod network;
pub mod template;

pub use escher::{EscherError, EscherMap};
pub use layout::{ConfigError, LayoutConfig, LayoutError};
pub use map::Map;
pub use network::{layout_network, NetworkInput, NetworkLayout};
pub use template::{load_as_template, Template};

use thiserror::Error;

/// Errors that can occur anywhere in the layout pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// A reaction could not be laid out
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// An Escher document could not be read
    #[error("escher error: {0}")]
    Escher(#[from] EscherError),

    /// The layout configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The network description is not valid JSON
    #[error("invalid network description: {0}")]
    Input(#[from] serde_json::Error),
}

/// Lay out a network description (JSON) with the default configuration
///
/// Reactions that cannot be laid out are left out of the returned map; use
/// [`layout_with_config`] to find out which.
///
/// # Example
///
/// ```rust
/// use pathway_layout::layout_json;
///
/// let escher = layout_json(r#"{"name": "empty", "metabolites": [], "reactions": []}"#).unwrap();
/// assert_eq!(escher.header().map_name, "empty");
/// ```
pub fn layout_json(source: &str) -> Result<EscherMap, Error> {
    let result = layout_with_config(source, &LayoutConfig::default())?;
    Ok(result.map.to_escher())
}

/// Lay out a network description (JSON) with a custom configuration
pub fn layout_with_config(source: &str, config: &LayoutConfig) -> Result<NetworkLayout, Error> {
    let input: NetworkInput = serde_json::from_str(source)?;
    Ok(layout_network(&input, config))
}

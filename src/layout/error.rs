//! Error types for the layout engine

use thiserror::Error;

use crate::map::NodeId;

/// Errors that can occur while laying out a single reaction
///
/// Every variant names the reaction it belongs to, so a caller laying out a
/// whole network can skip the reaction and continue with the next one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A node coincides with its reference node, so no direction exists
    #[error("degenerate geometry in reaction '{reaction}': {reason}")]
    DegenerateGeometry { reaction: String, reason: String },

    /// Fewer than two metabolites of the reaction are already on the map
    #[error(
        "reaction '{reaction}' needs two metabolite nodes already on the map, found {found}"
    )]
    InsufficientBackboneNodes { reaction: String, found: usize },

    /// The two backbone metabolites sit on the same stoichiometric side
    #[error("backbone nodes of reaction '{reaction}' are on the same side of the reaction")]
    SameSideBackbone { reaction: String },

    /// Redundant polylines of a reaction do not overlap; the first one is used
    #[error("no overlapping line found for reaction '{reaction}'")]
    NoBackboneOverlap { reaction: String },

    /// The reaction has no drawn polyline to derive a backbone from
    #[error("reaction '{reaction}' has no polyline data")]
    NoBackboneData { reaction: String },

    /// A node that must have a position does not have one
    #[error("{role} of reaction '{reaction}' has no position")]
    UnplacedNode { reaction: String, role: &'static str },

    /// A node carries an identifier that is not registered in the target map
    #[error("node {node} of reaction '{reaction}' is not registered in this map")]
    UnregisteredNode { reaction: String, node: NodeId },

    /// A reaction refers to a metabolite that was never supplied
    #[error("reaction '{reaction}' refers to unknown metabolite '{metabolite}'")]
    UnknownMetabolite { reaction: String, metabolite: String },
}

impl LayoutError {
    /// Create a degenerate geometry error
    pub fn degenerate(reaction: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            reaction: reaction.into(),
            reason: reason.into(),
        }
    }

    /// Create an unplaced node error
    pub fn unplaced(reaction: impl Into<String>, role: &'static str) -> Self {
        Self::UnplacedNode {
            reaction: reaction.into(),
            role,
        }
    }

    /// Identifier of the reaction the error belongs to
    pub fn reaction(&self) -> &str {
        match self {
            Self::DegenerateGeometry { reaction, .. }
            | Self::InsufficientBackboneNodes { reaction, .. }
            | Self::SameSideBackbone { reaction }
            | Self::NoBackboneOverlap { reaction }
            | Self::NoBackboneData { reaction }
            | Self::UnplacedNode { reaction, .. }
            | Self::UnregisteredNode { reaction, .. }
            | Self::UnknownMetabolite { reaction, .. } => reaction,
        }
    }
}

//! Metabolite placement around a reaction
//!
//! Each metabolite gets a position on a circle around the reference node of
//! its side (the side's multi-marker, or the mid-marker), a cubic bezier
//! connector and a label anchor. Candidate angles come from a
//! [`SlotStrategy`]; a candidate is rejected when its *effective* angular
//! delta, read off the bezier curve near the reference node, comes too close
//! to a delta already used on the same side.
//!
//! The control point near the reference node always points along the
//! reaction axis while the one near the metabolite points along the slot
//! angle. That asymmetry is what bends the connectors, and it is also why the
//! effective delta differs from the slot's raw delta.

use std::f64::consts::PI;

use tracing::debug;

use crate::map::{AutoReaction, Node, StagedNode};

use super::config::{PlacementOptions, Slot, SlotQuery, SlotStrategy};
use super::error::LayoutError;
use super::geometry::{cubic_bezier_point, normalize_angle};
use super::types::{Point, Side};

/// Explicit bezier control points: near the reference node, near the metabolite
pub type Controls = (Option<Point>, Option<Point>);

impl SlotStrategy {
    /// Candidate slot for attempt `query.index`
    pub fn slot(&self, query: &SlotQuery) -> Slot {
        match self {
            SlotStrategy::AlternatingSides => alternating_sides(query),
            SlotStrategy::SameSide { absolute_side } => same_side(query, *absolute_side),
            SlotStrategy::Custom(slot_fn) => slot_fn(query),
        }
    }
}

/// 0, -δ, +δ, -2δ, +2δ, ...
fn alternating_sides(query: &SlotQuery) -> Slot {
    let shifted = query.index as i64 - 1;
    let rank = 1 + shifted.div_euclid(2);
    let positive = shifted.rem_euclid(2) == 1;
    let magnitude = rank as f64 * query.delta;
    Slot {
        rank: rank as f64,
        positive,
        delta: if positive { magnitude } else { -magnitude },
    }
}

/// 0, δ, 2δ, ... all turning towards one visual side
fn same_side(query: &SlotQuery, absolute_side: bool) -> Slot {
    let mut positive = absolute_side == query.side.is_plus();
    if query.axis_angle.rem_euclid(2.0 * PI) > PI {
        positive = !positive;
    }
    let rank = query.index as f64;
    let magnitude = rank * query.delta;
    Slot {
        rank,
        positive,
        delta: if positive { magnitude } else { -magnitude },
    }
}

/// Outcome of placing one metabolite candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point,
    /// Distance from the reference node, in units
    pub size: f64,
    pub b1: Option<Point>,
    pub b2: Option<Point>,
    /// Angle of the connector as seen from the reference node, relative to
    /// the reaction axis and normalized into `[-π, π]`
    pub effective_delta: f64,
}

impl AutoReaction {
    /// Compute the placement of `node` for one candidate slot
    ///
    /// Nodes without a position are put on the slot's angle at the configured
    /// radius; nodes with a position stay where they are and only their
    /// radius is measured.
    pub fn calculate_placement(
        &self,
        reference: Point,
        node: &Node,
        side: Side,
        slot: Slot,
        controls: Option<Controls>,
        options: &PlacementOptions,
    ) -> Result<Placement, LayoutError> {
        let angle = self.angle + slot.delta;
        let outward = side.axis_offset();

        let (position, size) = match node.position {
            None => {
                let mut size = options.scale;
                if !node.is_primary() {
                    size *= (options.non_primary_length)(slot.rank);
                }
                let position = reference.polar_offset(self.unit * size, angle + outward);
                (position, size)
            }
            Some(position) => (position, reference.distance(position) / self.unit),
        };
        if !(size > 0.0 && size.is_finite()) {
            return Err(LayoutError::degenerate(
                self.bigg_id.clone(),
                format!(
                    "metabolite '{}' has no usable distance to its reference node (size {size})",
                    node.bigg_id().unwrap_or("?")
                ),
            ));
        }

        let (b1, b2) = controls.unwrap_or_else(|| {
            let b2 = position.polar_offset(
                self.unit * (1.0 - options.b2_scale) * size,
                angle + outward + PI,
            );
            let b1 = reference.polar_offset(self.unit * options.b1_scale * size, self.angle + outward);
            (Some(b1), Some(b2))
        });

        let t = (1.5 / size).min(1.0);
        let near_reference = cubic_bezier_point(
            t,
            reference,
            b1.unwrap_or(reference),
            b2.unwrap_or(position),
            position,
        );
        let effective_delta =
            normalize_angle(reference.angle_to(near_reference) - self.angle + outward);

        Ok(Placement {
            position,
            size,
            b1,
            b2,
            effective_delta,
        })
    }

    /// Place a metabolite and connect it to the reaction
    ///
    /// A node that already has a position and comes with explicit control
    /// points is taken as is; otherwise up to `max_attempts` slots are tried
    /// and the first one that does not collide with a previously used delta
    /// on the same side wins (the last candidate if all collide).
    pub fn add_metabolite(
        &mut self,
        mut node: Node,
        coefficient: f64,
        controls: Option<Controls>,
        options: &PlacementOptions,
    ) -> Result<StagedNode, LayoutError> {
        let side = Side::of(coefficient);
        let reference_slot = self.reference(side);
        let reference = self
            .node(reference_slot)
            .position
            .ok_or_else(|| LayoutError::unplaced(self.bigg_id.clone(), "reference node"))?;

        let (placement, positive) = match (node.position, controls) {
            (Some(_), Some(_)) => {
                let fixed = Slot {
                    rank: 0.0,
                    positive: false,
                    delta: 0.0,
                };
                let placement =
                    self.calculate_placement(reference, &node, side, fixed, controls, options)?;
                (placement, placement.effective_delta >= 0.0)
            }
            _ => self.search_slot(reference, &node, side, controls, options)?,
        };

        self.used_deltas
            .get_mut(side)
            .push(placement.effective_delta);
        node.position = Some(placement.position);

        let angle = self.angle;
        if let Some(metabolite) = node.as_metabolite_mut() {
            if metabolite.label.is_none() {
                // labels lean away from the axis, towards the side the curve bends to
                let normal = if positive == side.is_plus() {
                    0.5 * PI
                } else {
                    -0.5 * PI
                };
                let perpendicular = angle + normal;
                let leftward = -perpendicular.cos().min(0.0);
                let width = leftward * metabolite.bigg_id.chars().count() as f64;
                let offset = (options.text_offset)(width);
                let anchor = placement.position.polar_offset(offset, perpendicular);
                metabolite.label = Some(Point::new(anchor.x, anchor.y + options.text_y_correction));
            }
        }

        let staged = self.stage(node);
        self.metabolites.push((coefficient, staged));
        match side {
            Side::Plus => self.push_segment(reference_slot, staged, placement.b1, placement.b2),
            Side::Minus => self.push_segment(staged, reference_slot, placement.b2, placement.b1),
        }
        Ok(staged)
    }

    fn search_slot(
        &self,
        reference: Point,
        node: &Node,
        side: Side,
        controls: Option<Controls>,
        options: &PlacementOptions,
    ) -> Result<(Placement, bool), LayoutError> {
        let used = self.used_deltas.get(side);
        let mut index = 0;
        loop {
            let slot = options.slot_strategy.slot(&SlotQuery {
                index,
                delta: options.delta,
                side,
                axis_angle: self.angle,
            });
            let placement = self.calculate_placement(reference, node, side, slot, controls, options)?;
            let collides = used
                .iter()
                .any(|d| (d - placement.effective_delta).abs() < options.collision_distance());
            debug!(
                reaction = %self.bigg_id,
                metabolite = node.bigg_id().unwrap_or("?"),
                index,
                delta = slot.delta,
                effective_delta = placement.effective_delta,
                collides,
                "metabolite slot"
            );
            if !collides || index + 1 >= options.max_attempts {
                return Ok((placement, slot.positive));
            }
            index += 1;
        }
    }

    /// Place a metabolite previously kept aside as optional
    ///
    /// Returns `Ok(None)` when no optional metabolite has that identifier.
    pub fn include_optional(
        &mut self,
        bigg_id: &str,
        options: &PlacementOptions,
    ) -> Result<Option<StagedNode>, LayoutError> {
        let Some(optional) = self.optional_metabolites.get(bigg_id).cloned() else {
            return Ok(None);
        };
        let staged =
            self.add_metabolite(optional.node, optional.coefficient, optional.controls, options)?;
        self.optional_metabolites.remove(bigg_id);
        Ok(Some(staged))
    }
}

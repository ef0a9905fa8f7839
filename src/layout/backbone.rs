//! Backbone extraction from redundant drawn polylines
//!
//! A pathway diagram often draws one reaction several times, as polylines
//! made of horizontal and vertical pieces that partly overlap. The overlap of
//! all of them is taken as the reaction's backbone; its longest edge gives
//! the reaction axis and the position of the mid-marker.

use tracing::{debug, warn};

use super::config::BackboneOptions;
use super::error::LayoutError;
use super::geometry::{is_within, normalize_angle};
use super::types::Point;

/// The canonical line of one reaction
#[derive(Debug, Clone, PartialEq)]
pub struct Backbone {
    /// Axis angle, pointing from substrates to products
    pub angle: f64,
    /// Midpoint of the longest backbone edge
    pub midpoint: Point,
    /// Whether the drawing runs against the stoichiometry
    pub flipped: bool,
    /// The merged polyline the axis was taken from
    pub chain: Vec<Point>,
    /// Problems that were recovered from
    pub issues: Vec<LayoutError>,
}

/// Derive the backbone of a reaction from its drawn polylines
///
/// `metabolites` holds the coefficient and position of every participant;
/// it is only used to detect drawings that start at a product.
/// `scale_factor` is the factor the polyline coordinates were scaled by.
pub fn extract_backbone(
    reaction: &str,
    lines: &[Vec<Point>],
    metabolites: &[(f64, Point)],
    scale_factor: f64,
    options: &BackboneOptions,
) -> Result<Backbone, LayoutError> {
    let lines: Vec<&Vec<Point>> = lines.iter().filter(|line| line.len() >= 2).collect();
    let Some(first) = lines.first() else {
        return Err(LayoutError::NoBackboneData {
            reaction: reaction.to_string(),
        });
    };

    let start = first[0];
    let radius = options.flip_radius * scale_factor;
    let flipped = metabolites
        .iter()
        .find(|(_, position)| position.distance_squared(start) <= radius * radius)
        .is_some_and(|&(coefficient, _)| coefficient > 0.0);

    let mut issues = Vec::new();
    let mut chain = first.to_vec();
    for line in &lines[1..] {
        let segments = overlapping_segments(line, &chain);
        let chains = merge_segments(segments);
        debug!(
            reaction,
            segments = chains.iter().map(|c| c.len() - 1).sum::<usize>(),
            chains = chains.len(),
            "merged overlapping segments"
        );
        match longest_chain(chains) {
            Some(longest) => chain = longest,
            None => {
                warn!(reaction, "no overlapping line found, using the first drawn line");
                issues.push(LayoutError::NoBackboneOverlap {
                    reaction: reaction.to_string(),
                });
                chain = first.to_vec();
                break;
            }
        }
    }

    let (from, to) = longest_edge(&chain, options)
        .filter(|(from, to)| from != to)
        .ok_or_else(|| LayoutError::degenerate(reaction, "backbone has no extent"))?;

    let mut angle = from.angle_to(to);
    if flipped {
        angle = normalize_angle(angle + std::f64::consts::PI);
    }

    Ok(Backbone {
        angle,
        midpoint: from.midpoint(to),
        flipped,
        chain,
        issues,
    })
}

/// Pieces of `line` that run along `backbone`
///
/// Both polylines must consist of horizontal and vertical edges. Zero-length
/// pieces (edges that only touch at a corner) are dropped.
pub fn overlapping_segments(line: &[Point], backbone: &[Point]) -> Vec<(Point, Point)> {
    let mut segments = Vec::new();
    for edge in line.windows(2) {
        let (a1, a2) = (edge[0], edge[1]);
        for reference in backbone.windows(2) {
            let (b1, b2) = (reference[0], reference[1]);
            let overlap = if is_within(a1, b1, b2) {
                if is_within(a2, b1, b2) {
                    Some((a1, a2))
                } else if is_within(b1, a1, a2) {
                    Some((a1, b1))
                } else if is_within(b2, a1, a2) {
                    Some((a1, b2))
                } else {
                    None
                }
            } else if is_within(a2, b1, b2) {
                if is_within(b1, a1, a2) {
                    Some((a2, b1))
                } else if is_within(b2, a1, a2) {
                    Some((a2, b2))
                } else {
                    None
                }
            } else if is_within(b1, a1, a2) && is_within(b2, a1, a2) {
                Some((b1, b2))
            } else {
                None
            };

            if let Some((p, q)) = overlap {
                let duplicate = segments
                    .iter()
                    .any(|&(s, t)| (s == p && t == q) || (s == q && t == p));
                if p != q && !duplicate {
                    segments.push((p, q));
                }
            }
        }
    }
    segments
}

/// Join segments that share endpoints into polylines
///
/// Segments are attached to either end of an existing chain; chains that end
/// up sharing an endpoint are joined afterwards, so the result does not
/// depend on the order the segments come in.
/// A point where a chain runs straight on is dropped, so straight runs end up as a
/// single edge.
pub fn merge_segments(segments: Vec<(Point, Point)>) -> Vec<Vec<Point>> {
    let mut chains: Vec<Vec<Point>> = Vec::new();

    for (p, q) in segments {
        let attached = chains.iter_mut().any(|chain| attach(chain, p, q));
        if !attached {
            chains.push(vec![p, q]);
        }
    }

    while let Some((i, j)) = find_joinable(&chains) {
        let other = chains.remove(j);
        join(&mut chains[i], other);
    }

    chains
}

fn attach(chain: &mut Vec<Point>, p: Point, q: Point) -> bool {
    let front = chain[0];
    let back = chain[chain.len() - 1];
    if front == p || front == q {
        chain.insert(0, if front == p { q } else { p });
        straighten(chain, 1);
    } else if back == p || back == q {
        chain.push(if back == p { q } else { p });
        let joint = chain.len() - 2;
        straighten(chain, joint);
    } else {
        return false;
    }
    true
}

/// Drop the point at `joint` when the chain runs straight through it
fn straighten(chain: &mut Vec<Point>, joint: usize) {
    if joint == 0 || joint + 1 >= chain.len() {
        return;
    }
    if is_within(chain[joint], chain[joint - 1], chain[joint + 1]) {
        chain.remove(joint);
    }
}

fn find_joinable(chains: &[Vec<Point>]) -> Option<(usize, usize)> {
    for i in 0..chains.len() {
        for j in (i + 1)..chains.len() {
            let (a, b) = (&chains[i], &chains[j]);
            let a_ends = [a[0], a[a.len() - 1]];
            let b_ends = [b[0], b[b.len() - 1]];
            if a_ends.iter().any(|end| b_ends.contains(end)) {
                return Some((i, j));
            }
        }
    }
    None
}

fn join(chain: &mut Vec<Point>, mut other: Vec<Point>) {
    let back = chain[chain.len() - 1];
    let other_back = other[other.len() - 1];
    let joint;
    if back == other[0] {
        joint = chain.len() - 1;
        chain.extend_from_slice(&other[1..]);
    } else if back == other_back {
        joint = chain.len() - 1;
        other.pop();
        chain.extend(other.into_iter().rev());
    } else {
        // the other chain goes in front
        if chain[0] != other_back {
            other.reverse();
        }
        other.pop();
        joint = other.len();
        other.append(chain);
        *chain = other;
    }
    straighten(chain, joint);
}

fn chain_length(chain: &[Point]) -> f64 {
    chain.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// The longest chain by drawn length, the first one on ties
fn longest_chain(chains: Vec<Vec<Point>>) -> Option<Vec<Point>> {
    chains
        .into_iter()
        .fold(None, |best: Option<(f64, Vec<Point>)>, chain| {
            let length = chain_length(&chain);
            match best {
                Some((best_length, _)) if best_length >= length => best,
                _ => Some((length, chain)),
            }
        })
        .map(|(_, chain)| chain)
}

/// The longest edge of a polyline under the configured metric, the first one
/// on ties
fn longest_edge(chain: &[Point], options: &BackboneOptions) -> Option<(Point, Point)> {
    chain
        .windows(2)
        .fold(None, |best: Option<(f64, Point, Point)>, edge| {
            let measure = options.edge_metric.measure(edge[0], edge[1]);
            match best {
                Some((best_measure, ..)) if best_measure >= measure => best,
                _ => Some((measure, edge[0], edge[1])),
            }
        })
        .map(|(_, from, to)| (from, to))
}

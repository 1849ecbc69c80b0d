//! Node-node repulsion, exact or Barnes-Hut approximated.

use crate::config::LayoutConfig;
use crate::quadtree::QuadTree;
use crate::store::NodeStore;

/// Flat multiplier for overlapping nodes in the anti-collision variant.
/// An inverse law would blow up as the gap between two circles crosses zero,
/// so near contact switches to a constant boost.
const NEAR_CONTACT_BOOST: f32 = 100.0;

/// Apply repulsion between node pairs: through the Barnes-Hut tree when one
/// is supplied, else exact O(n²) pairwise.
pub fn apply(nodes: &mut NodeStore, tree: Option<&QuadTree>, config: &LayoutConfig) {
    match tree {
        Some(tree) => barnes_hut(nodes, tree, config),
        None => pairwise(nodes, config),
    }
}

fn pairwise(nodes: &mut NodeStore, config: &LayoutConfig) {
    for n1 in 0..nodes.len() {
        for n2 in 0..n1 {
            node_node(nodes, n1, n2, config);
        }
    }
}

fn barnes_hut(nodes: &mut NodeStore, tree: &QuadTree, config: &LayoutConfig) {
    let theta = config.barnes_hut_theta;
    for n1 in 0..nodes.len() {
        let x = nodes.x(n1);
        let y = nodes.y(n1);
        let mass = nodes.mass(n1);
        tree.visit(|region| {
            if region.is_leaf() {
                if let Some(occupant) = region.node() {
                    // One-sided: the occupant's own traversal applies the
                    // equal and opposite share.
                    if occupant as usize != n1 {
                        if let Some((x_dist, y_dist, factor)) =
                            pair_factor(nodes, n1, occupant as usize, config)
                        {
                            nodes.add_dx(n1, x_dist * factor);
                            nodes.add_dy(n1, y_dist * factor);
                        }
                    }
                }
                return true;
            }

            let (mass_x, mass_y) = region.mass_center();
            let x_dist = x - mass_x;
            let y_dist = y - mass_y;
            let distance = (x_dist * x_dist + y_dist * y_dist).sqrt();
            // Far enough: the whole region acts as one pseudo-body at its
            // center of mass. Zero distance fails the test and descends.
            let apply_region = distance > 0.0 && region.size() / distance < theta;
            if apply_region {
                let factor =
                    config.scaling_ratio * mass * region.mass() / (distance * distance);
                nodes.add_dx(n1, x_dist * factor);
                nodes.add_dy(n1, y_dist * factor);
            }
            apply_region
        });
    }
}

/// Symmetric two-body repulsion for the exact pairwise path, which visits
/// each unordered pair once.
fn node_node(nodes: &mut NodeStore, n1: usize, n2: usize, config: &LayoutConfig) {
    if let Some((x_dist, y_dist, factor)) = pair_factor(nodes, n1, n2, config) {
        push_apart(nodes, n1, n2, x_dist, y_dist, factor);
    }
}

/// Distance vector and force factor for a node pair. `None` when the
/// direction is undefined (exact coincidence, or circle borders exactly
/// touching under `adjust_sizes`).
fn pair_factor(
    nodes: &NodeStore,
    n1: usize,
    n2: usize,
    config: &LayoutConfig,
) -> Option<(f32, f32, f32)> {
    let x_dist = nodes.x(n1) - nodes.x(n2);
    let y_dist = nodes.y(n1) - nodes.y(n2);
    let mass_coeff = config.scaling_ratio * nodes.mass(n1) * nodes.mass(n2);

    if config.adjust_sizes {
        // Anti-collision repulsion: distance between the circle borders.
        let distance =
            (x_dist * x_dist + y_dist * y_dist).sqrt() - nodes.size(n1) - nodes.size(n2);
        if distance > 0.0 {
            Some((x_dist, y_dist, mass_coeff / (distance * distance)))
        } else if distance < 0.0 {
            Some((x_dist, y_dist, NEAR_CONTACT_BOOST * mass_coeff))
        } else {
            None
        }
    } else {
        let distance_sq = x_dist * x_dist + y_dist * y_dist;
        if distance_sq > 0.0 {
            Some((x_dist, y_dist, mass_coeff / distance_sq))
        } else {
            None
        }
    }
}

#[inline]
fn push_apart(
    nodes: &mut NodeStore,
    n1: usize,
    n2: usize,
    x_dist: f32,
    y_dist: f32,
    factor: f32,
) {
    nodes.add_dx(n1, x_dist * factor);
    nodes.add_dy(n1, y_dist * factor);
    nodes.sub_dx(n2, x_dist * factor);
    nodes.sub_dy(n2, y_dist * factor);
}

//! Per-edge attraction between connected nodes.
//!
//! Three independent switches pick the formula: `lin_log_mode` swaps the
//! linear spring for `ln(1+d)/d`, `outbound_attraction_distribution` spreads
//! a node's pull across its edges (divide by source mass, scale by the mean
//! mass), and `adjust_sizes` measures the distance between circle borders
//! instead of centers. The applied force is always equal and opposite on the
//! two endpoints.

use crate::config::LayoutConfig;
use crate::store::{EdgeStore, NodeStore};

pub fn apply(nodes: &mut NodeStore, edges: &EdgeStore, config: &LayoutConfig) {
    let coefficient = if config.outbound_attraction_distribution {
        mean_mass(nodes)
    } else {
        1.0
    };

    for e in 0..edges.len() {
        let n1 = edges.source(e);
        let n2 = edges.target(e);
        let ewc = edges.weight(e).powf(config.edge_weight_influence);

        let x_dist = nodes.x(n1) - nodes.x(n2);
        let y_dist = nodes.y(n1) - nodes.y(n2);

        let factor = if config.adjust_sizes {
            let distance =
                (x_dist * x_dist + y_dist * y_dist).sqrt() - nodes.size(n1) - nodes.size(n2);
            if distance <= 0.0 {
                continue;
            }
            if config.lin_log_mode {
                -coefficient * ewc * (1.0 + distance).ln() / distance
            } else {
                -coefficient * ewc
            }
        } else if config.lin_log_mode {
            let distance = (x_dist * x_dist + y_dist * y_dist).sqrt();
            if distance <= 0.0 {
                continue;
            }
            -coefficient * ewc * (1.0 + distance).ln() / distance
        } else {
            // Pure Hookean spring: distance plays no role, always applies.
            -coefficient * ewc
        };

        let factor = if config.outbound_attraction_distribution {
            factor / nodes.mass(n1)
        } else {
            factor
        };

        nodes.add_dx(n1, x_dist * factor);
        nodes.add_dy(n1, y_dist * factor);
        nodes.sub_dx(n2, x_dist * factor);
        nodes.sub_dy(n2, y_dist * factor);
    }
}

fn mean_mass(nodes: &NodeStore) -> f32 {
    let mut total = 0.0;
    for n in 0..nodes.len() {
        total += nodes.mass(n);
    }
    total / nodes.len() as f32
}

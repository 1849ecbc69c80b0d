//! Adaptive integration: accumulated forces become position updates.
//!
//! Per node, `swing` measures how much the force direction oscillates against
//! the previous pass and `traction` how much of it is sustained; the ratio
//! shapes a per-node speed so well-settled nodes calm down while agitated
//! ones keep moving. Pinned nodes are skipped entirely.

use crate::config::LayoutConfig;
use crate::store::NodeStore;

/// Returns the system-wide `(swing, traction)` sums over unpinned nodes.
pub fn apply(nodes: &mut NodeStore, config: &LayoutConfig) -> (f32, f32) {
    let mut total_swing = 0.0;
    let mut total_traction = 0.0;

    if config.adjust_sizes {
        for n in 0..nodes.len() {
            if nodes.fixed(n) {
                continue;
            }
            // Clamp the force before the heuristics read it, so next pass's
            // old_dx/old_dy also hold the clamped value.
            let force = (nodes.dx(n) * nodes.dx(n) + nodes.dy(n) * nodes.dy(n)).sqrt();
            if force > config.max_force {
                let scale = config.max_force / force;
                nodes.set_dx(n, nodes.dx(n) * scale);
                nodes.set_dy(n, nodes.dy(n) * scale);
            }

            let swing = nodes.swing(n);
            let traction = nodes.traction(n);
            let speed = 0.1 * (1.0 + traction).ln() / (1.0 + swing.sqrt());

            nodes.set_x(n, nodes.x(n) + nodes.dx(n) * (speed / config.slow_down));
            nodes.set_y(n, nodes.y(n) + nodes.dy(n) * (speed / config.slow_down));

            total_swing += swing;
            total_traction += traction;
        }
    } else {
        for n in 0..nodes.len() {
            if nodes.fixed(n) {
                continue;
            }
            let swing = nodes.swing(n);
            let traction = nodes.traction(n);
            let speed = nodes.convergence(n) * (1.0 + traction).ln() / (1.0 + swing.sqrt());

            let force_sq = nodes.dx(n) * nodes.dx(n) + nodes.dy(n) * nodes.dy(n);
            nodes.set_convergence(
                n,
                (speed * force_sq / (1.0 + swing.sqrt())).sqrt().min(1.0),
            );

            nodes.set_x(n, nodes.x(n) + nodes.dx(n) * (speed / config.slow_down));
            nodes.set_y(n, nodes.y(n) + nodes.dy(n) * (speed / config.slow_down));

            total_swing += swing;
            total_traction += traction;
        }
    }

    (total_swing, total_traction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NODE_STRIDE;

    fn single_node(dx: f32, dy: f32) -> NodeStore {
        let mut buf = vec![0.0; NODE_STRIDE];
        buf[2] = dx;
        buf[3] = dy;
        buf[6] = 1.0;
        buf[7] = 1.0;
        NodeStore::new(buf).unwrap()
    }

    #[test]
    fn displacement_follows_the_adaptive_speed() {
        let mut nodes = single_node(3.0, 0.0);
        let (swing, traction) = apply(&mut nodes, &LayoutConfig::default());
        // old force is zero: swing = 3, traction = 1.5
        assert!((swing - 3.0).abs() < 1e-6);
        assert!((traction - 1.5).abs() < 1e-6);
        let speed = 1.0 * 2.5_f32.ln() / (1.0 + 3.0_f32.sqrt());
        assert!((nodes.x(0) - 3.0 * speed).abs() < 1e-5);
        assert_eq!(nodes.y(0), 0.0);
    }

    #[test]
    fn convergence_is_capped_at_one() {
        let mut nodes = single_node(50.0, 0.0);
        apply(&mut nodes, &LayoutConfig::default());
        assert!(nodes.convergence(0) <= 1.0);
        assert!(nodes.convergence(0) >= 0.0);
    }

    #[test]
    fn pinned_node_never_moves() {
        let mut nodes = single_node(100.0, 100.0);
        nodes.set_fixed(0, true);
        let (swing, traction) = apply(&mut nodes, &LayoutConfig::default());
        assert_eq!(nodes.x(0), 0.0);
        assert_eq!(nodes.y(0), 0.0);
        assert_eq!(swing, 0.0);
        assert_eq!(traction, 0.0);
    }

    #[test]
    fn adjust_sizes_clamps_the_force() {
        let mut nodes = single_node(100.0, 0.0);
        let config = LayoutConfig {
            adjust_sizes: true,
            ..LayoutConfig::default()
        };
        apply(&mut nodes, &config);
        // written back, so the next pass's reset sees the clamped force
        assert!((nodes.dx(0) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn slow_down_divides_the_step() {
        let mut fast = single_node(3.0, 0.0);
        let mut slow = single_node(3.0, 0.0);
        apply(&mut fast, &LayoutConfig::default());
        let config = LayoutConfig {
            slow_down: 10.0,
            ..LayoutConfig::default()
        };
        apply(&mut slow, &config);
        assert!((fast.x(0) - 10.0 * slow.x(0)).abs() < 1e-5);
    }
}

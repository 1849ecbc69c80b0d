//! Central gravity keeping disconnected components on screen.

use crate::config::LayoutConfig;
use crate::store::NodeStore;

/// Pull every node toward the origin. Strong gravity ignores distance; the
/// default form weakens with it. A node exactly at the origin is left alone.
pub fn apply(nodes: &mut NodeStore, config: &LayoutConfig) {
    let g = config.gravity / config.scaling_ratio;
    let coefficient = config.scaling_ratio;

    for n in 0..nodes.len() {
        let x = nodes.x(n);
        let y = nodes.y(n);
        let distance = (x * x + y * y).sqrt();
        if distance > 0.0 {
            let factor = if config.strong_gravity_mode {
                coefficient * nodes.mass(n) * g
            } else {
                coefficient * nodes.mass(n) * g / distance
            };
            nodes.sub_dx(n, x * factor);
            nodes.sub_dy(n, y * factor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NODE_STRIDE;

    fn single_node(x: f32, y: f32, mass: f32) -> NodeStore {
        let mut buf = vec![0.0; NODE_STRIDE];
        buf[0] = x;
        buf[1] = y;
        buf[6] = mass;
        buf[7] = 1.0;
        NodeStore::new(buf).unwrap()
    }

    #[test]
    fn pulls_toward_the_origin() {
        let mut nodes = single_node(10.0, 0.0, 2.0);
        apply(&mut nodes, &LayoutConfig::default());
        // factor = mass * gravity / distance = 0.2
        assert!((nodes.dx(0) + 2.0).abs() < 1e-6);
        assert_eq!(nodes.dy(0), 0.0);
    }

    #[test]
    fn strong_gravity_ignores_distance() {
        let mut nodes = single_node(10.0, 0.0, 2.0);
        let config = LayoutConfig {
            strong_gravity_mode: true,
            ..LayoutConfig::default()
        };
        apply(&mut nodes, &config);
        // factor = mass * gravity = 2, force = -x * factor
        assert!((nodes.dx(0) + 20.0).abs() < 1e-6);
    }

    #[test]
    fn node_at_the_origin_is_untouched() {
        let mut nodes = single_node(0.0, 0.0, 1.0);
        apply(&mut nodes, &LayoutConfig::default());
        assert_eq!(nodes.dx(0), 0.0);
        assert_eq!(nodes.dy(0), 0.0);
    }

    #[test]
    fn gravity_scales_with_the_configured_strength() {
        let mut weak = single_node(5.0, 5.0, 1.0);
        let mut strong = single_node(5.0, 5.0, 1.0);
        apply(&mut weak, &LayoutConfig::default());
        let config = LayoutConfig {
            gravity: 4.0,
            ..LayoutConfig::default()
        };
        apply(&mut strong, &config);
        assert!((strong.dx(0) - 4.0 * weak.dx(0)).abs() < 1e-6);
        assert!((strong.dy(0) - 4.0 * weak.dy(0)).abs() < 1e-6);
    }
}

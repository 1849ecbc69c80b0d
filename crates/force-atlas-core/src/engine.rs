//! The ForceAtlas2 step driver.
//!
//! [`LayoutEngine`] owns the node/edge stores and the configuration, and runs
//! one simulation pass at a time. It has no terminal state: callers request
//! passes for as long as they want the layout to keep settling.

use tracing::debug;

use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::forces::{attraction, collision, gravity, integrate, repulsion};
use crate::quadtree::QuadTree;
use crate::store::{EdgeStore, NodeStore, NODE_STRIDE};

/// Per-pass report: the iteration counter after the pass plus the
/// system-wide swing and traction sums, the quantities drivers watch to
/// judge how settled the layout is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassStats {
    pub iteration: u64,
    pub swing: f32,
    pub traction: f32,
}

/// Owns the simulation state and advances it one pass at a time.
#[derive(Debug)]
pub struct LayoutEngine {
    nodes: NodeStore,
    edges: EdgeStore,
    config: LayoutConfig,
    node_count: usize,
    iterations: u64,
}

impl LayoutEngine {
    /// Build an engine over packed stores. Every edge endpoint is validated
    /// against the node count once, here, so the hot path never has to.
    pub fn new(nodes: NodeStore, edges: EdgeStore, config: LayoutConfig) -> Result<Self> {
        let node_count = nodes.len();
        for e in 0..edges.len() {
            for endpoint in [edges.source(e), edges.target(e)] {
                if endpoint >= node_count {
                    return Err(LayoutError::EdgeEndpointOutOfRange {
                        edge: e,
                        endpoint,
                        node_count,
                    });
                }
            }
        }
        Ok(Self {
            nodes,
            edges,
            config,
            node_count,
            iterations: 0,
        })
    }

    /// Run one simulation pass: rotate the force accumulators, apply every
    /// stage in pipeline order, integrate, and bump the iteration counter.
    pub fn pass(&mut self) -> PassStats {
        self.nodes.reset_deltas();

        if self.config.barnes_hut_optimize {
            let tree = QuadTree::build(&self.nodes);
            repulsion::apply(&mut self.nodes, Some(&tree), &self.config);
        } else {
            repulsion::apply(&mut self.nodes, None, &self.config);
        }
        gravity::apply(&mut self.nodes, &self.config);
        attraction::apply(&mut self.nodes, &self.edges, &self.config);
        if self.config.collision_detection {
            collision::apply(&mut self.nodes, &self.config);
        }
        let (swing, traction) = integrate::apply(&mut self.nodes, &self.config);

        self.iterations += 1;
        debug!(
            iteration = self.iterations,
            swing, traction, "pass_complete"
        );
        PassStats {
            iteration: self.iterations,
            swing,
            traction,
        }
    }

    /// Replace the configuration wholesale. Does not reset iterations or
    /// positions; takes effect from the next pass.
    pub fn configure(&mut self, config: LayoutConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Passes completed so far. Survives buffer re-pointing.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut NodeStore {
        &mut self.nodes
    }

    pub fn edges(&self) -> &EdgeStore {
        &self.edges
    }

    /// Move the node buffer out for a handoff. The engine is inert until
    /// [`restore_nodes`](Self::restore_nodes) gives it a buffer back.
    pub fn take_nodes(&mut self) -> Vec<f32> {
        self.nodes.take_buffer()
    }

    /// Re-point the engine at a (possibly externally edited) node buffer.
    /// The buffer must describe the same number of nodes the engine was
    /// built with; the iteration counter is untouched.
    pub fn restore_nodes(&mut self, buf: Vec<f32>) -> Result<()> {
        if buf.len() != self.node_count * NODE_STRIDE {
            if buf.len() % NODE_STRIDE != 0 {
                return Err(LayoutError::InvalidNodeBuffer {
                    len: buf.len(),
                    stride: NODE_STRIDE,
                });
            }
            return Err(LayoutError::NodeCountMismatch {
                expected: self.node_count,
                got: buf.len() / NODE_STRIDE,
            });
        }
        self.nodes.restore_buffer(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EDGE_STRIDE;

    fn node_buffer(positions: &[(f32, f32)]) -> Vec<f32> {
        let mut buf = vec![0.0; positions.len() * NODE_STRIDE];
        for (i, &(x, y)) in positions.iter().enumerate() {
            buf[i * NODE_STRIDE] = x;
            buf[i * NODE_STRIDE + 1] = y;
            buf[i * NODE_STRIDE + 6] = 1.0;
            buf[i * NODE_STRIDE + 7] = 1.0;
        }
        buf
    }

    fn edge_buffer(edges: &[(usize, usize, f32)]) -> Vec<f32> {
        let mut buf = vec![0.0; edges.len() * EDGE_STRIDE];
        for (i, &(s, t, w)) in edges.iter().enumerate() {
            buf[i * EDGE_STRIDE] = s as f32;
            buf[i * EDGE_STRIDE + 1] = t as f32;
            buf[i * EDGE_STRIDE + 2] = w;
        }
        buf
    }

    fn engine(positions: &[(f32, f32)], edges: &[(usize, usize, f32)], config: LayoutConfig) -> LayoutEngine {
        LayoutEngine::new(
            NodeStore::new(node_buffer(positions)).unwrap(),
            EdgeStore::new(edge_buffer(edges)).unwrap(),
            config,
        )
        .unwrap()
    }

    #[test]
    fn out_of_range_edge_endpoint_is_rejected() {
        let nodes = NodeStore::new(node_buffer(&[(0.0, 0.0), (1.0, 0.0)])).unwrap();
        let edges = EdgeStore::new(edge_buffer(&[(0, 5, 1.0)])).unwrap();
        let err = LayoutEngine::new(nodes, edges, LayoutConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::EdgeEndpointOutOfRange {
                edge: 0,
                endpoint: 5,
                node_count: 2
            }
        ));
    }

    #[test]
    fn two_free_nodes_separate_symmetrically() {
        let config = LayoutConfig {
            gravity: 0.0,
            barnes_hut_optimize: false,
            ..LayoutConfig::default()
        };
        let mut engine = engine(&[(0.0, 0.0), (10.0, 0.0)], &[], config);
        engine.pass();
        let nodes = engine.nodes();
        assert!(nodes.x(0) < 0.0);
        assert!(nodes.x(1) > 10.0);
        assert!((nodes.x(0).abs() - (nodes.x(1) - 10.0)).abs() < 1e-5);
        assert_eq!(nodes.y(0), 0.0);
        assert_eq!(nodes.y(1), 0.0);
    }

    #[test]
    fn connected_nodes_drift_closer() {
        let config = LayoutConfig {
            barnes_hut_optimize: false,
            ..LayoutConfig::default()
        };
        let mut engine = engine(&[(0.0, 0.0), (100.0, 0.0)], &[(0, 1, 1.0)], config);
        engine.pass();
        let nodes = engine.nodes();
        let distance = nodes.x(1) - nodes.x(0);
        assert!(distance < 100.0);
        assert!(distance > 0.0);
    }

    #[test]
    fn pinned_node_keeps_its_exact_position() {
        let config = LayoutConfig {
            barnes_hut_optimize: false,
            ..LayoutConfig::default()
        };
        let mut engine = engine(
            &[(0.0, 0.0), (3.0, 4.0), (10.0, -2.0)],
            &[(0, 1, 1.0), (1, 2, 2.0)],
            config,
        );
        engine.nodes_mut().set_fixed(1, true);
        for _ in 0..50 {
            engine.pass();
        }
        assert_eq!(engine.nodes().x(1), 3.0);
        assert_eq!(engine.nodes().y(1), 4.0);
        // the free nodes did move
        assert!(engine.nodes().x(0) != 0.0);
    }

    #[test]
    fn edgeless_pass_moves_nodes_under_gravity_without_nan() {
        let mut engine = engine(
            &[(10.0, 0.0), (-5.0, 8.0), (3.0, -7.0), (0.5, 0.5)],
            &[],
            LayoutConfig::default(),
        );
        let before: Vec<(f32, f32)> = (0..4)
            .map(|i| (engine.nodes().x(i), engine.nodes().y(i)))
            .collect();
        engine.pass();
        let mut moved = 0;
        for i in 0..4 {
            let (x, y) = (engine.nodes().x(i), engine.nodes().y(i));
            assert!(x.is_finite() && y.is_finite());
            if (x, y) != before[i] {
                moved += 1;
            }
        }
        assert!(moved > 0);
    }

    #[test]
    fn iterations_count_passes() {
        let mut engine = engine(&[(0.0, 0.0), (5.0, 5.0)], &[], LayoutConfig::default());
        assert_eq!(engine.iterations(), 0);
        let stats = engine.pass();
        assert_eq!(stats.iteration, 1);
        engine.pass();
        assert_eq!(engine.iterations(), 2);
    }

    #[test]
    fn reconfigure_keeps_positions_and_iterations() {
        let mut engine = engine(&[(1.0, 2.0), (8.0, 9.0)], &[], LayoutConfig::default());
        engine.pass();
        let x_after_one = engine.nodes().x(0);
        engine.configure(LayoutConfig {
            gravity: 7.0,
            ..LayoutConfig::default()
        });
        assert_eq!(engine.iterations(), 1);
        assert_eq!(engine.nodes().x(0), x_after_one);
        assert_eq!(engine.config().gravity, 7.0);
    }

    #[test]
    fn buffer_round_trip_preserves_iterations() {
        let mut engine = engine(&[(0.0, 0.0), (10.0, 10.0)], &[], LayoutConfig::default());
        engine.pass();
        let buf = engine.take_nodes();
        assert_eq!(buf.len(), 2 * NODE_STRIDE);
        engine.restore_nodes(buf).unwrap();
        assert_eq!(engine.iterations(), 1);
        engine.pass();
        assert_eq!(engine.iterations(), 2);
    }

    #[test]
    fn restore_rejects_misaligned_and_resized_buffers() {
        let mut engine = engine(&[(0.0, 0.0), (10.0, 10.0)], &[], LayoutConfig::default());
        let _ = engine.take_nodes();
        assert!(matches!(
            engine.restore_nodes(vec![0.0; 7]),
            Err(LayoutError::InvalidNodeBuffer { .. })
        ));
        assert!(matches!(
            engine.restore_nodes(vec![0.0; 3 * NODE_STRIDE]),
            Err(LayoutError::NodeCountMismatch {
                expected: 2,
                got: 3
            })
        ));
    }
}

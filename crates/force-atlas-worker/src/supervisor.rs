//! The supervisor: packs graphs, drives the worker, writes positions back.
//!
//! The supervisor owns the [`LayoutGraph`] and keeps at most one exchange in
//! flight. Buffers are single-writer by protocol, not by lock: a buffer that
//! has been sent is gone until the reply brings it back, and position edits
//! made in the meantime are queued per node and pushed into the buffer when
//! the reply is applied.

use std::collections::HashMap;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use force_atlas_core::{LayoutConfig, NodeStore, Rect, EDGE_STRIDE, NODE_STRIDE};
use tracing::{debug, info};

use crate::error::{Result, SupervisorError};
use crate::graph::LayoutGraph;
use crate::protocol::{Reply, Request};
use crate::worker;

/// Drives a layout worker thread over an owned graph.
#[derive(Debug)]
pub struct Supervisor {
    graph: LayoutGraph,
    /// External id to buffer index, fixed at construction.
    index_of: HashMap<u64, usize>,
    /// Nodes edited since the last publish; their graph values win over the
    /// worker's on the next reply.
    changed: Vec<bool>,
    config: LayoutConfig,
    requests: Sender<Request>,
    replies: Receiver<Reply>,
    handle: Option<JoinHandle<()>>,
    /// The node buffer, held here whenever no exchange is in flight and the
    /// worker has been started at least once.
    node_buf: Option<Vec<f32>>,
    /// A `Start` has been sent; subsequent batches use `Loop`.
    started: bool,
    running: bool,
    /// True from send until the reply is applied.
    pending: bool,
    /// Deferred `force_update`, consumed when the next reply is applied.
    needs_update: bool,
    killed: bool,
    iterations: u64,
    rect: Rect,
}

impl Supervisor {
    /// Validate and adopt a graph, and spawn the worker thread. The worker
    /// stays idle until [`start`](Self::start).
    pub fn new(graph: LayoutGraph, config: LayoutConfig) -> Result<Self> {
        if graph.nodes.is_empty() {
            return Err(SupervisorError::EmptyGraph);
        }

        let mut index_of = HashMap::with_capacity(graph.nodes.len());
        for (i, node) in graph.nodes.iter().enumerate() {
            index_of.insert(node.id, i);
        }
        for edge in &graph.edges {
            for id in [edge.source, edge.target] {
                if !index_of.contains_key(&id) {
                    return Err(SupervisorError::UnknownNode { id });
                }
            }
        }

        let (requests, replies, handle) = worker::spawn();
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "supervisor_started"
        );

        let rect = rect_of(&graph);
        let changed = vec![false; graph.nodes.len()];
        Ok(Self {
            graph,
            index_of,
            changed,
            config,
            requests,
            replies,
            handle: Some(handle),
            node_buf: None,
            started: false,
            running: false,
            pending: false,
            needs_update: false,
            killed: false,
            iterations: 0,
            rect,
        })
    }

    /// Begin (or resume) the layout loop. The first call packs the graph and
    /// sends `Start`; later calls resume with the held buffer. No-op when
    /// already running.
    pub fn start(&mut self) -> Result<()> {
        if self.killed {
            return Err(SupervisorError::WorkerGone);
        }
        if self.running {
            return Ok(());
        }
        self.running = true;

        if !self.started {
            let nodes = self.pack_nodes()?;
            let edges = self.pack_edges()?;
            self.send(Request::Start {
                nodes,
                edges,
                config: self.config.clone(),
            })?;
            self.started = true;
            self.pending = true;
        } else if !self.pending {
            if let Some(mut buf) = self.node_buf.take() {
                let all = self.needs_update;
                self.needs_update = false;
                self.publish_edits(&mut buf, all)?;
                self.send(Request::Loop { nodes: buf })?;
                self.pending = true;
            }
        }
        // still pending: the in-flight reply schedules the next batch
        Ok(())
    }

    /// Stop requesting batches. The in-flight exchange, if any, still
    /// completes and its reply is applied.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Request exactly one batch: `start()` then `stop()`.
    pub fn step(&mut self) -> Result<()> {
        self.start()?;
        self.stop();
        Ok(())
    }

    /// Replace the layout configuration. Forwarded to the worker once it has
    /// an engine; always retained locally for the next `Start`.
    pub fn configure(&mut self, config: LayoutConfig) -> Result<()> {
        if self.killed {
            return Err(SupervisorError::WorkerGone);
        }
        self.config = config.clone();
        if self.started {
            self.send(Request::Configure { config })?;
        }
        Ok(())
    }

    /// Publish the graph's current positions and pin flags to the worker.
    /// Applies immediately when no exchange is pending, otherwise defers to
    /// the next reply.
    pub fn force_update(&mut self) -> Result<()> {
        if self.pending {
            self.needs_update = true;
            debug!("force_update_deferred");
            return Ok(());
        }
        if let Some(mut buf) = self.node_buf.take() {
            self.publish_edits(&mut buf, true)?;
            self.node_buf = Some(buf);
        }
        // not started yet: start() packs fresh state anyway
        Ok(())
    }

    /// Move a node and mark it changed so the worker's stale position for it
    /// is not written back.
    pub fn set_node_position(&mut self, id: u64, x: f32, y: f32) -> Result<()> {
        let i = self.index(id)?;
        self.graph.nodes[i].x = x;
        self.graph.nodes[i].y = y;
        self.changed[i] = true;
        Ok(())
    }

    /// Pin or release a node. Pinned nodes keep their position through every
    /// pass.
    pub fn pin_node(&mut self, id: u64, pinned: bool) -> Result<()> {
        let i = self.index(id)?;
        self.graph.nodes[i].pinned = pinned;
        self.changed[i] = true;
        Ok(())
    }

    /// Apply every reply already waiting in the channel without blocking.
    /// Returns whether any reply was applied.
    pub fn poll(&mut self) -> Result<bool> {
        let mut applied = false;
        loop {
            match self.replies.try_recv() {
                Ok(Reply::Positions { nodes, iterations }) => {
                    if self.killed {
                        continue;
                    }
                    self.apply_reply(nodes, iterations)?;
                    applied = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.killed {
                        break;
                    }
                    return Err(SupervisorError::WorkerGone);
                }
            }
        }
        Ok(applied)
    }

    /// Block up to `timeout` for one reply and apply it. Returns whether a
    /// reply was applied.
    pub fn poll_timeout(&mut self, timeout: Duration) -> Result<bool> {
        match self.replies.recv_timeout(timeout) {
            Ok(Reply::Positions { nodes, iterations }) => {
                if self.killed {
                    return Ok(false);
                }
                self.apply_reply(nodes, iterations)?;
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => {
                if self.killed {
                    Ok(false)
                } else {
                    Err(SupervisorError::WorkerGone)
                }
            }
        }
    }

    /// Tear down the worker thread. Idempotent; an in-flight reply is
    /// dropped, not applied.
    pub fn kill(&mut self) {
        if self.killed {
            return;
        }
        self.killed = true;
        self.running = false;
        let _ = self.requests.send(Request::Kill);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        info!("layout_worker_killed");
    }

    /// The owned graph with the latest applied positions.
    pub fn nodes(&self) -> &[crate::graph::GraphNode] {
        &self.graph.nodes
    }

    pub fn graph(&self) -> &LayoutGraph {
        &self.graph
    }

    /// Bounding rectangle of the layout, recomputed after every applied
    /// reply.
    pub fn layout_rect(&self) -> Rect {
        self.rect
    }

    /// Cumulative engine passes reported by the last applied reply.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    fn index(&self, id: u64) -> Result<usize> {
        self.index_of
            .get(&id)
            .copied()
            .ok_or(SupervisorError::UnknownNode { id })
    }

    fn send(&self, request: Request) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| SupervisorError::WorkerGone)
    }

    /// Pack the graph into a fresh node buffer: position, `mass = 1 + degree`,
    /// `convergence = 1`, size, and the pin flag.
    fn pack_nodes(&self) -> Result<Vec<f32>> {
        let mut degree = vec![0u32; self.graph.nodes.len()];
        for edge in &self.graph.edges {
            degree[self.index(edge.source)?] += 1;
            degree[self.index(edge.target)?] += 1;
        }

        let mut nodes = NodeStore::new(vec![0.0; self.graph.nodes.len() * NODE_STRIDE])?;
        for (i, node) in self.graph.nodes.iter().enumerate() {
            nodes.set_x(i, node.x);
            nodes.set_y(i, node.y);
            nodes.set_mass(i, 1.0 + degree[i] as f32);
            nodes.set_convergence(i, 1.0);
            nodes.set_size(i, node.size);
            nodes.set_fixed(i, node.pinned);
        }
        Ok(nodes.take_buffer())
    }

    fn pack_edges(&self) -> Result<Vec<f32>> {
        let mut buf = Vec::with_capacity(self.graph.edges.len() * EDGE_STRIDE);
        for edge in &self.graph.edges {
            buf.push(self.index(edge.source)? as f32);
            buf.push(self.index(edge.target)? as f32);
            buf.push(edge.weight);
        }
        Ok(buf)
    }

    /// Push edited (or, with `all`, every) node's position and pin flag from
    /// the graph into the buffer, clearing the changed marks.
    fn publish_edits(&mut self, buf: &mut Vec<f32>, all: bool) -> Result<()> {
        let mut nodes = NodeStore::new(std::mem::take(buf))?;
        for (i, node) in self.graph.nodes.iter().enumerate() {
            if all || self.changed[i] {
                nodes.set_x(i, node.x);
                nodes.set_y(i, node.y);
                nodes.set_fixed(i, node.pinned);
            }
            self.changed[i] = false;
        }
        *buf = nodes.take_buffer();
        Ok(())
    }

    /// Consume one worker reply: write fresh positions into the graph (edited
    /// nodes keep their graph values and push them the other way), recompute
    /// the layout rect, then either send the next `Loop` or hold the buffer.
    fn apply_reply(&mut self, buf: Vec<f32>, iterations: u64) -> Result<()> {
        self.pending = false;
        self.iterations = iterations;
        let republish_all = self.needs_update;
        self.needs_update = false;

        let mut nodes = NodeStore::new(buf)?;
        for (i, node) in self.graph.nodes.iter_mut().enumerate() {
            if republish_all || self.changed[i] {
                nodes.set_x(i, node.x);
                nodes.set_y(i, node.y);
                nodes.set_fixed(i, node.pinned);
                self.changed[i] = false;
            } else {
                node.x = nodes.x(i);
                node.y = nodes.y(i);
            }
        }
        self.rect = nodes.bounds(false);
        debug!(iterations, "positions_applied");

        let buf = nodes.take_buffer();
        if self.running {
            self.send(Request::Loop { nodes: buf })?;
            self.pending = true;
        } else {
            self.node_buf = Some(buf);
        }
        Ok(())
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.kill();
    }
}

fn rect_of(graph: &LayoutGraph) -> Rect {
    let mut rect = Rect {
        x1: f32::INFINITY,
        y1: f32::INFINITY,
        x2: f32::NEG_INFINITY,
        y2: f32::NEG_INFINITY,
    };
    for node in &graph.nodes {
        rect.x1 = rect.x1.min(node.x);
        rect.y1 = rect.y1.min(node.y);
        rect.x2 = rect.x2.max(node.x);
        rect.y2 = rect.y2.max(node.y);
    }
    rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphEdge, GraphNode};

    fn path_graph() -> LayoutGraph {
        let mut graph = LayoutGraph::new();
        graph
            .add_node(GraphNode::new(10, 0.0, 0.0))
            .add_node(GraphNode::new(20, 5.0, 1.0).with_size(4.0).pinned())
            .add_node(GraphNode::new(30, -3.0, 2.0));
        graph.add_edge(GraphEdge::new(10, 20));
        graph.add_edge(GraphEdge::new(20, 30).with_weight(2.0));
        graph
    }

    #[test]
    fn empty_graph_is_rejected() {
        let err = Supervisor::new(LayoutGraph::new(), LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, SupervisorError::EmptyGraph));
    }

    #[test]
    fn edges_must_reference_known_ids() {
        let mut graph = LayoutGraph::new();
        graph.add_node(GraphNode::new(1, 0.0, 0.0));
        graph.add_edge(GraphEdge::new(1, 99));
        let err = Supervisor::new(graph, LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, SupervisorError::UnknownNode { id: 99 }));
    }

    #[test]
    fn position_edits_validate_ids() {
        let mut supervisor = Supervisor::new(path_graph(), LayoutConfig::default()).unwrap();
        assert!(matches!(
            supervisor.set_node_position(77, 0.0, 0.0),
            Err(SupervisorError::UnknownNode { id: 77 })
        ));
        assert!(supervisor.pin_node(30, true).is_ok());
    }

    #[test]
    fn packing_derives_mass_from_degree() {
        let supervisor = Supervisor::new(path_graph(), LayoutConfig::default()).unwrap();
        let nodes = NodeStore::new(supervisor.pack_nodes().unwrap()).unwrap();

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes.mass(0), 2.0); // degree 1
        assert_eq!(nodes.mass(1), 3.0); // degree 2
        assert_eq!(nodes.mass(2), 2.0);
        assert_eq!(nodes.convergence(0), 1.0);
        assert_eq!(nodes.size(1), 4.0);
        assert!(nodes.fixed(1));
        assert!(!nodes.fixed(0));

        let edges = supervisor.pack_edges().unwrap();
        assert_eq!(edges, vec![0.0, 1.0, 1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn initial_rect_covers_the_input_positions() {
        let supervisor = Supervisor::new(path_graph(), LayoutConfig::default()).unwrap();
        let rect = supervisor.layout_rect();
        assert_eq!(rect.x1, -3.0);
        assert_eq!(rect.x2, 5.0);
        assert_eq!(rect.y1, 0.0);
        assert_eq!(rect.y2, 2.0);
    }
}

//! The layout thread: owns the engine, executes batches, hands buffers back.
//!
//! The thread is a plain request loop over an explicit state machine. A
//! message arriving in the wrong state is a protocol violation by the sender;
//! it is logged loudly and dropped so the worker never runs on stale state.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use force_atlas_core::{EdgeStore, LayoutConfig, LayoutEngine, NodeStore};
use tracing::{error, info};

use crate::protocol::{Reply, Request};

/// Engine lifecycle inside the worker thread.
enum WorkerState {
    Uninitialized,
    Running(LayoutEngine),
}

/// Spawn the layout thread and return its request/reply endpoints.
///
/// The thread exits when it receives [`Request::Kill`] or when the request
/// sender is dropped.
pub fn spawn() -> (Sender<Request>, Receiver<Reply>, JoinHandle<()>) {
    let (request_tx, request_rx) = unbounded();
    let (reply_tx, reply_rx) = unbounded();
    let handle = thread::spawn(move || run(request_rx, reply_tx));
    (request_tx, reply_rx, handle)
}

fn run(requests: Receiver<Request>, replies: Sender<Reply>) {
    let mut state = WorkerState::Uninitialized;

    while let Ok(request) = requests.recv() {
        match request {
            Request::Start {
                nodes,
                edges,
                config,
            } => {
                if matches!(state, WorkerState::Running(_)) {
                    error!("start_in_running_state");
                    continue;
                }
                match initialize(nodes, edges, config) {
                    Ok(mut engine) => {
                        info!(
                            nodes = engine.nodes().len(),
                            edges = engine.edges().len(),
                            "layout_worker_started"
                        );
                        let passes = engine.config().starting_iterations;
                        if !run_batch(&mut engine, passes, &replies) {
                            break;
                        }
                        state = WorkerState::Running(engine);
                    }
                    Err(err) => error!(error = %err, "engine_construction_failed"),
                }
            }
            Request::Loop { nodes } => match &mut state {
                WorkerState::Running(engine) => {
                    if let Err(err) = engine.restore_nodes(nodes) {
                        error!(error = %err, "node_buffer_rejected");
                        continue;
                    }
                    let passes = engine.config().iterations_per_render;
                    if !run_batch(engine, passes, &replies) {
                        break;
                    }
                }
                WorkerState::Uninitialized => error!("loop_before_start"),
            },
            Request::Configure { config } => match &mut state {
                WorkerState::Running(engine) => engine.configure(config),
                WorkerState::Uninitialized => error!("configure_before_start"),
            },
            Request::Kill => break,
        }
    }
    info!("layout_worker_stopped");
}

fn initialize(
    nodes: Vec<f32>,
    edges: Vec<f32>,
    config: LayoutConfig,
) -> force_atlas_core::Result<LayoutEngine> {
    LayoutEngine::new(NodeStore::new(nodes)?, EdgeStore::new(edges)?, config)
}

/// Run one batch of passes and hand the buffer back. Returns false when the
/// supervisor hung up, which ends the thread.
fn run_batch(engine: &mut LayoutEngine, passes: u32, replies: &Sender<Reply>) -> bool {
    for _ in 0..passes {
        engine.pass();
    }
    let reply = Reply::Positions {
        nodes: engine.take_nodes(),
        iterations: engine.iterations(),
    };
    replies.send(reply).is_ok()
}

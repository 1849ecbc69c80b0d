//! Message contract between the supervisor and the layout thread.
//!
//! Buffers move with the messages: whichever side holds a `nodes` vector is
//! the only writer until it sends the vector away. The supervisor keeps at
//! most one exchange in flight, so replies never reorder.

use force_atlas_core::LayoutConfig;

/// Requests the supervisor sends to the worker.
#[derive(Debug)]
pub enum Request {
    /// Initialize the engine from packed buffers and run
    /// `starting_iterations` passes.
    Start {
        nodes: Vec<f32>,
        edges: Vec<f32>,
        config: LayoutConfig,
    },
    /// Re-point the engine at the (possibly edited) node buffer and run
    /// `iterations_per_render` passes.
    Loop { nodes: Vec<f32> },
    /// Replace the configuration without touching node data.
    Configure { config: LayoutConfig },
    /// Tear down the worker thread. Idempotent from the sender's side.
    Kill,
}

/// Replies the worker sends after each completed batch.
#[derive(Debug)]
pub enum Reply {
    /// The node buffer after the batch, plus the engine's cumulative pass
    /// count.
    Positions { nodes: Vec<f32>, iterations: u64 },
}

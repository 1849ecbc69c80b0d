//! Error types for the supervisor and its worker thread.

use thiserror::Error;

/// Result type alias for supervisor operations.
pub type Result<T> = std::result::Result<T, SupervisorError>;

#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Zero nodes. Rejected before any layout math can see NaN bounds.
    #[error("cannot lay out an empty graph")]
    EmptyGraph,

    /// An edge endpoint or position edit names an id with no packed node.
    #[error("unknown node id {id}")]
    UnknownNode { id: u64 },

    /// The worker thread hung up its channel.
    #[error("layout worker disconnected")]
    WorkerGone,

    /// Buffer or endpoint validation failed inside the layout engine.
    #[error(transparent)]
    Layout(#[from] force_atlas_core::LayoutError),
}

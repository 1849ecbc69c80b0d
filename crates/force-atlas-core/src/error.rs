//! Error types for the layout engine.

use thiserror::Error;

/// Result type alias for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors that can occur while constructing layout state.
///
/// All variants are construction-time failures. Steady-state simulation never
/// raises: degenerate geometry (coincident nodes, zero distances) is handled
/// locally inside the force stages because it occurs routinely.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A node buffer's length is not a multiple of the per-node stride.
    #[error("invalid node buffer: length {len} is not a multiple of {stride}")]
    InvalidNodeBuffer { len: usize, stride: usize },

    /// An edge buffer's length is not a multiple of the per-edge stride.
    #[error("invalid edge buffer: length {len} is not a multiple of {stride}")]
    InvalidEdgeBuffer { len: usize, stride: usize },

    /// An edge references a node index outside the node store.
    #[error("edge {edge} endpoint {endpoint} out of range (node count {node_count})")]
    EdgeEndpointOutOfRange {
        edge: usize,
        endpoint: usize,
        node_count: usize,
    },

    /// A restored node buffer does not describe the same number of nodes the
    /// engine was built with.
    #[error("node count changed across handoff: expected {expected}, got {got}")]
    NodeCountMismatch { expected: usize, got: usize },
}

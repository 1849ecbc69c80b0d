//! ForceAtlas2 force-directed graph layout.
//!
//! A headless CPU implementation of the ForceAtlas2 algorithm with optional
//! Barnes-Hut repulsion, degree-proportional gravity, lin-log attraction and
//! size-aware collision handling. The crate owns no threads and performs no
//! I/O: callers hand it packed node/edge buffers and pump
//! [`LayoutEngine::pass`] as often as they want the layout to keep settling.
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────────┐   ┌───────────────┐   ┌────────────────────────────┐
//! │ reset      │──▶│ quadtree      │──▶│ forces                     │
//! │ deltas     │   │ (Barnes-Hut)  │   │ repulsion → gravity →      │
//! └────────────┘   └───────────────┘   │ attraction → collision     │
//!                                      └────────────┬───────────────┘
//!                                                   ▼
//!                                      ┌────────────────────────────┐
//!                                      │ integrate                  │
//!                                      │ adaptive speed from        │
//!                                      │ swing / traction           │
//!                                      └────────────────────────────┘
//! ```
//!
//! ## Performance
//!
//! - Pairwise repulsion: O(n²) per pass
//! - Barnes-Hut approximation (default): O(n log n) per pass
//!
//! All node state lives in a single flat `Vec<f32>` ([`NODE_STRIDE`] floats
//! per node) so the buffer can be moved across thread or FFI boundaries
//! without copying; see [`LayoutEngine::take_nodes`].

pub mod config;
pub mod engine;
pub mod error;
pub mod forces;
pub mod quadtree;
pub mod store;

pub use config::LayoutConfig;
pub use engine::{LayoutEngine, PassStats};
pub use error::{LayoutError, Result};
pub use quadtree::{QuadTree, Region};
pub use store::{EdgeStore, NodeStore, Rect, EDGE_STRIDE, NODE_STRIDE};

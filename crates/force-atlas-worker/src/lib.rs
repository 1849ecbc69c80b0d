//! Off-thread driver for the force-atlas-core layout engine.
//!
//! The crate splits layout execution across two contexts: a [`Supervisor`]
//! owned by the caller, and a worker thread running the step driver. They
//! communicate exclusively by message passing; node buffers move with the
//! messages, so exactly one side can write at any moment.
//!
//! ```text
//!  caller thread                         worker thread
//! ┌──────────────────┐   Start/Loop     ┌──────────────────┐
//! │ Supervisor       │ ───────────────▶ │ WorkerState      │
//! │  owns LayoutGraph│                  │  runs LayoutEngine│
//! │  applies replies │ ◀─────────────── │  batches passes  │
//! └──────────────────┘    Positions     └──────────────────┘
//! ```
//!
//! Typical use: build a [`LayoutGraph`], hand it to [`Supervisor::new`],
//! call [`Supervisor::start`], and pump [`Supervisor::poll`] from the render
//! loop (or [`Supervisor::poll_timeout`] when headless). Positions stream
//! back into the owned graph; [`Supervisor::layout_rect`] tracks the extent
//! for camera fitting.

pub mod error;
pub mod graph;
pub mod protocol;
pub mod supervisor;
pub mod worker;

pub use error::{Result, SupervisorError};
pub use graph::{GraphEdge, GraphNode, LayoutGraph};
pub use protocol::{Reply, Request};
pub use supervisor::Supervisor;

pub use force_atlas_core::{LayoutConfig, Rect};

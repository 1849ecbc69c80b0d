//! The per-pass force stages.
//!
//! Stages always run in the same order — repulsion, gravity, attraction,
//! optional collision, then integration — each reading and writing the same
//! [`NodeStore`](crate::store::NodeStore). The first four accumulate into the
//! `dx`/`dy` fields; integration turns the accumulated force into a position
//! update with a per-node adaptive speed.
//!
//! Degenerate geometry (coincident nodes, zero distances) is never an error
//! here: every formula carries its own guard and either skips the update or
//! jiggles the direction vector. Coincident initial positions are routine.

pub mod attraction;
pub mod collision;
pub mod gravity;
pub mod integrate;
pub mod repulsion;

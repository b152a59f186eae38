//! Cost-aware task-to-service placement with a discrete particle swarm.
//!
//! Given a set of interdependent tasks and a set of priced service
//! instances, [`pso::PsoRunner`] searches for the assignment with the
//! lowest execution plus data-transfer cost.
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` on tasks, services, configs and results.
//! - `parallel`: rayon-backed particle updates in synchronous mode.
//!
//! # Architecture
//!
//! The crate contains the optimization engine only. Building problem
//! instances, rendering results, and persisting them are left to callers.

pub mod pso;

//! Discrete Particle Swarm Optimization (RD-PSO) for task placement.
//!
//! Places every task of an [`Instance`] on one [`ServiceInstance`] so that
//! execution cost plus cross-service data-transfer cost is minimized.
//!
//! PSO is continuous; the discrete choice is recovered by keeping one
//! preference score per (task, service) pair as the particle's velocity
//! and taking the arg-max of each task's row as its position.
//!
//! # Key Types
//!
//! - [`Instance`]: validated tasks and services
//! - [`PsoConfig`]: swarm size, iteration budget, coefficients
//! - [`PsoRunner`]: executes the search
//! - [`PsoResult`]: best assignment, cost, and run statistics
//!
//! # References
//!
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! - Shi & Eberhart (1998), "A Modified Particle Swarm Optimizer"

mod config;
mod cost;
mod error;
mod particle;
mod runner;
mod types;

pub use config::{PsoConfig, UpdateMode};
pub use cost::{breakdown, cost, CostBreakdown};
pub use error::PsoError;
pub use particle::{Particle, PreferenceMatrix};
pub use runner::{PsoResult, PsoRunner};
pub use types::{Assignment, Instance, Placement, ServiceId, ServiceInstance, Task, TaskId};

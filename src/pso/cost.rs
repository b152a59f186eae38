//! Assignment cost: execution plus cross-service data transfer.
//!
//! For each task `t` placed on service `s`:
//!
//! ```text
//! exec(t)     = t.execution_time * s.cost_per_hour
//! transfer(t) = sum over deps d of t with service(d) != s:
//!                   d.data_size * s.data_transfer_rate
//! ```
//!
//! Transfer is billed at the consumer's rate. Dependencies co-located with
//! the consumer cost nothing.

use super::types::{Assignment, Instance};

/// Cost split into its execution and transfer parts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostBreakdown {
    pub execution: f64,
    pub transfer: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.execution + self.transfer
    }
}

/// Total cost of `assignment` on `instance`. Lower is better.
///
/// # Examples
///
/// ```
/// use u_rdpso::pso::{cost, Assignment, Instance, ServiceInstance, Task};
///
/// let instance = Instance::new(
///     vec![Task::new(1, 3.0, 100.0), Task::new(2, 2.0, 150.0).with_dependencies(vec![1])],
///     vec![ServiceInstance::new(1, 0.20, 0.05), ServiceInstance::new(2, 0.15, 0.03)],
/// )
/// .unwrap();
///
/// let split = Assignment::new(&instance, vec![0, 1]).unwrap();
/// assert!((cost(&instance, &split) - 4.0).abs() < 1e-9);
/// ```
pub fn cost(instance: &Instance, assignment: &Assignment) -> f64 {
    breakdown(instance, assignment).total()
}

/// Same as [`cost`], keeping execution and transfer apart.
pub fn breakdown(instance: &Instance, assignment: &Assignment) -> CostBreakdown {
    let tasks = instance.tasks();
    let services = instance.services();

    let mut out = CostBreakdown::default();
    for (i, task) in tasks.iter().enumerate() {
        let s = assignment.service_of(i);
        let service = &services[s];

        out.execution += task.execution_time * service.cost_per_hour;
        out.transfer += instance
            .dependency_indices(i)
            .iter()
            .filter(|&&d| assignment.service_of(d) != s)
            .map(|&d| tasks[d].data_size * service.data_transfer_rate)
            .sum::<f64>();
    }
    out
}

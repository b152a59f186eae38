//! Problem instance data: tasks, service instances, and assignments.

use super::error::PsoError;
use std::collections::{HashMap, HashSet};

/// Identifier of a [`Task`].
pub type TaskId = u32;

/// Identifier of a [`ServiceInstance`].
pub type ServiceId = u32;

/// A unit of work to place on a service.
///
/// Equality is by `id` only.
///
/// # Examples
///
/// ```
/// use u_rdpso::pso::Task;
///
/// let load = Task::new(1, 3.0, 100.0);
/// let transform = Task::new(2, 2.0, 150.0).with_dependencies(vec![1]);
/// assert_eq!(transform.dependencies, vec![1]);
/// assert!(load.dependencies.is_empty());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    /// Unique positive identifier.
    pub id: TaskId,

    /// Execution time in hours.
    pub execution_time: f64,

    /// Size of the data this task produces, in MB.
    pub data_size: f64,

    /// Ids of the tasks whose output this task consumes.
    pub dependencies: Vec<TaskId>,
}

impl Task {
    /// Creates a task without dependencies.
    pub fn new(id: TaskId, execution_time: f64, data_size: f64) -> Self {
        Self {
            id,
            execution_time,
            data_size,
            dependencies: Vec::new(),
        }
    }

    /// Sets the dependency list (task ids).
    pub fn with_dependencies(mut self, dependencies: Vec<TaskId>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

/// A priced compute resource.
///
/// Equality is by `id` only.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceInstance {
    /// Unique positive identifier.
    pub id: ServiceId,

    /// Execution cost per hour.
    pub cost_per_hour: f64,

    /// Cost per MB pulled in from a task on another service.
    pub data_transfer_rate: f64,
}

impl ServiceInstance {
    pub fn new(id: ServiceId, cost_per_hour: f64, data_transfer_rate: f64) -> Self {
        Self {
            id,
            cost_per_hour,
            data_transfer_rate,
        }
    }
}

impl PartialEq for ServiceInstance {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceInstance {}

/// A validated problem instance.
///
/// Holds the tasks and services in their canonical order, with every
/// dependency id resolved to the position of the producing task.
/// Building one is the only place where an instance can be rejected.
///
/// # Examples
///
/// ```
/// use u_rdpso::pso::{Instance, ServiceInstance, Task};
///
/// let instance = Instance::new(
///     vec![Task::new(1, 3.0, 100.0), Task::new(2, 2.0, 150.0).with_dependencies(vec![1])],
///     vec![ServiceInstance::new(1, 0.20, 0.05)],
/// )
/// .unwrap();
/// assert_eq!(instance.dependency_indices(1), &[0]);
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    tasks: Vec<Task>,
    services: Vec<ServiceInstance>,
    dependencies: Vec<Vec<usize>>,
}

impl Instance {
    /// Validates and builds an instance.
    ///
    /// # Errors
    ///
    /// - [`PsoError::InvalidInstance`] if either list is empty or an id repeats.
    /// - [`PsoError::MalformedDependency`] if a dependency is unknown or
    ///   points at the task itself.
    pub fn new(tasks: Vec<Task>, services: Vec<ServiceInstance>) -> Result<Self, PsoError> {
        if tasks.is_empty() {
            return Err(PsoError::InvalidInstance("task list is empty".into()));
        }
        if services.is_empty() {
            return Err(PsoError::InvalidInstance("service list is empty".into()));
        }

        let mut index_of: HashMap<TaskId, usize> = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if index_of.insert(task.id, i).is_some() {
                return Err(PsoError::InvalidInstance(format!(
                    "duplicate task id {}",
                    task.id
                )));
            }
        }

        let mut seen_services = HashSet::with_capacity(services.len());
        for service in &services {
            if !seen_services.insert(service.id) {
                return Err(PsoError::InvalidInstance(format!(
                    "duplicate service id {}",
                    service.id
                )));
            }
        }

        let dependencies = tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                task.dependencies
                    .iter()
                    .map(|&dep| match index_of.get(&dep) {
                        Some(&j) if j != i => Ok(j),
                        _ => Err(PsoError::MalformedDependency {
                            task_id: task.id,
                            dependency: dep,
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            tasks,
            services,
            dependencies,
        })
    }

    /// Tasks in canonical order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Services in canonical order. Ties in position updates go to the
    /// earliest entry.
    pub fn services(&self) -> &[ServiceInstance] {
        &self.services
    }

    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn num_services(&self) -> usize {
        self.services.len()
    }

    /// Positions of the tasks that the task at `task` depends on.
    pub fn dependency_indices(&self, task: usize) -> &[usize] {
        &self.dependencies[task]
    }
}

/// A task-to-service mapping: entry `i` is the index of the service
/// running task `i`.
///
/// Always total over the tasks of the instance it was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment(Vec<usize>);

impl Assignment {
    /// Wraps a vector of service indices, checking it against `instance`.
    ///
    /// # Errors
    ///
    /// [`PsoError::InvalidInstance`] if the length differs from the task
    /// count or an index is out of range.
    pub fn new(instance: &Instance, services: Vec<usize>) -> Result<Self, PsoError> {
        if services.len() != instance.num_tasks() {
            return Err(PsoError::InvalidInstance(format!(
                "assignment covers {} tasks, instance has {}",
                services.len(),
                instance.num_tasks()
            )));
        }
        if let Some(&bad) = services.iter().find(|&&s| s >= instance.num_services()) {
            return Err(PsoError::InvalidInstance(format!(
                "service index {bad} out of range"
            )));
        }
        Ok(Self(services))
    }

    pub(crate) fn from_indices(services: Vec<usize>) -> Self {
        Self(services)
    }

    /// Assigns every task to the same service.
    pub fn uniform(instance: &Instance, service: usize) -> Result<Self, PsoError> {
        Self::new(instance, vec![service; instance.num_tasks()])
    }

    /// Service index of the task at position `task`.
    pub fn service_of(&self, task: usize) -> usize {
        self.0[task]
    }

    pub(crate) fn set(&mut self, task: usize, service: usize) {
        self.0[task] = service;
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Resolves the mapping to `(task_id, service_id)` pairs, in task order.
    pub fn placements(&self, instance: &Instance) -> Vec<Placement> {
        instance
            .tasks()
            .iter()
            .zip(&self.0)
            .map(|(task, &s)| Placement {
                task_id: task.id,
                service_id: instance.services()[s].id,
            })
            .collect()
    }
}

/// One `(task, service)` pair of a final assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub task_id: TaskId,
    pub service_id: ServiceId,
}

//! Errors raised before the search starts.

use super::types::TaskId;

/// Errors produced while validating a problem instance or configuration.
///
/// Once both have been accepted the search itself cannot fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PsoError {
    /// The instance has no tasks, no services, or repeated ids.
    #[error("invalid problem instance: {0}")]
    InvalidInstance(String),

    /// A dependency does not name another task of the same instance.
    #[error("task {task_id} depends on {dependency}, which is not another task of the instance")]
    MalformedDependency {
        /// Task holding the bad reference.
        task_id: TaskId,
        /// The unresolved reference.
        dependency: TaskId,
    },

    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

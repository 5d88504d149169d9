//! Exposes the deimos error type

use std::sync::PoisonError;

use thiserror::Error;

use crate::graph::descriptor::TaskKey;

/// Error type that deimos can return.
#[derive(Error, Debug)]
pub enum Error {
    /// A task was registered under a type key that is already taken in this graph.
    #[error("A task with key `{0}` is already registered in this frame graph.")]
    DuplicateTaskKey(TaskKey),
    /// A dependency lookup did not match any task registered strictly earlier.
    #[error("No task with key `{0}` was registered before this point in the graph.")]
    DependencyNotFound(TaskKey),
    /// A dependency lookup joined a producer whose execution had failed.
    #[error("Task `{key}` failed in a previous dispatch: {message}")]
    DependencyFailed {
        /// Key of the failed producer.
        key: TaskKey,
        /// The producer's error, rendered.
        message: String,
    },
    /// The declared dependencies form a cycle. Cannot happen when dependencies
    /// only point at earlier registrations; kept as a hard check.
    #[error("Frame graph dependencies contain a cycle.")]
    GraphHasCycle,
    /// A typed data accessor was called with a type that does not match the
    /// task's private data block.
    #[error("Task `{key}` does not store data of type `{expected}`.")]
    TypeMismatch {
        /// Key of the task whose data was requested.
        key: TaskKey,
        /// The requested type.
        expected: &'static str,
    },
    /// The device could not obtain backing memory for a render target.
    #[error("Render target allocation failed: {0}")]
    AllocationFailed(String),
    /// More color formats were declared than the implementation supports.
    #[error("Render target declares {0} color attachments, the maximum is {max}.", max = crate::resource::properties::MAX_COLOR_ATTACHMENTS)]
    TooManyColorAttachments(usize),
    /// A task handle did not resolve to a registered task.
    #[error("Render task handle does not resolve to a registered task.")]
    TaskNotFound,
    /// An operation that requires a set up task was called before `setup()`.
    #[error("Task `{0}` has not been set up.")]
    NotSetUp(TaskKey),
    /// An operation was attempted on a task that was already destroyed.
    #[error("Task `{0}` was already destroyed.")]
    TaskDestroyed(TaskKey),
    /// No task in the graph renders to the window.
    #[error("This frame graph has no render-window task.")]
    NoRenderWindow,
    /// Named pipeline not registered in the pipeline registry.
    #[error("Named pipeline `{0}` not found.")]
    PipelineNotFound(String),
    /// Poisoned mutex
    #[error("Poisoned mutex")]
    PoisonError,
    /// Uncategorized error.
    #[error("Uncategorized error: `{0}`")]
    Uncategorized(&'static str),
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_: PoisonError<T>) -> Self {
        Error::PoisonError
    }
}

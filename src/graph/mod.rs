//! The frame graph and the render task lifecycle.
//!
//! A frame graph is built once per application configuration by registering
//! every pass, in dependency order, as a [`TaskDescriptor`](crate::TaskDescriptor).
//! Registration order is the execution order; the graph never reorders tasks.
//! After registration the graph drives four lifecycle phases across all tasks:
//!
//! * **Setup** — once, after every task is registered. Acquires command lists,
//!   materializes render targets, runs the setup callbacks.
//! * **Execute** — once per rendered frame, in registration order. Tasks that
//!   opt in to multithreading run on a worker; everything that reads their
//!   output joins on a completion barrier first.
//! * **Resize** — on every viewport change. Idempotent; joins in-flight work
//!   before touching any resource.
//! * **Destroy** — once, in reverse registration order, so a pass is destroyed
//!   before anything it depends on.
//!
//! Cross-task data flow is by type key only: a pass asks its
//! [`ExecuteContext`](crate::ExecuteContext) for "the render target produced
//! by the task registered as `key`", never for a target by index or pointer.
//! Declared dependencies are validated when the task is registered, before any
//! callback has run.

pub mod context;
pub mod descriptor;
pub mod frame_graph;
pub mod task;

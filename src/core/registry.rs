//! Explicit pipeline registry.
//!
//! The scheduler itself never looks up pipelines; pass setup and execute
//! callbacks do, through the registry handed to them in their context. Keeping
//! the registry an explicit object (instead of a process-wide singleton) means
//! a graph can be unit tested with a stub registry.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;

use crate::core::error::Error;

/// Opaque handle to a compiled pipeline owned by the backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PipelineHandle(pub u64);

/// Maps stable pipeline names to backend pipeline handles.
#[derive(Debug, Default)]
pub struct PipelineRegistry {
    pipelines: Mutex<HashMap<String, PipelineHandle>>,
}

impl PipelineRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pipeline under `name`. Re-registering a name replaces the
    /// previous handle, which is how backends swap in hot-reloaded shaders.
    pub fn register(&self, name: impl Into<String>, pipeline: PipelineHandle) -> Result<()> {
        let mut pipelines = self.pipelines.lock().map_err(Error::from)?;
        pipelines.insert(name.into(), pipeline);
        Ok(())
    }

    /// Look up a pipeline by name.
    ///
    /// # Errors
    /// * Fails with [`Error::PipelineNotFound`] if no pipeline was registered
    ///   under `name`.
    pub fn find(&self, name: &str) -> Result<PipelineHandle> {
        let pipelines = self.pipelines.lock().map_err(Error::from)?;
        pipelines
            .get(name)
            .copied()
            .ok_or_else(|| Error::PipelineNotFound(name.to_owned()).into())
    }
}

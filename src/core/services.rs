//! Shared collaborator bundle passed into every frame graph entry point.

use std::sync::Arc;

use crate::core::device::RenderDevice;
use crate::core::registry::PipelineRegistry;

/// The external collaborators a frame graph needs to run: the device backend
/// and the pipeline registry. Cheap to clone; worker threads take a clone when
/// a task execution is dispatched off the main thread.
#[derive(Clone)]
pub struct RenderServices {
    /// The device backend.
    pub device: Arc<dyn RenderDevice>,
    /// Pipeline lookup used by pass callbacks.
    pub pipelines: Arc<PipelineRegistry>,
}

impl RenderServices {
    /// Bundle a device and a pipeline registry.
    pub fn new(device: Arc<dyn RenderDevice>, pipelines: Arc<PipelineRegistry>) -> Self {
        Self {
            device,
            pipelines,
        }
    }
}

//! Per-phase contexts handed to lifecycle callbacks.
//!
//! A callback never sees the frame graph itself. It gets a context scoped to
//! its own task: the device, the pipeline registry, its command list and
//! render target, and (during execute) the scene snapshot plus read access to
//! predecessor render targets. This keeps all task-state mutation inside the
//! graph and makes the ownership rule of §concurrency enforceable: a pass
//! writes its own target and only ever reads targets of tasks registered
//! strictly before it.

use std::sync::Arc;

use anyhow::Result;

use crate::core::device::{CommandListHandle, RenderDevice};
use crate::core::registry::PipelineRegistry;
use crate::graph::descriptor::TaskKey;
use crate::graph::task::TaskSlot;
use crate::resource::properties::RenderTargetProperties;
use crate::resource::target::RenderTarget;
use crate::Error;

/// Context for setup callbacks.
pub struct SetupContext<'a> {
    pub(crate) device: &'a dyn RenderDevice,
    pub(crate) pipelines: &'a PipelineRegistry,
    pub(crate) command_list: CommandListHandle,
    pub(crate) target: &'a Arc<RenderTarget>,
    pub(crate) version_count: usize,
}

impl<'a> SetupContext<'a> {
    /// The device backend.
    pub fn device(&self) -> &dyn RenderDevice {
        self.device
    }

    /// The pipeline registry.
    pub fn pipelines(&self) -> &PipelineRegistry {
        self.pipelines
    }

    /// The command list acquired for this task.
    pub fn command_list(&self) -> CommandListHandle {
        self.command_list
    }

    /// The task's own render target.
    pub fn render_target(&self) -> &Arc<RenderTarget> {
        self.target
    }

    /// Number of frames in flight.
    pub fn version_count(&self) -> usize {
        self.version_count
    }
}

/// Context for execute callbacks. `S` is the scene snapshot type of the
/// graph.
pub struct ExecuteContext<'a, S = ()> {
    pub(crate) device: &'a dyn RenderDevice,
    pub(crate) pipelines: &'a PipelineRegistry,
    pub(crate) command_list: CommandListHandle,
    pub(crate) target: &'a Arc<RenderTarget>,
    pub(crate) scene: &'a S,
    pub(crate) frame_index: usize,
    pub(crate) version: usize,
    pub(crate) predecessors: &'a [Arc<TaskSlot<S>>],
}

impl<'a, S: 'static> ExecuteContext<'a, S> {
    /// The device backend.
    pub fn device(&self) -> &dyn RenderDevice {
        self.device
    }

    /// The pipeline registry.
    pub fn pipelines(&self) -> &PipelineRegistry {
        self.pipelines
    }

    /// The command list to record into this frame.
    pub fn command_list(&self) -> CommandListHandle {
        self.command_list
    }

    /// The task's own render target. The only target this task may write.
    pub fn render_target(&self) -> &Arc<RenderTarget> {
        self.target
    }

    /// The scene snapshot for this frame, passed through unmodified.
    pub fn scene(&self) -> &S {
        self.scene
    }

    /// The graph's frame counter at dispatch time.
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// `frame_index % versions`; the index into every multi-buffered
    /// resource this frame.
    pub fn version(&self) -> usize {
        self.version
    }

    /// The render target most recently produced by the task registered
    /// strictly earlier under `key`, read-only.
    ///
    /// If that task's execution was dispatched to a worker this blocks until
    /// it has completed (join-on-read), so the returned target is never
    /// observed mid-write.
    ///
    /// # Errors
    /// * Fails with [`Error::DependencyNotFound`] if no earlier task carries
    ///   `key`.
    /// * Fails with [`Error::DependencyFailed`] if the producer's execution
    ///   failed; its target never reached the finished state, so the read
    ///   must not proceed.
    /// * Fails with [`Error::NotSetUp`] if the producing task has no target
    ///   yet.
    pub fn predecessor_render_target(&self, key: TaskKey) -> Result<Arc<RenderTarget>> {
        for slot in self.predecessors.iter().rev() {
            if slot.key() == key {
                slot.wait_idle()?;
                return slot.render_target().ok_or_else(|| Error::NotSetUp(key).into());
            }
        }
        Err(Error::DependencyNotFound(key).into())
    }
}

/// Context for resize callbacks.
pub struct ResizeContext<'a> {
    pub(crate) device: &'a dyn RenderDevice,
    pub(crate) pipelines: &'a PipelineRegistry,
    pub(crate) command_list: CommandListHandle,
    pub(crate) target: &'a Arc<RenderTarget>,
}

impl<'a> ResizeContext<'a> {
    /// The device backend.
    pub fn device(&self) -> &dyn RenderDevice {
        self.device
    }

    /// The pipeline registry.
    pub fn pipelines(&self) -> &PipelineRegistry {
        self.pipelines
    }

    /// The command list acquired for this task.
    pub fn command_list(&self) -> CommandListHandle {
        self.command_list
    }

    /// The task's render target, already resized.
    pub fn render_target(&self) -> &Arc<RenderTarget> {
        self.target
    }
}

/// Read-only view of a task's observable state, returned by
/// [`FrameGraph::with_data`](crate::FrameGraph::with_data). Obtaining one
/// joins any in-flight execution first, so the view is never torn.
pub struct TaskDataView<'a, T> {
    /// The task's render target.
    pub render_target: Arc<RenderTarget>,
    /// The target's property record.
    pub properties: &'a RenderTargetProperties,
    /// The pass-private data block.
    pub data: &'a T,
}

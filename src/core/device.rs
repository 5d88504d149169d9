//! The graphics device abstraction the frame graph schedules against.
//!
//! Deimos never talks to a graphics API directly. Everything that touches the
//! GPU goes through [`RenderDevice`]: acquiring command lists, allocating
//! attachment memory and bracketing a pass with its resource-state
//! transitions. Backends implement this trait once; the scheduler and all of
//! its tests are written purely against it.

use anyhow::Result;

use crate::graph::descriptor::TaskType;
use crate::resource::format::{Extent, Format};
use crate::resource::target::RenderTarget;

/// Opaque handle to a command list (or a versioned set of command lists)
/// acquired from the device. Handles are issued by the backend's own
/// identifier allocator and have no meaning to the scheduler beyond identity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CommandListHandle(pub u64);

/// Opaque handle to a single GPU attachment allocation (one version of one
/// color or depth attachment).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentHandle(pub u64);

/// What an attachment is used for. Determines the memory layout and view
/// types the backend creates for it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttachmentUsage {
    /// Color attachment.
    Color,
    /// Depth(/stencil) attachment.
    Depth,
}

/// Everything the backend needs to materialize one attachment.
#[derive(Debug, Clone)]
pub struct AttachmentDescription<'a> {
    /// Diagnostic label, shows up in graphics debuggers.
    pub name: &'a str,
    /// Concrete dimensions. Already resolved from viewport-relative sizing,
    /// never zero.
    pub extent: Extent,
    /// Pixel format.
    pub format: Format,
    /// Color or depth usage.
    pub usage: AttachmentUsage,
    /// Multisample count, 1 for no multisampling.
    pub samples: u32,
}

/// Interface to the device backend.
///
/// The trait is object safe and shared as `Arc<dyn RenderDevice>` so that
/// worker-dispatched task executions can record commands concurrently. All
/// methods take `&self`; backends are expected to synchronize internally the
/// same way a `VkDevice` or `ID3D12Device` is externally synchronized per
/// object, not per device.
pub trait RenderDevice: Send + Sync {
    /// Acquire a command list of the category matching `task_type`, with
    /// `versions` buffered copies for frames in flight. Bundle tasks pass 1.
    ///
    /// # Errors
    /// * Fails if the backend cannot provide the requested category. The frame
    ///   graph treats this as a fatal configuration error and aborts graph
    ///   construction.
    fn acquire_command_list(
        &self,
        task_type: TaskType,
        versions: u32,
    ) -> Result<CommandListHandle>;

    /// Return a command list to the backend. Called exactly once per acquired
    /// list, during task destruction.
    fn release_command_list(&self, list: CommandListHandle) -> Result<()>;

    /// Transition `target` into its execute resource state and open the pass
    /// on `list`. Called by the scheduler immediately before a task's execute
    /// callback runs.
    fn begin_pass(
        &self,
        list: CommandListHandle,
        target: &RenderTarget,
        version: usize,
    ) -> Result<()>;

    /// Transition `target` into its finished resource state and close the
    /// pass on `list`. Called immediately after the execute callback returns.
    fn end_pass(
        &self,
        list: CommandListHandle,
        target: &RenderTarget,
        version: usize,
    ) -> Result<()>;

    /// The backend's notion of the current frame index. Informational; the
    /// frame graph keeps its own frame counter for version indexing.
    fn current_frame_index(&self) -> usize;

    /// Allocate one attachment.
    ///
    /// # Errors
    /// * Fails with an allocation error if backing memory cannot be obtained.
    ///   The store propagates this instead of substituting a null target.
    fn create_attachment(&self, description: &AttachmentDescription) -> Result<AttachmentHandle>;

    /// Free an attachment previously created with
    /// [`create_attachment`](RenderDevice::create_attachment).
    fn destroy_attachment(&self, attachment: AttachmentHandle) -> Result<()>;

    /// Attachment backed by the presentation surface, for render-window
    /// targets. The surface owns this memory; the store never destroys it.
    fn surface_attachment(&self, version: usize) -> Result<AttachmentHandle>;
}

pub use crate::core::device::{
    AttachmentDescription, AttachmentHandle, AttachmentUsage, CommandListHandle, RenderDevice,
};
pub use crate::core::error::Error;
pub use crate::core::registry::{PipelineHandle, PipelineRegistry};
pub use crate::core::services::RenderServices;
pub use crate::core::settings::{GraphSettings, GraphSettingsBuilder};

pub use crate::graph::context::{ExecuteContext, ResizeContext, SetupContext, TaskDataView};
pub use crate::graph::descriptor::{TaskDescriptor, TaskDescriptorBuilder, TaskKey, TaskType};
pub use crate::graph::frame_graph::{FrameGraph, RenderTaskHandle};
pub use crate::graph::task::TaskState;

pub use crate::resource::format::{Extent, Format, ResourceState};
pub use crate::resource::properties::{
    RenderTargetProperties, RenderTargetPropertiesBuilder, RenderTargetSize,
    MAX_COLOR_ATTACHMENTS,
};
pub use crate::resource::store::RenderTargetStore;
pub use crate::resource::target::{AttachmentSet, RenderTarget};

pub use crate::sync::completion::CompletionHandle;

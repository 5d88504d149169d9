//! Task descriptors: the immutable configuration a render task is built from.

use std::fmt::{Display, Formatter};

use anyhow::Result;

use crate::graph::context::{ExecuteContext, ResizeContext, SetupContext};
use crate::resource::properties::RenderTargetProperties;

/// Which command-list category a task records into.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TaskType {
    /// Graphics queue work: draws, render passes.
    Graphics,
    /// Compute dispatches.
    Compute,
    /// Copy/transfer work.
    Copy,
    /// A pre-recorded bundle, replayed every frame. Bundles acquire exactly
    /// one command list instead of one per frame in flight.
    Bundle,
}

impl TaskType {
    /// Whether command lists of this category are buffered per frame in
    /// flight.
    pub fn is_versioned(self) -> bool {
        !matches!(self, TaskType::Bundle)
    }
}

/// Stable identifier distinguishing pass kinds within one frame graph. Used
/// both to store a pass's private data and to let later passes request "the
/// render target produced by the pass registered as key X". Keys must be
/// unique per graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey(&'static str);

impl TaskKey {
    /// Create a key from a stable name. Intended for `const` declarations
    /// next to the pass definition.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The key's name.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Display for TaskKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

pub(crate) type SetupFn<D> =
    Box<dyn FnMut(&mut SetupContext<'_>, &mut D) -> Result<()> + Send>;
pub(crate) type ExecuteFn<D, S> =
    Box<dyn FnMut(&mut ExecuteContext<'_, S>, &mut D) -> Result<()> + Send>;
pub(crate) type ResizeFn<D> =
    Box<dyn FnMut(&mut ResizeContext<'_>, &mut D, u32, u32) -> Result<()> + Send>;
pub(crate) type DestroyFn<D> = Box<dyn FnMut(&mut D) + Send>;

/// Immutable configuration record for one render task: its type key, command
/// list category, threading eligibility, render target properties, declared
/// upstream dependencies and the four lifecycle callbacks.
///
/// `D` is the pass-private data block, default-constructed when the task is
/// registered. `S` is the scene snapshot type handed to execute callbacks.
/// Obtain descriptors through a [`TaskDescriptorBuilder`].
#[derive(Derivative)]
#[derivative(Debug)]
pub struct TaskDescriptor<D, S = ()> {
    pub(crate) key: TaskKey,
    pub(crate) task_type: TaskType,
    pub(crate) allow_multithreading: bool,
    pub(crate) properties: RenderTargetProperties,
    pub(crate) dependencies: Vec<TaskKey>,
    #[derivative(Debug = "ignore")]
    pub(crate) setup: Option<SetupFn<D>>,
    #[derivative(Debug = "ignore")]
    pub(crate) execute: Option<ExecuteFn<D, S>>,
    #[derivative(Debug = "ignore")]
    pub(crate) resize: Option<ResizeFn<D>>,
    #[derivative(Debug = "ignore")]
    pub(crate) destroy: Option<DestroyFn<D>>,
}

/// Builder for [`TaskDescriptor`] objects.
///
/// # Example
/// ```
/// use deimos::prelude::*;
///
/// const SHADOW: TaskKey = TaskKey::new("shadow");
///
/// #[derive(Default)]
/// struct ShadowData {
///     cascade_count: u32,
/// }
///
/// let descriptor = TaskDescriptorBuilder::<ShadowData>::new(SHADOW, TaskType::Graphics)
///     .properties(
///         RenderTargetPropertiesBuilder::new("shadow atlas")
///             .absolute_size(4096, 4096)
///             .depth_format(Format::D32Float)
///             .clear_depth(true)
///             .build()?,
///     )
///     .multithreaded(true)
///     .setup(|_ctx, data: &mut ShadowData| {
///         data.cascade_count = 4;
///         Ok(())
///     })
///     .build();
/// # anyhow::Ok(())
/// ```
pub struct TaskDescriptorBuilder<D, S = ()> {
    inner: TaskDescriptor<D, S>,
}

impl<D, S> TaskDescriptorBuilder<D, S> {
    /// Start describing a task. Defaults: inline execution, no declared
    /// dependencies, a viewport-sized target with no attachments, and no-op
    /// callbacks for every phase that is not set.
    pub fn new(key: TaskKey, task_type: TaskType) -> Self {
        Self {
            inner: TaskDescriptor {
                key,
                task_type,
                allow_multithreading: false,
                properties: RenderTargetProperties {
                    name: key.as_str().to_owned(),
                    is_render_window: false,
                    size: Default::default(),
                    execute_state: Default::default(),
                    finished_state: Default::default(),
                    color_formats: Vec::new(),
                    depth_format: None,
                    clear_color: false,
                    clear_depth: false,
                    samples: 1,
                },
                dependencies: Vec::new(),
                setup: None,
                execute: None,
                resize: None,
                destroy: None,
            },
        }
    }

    /// Set the render target properties.
    pub fn properties(mut self, properties: RenderTargetProperties) -> Self {
        self.inner.properties = properties;
        self
    }

    /// Allow this task's execute callback to be dispatched onto a worker
    /// thread. Tasks without this run inline, in registration order, on the
    /// thread that called [`FrameGraph::execute`](crate::FrameGraph::execute).
    pub fn multithreaded(mut self, allow: bool) -> Self {
        self.inner.allow_multithreading = allow;
        self
    }

    /// Declare that this task consumes the output of the task registered as
    /// `key`. Checked at registration time: the dependency must already be
    /// registered, so a miswired graph fails before any callback runs.
    pub fn depends_on(mut self, key: TaskKey) -> Self {
        self.inner.dependencies.push(key);
        self
    }

    /// Set the setup callback, invoked once after the task's command list and
    /// render target have been acquired.
    pub fn setup<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut SetupContext<'_>, &mut D) -> Result<()> + Send + 'static,
    {
        self.inner.setup = Some(Box::new(f));
        self
    }

    /// Set the execute callback, invoked once per rendered frame between the
    /// pass's resource-state transitions. This is the only place a pass may
    /// read a predecessor's render target.
    pub fn execute<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut ExecuteContext<'_, S>, &mut D) -> Result<()> + Send + 'static,
    {
        self.inner.execute = Some(Box::new(f));
        self
    }

    /// Set the resize callback, invoked with the new viewport dimensions
    /// after the task's render target has been resized.
    pub fn resize<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut ResizeContext<'_>, &mut D, u32, u32) -> Result<()> + Send + 'static,
    {
        self.inner.resize = Some(Box::new(f));
        self
    }

    /// Set the destroy callback, invoked exactly once at graph teardown with
    /// the private data block, so pass-owned GPU sub-resources are freed
    /// deterministically.
    pub fn destroy<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut D) + Send + 'static,
    {
        self.inner.destroy = Some(Box::new(f));
        self
    }

    /// Obtain the built descriptor.
    pub fn build(self) -> TaskDescriptor<D, S> {
        self.inner
    }
}

//! Live render task instances and their lifecycle state machine.

use std::any::Any;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::core::device::CommandListHandle;
use crate::core::services::RenderServices;
use crate::graph::context::{ExecuteContext, ResizeContext, SetupContext, TaskDataView};
use crate::graph::descriptor::{
    DestroyFn, ExecuteFn, ResizeFn, SetupFn, TaskDescriptor, TaskKey, TaskType,
};
use crate::resource::properties::RenderTargetProperties;
use crate::resource::target::RenderTarget;
use crate::Error;

/// Lifecycle state of a render task.
///
/// `Created → SetUp → Idle ⇄ Executing`, with `Resizing` entered from
/// `SetUp`/`Idle` on viewport changes. `Destroyed` is terminal and reached
/// exactly once.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Registered, not yet set up.
    Created,
    /// Setup ran; no frame executed yet.
    SetUp,
    /// Between frames.
    Idle,
    /// An execute callback is running (possibly on a worker).
    Executing,
    /// A resize is in progress.
    Resizing,
    /// Destroy ran. Terminal.
    Destroyed,
}

/// Dispatch interface over a task's typed callbacks and private data.
/// Replaces per-pass inheritance: the graph stores one boxed delegate per
/// task and never sees the concrete data type.
pub(crate) trait TaskDelegate<S>: Send {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()>;
    fn execute(&mut self, ctx: &mut ExecuteContext<'_, S>) -> Result<()>;
    fn resize(&mut self, ctx: &mut ResizeContext<'_>, width: u32, height: u32) -> Result<()>;
    fn destroy(&mut self);
    fn data(&self) -> &dyn Any;
}

struct TypedDelegate<D, S> {
    data: D,
    setup: Option<SetupFn<D>>,
    execute: Option<ExecuteFn<D, S>>,
    resize: Option<ResizeFn<D>>,
    destroy: Option<DestroyFn<D>>,
}

impl<D: Send + 'static, S> TaskDelegate<S> for TypedDelegate<D, S> {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        match &mut self.setup {
            Some(f) => f(ctx, &mut self.data),
            None => Ok(()),
        }
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_, S>) -> Result<()> {
        match &mut self.execute {
            Some(f) => f(ctx, &mut self.data),
            None => Ok(()),
        }
    }

    fn resize(&mut self, ctx: &mut ResizeContext<'_>, width: u32, height: u32) -> Result<()> {
        match &mut self.resize {
            Some(f) => f(ctx, &mut self.data, width, height),
            None => Ok(()),
        }
    }

    fn destroy(&mut self) {
        if let Some(f) = &mut self.destroy {
            f(&mut self.data);
        }
    }

    fn data(&self) -> &dyn Any {
        &self.data
    }
}

struct TaskInner<S> {
    state: TaskState,
    command_list: Option<CommandListHandle>,
    delegate: Box<dyn TaskDelegate<S>>,
}

/// A live render task. Shared as `Arc<TaskSlot>` between the graph and any
/// worker currently executing it.
///
/// The render target reference and the completion handle live outside the
/// task mutex on purpose: predecessor lookups read them while the producing
/// task's execute callback holds the inner lock.
#[derive(Derivative)]
#[derivative(Debug)]
pub(crate) struct TaskSlot<S> {
    key: TaskKey,
    task_type: TaskType,
    allow_multithreading: bool,
    properties: RenderTargetProperties,
    target: Mutex<Option<Arc<RenderTarget>>>,
    completion: crate::sync::completion::CompletionHandle,
    #[derivative(Debug = "ignore")]
    failure: Mutex<Option<anyhow::Error>>,
    #[derivative(Debug = "ignore")]
    inner: Mutex<TaskInner<S>>,
}

impl<S: 'static> TaskSlot<S> {
    pub(crate) fn new<D: Default + Send + 'static>(descriptor: TaskDescriptor<D, S>) -> Self {
        Self {
            key: descriptor.key,
            task_type: descriptor.task_type,
            allow_multithreading: descriptor.allow_multithreading,
            properties: descriptor.properties,
            target: Mutex::new(None),
            completion: Default::default(),
            failure: Mutex::new(None),
            inner: Mutex::new(TaskInner {
                state: TaskState::Created,
                command_list: None,
                delegate: Box::new(TypedDelegate {
                    data: D::default(),
                    setup: descriptor.setup,
                    execute: descriptor.execute,
                    resize: descriptor.resize,
                    destroy: descriptor.destroy,
                }),
            }),
        }
    }

    pub(crate) fn key(&self) -> TaskKey {
        self.key
    }

    pub(crate) fn properties(&self) -> &RenderTargetProperties {
        &self.properties
    }

    pub(crate) fn allow_multithreading(&self) -> bool {
        self.allow_multithreading
    }

    pub(crate) fn completion(&self) -> &crate::sync::completion::CompletionHandle {
        &self.completion
    }

    pub(crate) fn render_target(&self) -> Option<Arc<RenderTarget>> {
        self.target.lock().unwrap().clone()
    }

    pub(crate) fn state(&self) -> TaskState {
        self.inner.lock().unwrap().state
    }

    /// Completion barrier: block until any in-flight execution has finished
    /// and surface an error it may have recorded.
    pub(crate) fn join(&self) -> Result<()> {
        self.completion.wait();
        let failure = self.failure.lock().map_err(Error::from)?.take();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Completion barrier for readers that do not own this task's failure:
    /// block until any in-flight execution has finished and report a recorded
    /// failure without consuming it, so the owning graph still surfaces it at
    /// its own join point.
    pub(crate) fn wait_idle(&self) -> Result<()> {
        self.completion.wait();
        let failure = self.failure.lock().map_err(Error::from)?;
        match failure.as_ref() {
            Some(err) => Err(Error::DependencyFailed {
                key: self.key,
                message: format!("{err:#}"),
            }
            .into()),
            None => Ok(()),
        }
    }

    pub(crate) fn record_failure(&self, err: anyhow::Error) {
        *self.failure.lock().unwrap() = Some(err);
    }

    /// Acquire the command list and render target, then run the setup
    /// callback. Runs exactly once per task.
    pub(crate) fn run_setup(
        &self,
        services: &RenderServices,
        target: Arc<RenderTarget>,
        versions: usize,
    ) -> Result<()> {
        let mut inner = self.inner.lock().map_err(Error::from)?;
        match inner.state {
            TaskState::Created => {}
            TaskState::Destroyed => return Err(Error::TaskDestroyed(self.key).into()),
            _ => return Err(Error::Uncategorized("Setup may only run once per task").into()),
        }

        let list_versions = if self.task_type.is_versioned() {
            versions as u32
        } else {
            1
        };
        let list = services
            .device
            .acquire_command_list(self.task_type, list_versions)?;
        inner.command_list = Some(list);
        *self.target.lock().map_err(Error::from)? = Some(target.clone());

        let mut ctx = SetupContext {
            device: services.device.as_ref(),
            pipelines: &services.pipelines,
            command_list: list,
            target: &target,
            version_count: versions,
        };
        inner.delegate.setup(&mut ctx)?;
        inner.state = TaskState::SetUp;
        trace!("set up render task '{}'", self.key);
        Ok(())
    }

    /// Run one frame's execution: transition the target into its execute
    /// state, invoke the callback, transition into the finished state.
    pub(crate) fn run_execute(
        &self,
        services: &RenderServices,
        scene: &S,
        predecessors: &[Arc<TaskSlot<S>>],
        frame: usize,
        versions: usize,
    ) -> Result<()> {
        let mut inner = self.inner.lock().map_err(Error::from)?;
        match inner.state {
            TaskState::SetUp | TaskState::Idle => {}
            TaskState::Created => return Err(Error::NotSetUp(self.key).into()),
            TaskState::Destroyed => return Err(Error::TaskDestroyed(self.key).into()),
            _ => {
                return Err(
                    Error::Uncategorized("Task execution dispatched while already running").into(),
                )
            }
        }
        let list = inner.command_list.ok_or(Error::NotSetUp(self.key))?;
        let target = self.render_target().ok_or(Error::NotSetUp(self.key))?;
        inner.state = TaskState::Executing;
        let version = if self.task_type.is_versioned() {
            frame % versions
        } else {
            0
        };

        let result = self.execute_bracket(
            &mut inner,
            services,
            scene,
            predecessors,
            list,
            &target,
            frame,
            version,
        );
        // The task returns to Idle even when the callback failed; the error
        // itself is surfaced at the next join point.
        inner.state = TaskState::Idle;
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_bracket(
        &self,
        inner: &mut TaskInner<S>,
        services: &RenderServices,
        scene: &S,
        predecessors: &[Arc<TaskSlot<S>>],
        list: CommandListHandle,
        target: &Arc<RenderTarget>,
        frame: usize,
        version: usize,
    ) -> Result<()> {
        let device = services.device.as_ref();
        device.begin_pass(list, target, version)?;
        target.set_state(self.properties.execute_state);

        let mut ctx = ExecuteContext {
            device,
            pipelines: &services.pipelines,
            command_list: list,
            target,
            scene,
            frame_index: frame,
            version,
            predecessors,
        };
        inner.delegate.execute(&mut ctx)?;

        device.end_pass(list, target, version)?;
        target.set_state(self.properties.finished_state);
        Ok(())
    }

    /// Run the resize callback. The render target itself was already resized
    /// by the store; callers must have joined any in-flight execution.
    pub(crate) fn run_resize(
        &self,
        services: &RenderServices,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let mut inner = self.inner.lock().map_err(Error::from)?;
        match inner.state {
            TaskState::SetUp | TaskState::Idle => {}
            TaskState::Created => return Err(Error::NotSetUp(self.key).into()),
            TaskState::Destroyed => return Err(Error::TaskDestroyed(self.key).into()),
            _ => return Err(Error::Uncategorized("Resize during an in-flight execution").into()),
        }
        let list = inner.command_list.ok_or(Error::NotSetUp(self.key))?;
        let target = self.render_target().ok_or(Error::NotSetUp(self.key))?;
        inner.state = TaskState::Resizing;
        let mut ctx = ResizeContext {
            device: services.device.as_ref(),
            pipelines: &services.pipelines,
            command_list: list,
            target: &target,
        };
        let result = inner.delegate.resize(&mut ctx, width, height);
        inner.state = TaskState::Idle;
        result
    }

    /// Release the command list and invoke the destroy callback. Terminal;
    /// callers must have joined any in-flight execution.
    pub(crate) fn run_destroy(&self, services: &RenderServices) -> Result<()> {
        let mut inner = self.inner.lock().map_err(Error::from)?;
        if inner.state == TaskState::Destroyed {
            return Err(Error::TaskDestroyed(self.key).into());
        }

        if let Some(list) = inner.command_list.take() {
            services.device.release_command_list(list)?;
        }
        inner.delegate.destroy();
        inner.state = TaskState::Destroyed;
        trace!("destroyed render task '{}'", self.key);
        Ok(())
    }

    /// Read-only view of {render target, properties, data}, with a checked
    /// cast of the private data block.
    pub(crate) fn with_data<T: 'static, R>(
        &self,
        f: impl FnOnce(TaskDataView<'_, T>) -> R,
    ) -> Result<R> {
        let inner = self.inner.lock().map_err(Error::from)?;
        if inner.state == TaskState::Destroyed {
            return Err(Error::TaskDestroyed(self.key).into());
        }
        let data = inner
            .delegate
            .data()
            .downcast_ref::<T>()
            .ok_or(Error::TypeMismatch {
                key: self.key,
                expected: std::any::type_name::<T>(),
            })?;
        let render_target = self.render_target().ok_or(Error::NotSetUp(self.key))?;
        Ok(f(TaskDataView {
            render_target,
            properties: &self.properties,
            data,
        }))
    }
}

static_assertions::assert_impl_all!(TaskSlot<()>: Send, Sync);

//! The frame graph: registration, scheduling and lifecycle driving.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{Graph, NodeIndex};
use petgraph::Directed;

use crate::core::services::RenderServices;
use crate::core::settings::GraphSettings;
use crate::graph::context::TaskDataView;
use crate::graph::descriptor::{TaskDescriptor, TaskKey};
use crate::graph::task::{TaskSlot, TaskState};
use crate::resource::format::Extent;
use crate::resource::store::RenderTargetStore;
use crate::resource::target::RenderTarget;
use crate::Error;

/// Opaque handle to a task registered in a [`FrameGraph`], returned by
/// [`FrameGraph::add_task`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RenderTaskHandle(pub(crate) usize);

/// An ordered collection of render tasks plus the render target store backing
/// them.
///
/// `S` is the scene snapshot type handed to execute callbacks; it defaults to
/// `()` for graphs that do not consume scene data.
///
/// Registration order is the execution order. A task may declare dependencies
/// with [`TaskDescriptorBuilder::depends_on`](crate::TaskDescriptorBuilder::depends_on);
/// those are validated at registration time against the tasks already present,
/// so any miswiring fails before a single callback has run. The declared edges
/// are mirrored into a [`petgraph`] graph for diagnostics ([`FrameGraph::dot`])
/// and a cycle check.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct FrameGraph<S = ()> {
    name: String,
    #[derivative(Debug = "ignore")]
    tasks: Vec<Arc<TaskSlot<S>>>,
    index: HashMap<TaskKey, usize>,
    graph: Graph<&'static str, (), Directed>,
    nodes: Vec<NodeIndex>,
    store: RenderTargetStore,
    versions: usize,
    current_frame: usize,
    built: bool,
    destroyed: bool,
}

impl<S: 'static> FrameGraph<S> {
    /// Create an empty frame graph.
    pub fn new(settings: GraphSettings) -> Self {
        Self {
            name: settings.name,
            tasks: Vec::new(),
            index: HashMap::new(),
            graph: Graph::new(),
            nodes: Vec::new(),
            store: RenderTargetStore::new(settings.viewport, settings.versions),
            versions: settings.versions.max(1),
            current_frame: 0,
            built: false,
            destroyed: false,
        }
    }

    /// Diagnostic name of this graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of frames in flight.
    pub fn version_count(&self) -> usize {
        self.versions
    }

    /// Number of frames dispatched so far.
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// The viewport extent viewport-relative targets are currently sized
    /// against.
    pub fn viewport(&self) -> Extent {
        self.store.viewport()
    }

    /// Number of registered tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Register a render task at the end of the execution order. `D` is the
    /// pass-private data block, default-constructed here.
    ///
    /// # Errors
    /// * Fails with [`Error::DuplicateTaskKey`] if the key is already taken.
    /// * Fails with [`Error::DependencyNotFound`] if a declared dependency is
    ///   not registered yet. Dependencies must point strictly backwards.
    ///
    /// All validation happens before the task is stored, so a rejected
    /// registration leaves the graph unchanged and no callback ever runs.
    pub fn add_task<D: Default + Send + 'static>(
        &mut self,
        descriptor: TaskDescriptor<D, S>,
    ) -> Result<RenderTaskHandle> {
        if self.built {
            return Err(Error::Uncategorized("Tasks must be registered before setup()").into());
        }
        if self.index.contains_key(&descriptor.key) {
            return Err(Error::DuplicateTaskKey(descriptor.key).into());
        }
        for dependency in &descriptor.dependencies {
            if !self.index.contains_key(dependency) {
                return Err(Error::DependencyNotFound(*dependency).into());
            }
        }

        let key = descriptor.key;
        let node = self.graph.add_node(key.as_str());
        for dependency in &descriptor.dependencies {
            let from = self.nodes[self.index[dependency]];
            self.graph.add_edge(from, node, ());
        }
        // Dependencies only ever point at earlier registrations, so a cycle
        // is impossible by construction. Keep the hard check anyway.
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(Error::GraphHasCycle.into());
        }

        let handle = RenderTaskHandle(self.tasks.len());
        self.tasks.push(Arc::new(TaskSlot::new(descriptor)));
        self.nodes.push(node);
        self.index.insert(key, handle.0);
        trace!("registered render task '{}' in graph '{}'", key, self.name);
        Ok(handle)
    }

    /// Look up the handle of the task registered under `key`.
    pub fn task_handle(&self, key: TaskKey) -> Option<RenderTaskHandle> {
        self.index.get(&key).map(|&i| RenderTaskHandle(i))
    }

    /// Current lifecycle state of a task.
    pub fn task_state(&self, handle: RenderTaskHandle) -> Result<TaskState> {
        let slot = self.tasks.get(handle.0).ok_or(Error::TaskNotFound)?;
        Ok(slot.state())
    }

    /// Set up every task in registration order: materialize its render target
    /// in the store, acquire its command list, run its setup callback.
    /// Runs once per graph.
    pub fn setup(&mut self, services: &RenderServices) -> Result<()> {
        if self.built {
            return Err(Error::Uncategorized("Graph setup may only run once").into());
        }
        for slot in &self.tasks {
            let target = self.store.create(services.device.as_ref(), slot.properties())?;
            slot.run_setup(services, target, self.versions)?;
        }
        self.built = true;
        info!(
            "frame graph '{}' set up with {} task(s), {} frame(s) in flight",
            self.name,
            self.tasks.len(),
            self.versions
        );
        Ok(())
    }

    /// Resize every render target against a new viewport extent and invoke
    /// the resize callbacks, in registration order. Joins any in-flight
    /// execution first. Idempotent: targets whose computed dimensions did not
    /// change are not reallocated.
    pub fn resize(&mut self, services: &RenderServices, width: u32, height: u32) -> Result<()> {
        if !self.built {
            return Err(Error::Uncategorized("Resize on a graph that was never set up").into());
        }
        if self.destroyed {
            return Err(Error::Uncategorized("Resize on a destroyed graph").into());
        }
        let viewport = Extent::new(width, height);
        for slot in &self.tasks {
            slot.join()?;
            let target = slot.render_target().ok_or(Error::NotSetUp(slot.key()))?;
            self.store.resize(services.device.as_ref(), &target, viewport)?;
            slot.run_resize(services, viewport.width, viewport.height)?;
        }
        info!(
            "frame graph '{}' resized to {}x{}",
            self.name, viewport.width, viewport.height
        );
        Ok(())
    }

    /// Tear the graph down: destroy every task in reverse registration order,
    /// then free all render targets. Joins in-flight executions first, so no
    /// resource is freed under a running callback. Runs once; the graph is
    /// unusable afterwards.
    pub fn destroy(&mut self, services: &RenderServices) -> Result<()> {
        if self.destroyed {
            return Err(Error::Uncategorized("Frame graph was already destroyed").into());
        }
        for slot in self.tasks.iter().rev() {
            slot.join()?;
            slot.run_destroy(services)?;
        }
        self.store.release_all(services.device.as_ref())?;
        self.destroyed = true;
        info!("frame graph '{}' destroyed", self.name);
        Ok(())
    }

    /// Read a task's observable state under a typed view. Joins any in-flight
    /// execution of that task first, so the view is never torn.
    ///
    /// # Errors
    /// Fails with [`Error::TypeMismatch`] if `T` is not the task's data type.
    pub fn with_data<T: 'static, R>(
        &self,
        handle: RenderTaskHandle,
        f: impl FnOnce(TaskDataView<'_, T>) -> R,
    ) -> Result<R> {
        let slot = self.tasks.get(handle.0).ok_or(Error::TaskNotFound)?;
        slot.join()?;
        slot.with_data(f)
    }

    /// The render target of a task. Joins any in-flight execution first.
    pub fn render_target(&self, handle: RenderTaskHandle) -> Result<Arc<RenderTarget>> {
        let slot = self.tasks.get(handle.0).ok_or(Error::TaskNotFound)?;
        slot.join()?;
        slot.render_target()
            .ok_or_else(|| Error::NotSetUp(slot.key()).into())
    }

    /// The render target backed by the presentation surface. Joins its
    /// producing task first. When several tasks render to the window, the
    /// last registered one wins.
    ///
    /// # Errors
    /// Fails with [`Error::NoRenderWindow`] if no task declared a
    /// render-window target.
    pub fn render_window(&self) -> Result<Arc<RenderTarget>> {
        for slot in self.tasks.iter().rev() {
            if slot.properties().is_render_window {
                slot.join()?;
                return slot
                    .render_target()
                    .ok_or_else(|| Error::NotSetUp(slot.key()).into());
            }
        }
        Err(Error::NoRenderWindow.into())
    }

    /// The declared dependency edges in graphviz dot format, for debugging
    /// graph wiring.
    pub fn dot(&self) -> String {
        format!("{:?}", Dot::with_config(&self.graph, &[Config::EdgeNoLabel]))
    }
}

impl<S: Send + Sync + 'static> FrameGraph<S> {
    /// Execute one frame: dispatch every task in registration order.
    ///
    /// Tasks that opted in to multithreading are spawned onto the rayon
    /// thread pool after their completion barrier is reset; everything else
    /// runs inline on the calling thread. A worker failure is recorded on the
    /// task and surfaced at the next join point (the next `execute`, a data
    /// accessor, `resize` or `destroy`), never silently dropped. An inline
    /// failure aborts the frame immediately.
    ///
    /// The scene snapshot is shared read-only with every dispatched task and
    /// passed through to the execute callbacks unmodified.
    pub fn execute(&mut self, services: &RenderServices, scene: &Arc<S>) -> Result<()> {
        if !self.built {
            return Err(Error::Uncategorized("Graph executed before setup()").into());
        }
        if self.destroyed {
            return Err(Error::Uncategorized("Graph executed after destroy()").into());
        }

        let frame = self.current_frame;
        let versions = self.versions;
        for (i, slot) in self.tasks.iter().enumerate() {
            // Surfaces a failure recorded by this task's previous dispatch.
            slot.join()?;
            if slot.allow_multithreading() {
                slot.completion().reset();
                let slot = slot.clone();
                let services = services.clone();
                let scene = scene.clone();
                let predecessors: Vec<_> = self.tasks[..i].to_vec();
                rayon::spawn(move || {
                    let result =
                        slot.run_execute(&services, scene.as_ref(), &predecessors, frame, versions);
                    if let Err(err) = result {
                        error!("render task '{}' failed: {:#}", slot.key(), err);
                        slot.record_failure(err);
                    }
                    slot.completion().complete();
                });
            } else {
                slot.run_execute(services, scene.as_ref(), &self.tasks[..i], frame, versions)?;
            }
        }
        self.current_frame += 1;
        trace!("frame graph '{}' dispatched frame {}", self.name, frame);
        Ok(())
    }
}

impl<S> Drop for FrameGraph<S> {
    fn drop(&mut self) {
        if self.built && !self.destroyed {
            warn!("frame graph '{}' dropped without destroy()", self.name);
        }
    }
}

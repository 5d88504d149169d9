//! Declarative frame graph scheduler and render task lifecycle management
//!
//! Deimos turns an ordered list of named render passes into a resource-safe,
//! optionally multithreaded per-frame execution sequence against a graphics
//! device abstraction. It does not talk to any graphics API directly: command
//! list submission, attachment allocation and pipeline compilation all happen
//! behind the [`RenderDevice`](crate::RenderDevice) trait, which makes the
//! whole scheduler testable with a stub backend.
//!
//! A pass is described once with a [`TaskDescriptorBuilder`](crate::TaskDescriptorBuilder)
//! and registered into a [`FrameGraph`](crate::FrameGraph). Registration order
//! is the topological order: a task may only consume render targets produced
//! by tasks registered strictly before it, looked up by their
//! [`TaskKey`](crate::TaskKey).
//!
//! ```no_run
//! use std::sync::Arc;
//! use deimos::prelude::*;
//!
//! # fn run(device: Arc<dyn RenderDevice>) -> anyhow::Result<()> {
//! const GEOMETRY: TaskKey = TaskKey::new("geometry");
//! const COMPOSITE: TaskKey = TaskKey::new("composite");
//!
//! #[derive(Default)]
//! struct GeometryData {
//!     frame_count: u64,
//! }
//!
//! let services = RenderServices::new(device, Arc::new(PipelineRegistry::new()));
//! let settings = GraphSettingsBuilder::new()
//!     .name("forward renderer")
//!     .versions(2)
//!     .viewport(1280, 720)
//!     .build();
//!
//! let mut graph: FrameGraph = FrameGraph::new(settings);
//! graph.add_task::<GeometryData>(
//!     TaskDescriptorBuilder::new(GEOMETRY, TaskType::Graphics)
//!         .properties(
//!             RenderTargetPropertiesBuilder::new("geometry buffer")
//!                 .color_format(Format::Rgba16Float)
//!                 .depth_format(Format::D32Float)
//!                 .clear_color(true)
//!                 .build()?,
//!         )
//!         .execute(|_ctx, data: &mut GeometryData| {
//!             data.frame_count += 1;
//!             Ok(())
//!         })
//!         .build(),
//! )?;
//! graph.add_task::<()>(
//!     TaskDescriptorBuilder::new(COMPOSITE, TaskType::Graphics)
//!         .properties(
//!             RenderTargetPropertiesBuilder::new("present")
//!                 .render_window()
//!                 .build()?,
//!         )
//!         .depends_on(GEOMETRY)
//!         .execute(|ctx, _data: &mut ()| {
//!             let _input = ctx.predecessor_render_target(GEOMETRY)?;
//!             Ok(())
//!         })
//!         .build(),
//! )?;
//!
//! graph.setup(&services)?;
//! let scene = Arc::new(());
//! graph.execute(&services, &scene)?;
//! graph.destroy(&services)?;
//! # Ok(())
//! # }
//! ```
//!
//! For further documentation, check out the following modules
//! - [`graph`] for the frame graph, task descriptors and the task lifecycle.
//! - [`resource`] for render target properties and the render target store.
//! - [`sync`] for the completion barrier used by worker-dispatched tasks.
//! - [`core`] for the device abstraction and the pipeline registry.

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate log;

pub mod prelude;
pub use crate::prelude::*;

pub mod core;
pub mod graph;
pub mod resource;
pub mod sync;

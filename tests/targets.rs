//! Render target sizing, resize idempotence and attachment ownership tests.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use deimos::prelude::*;

mod framework;

const SCENE: TaskKey = TaskKey::new("scene");
const BLOOM: TaskKey = TaskKey::new("bloom");
const PRESENT: TaskKey = TaskKey::new("present");

fn settings(width: u32, height: u32) -> GraphSettings {
    GraphSettingsBuilder::new()
        .name("target tests")
        .versions(2)
        .viewport(width, height)
        .build()
}

#[test]
fn attachments_are_buffered_per_version() -> Result<()> {
    let (services, device) = framework::make_services();
    let mut graph: FrameGraph = FrameGraph::new(settings(800, 600));

    let handle = graph.add_task::<()>(
        TaskDescriptorBuilder::new(SCENE, TaskType::Graphics)
            .properties(
                RenderTargetPropertiesBuilder::new("scene")
                    .color_format(Format::Rgba16Float)
                    .color_format(Format::Rgba8Unorm)
                    .depth_format(Format::D32Float)
                    .build()?,
            )
            .build(),
    )?;
    graph.setup(&services)?;

    // 2 versions x (2 color + 1 depth).
    assert_eq!(device.created_attachments(), 6);
    let target = graph.render_target(handle)?;
    assert_eq!(target.version_count(), 2);
    assert_eq!(target.extent(), Extent::new(800, 600));
    assert!(target.depth_attachment(0).is_some());
    assert!(target.color_attachment(1, 1).is_some());

    graph.destroy(&services)?;
    assert_eq!(device.destroyed_attachments(), 6);
    Ok(())
}

#[test]
fn resize_is_idempotent() -> Result<()> {
    let (services, device) = framework::make_services();
    let mut graph: FrameGraph = FrameGraph::new(settings(800, 600));

    graph.add_task::<()>(
        TaskDescriptorBuilder::new(SCENE, TaskType::Graphics)
            .properties(
                RenderTargetPropertiesBuilder::new("scene")
                    .color_format(Format::Rgba8Unorm)
                    .build()?,
            )
            .build(),
    )?;
    graph.setup(&services)?;
    device.clear_events();

    // Same viewport, nothing to do.
    graph.resize(&services, 800, 600)?;
    assert_eq!(device.created_attachments(), 0);
    assert_eq!(device.destroyed_attachments(), 0);

    // New viewport: exactly one reallocation of the two versions, and the
    // old ones are freed.
    graph.resize(&services, 1024, 768)?;
    assert_eq!(device.created_attachments(), 2);
    assert_eq!(device.destroyed_attachments(), 2);

    // Repeating the same viewport is again a no-op.
    graph.resize(&services, 1024, 768)?;
    assert_eq!(device.created_attachments(), 2);

    graph.destroy(&services)?;
    Ok(())
}

#[test]
fn resolution_scalar_scales_with_the_viewport() -> Result<()> {
    let (services, _device) = framework::make_services();
    let mut graph: FrameGraph = FrameGraph::new(settings(800, 600));

    let resized_to = Arc::new(Mutex::new(None));
    let sink = resized_to.clone();
    let handle = graph.add_task::<()>(
        TaskDescriptorBuilder::new(BLOOM, TaskType::Compute)
            .properties(
                RenderTargetPropertiesBuilder::new("bloom half res")
                    .color_format(Format::Rgba16Float)
                    .resolution_scalar(0.5)
                    .execute_state(ResourceState::UnorderedAccess)
                    .build()?,
            )
            .resize(move |ctx, _data: &mut (), width, height| {
                *sink.lock().unwrap() = Some((width, height, ctx.render_target().extent()));
                Ok(())
            })
            .build(),
    )?;
    graph.setup(&services)?;

    assert_eq!(graph.render_target(handle)?.extent(), Extent::new(400, 300));

    graph.resize(&services, 400, 300)?;
    assert_eq!(graph.render_target(handle)?.extent(), Extent::new(200, 150));
    // The callback sees the viewport dimensions; its target was already
    // resized to the scaled extent when it runs.
    assert_eq!(*resized_to.lock().unwrap(), Some((400, 300, Extent::new(200, 150))));

    graph.destroy(&services)?;
    Ok(())
}

#[test]
fn absolute_size_ignores_viewport_changes() -> Result<()> {
    let (services, device) = framework::make_services();
    let mut graph: FrameGraph = FrameGraph::new(settings(800, 600));

    let handle = graph.add_task::<()>(
        TaskDescriptorBuilder::new(SCENE, TaskType::Graphics)
            .properties(
                RenderTargetPropertiesBuilder::new("shadow atlas")
                    .absolute_size(2048, 2048)
                    .depth_format(Format::D32Float)
                    .clear_depth(true)
                    .build()?,
            )
            .build(),
    )?;
    graph.setup(&services)?;
    device.clear_events();

    graph.resize(&services, 1920, 1080)?;
    assert_eq!(device.created_attachments(), 0);
    assert_eq!(graph.render_target(handle)?.extent(), Extent::new(2048, 2048));

    graph.destroy(&services)?;
    Ok(())
}

#[test]
fn render_window_is_backed_by_the_surface() -> Result<()> {
    let (services, device) = framework::make_services();
    let mut graph: FrameGraph = FrameGraph::new(settings(800, 600));

    let handle = graph.add_task::<()>(
        TaskDescriptorBuilder::new(PRESENT, TaskType::Graphics)
            .properties(RenderTargetPropertiesBuilder::new("present").render_window().build()?)
            .build(),
    )?;
    graph.setup(&services)?;

    // One surface lookup per version, no owned allocations.
    assert_eq!(device.surface_lookups(), 2);
    assert_eq!(device.created_attachments(), 0);
    let target = graph.render_target(handle)?;
    assert!(target.properties().is_render_window);
    assert_eq!(target.properties().finished_state, ResourceState::Present);
    assert!(Arc::ptr_eq(&graph.render_window()?, &target));

    // A render-window target takes the viewport extent verbatim on resize.
    graph.resize(&services, 1280, 720)?;
    assert_eq!(graph.render_target(handle)?.extent(), Extent::new(1280, 720));

    graph.destroy(&services)?;
    // The surface owns those attachments.
    assert_eq!(device.destroyed_attachments(), 0);
    Ok(())
}

#[test]
fn graphs_without_a_window_say_so() -> Result<()> {
    let (services, _device) = framework::make_services();
    let mut graph: FrameGraph = FrameGraph::new(settings(800, 600));
    graph.add_task::<()>(TaskDescriptorBuilder::new(SCENE, TaskType::Graphics).build())?;
    graph.setup(&services)?;

    let err = graph.render_window().unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoRenderWindow)));

    graph.destroy(&services)?;
    Ok(())
}

#[test]
fn bundle_tasks_share_one_command_list() -> Result<()> {
    let (services, device) = framework::make_services();
    let mut graph: FrameGraph = FrameGraph::new(settings(800, 600));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    graph.add_task::<()>(
        TaskDescriptorBuilder::new(SCENE, TaskType::Bundle)
            .execute(move |ctx, _data: &mut ()| {
                sink.lock().unwrap().push(ctx.version());
                Ok(())
            })
            .build(),
    )?;
    graph.setup(&services)?;

    let scene = Arc::new(());
    graph.execute(&services, &scene)?;
    graph.execute(&services, &scene)?;
    graph.execute(&services, &scene)?;
    graph.destroy(&services)?;

    // Bundles replay the same recording: version 0 every frame.
    assert_eq!(*seen.lock().unwrap(), vec![0, 0, 0]);
    assert_eq!(
        device
            .events()
            .iter()
            .filter(|e| matches!(e, framework::Event::AcquireList(_)))
            .count(),
        1
    );
    Ok(())
}

//! Worker dispatch and join-on-read tests. These exercise the completion
//! barrier with real rayon workers and deliberately slow callbacks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use deimos::prelude::*;

mod framework;

const PRODUCER: TaskKey = TaskKey::new("producer");
const CONSUMER: TaskKey = TaskKey::new("consumer");

fn settings() -> GraphSettings {
    GraphSettingsBuilder::new()
        .name("threading tests")
        .versions(2)
        .viewport(640, 480)
        .build()
}

#[derive(Default)]
struct SlowData {
    started: bool,
    value: u64,
}

#[test]
fn data_reads_join_worker_execution() -> Result<()> {
    let (services, _device) = framework::make_services();
    let mut graph: FrameGraph = FrameGraph::new(settings());

    let handle = graph.add_task::<SlowData>(
        TaskDescriptorBuilder::new(PRODUCER, TaskType::Compute)
            .multithreaded(true)
            .execute(|_ctx, data: &mut SlowData| {
                data.started = true;
                std::thread::sleep(Duration::from_millis(30));
                data.value = 42;
                Ok(())
            })
            .build(),
    )?;
    graph.setup(&services)?;

    let scene = Arc::new(());
    graph.execute(&services, &scene)?;

    // Blocks until the worker finished; the half-written state with
    // `started` set but `value` still zero is never observable here.
    let value = graph.with_data(handle, |view: TaskDataView<SlowData>| {
        assert!(view.data.started);
        view.data.value
    })?;
    assert_eq!(value, 42);

    graph.destroy(&services)?;
    Ok(())
}

#[test]
fn inline_consumers_join_their_producers() -> Result<()> {
    let (services, _device) = framework::make_services();
    let mut graph: FrameGraph = FrameGraph::new(settings());

    let order = Arc::new(Mutex::new(Vec::new()));

    let sink = order.clone();
    graph.add_task::<()>(
        TaskDescriptorBuilder::new(PRODUCER, TaskType::Graphics)
            .properties(
                RenderTargetPropertiesBuilder::new("producer")
                    .color_format(Format::Rgba8Unorm)
                    .build()?,
            )
            .multithreaded(true)
            .execute(move |_ctx, _data: &mut ()| {
                std::thread::sleep(Duration::from_millis(30));
                sink.lock().unwrap().push("producer");
                Ok(())
            })
            .build(),
    )?;
    let sink = order.clone();
    graph.add_task::<()>(
        TaskDescriptorBuilder::new(CONSUMER, TaskType::Graphics)
            .depends_on(PRODUCER)
            .execute(move |ctx, _data: &mut ()| {
                let input = ctx.predecessor_render_target(PRODUCER)?;
                // The lookup joined the worker, so the producer's target has
                // reached its finished state.
                assert_eq!(input.current_state(), ResourceState::PixelShaderResource);
                sink.lock().unwrap().push("consumer");
                Ok(())
            })
            .build(),
    )?;

    graph.setup(&services)?;
    let scene = Arc::new(());
    graph.execute(&services, &scene)?;
    graph.destroy(&services)?;

    assert_eq!(*order.lock().unwrap(), vec!["producer", "consumer"]);
    Ok(())
}

#[test]
fn worker_failure_surfaces_at_the_next_join() -> Result<()> {
    let (services, _device) = framework::make_services();
    let mut graph: FrameGraph = FrameGraph::new(settings());

    graph.add_task::<()>(
        TaskDescriptorBuilder::new(PRODUCER, TaskType::Compute)
            .multithreaded(true)
            .execute(|_ctx, _data: &mut ()| Err(anyhow::anyhow!("device lost")))
            .build(),
    )?;
    graph.setup(&services)?;

    let scene = Arc::new(());
    // Dispatch itself succeeds; the failure happens on the worker.
    graph.execute(&services, &scene)?;
    // The next frame joins the failed execution and surfaces its error.
    let err = graph.execute(&services, &scene).unwrap_err();
    assert!(err.to_string().contains("device lost"));

    // The failure was consumed; teardown proceeds normally.
    graph.destroy(&services)?;
    Ok(())
}

#[test]
fn consumers_fail_when_their_producer_failed() -> Result<()> {
    let (services, _device) = framework::make_services();
    let mut graph: FrameGraph = FrameGraph::new(settings());

    graph.add_task::<()>(
        TaskDescriptorBuilder::new(PRODUCER, TaskType::Compute)
            .multithreaded(true)
            .execute(|_ctx, _data: &mut ()| Err(anyhow::anyhow!("device lost mid-pass")))
            .build(),
    )?;
    let past_lookup = Arc::new(AtomicUsize::new(0));
    let counter = past_lookup.clone();
    graph.add_task::<()>(
        TaskDescriptorBuilder::new(CONSUMER, TaskType::Graphics)
            .depends_on(PRODUCER)
            .execute(move |ctx, _data: &mut ()| {
                let _input = ctx.predecessor_render_target(PRODUCER)?;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build(),
    )?;
    graph.setup(&services)?;

    let scene = Arc::new(());
    // The consumer's lookup joins the failed producer and fails the frame;
    // the producer's target never reached its finished state and is never
    // handed out.
    let err = graph.execute(&services, &scene).unwrap_err();
    assert!(err.to_string().contains("device lost mid-pass"));
    assert_eq!(past_lookup.load(Ordering::SeqCst), 0);

    // The lookup did not consume the failure: the producer's own join point
    // still reports it.
    let err = graph.execute(&services, &scene).unwrap_err();
    assert!(err.to_string().contains("device lost mid-pass"));

    graph.destroy(&services)?;
    Ok(())
}

#[test]
fn destroy_joins_in_flight_workers() -> Result<()> {
    let (services, _device) = framework::make_services();
    let mut graph: FrameGraph = FrameGraph::new(settings());

    let completed = Arc::new(AtomicUsize::new(0));
    let counter = completed.clone();
    graph.add_task::<()>(
        TaskDescriptorBuilder::new(PRODUCER, TaskType::Compute)
            .multithreaded(true)
            .execute(move |_ctx, _data: &mut ()| {
                std::thread::sleep(Duration::from_millis(30));
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build(),
    )?;
    graph.setup(&services)?;

    let scene = Arc::new(());
    graph.execute(&services, &scene)?;
    graph.destroy(&services)?;

    // destroy() waited for the worker instead of tearing down under it.
    assert_eq!(completed.load(Ordering::SeqCst), 1);
    Ok(())
}

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use deimos::prelude::*;

/// One observable backend call, recorded in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    AcquireList(u64),
    ReleaseList(u64),
    CreateAttachment(u64),
    DestroyAttachment(u64),
    BeginPass(String),
    EndPass(String),
    SurfaceAttachment(usize),
}

/// Stub backend: hands out sequential handles and records every call so tests
/// can assert on allocation counts and dispatch order.
#[derive(Debug, Default)]
pub struct StubDevice {
    next_list: AtomicU64,
    next_attachment: AtomicU64,
    events: Mutex<Vec<Event>>,
}

impl StubDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().unwrap().clear();
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn created_attachments(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::CreateAttachment(_)))
            .count()
    }

    pub fn destroyed_attachments(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::DestroyAttachment(_)))
            .count()
    }

    pub fn surface_lookups(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::SurfaceAttachment(_)))
            .count()
    }

    /// Names of the render targets passes were opened on, in dispatch order.
    pub fn pass_order(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                Event::BeginPass(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

impl RenderDevice for StubDevice {
    fn acquire_command_list(&self, _task_type: TaskType, _versions: u32) -> Result<CommandListHandle> {
        let handle = CommandListHandle(self.next_list.fetch_add(1, Ordering::SeqCst));
        self.record(Event::AcquireList(handle.0));
        Ok(handle)
    }

    fn release_command_list(&self, list: CommandListHandle) -> Result<()> {
        self.record(Event::ReleaseList(list.0));
        Ok(())
    }

    fn begin_pass(&self, _list: CommandListHandle, target: &RenderTarget, _version: usize) -> Result<()> {
        self.record(Event::BeginPass(target.properties().name.clone()));
        Ok(())
    }

    fn end_pass(&self, _list: CommandListHandle, target: &RenderTarget, _version: usize) -> Result<()> {
        self.record(Event::EndPass(target.properties().name.clone()));
        Ok(())
    }

    fn current_frame_index(&self) -> usize {
        0
    }

    fn create_attachment(&self, _description: &AttachmentDescription) -> Result<AttachmentHandle> {
        let handle = AttachmentHandle(self.next_attachment.fetch_add(1, Ordering::SeqCst));
        self.record(Event::CreateAttachment(handle.0));
        Ok(handle)
    }

    fn destroy_attachment(&self, attachment: AttachmentHandle) -> Result<()> {
        self.record(Event::DestroyAttachment(attachment.0));
        Ok(())
    }

    fn surface_attachment(&self, version: usize) -> Result<AttachmentHandle> {
        self.record(Event::SurfaceAttachment(version));
        // Surface images live outside the store's allocation space.
        Ok(AttachmentHandle(0xF000 + version as u64))
    }
}

pub fn make_services() -> (RenderServices, Arc<StubDevice>) {
    let _ = pretty_env_logger::try_init();
    let device = Arc::new(StubDevice::new());
    let services = RenderServices::new(device.clone(), Arc::new(PipelineRegistry::new()));
    (services, device)
}

//! Live render target objects.

use std::sync::Mutex;

use crate::core::device::AttachmentHandle;
use crate::resource::format::{Extent, ResourceState};
use crate::resource::properties::RenderTargetProperties;

/// One frame-in-flight version of a render target: its color attachments and
/// the optional depth attachment.
#[derive(Debug, Clone, Default)]
pub struct AttachmentSet {
    /// Color attachments, in the order of the declared color formats.
    pub colors: Vec<AttachmentHandle>,
    /// Depth attachment if the target declares a depth buffer.
    pub depth: Option<AttachmentHandle>,
}

/// A materialized render target. Owned by the render target store and shared
/// with its producing task (and any consumers) as `Arc<RenderTarget>`.
///
/// Attachments and the concrete extent sit behind mutexes because a resize
/// replaces them in place while consumers keep holding the `Arc`. The frame
/// graph guarantees no task execution is in flight when that happens.
#[derive(Debug)]
pub struct RenderTarget {
    properties: RenderTargetProperties,
    extent: Mutex<Extent>,
    versions: Mutex<Vec<AttachmentSet>>,
    state: Mutex<ResourceState>,
}

impl RenderTarget {
    pub(crate) fn new(
        properties: RenderTargetProperties,
        extent: Extent,
        versions: Vec<AttachmentSet>,
    ) -> Self {
        let initial_state = properties.execute_state;
        Self {
            properties,
            extent: Mutex::new(extent),
            versions: Mutex::new(versions),
            state: Mutex::new(initial_state),
        }
    }

    /// The property record this target was created from.
    pub fn properties(&self) -> &RenderTargetProperties {
        &self.properties
    }

    /// Current concrete dimensions.
    pub fn extent(&self) -> Extent {
        *self.extent.lock().unwrap()
    }

    /// Number of buffered versions.
    pub fn version_count(&self) -> usize {
        self.versions.lock().unwrap().len()
    }

    /// The attachment set for one version. `version` must come from
    /// `frame % versions`.
    pub fn attachments(&self, version: usize) -> Option<AttachmentSet> {
        self.versions.lock().unwrap().get(version).cloned()
    }

    /// One color attachment of one version.
    pub fn color_attachment(&self, version: usize, index: usize) -> Option<AttachmentHandle> {
        let versions = self.versions.lock().unwrap();
        versions.get(version).and_then(|set| set.colors.get(index).copied())
    }

    /// The depth attachment of one version.
    pub fn depth_attachment(&self, version: usize) -> Option<AttachmentHandle> {
        let versions = self.versions.lock().unwrap();
        versions.get(version).and_then(|set| set.depth)
    }

    /// The resource state the target is currently in. Execution bracketing
    /// moves this between the execute and finished states of the transition
    /// contract.
    pub fn current_state(&self) -> ResourceState {
        *self.state.lock().unwrap()
    }

    pub(crate) fn set_state(&self, state: ResourceState) {
        *self.state.lock().unwrap() = state;
    }

    /// Swap in a freshly allocated set of versions after a resize, returning
    /// the old sets so the store can free them.
    pub(crate) fn replace_attachments(
        &self,
        extent: Extent,
        versions: Vec<AttachmentSet>,
    ) -> Vec<AttachmentSet> {
        *self.extent.lock().unwrap() = extent;
        std::mem::replace(&mut *self.versions.lock().unwrap(), versions)
    }
}

static_assertions::assert_impl_all!(RenderTarget: Send, Sync);

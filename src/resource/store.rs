//! The render target store.
//!
//! The store is the only component that owns GPU attachments. It materializes
//! a [`RenderTarget`] from a [`RenderTargetProperties`] record, keeps it valid
//! across viewport resizes, and frees it on graph teardown. Render-window
//! targets are the exception: their backing memory belongs to the
//! presentation surface and is only referenced here.

use std::sync::Arc;

use anyhow::Result;

use crate::core::device::{AttachmentDescription, AttachmentUsage, RenderDevice};
use crate::resource::format::Extent;
use crate::resource::properties::{RenderTargetProperties, MAX_COLOR_ATTACHMENTS};
use crate::resource::target::{AttachmentSet, RenderTarget};
use crate::Error;

/// Owns every render target of one frame graph, with `versions` buffered
/// copies of each attachment for frames in flight.
#[derive(Debug)]
pub struct RenderTargetStore {
    viewport: Extent,
    versions: usize,
    targets: Vec<Arc<RenderTarget>>,
}

impl RenderTargetStore {
    /// Create an empty store.
    pub fn new(viewport: Extent, versions: usize) -> Self {
        Self {
            viewport,
            versions: versions.max(1),
            targets: Vec::new(),
        }
    }

    /// The viewport extent viewport-relative targets are currently sized
    /// against.
    pub fn viewport(&self) -> Extent {
        self.viewport
    }

    /// Number of buffered versions per attachment.
    pub fn version_count(&self) -> usize {
        self.versions
    }

    /// Materialize a render target from its property record.
    ///
    /// # Errors
    /// * Fails if the properties declare more than [`MAX_COLOR_ATTACHMENTS`]
    ///   color formats.
    /// * Propagates device allocation failures. No partially allocated target
    ///   is ever returned.
    pub fn create(
        &mut self,
        device: &dyn RenderDevice,
        properties: &RenderTargetProperties,
    ) -> Result<Arc<RenderTarget>> {
        if properties.color_formats.len() > MAX_COLOR_ATTACHMENTS {
            return Err(Error::TooManyColorAttachments(properties.color_formats.len()).into());
        }

        let extent = properties.size.resolve(self.viewport);
        let versions = self.allocate_versions(device, properties, extent)?;
        trace!(
            "created render target '{}' at {}x{} with {} version(s)",
            properties.name,
            extent.width,
            extent.height,
            versions.len()
        );

        let target = Arc::new(RenderTarget::new(properties.clone(), extent, versions));
        self.targets.push(target.clone());
        Ok(target)
    }

    /// Re-derive a target's concrete dimensions and reallocate its
    /// attachments if, and only if, the computed size changed. Returns whether
    /// a reallocation happened, so callers can verify idempotence.
    ///
    /// Render-window targets take the supplied extent verbatim; their backing
    /// surface was already resized by the windowing layer.
    pub fn resize(
        &mut self,
        device: &dyn RenderDevice,
        target: &Arc<RenderTarget>,
        viewport: Extent,
    ) -> Result<bool> {
        self.viewport = viewport;
        let properties = target.properties();
        let extent = if properties.is_render_window {
            viewport
        } else {
            properties.size.resolve(viewport)
        };
        if extent == target.extent() {
            return Ok(false);
        }

        let versions = self.allocate_versions(device, properties, extent)?;
        let old = target.replace_attachments(extent, versions);
        self.destroy_versions(device, properties, old)?;
        trace!(
            "resized render target '{}' to {}x{}",
            properties.name,
            extent.width,
            extent.height
        );
        Ok(true)
    }

    /// Free every owned attachment. Called once, at graph teardown.
    pub fn release_all(&mut self, device: &dyn RenderDevice) -> Result<()> {
        for target in std::mem::take(&mut self.targets) {
            let versions = target.replace_attachments(target.extent(), Vec::new());
            self.destroy_versions(device, target.properties(), versions)?;
        }
        Ok(())
    }

    fn allocate_versions(
        &self,
        device: &dyn RenderDevice,
        properties: &RenderTargetProperties,
        extent: Extent,
    ) -> Result<Vec<AttachmentSet>> {
        if properties.is_render_window {
            return (0..self.versions)
                .map(|version| {
                    Ok(AttachmentSet {
                        colors: vec![device.surface_attachment(version)?],
                        depth: None,
                    })
                })
                .collect();
        }

        (0..self.versions)
            .map(|_| {
                let colors = properties
                    .color_formats
                    .iter()
                    .map(|&format| {
                        device.create_attachment(&AttachmentDescription {
                            name: &properties.name,
                            extent,
                            format,
                            usage: AttachmentUsage::Color,
                            samples: properties.samples,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                let depth = properties
                    .depth_format
                    .map(|format| {
                        device.create_attachment(&AttachmentDescription {
                            name: &properties.name,
                            extent,
                            format,
                            usage: AttachmentUsage::Depth,
                            samples: properties.samples,
                        })
                    })
                    .transpose()?;
                Ok(AttachmentSet {
                    colors,
                    depth,
                })
            })
            .collect()
    }

    fn destroy_versions(
        &self,
        device: &dyn RenderDevice,
        properties: &RenderTargetProperties,
        versions: Vec<AttachmentSet>,
    ) -> Result<()> {
        // Surface attachments belong to the presentation surface.
        if properties.is_render_window {
            return Ok(());
        }
        for set in versions {
            for color in set.colors {
                device.destroy_attachment(color)?;
            }
            if let Some(depth) = set.depth {
                device.destroy_attachment(depth)?;
            }
        }
        Ok(())
    }
}

//! Render target property records.
//!
//! A [`RenderTargetProperties`] value describes everything the
//! [`RenderTargetStore`](crate::RenderTargetStore) needs to materialize a
//! target: how it is sized, which attachments it carries and the resource
//! states it must be in during and after a task's execution.

use anyhow::Result;

use crate::core::error::Error;
use crate::resource::format::{Extent, Format, ResourceState};

/// Maximum number of color attachments a single render target may declare.
/// Matches the lowest simultaneous-render-target limit of the supported
/// backends.
pub const MAX_COLOR_ATTACHMENTS: usize = 8;

/// How a render target derives its concrete dimensions. Absolute sizing and
/// viewport-relative sizing are mutually exclusive by construction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RenderTargetSize {
    /// Fixed dimensions, unaffected by viewport resizes.
    Absolute {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// Track the viewport, scaled by a resolution scalar.
    Viewport {
        /// Factor applied to the viewport dimensions. 1.0 is full resolution.
        scale: f32,
    },
}

impl Default for RenderTargetSize {
    /// Viewport-relative at full resolution.
    fn default() -> Self {
        RenderTargetSize::Viewport {
            scale: 1.0,
        }
    }
}

impl RenderTargetSize {
    /// Resolve to concrete dimensions for the given viewport.
    pub fn resolve(self, viewport: Extent) -> Extent {
        match self {
            RenderTargetSize::Absolute {
                width,
                height,
            } => Extent::new(width, height),
            RenderTargetSize::Viewport {
                scale,
            } => viewport.scaled(scale),
        }
    }
}

/// Immutable description of a render target.
#[derive(Debug, Clone)]
pub struct RenderTargetProperties {
    /// Diagnostic label, also forwarded to the backend for each attachment.
    pub name: String,
    /// True only for the final present target. Render-window targets are
    /// backed by the presentation surface instead of owned allocations.
    pub is_render_window: bool,
    /// Sizing rule.
    pub size: RenderTargetSize,
    /// Resource state the target must be in while its task executes.
    pub execute_state: ResourceState,
    /// Resource state the target is left in after the task finishes. This is
    /// the state downstream consumers observe.
    pub finished_state: ResourceState,
    /// Ordered color attachment formats, at most [`MAX_COLOR_ATTACHMENTS`].
    pub color_formats: Vec<Format>,
    /// Depth attachment format, if the target carries a depth buffer.
    pub depth_format: Option<Format>,
    /// Whether color attachments are cleared on pass begin.
    pub clear_color: bool,
    /// Whether the depth attachment is cleared on pass begin.
    pub clear_depth: bool,
    /// Multisample count, 1 for no multisampling.
    pub samples: u32,
}

/// Builder for [`RenderTargetProperties`].
///
/// # Example
/// ```
/// use deimos::prelude::*;
///
/// let properties = RenderTargetPropertiesBuilder::new("bloom horizontal")
///     .color_format(Format::Rgba16Float)
///     .resolution_scalar(0.5)
///     .execute_state(ResourceState::UnorderedAccess)
///     .finished_state(ResourceState::CopySource)
///     .build()?;
/// # anyhow::Ok(())
/// ```
pub struct RenderTargetPropertiesBuilder {
    inner: RenderTargetProperties,
}

impl RenderTargetPropertiesBuilder {
    /// Start describing a render target. Defaults: viewport-sized, one
    /// implicit nothing (no color formats yet), no depth buffer, no clears,
    /// render-target execute state and pixel-shader-readable finished state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: RenderTargetProperties {
                name: name.into(),
                is_render_window: false,
                size: RenderTargetSize::default(),
                execute_state: ResourceState::RenderTarget,
                finished_state: ResourceState::PixelShaderResource,
                color_formats: Vec::new(),
                depth_format: None,
                clear_color: false,
                clear_depth: false,
                samples: 1,
            },
        }
    }

    /// Mark this target as the render window. It will be backed by the
    /// presentation surface and its finished state becomes `Present`.
    pub fn render_window(mut self) -> Self {
        self.inner.is_render_window = true;
        self.inner.finished_state = ResourceState::Present;
        self
    }

    /// Give the target fixed dimensions instead of tracking the viewport.
    pub fn absolute_size(mut self, width: u32, height: u32) -> Self {
        self.inner.size = RenderTargetSize::Absolute {
            width,
            height,
        };
        self
    }

    /// Track the viewport, scaled by `scale`.
    pub fn resolution_scalar(mut self, scale: f32) -> Self {
        self.inner.size = RenderTargetSize::Viewport {
            scale,
        };
        self
    }

    /// Resource state during task execution.
    pub fn execute_state(mut self, state: ResourceState) -> Self {
        self.inner.execute_state = state;
        self
    }

    /// Resource state after task execution.
    pub fn finished_state(mut self, state: ResourceState) -> Self {
        self.inner.finished_state = state;
        self
    }

    /// Append a color attachment format.
    pub fn color_format(mut self, format: Format) -> Self {
        self.inner.color_formats.push(format);
        self
    }

    /// Add a depth attachment.
    pub fn depth_format(mut self, format: Format) -> Self {
        self.inner.depth_format = Some(format);
        self
    }

    /// Clear color attachments on pass begin.
    pub fn clear_color(mut self, clear: bool) -> Self {
        self.inner.clear_color = clear;
        self
    }

    /// Clear the depth attachment on pass begin.
    pub fn clear_depth(mut self, clear: bool) -> Self {
        self.inner.clear_depth = clear;
        self
    }

    /// Multisample count.
    pub fn samples(mut self, samples: u32) -> Self {
        self.inner.samples = samples.max(1);
        self
    }

    /// Validate and build the property record.
    ///
    /// # Errors
    /// * Fails if more than [`MAX_COLOR_ATTACHMENTS`] color formats were added.
    /// * Fails if a non-depth format was given as the depth format.
    pub fn build(self) -> Result<RenderTargetProperties> {
        if self.inner.color_formats.len() > MAX_COLOR_ATTACHMENTS {
            return Err(Error::TooManyColorAttachments(self.inner.color_formats.len()).into());
        }
        if let Some(format) = self.inner.depth_format {
            if !format.is_depth() {
                return Err(Error::Uncategorized("Depth buffer requested with a color format").into());
            }
        }
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_attachment_limit_enforced() {
        let mut builder = RenderTargetPropertiesBuilder::new("too many");
        for _ in 0..MAX_COLOR_ATTACHMENTS + 1 {
            builder = builder.color_format(Format::Rgba8Unorm);
        }
        assert!(builder.build().is_err());
    }

    #[test]
    fn depth_format_must_be_depth() {
        let result = RenderTargetPropertiesBuilder::new("bad depth")
            .depth_format(Format::Rgba8Unorm)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn size_resolution() {
        let viewport = Extent::new(1600, 900);
        let absolute = RenderTargetSize::Absolute {
            width: 512,
            height: 512,
        };
        assert_eq!(absolute.resolve(viewport), Extent::new(512, 512));
        let half = RenderTargetSize::Viewport {
            scale: 0.5,
        };
        assert_eq!(half.resolve(viewport), Extent::new(800, 450));
    }
}

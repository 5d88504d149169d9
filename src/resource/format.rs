//! API-agnostic value enums for attachment formats and resource states, plus
//! the [`Extent`] type used for all dimension bookkeeping.

/// Pixel formats the scheduler knows about. Backends map these onto their
/// API's format enumeration; `Unknown` is valid only for targets that declare
/// no depth buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// No format. Placeholder for absent attachments.
    #[default]
    Unknown,
    /// 8-bit unsigned normalized RGBA.
    Rgba8Unorm,
    /// 8-bit sRGB RGBA.
    Rgba8Srgb,
    /// 16-bit float RGBA. The default HDR intermediate format.
    Rgba16Float,
    /// 32-bit float RGBA.
    Rgba32Float,
    /// 16-bit float RG, typically motion vectors.
    Rg16Float,
    /// Single channel 32-bit float.
    R32Float,
    /// 32-bit float depth.
    D32Float,
    /// 24-bit normalized depth with 8-bit stencil.
    D24UnormS8Uint,
}

impl Format {
    /// Whether this is a depth(/stencil) format.
    pub fn is_depth(self) -> bool {
        matches!(self, Format::D32Float | Format::D24UnormS8Uint)
    }
}

/// The state a render target resource is in, as seen by the transition
/// contract on [`RenderTargetProperties`](crate::RenderTargetProperties).
/// Backends translate these to barriers/layout transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ResourceState {
    /// Writable color attachment. The state a target is created in.
    #[default]
    RenderTarget,
    /// Readable from pixel shaders.
    PixelShaderResource,
    /// Read/write access from compute.
    UnorderedAccess,
    /// Source of a copy operation.
    CopySource,
    /// Destination of a copy operation.
    CopyDest,
    /// Writable depth attachment.
    DepthWrite,
    /// Ready for presentation. Only meaningful on render-window targets.
    Present,
}

/// Two dimensional size in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Extent {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Extent {
    /// Create an extent. Dimensions are clamped to at least one pixel; a
    /// zero-sized attachment is never valid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Scale by a viewport resolution scalar, rounding to the nearest pixel
    /// and never below one.
    pub fn scaled(self, scale: f32) -> Self {
        Extent::new(
            (self.width as f32 * scale).round() as u32,
            (self.height as f32 * scale).round() as u32,
        )
    }
}

//! Frame graph configuration.

use crate::resource::format::Extent;

/// Configuration a [`FrameGraph`](crate::FrameGraph) is created with. The
/// version count is fixed for the lifetime of the graph; changing it means
/// tearing the graph down and rebuilding it.
#[derive(Debug, Clone)]
pub struct GraphSettings {
    /// Diagnostic name for this graph, used in log output.
    pub name: String,
    /// Number of frames kept in flight. Every versioned resource (command
    /// lists, render target attachments) is buffered this many times and
    /// indexed with `frame % versions`.
    pub versions: usize,
    /// Initial viewport dimensions, used to size viewport-relative render
    /// targets until the first resize.
    pub viewport: Extent,
}

/// Convenience builder for [`GraphSettings`].
///
/// # Example
/// ```
/// use deimos::prelude::*;
///
/// let settings = GraphSettingsBuilder::new()
///     .name("deferred renderer")
///     .versions(3)
///     .viewport(1920, 1080)
///     .build();
/// ```
pub struct GraphSettingsBuilder {
    inner: GraphSettings,
}

impl GraphSettingsBuilder {
    /// Create a new settings builder with default settings: two frames in
    /// flight and a 1x1 viewport.
    pub fn new() -> Self {
        Self {
            inner: GraphSettings {
                name: String::from("frame graph"),
                versions: 2,
                viewport: Extent::new(1, 1),
            },
        }
    }

    /// Set the diagnostic name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = name.into();
        self
    }

    /// Set the number of frames in flight. Clamped to at least one.
    pub fn versions(mut self, versions: usize) -> Self {
        self.inner.versions = versions.max(1);
        self
    }

    /// Set the initial viewport dimensions.
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.inner.viewport = Extent::new(width, height);
        self
    }

    /// Build the resulting settings.
    pub fn build(self) -> GraphSettings {
        self.inner
    }
}

impl Default for GraphSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Render target descriptions, the render target store and the value enums
//! shared with the device abstraction.

pub mod format;
pub mod properties;
pub mod store;
pub mod target;

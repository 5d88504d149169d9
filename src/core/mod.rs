//! Core interfaces the scheduler is built on: the device abstraction, the
//! pipeline registry, the error type and graph configuration.

pub mod device;
pub mod error;
pub mod registry;
pub mod services;
pub mod settings;

//! Infrastructure implementations.
//!
//! Contains the distribution cache, host port traits and operational setup.

pub mod cache;
pub mod ports;
pub mod session_resolver;
pub mod settings;
pub mod telemetry;

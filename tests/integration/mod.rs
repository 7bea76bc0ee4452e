//! Integration test modules for plughost

pub mod lifecycle;
pub mod metrics;
pub mod render;
pub mod session;
pub mod topology;

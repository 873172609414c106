//! Common types and utilities for the Rucalc projects.

pub mod config;
pub mod error;
pub mod expression;
pub mod task;

pub use ::anyhow;
pub use ::serde;
pub use ::serde_json;
pub use ::tokio;
pub use ::tracing;
pub use ::tracing_subscriber;

//! Logging, tracing and metrics setup for Trip Insight.

#![deny(unused)]

pub mod metrics;
pub mod tracing_layer;

pub use metrics::{setup_metrics_recorder, track_analysis, track_request};
pub use tracing_layer::configure_tracing;

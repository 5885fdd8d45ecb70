#![deny(unused)]
//! The trip photo analysis pipeline.
//!
//! Three stages run strictly in sequence for every request:
//!
//! 1. [`Collector`] resolves a trip into a storage scope and lists it.
//! 2. [`Normalizer`] fetches, decodes and re-encodes each listed image as a
//!    JPEG data URL, recording a [`FailureRecord`] for anything it cannot use.
//! 3. [`Analyzer`] sends every normalized image plus the instruction to the
//!    vision model in one call and parses the reply as JSON.
//!
//! [`FailureRecord`]: trip_insight_core::types::FailureRecord

pub mod analyzer;
pub mod collector;
pub mod normalizer;
pub mod pipeline;
pub mod transcode;

pub use analyzer::{AnalysisFailure, Analyzer};
pub use collector::{Collector, ScopedObjects};
pub use normalizer::{KeyPolicy, NormalizationReport, Normalizer};
pub use pipeline::{AnalysisOutcome, Stage, TripAnalysisPipeline};
pub use transcode::transcode_to_jpeg;

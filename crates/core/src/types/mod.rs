//! Core type definitions for Trip Insight.
//!
//! Broken down into submodules:
//! - `image`: per-object records flowing through the normalizer
//! - `analysis`: what is sent to and received from the inference service
//! - `scope`: inbound requests and the storage scope they resolve to

pub mod analysis;
pub mod image;
pub mod scope;

pub use analysis::*;
pub use image::*;
pub use scope::*;

#![deny(unused)]
//! Core types, traits, and error definitions for Trip Insight.
//!
//! This crate provides the building blocks shared by the collector,
//! normalizer and analyzer stages as well as the HTTP front door.

pub mod config;
pub mod error;
pub mod mocks;
pub mod template;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;

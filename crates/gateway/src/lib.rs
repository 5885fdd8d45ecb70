//! HTTP front door for Trip Insight.
//!
//! Parses the loosely-shaped request bodies, runs the analysis pipeline and
//! maps each outcome to a status code and JSON body.

#![deny(unused)]

pub mod extract;
pub mod response;
pub mod server;

pub use response::{AnalysisResponse, ApiResponse};
pub use server::{AppState, GatewayConfig, GatewayServer};

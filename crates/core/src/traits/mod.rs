//! Capability traits for the collaborators the pipeline talks to.
//!
//! - `storage`: object listing and blob retrieval (ObjectStore, BlobSource)
//! - `vision`: hosted multimodal inference (VisionClient)

pub mod storage;
pub mod vision;

pub use storage::*;
pub use vision::*;

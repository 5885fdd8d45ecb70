#![deny(unused)]
//! Storage adapters for Trip Insight.
//!
//! - [`S3ObjectStore`]: lists trip folders and downloads photos from S3
//! - [`HttpBlobSource`]: downloads photos from arbitrary http(s) URLs

pub mod remote;
pub mod s3;

pub use remote::HttpBlobSource;
pub use s3::S3ObjectStore;

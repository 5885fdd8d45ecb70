//! Storage traits.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::types::StorageScope;

/// Object storage: list keys under a prefix, fetch a blob by key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every key under `scope.prefix`, in listing order.
    ///
    /// Implementations must drain pagination; a partial listing is a bug.
    async fn list_keys(&self, scope: &StorageScope) -> Result<Vec<String>>;

    /// Fetch one object.
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Bytes>;
}

/// Anything the normalizer can pull image bytes from.
#[async_trait]
pub trait BlobSource: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Bytes>;
}

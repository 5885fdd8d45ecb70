//! Collector stage: trip → storage scope → image references.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use trip_insight_core::{
    traits::{BlobSource, ObjectStore},
    types::{ImageRef, StorageScope, TripRequest},
    Error, Result,
};

/// Resolves trips against the configured bucket and enumerates them.
pub struct Collector {
    store: Arc<dyn ObjectStore>,
    bucket: Option<String>,
}

impl Collector {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: Option<String>) -> Self {
        Self { store, bucket }
    }

    /// Replace the configured bucket.
    pub fn with_bucket(mut self, bucket: Option<String>) -> Self {
        self.bucket = bucket;
        self
    }

    /// `{bucket}` + `{memberId}/{retripId}/`.
    pub fn scope_for(&self, request: &TripRequest) -> Result<StorageScope> {
        let bucket = self.bucket.as_deref().ok_or_else(|| {
            Error::configuration("storage bucket name is not configured (set AWS_S3_BUCKET)")
        })?;
        Ok(StorageScope::new(bucket, request.prefix()))
    }

    /// Every object under the scope, in listing order.
    pub async fn collect(&self, scope: &StorageScope) -> Result<Vec<ImageRef>> {
        tracing::info!(scope = %scope.display_url(), "Listing trip images");

        let keys = self.store.list_keys(scope).await?;
        Ok(keys.into_iter().map(ImageRef::from_key).collect())
    }

    /// Blob source that fetches from the same bucket as `scope`.
    pub fn blobs(&self, scope: &StorageScope) -> ScopedObjects {
        ScopedObjects {
            store: self.store.clone(),
            bucket: scope.bucket.clone(),
        }
    }
}

/// An [`ObjectStore`] pinned to one bucket.
pub struct ScopedObjects {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

#[async_trait]
impl BlobSource for ScopedObjects {
    async fn fetch(&self, key: &str) -> Result<Bytes> {
        self.store.fetch_object(&self.bucket, key).await
    }
}

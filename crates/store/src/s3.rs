//! S3 implementation of ObjectStore.

use async_trait::async_trait;
use aws_credential_types::provider::error::CredentialsError;
use aws_sdk_s3::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    Client,
};
use bytes::Bytes;
use std::error::Error as StdError;

use trip_insight_core::{traits::ObjectStore, types::StorageScope, Error, Result};

/// S3-backed object store.
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Create a store from the default AWS provider chain.
    ///
    /// `region` and `endpoint` override what the chain resolves; a custom
    /// endpoint (MinIO, LocalStack) switches to path-style addressing.
    pub async fn new(region: Option<&str>, endpoint: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(endpoint.is_some())
            .build();

        Self {
            client: Client::from_conf(s3_config),
        }
    }

    /// Create with custom client (for testing/custom config).
    pub fn new_with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_keys(&self, scope: &StorageScope) -> Result<Vec<String>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&scope.bucket)
            .prefix(&scope.prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        let mut page_count = 0usize;
        while let Some(page) = pages.next().await {
            let page = page.map_err(classify_sdk_error)?;
            page_count += 1;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
        }

        tracing::debug!(
            bucket = %scope.bucket,
            prefix = %scope.prefix,
            pages = page_count,
            keys = keys.len(),
            "Listed S3 prefix"
        );

        Ok(keys)
    }

    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| Error::storage(format!("S3 body read error: {}", e)))?
            .into_bytes();

        Ok(data)
    }
}

/// Map an SDK failure onto the storage error taxonomy.
///
/// Modeled service errors keep their S3 code (`AccessDenied`,
/// `NoSuchBucket`, `NoSuchKey`, ...). A `CredentialsError` anywhere in the
/// source chain means the provider chain gave up before a request was sent.
fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: std::fmt::Debug + 'static,
{
    if let Some(service) = err.as_service_error() {
        if let Some(code) = service.code() {
            return Error::StorageAccess {
                code: code.to_string(),
                message: service.message().unwrap_or_default().to_string(),
            };
        }
    }

    let detail = DisplayErrorContext(&err).to_string();
    if caused_by_credentials(&err) {
        Error::StorageCredentials(detail)
    } else {
        Error::storage(format!("S3 request failed: {}", detail))
    }
}

fn caused_by_credentials(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.downcast_ref::<CredentialsError>().is_some() {
            return true;
        }
        current = e.source();
    }
    false
}

//! Mock implementations of core traits for testing.
//!
//! These stand in for object storage and the inference service so that the
//! pipeline and the HTTP layer can be exercised without network access.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::{
    traits::{ObjectStore, VisionClient},
    types::{AnalysisRequest, StorageScope},
    Error, Result,
};

// =============================================================================
// Mock Object Store
// =============================================================================

/// How a mocked listing should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFailure {
    NoCredentials,
    AccessDenied,
}

/// In-memory object store with call counters and injectable failures.
#[derive(Default)]
pub struct MockObjectStore {
    objects: Vec<(String, Bytes)>,
    failing_keys: HashSet<String>,
    list_failure: Option<ListFailure>,
    list_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    listed_scopes: Mutex<Vec<StorageScope>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object. Listing order follows insertion order.
    pub fn with_object(mut self, key: &str, data: impl Into<Bytes>) -> Self {
        self.objects.push((key.to_string(), data.into()));
        self
    }

    /// Make fetching `key` fail even though it is listed.
    pub fn with_failing_fetch(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }

    /// Make every listing fail.
    pub fn with_list_failure(mut self, failure: ListFailure) -> Self {
        self.list_failure = Some(failure);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Scopes passed to `list_keys`, in call order.
    pub fn listed_scopes(&self) -> Vec<StorageScope> {
        self.listed_scopes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn list_keys(&self, scope: &StorageScope) -> Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.listed_scopes.lock().unwrap().push(scope.clone());

        match self.list_failure {
            Some(ListFailure::NoCredentials) => {
                return Err(Error::StorageCredentials(
                    "no credentials in the mock provider chain".into(),
                ))
            }
            Some(ListFailure::AccessDenied) => {
                return Err(Error::StorageAccess {
                    code: "AccessDenied".into(),
                    message: "Access Denied".into(),
                })
            }
            None => {}
        }

        Ok(self
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(&scope.prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn fetch_object(&self, _bucket: &str, key: &str) -> Result<Bytes> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_keys.contains(key) {
            return Err(Error::storage(format!("NoSuchKey: {}", key)));
        }

        self.objects
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| Error::storage(format!("NoSuchKey: {}", key)))
    }
}

// =============================================================================
// Mock Vision Client
// =============================================================================

/// Scripted reply for [`MockVisionClient`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Failure(String),
}

/// Scripted vision model that records what it was asked.
pub struct MockVisionClient {
    replies: Mutex<Vec<MockReply>>,
    call_count: AtomicUsize,
    requests: Mutex<Vec<AnalysisRequest>>,
}

impl MockVisionClient {
    /// Create a mock with a queue of replies; the last one repeats.
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies),
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always reply with `text`.
    pub fn constant(text: &str) -> Self {
        Self::new(vec![MockReply::Text(text.to_string())])
    }

    /// Always fail as if the service were unreachable.
    pub fn failing(message: &str) -> Self {
        Self::new(vec![MockReply::Failure(message.to_string())])
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionClient for MockVisionClient {
    async fn complete_json(&self, request: &AnalysisRequest) -> Result<String> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        let replies = self.replies.lock().unwrap();
        let idx = (count - 1).min(replies.len().saturating_sub(1));
        match replies.get(idx) {
            Some(MockReply::Text(text)) => Ok(text.clone()),
            Some(MockReply::Failure(message)) => Err(Error::model_provider(message.clone())),
            None => Err(Error::model_provider("no scripted reply")),
        }
    }

    fn model_name(&self) -> &str {
        "mock-vision"
    }
}

//! Per-request orchestration of the collector, normalizer and analyzer.
//!
//! Each request walks `Received → Listing → Normalizing → Analyzing` and
//! ends in exactly one [`AnalysisOutcome`] or an aborting error. Nothing is
//! retained between requests.

use std::fmt;
use std::sync::Arc;

use trip_insight_core::{
    traits::{BlobSource, ObjectStore, VisionClient},
    types::{
        AnalysisResult, FailureRecord, ImageRef, LocationHint, NormalizedImage,
        RemoteImagesRequest, TripRequest,
    },
    Error, Result,
};

use crate::analyzer::{AnalysisFailure, Analyzer};
use crate::collector::Collector;
use crate::normalizer::{KeyPolicy, Normalizer};

/// Where a request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Listing,
    Normalizing,
    Analyzing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Listing => "listing",
            Self::Normalizing => "normalizing",
            Self::Analyzing => "analyzing",
        };
        f.write_str(name)
    }
}

/// Terminal state of a request that did not abort.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The scope listed no objects at all.
    NoImagesFound { scope: String },
    /// Objects were listed but none survived normalization.
    NothingAnalyzable {
        scope: String,
        failures: Vec<FailureRecord>,
    },
    /// The model answered with JSON.
    Analyzed {
        analysis: AnalysisResult,
        failures: Vec<FailureRecord>,
    },
    /// The inference call failed or returned nothing.
    InferenceFailed {
        detail: String,
        failures: Vec<FailureRecord>,
    },
    /// The model answered, but not with JSON.
    UnparseableResponse {
        raw: String,
        failures: Vec<FailureRecord>,
    },
}

impl AnalysisOutcome {
    /// Stable label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoImagesFound { .. } => "no_images",
            Self::NothingAnalyzable { .. } => "nothing_analyzable",
            Self::Analyzed { .. } => "succeeded",
            Self::InferenceFailed { .. } => "inference_failed",
            Self::UnparseableResponse { .. } => "unparseable_response",
        }
    }
}

/// The analysis pipeline shared by all requests.
///
/// Holds long-lived clients built at startup; every call to
/// [`run_trip`](Self::run_trip) or [`run_urls`](Self::run_urls) owns its own
/// buffers and failure list.
pub struct TripAnalysisPipeline {
    collector: Collector,
    analyzer: Analyzer,
    remote: Option<Arc<dyn BlobSource>>,
}

impl TripAnalysisPipeline {
    /// Create a pipeline over an object store and a vision model.
    pub fn new(store: Arc<dyn ObjectStore>, vision: Arc<dyn VisionClient>) -> Self {
        Self {
            collector: Collector::new(store, None),
            analyzer: Analyzer::new(vision),
            remote: None,
        }
    }

    /// Set the bucket trips live in.
    pub fn with_bucket(mut self, bucket: Option<String>) -> Self {
        self.collector = self.collector.with_bucket(bucket);
        self
    }

    /// Enable analysis of caller-supplied URLs.
    pub fn with_remote_source(mut self, remote: Arc<dyn BlobSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Analyze every photo under `{memberId}/{retripId}/`.
    pub async fn run_trip(&self, request: &TripRequest) -> Result<AnalysisOutcome> {
        let mut stage = Stage::Received;
        tracing::debug!(
            %stage,
            member_id = %request.member_id,
            retrip_id = %request.retrip_id,
            "Trip analysis requested"
        );

        let scope = self.collector.scope_for(request)?;

        stage = Stage::Listing;
        tracing::debug!(%stage, scope = %scope.display_url(), "Pipeline stage");
        let refs = self.collector.collect(&scope).await?;

        if refs.is_empty() {
            tracing::info!(scope = %scope.display_url(), "No objects under trip prefix");
            return Ok(AnalysisOutcome::NoImagesFound {
                scope: scope.prefix,
            });
        }

        stage = Stage::Normalizing;
        tracing::debug!(%stage, objects = refs.len(), "Pipeline stage");
        let blobs = self.collector.blobs(&scope);
        let report = Normalizer::new(&blobs, KeyPolicy::StorageKeys)
            .normalize_all(&refs)
            .await;

        if report.images.is_empty() {
            return Ok(AnalysisOutcome::NothingAnalyzable {
                scope: scope.prefix,
                failures: report.failures,
            });
        }

        stage = Stage::Analyzing;
        tracing::debug!(%stage, images = report.images.len(), "Pipeline stage");
        self.analyze(report.images, report.failures, request.location)
            .await
    }

    /// Analyze photos downloaded from caller-supplied URLs.
    pub async fn run_urls(&self, request: &RemoteImagesRequest) -> Result<AnalysisOutcome> {
        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| Error::configuration("remote image fetching is not enabled"))?;

        let refs: Vec<ImageRef> = request.urls.iter().map(ImageRef::from_key).collect();
        let report = Normalizer::new(remote.as_ref(), KeyPolicy::RemoteUrls)
            .normalize_all(&refs)
            .await;

        if report.images.is_empty() {
            return Ok(AnalysisOutcome::NothingAnalyzable {
                scope: "imageUrls".to_string(),
                failures: report.failures,
            });
        }

        self.analyze(report.images, report.failures, request.location)
            .await
    }

    async fn analyze(
        &self,
        images: Vec<NormalizedImage>,
        failures: Vec<FailureRecord>,
        location: Option<LocationHint>,
    ) -> Result<AnalysisOutcome> {
        let request = self.analyzer.build_request(images, location)?;

        Ok(match self.analyzer.analyze(&request).await {
            Ok(analysis) => AnalysisOutcome::Analyzed { analysis, failures },
            Err(AnalysisFailure::InferenceFailed { detail }) => {
                AnalysisOutcome::InferenceFailed { detail, failures }
            }
            Err(AnalysisFailure::UnparseableResponse { raw, .. }) => {
                AnalysisOutcome::UnparseableResponse { raw, failures }
            }
        })
    }
}

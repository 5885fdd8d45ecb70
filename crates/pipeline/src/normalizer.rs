//! Normalizer stage: fetch, decode, and re-encode every listed image.
//!
//! Items are processed one after another in listing order. A failure on one
//! item is recorded and never affects the others.

use trip_insight_core::{
    traits::BlobSource,
    types::{FailureReason, FailureRecord, ImageRef, NormalizedImage},
};

use crate::transcode::transcode_to_jpeg;

/// Which keys are eligible for normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Object-storage keys: skip directory markers, enforce the extension
    /// allow-list.
    StorageKeys,
    /// Caller-supplied URLs: attempt everything.
    RemoteUrls,
}

/// Result of normalizing one listing.
#[derive(Debug, Default)]
pub struct NormalizationReport {
    /// Successfully normalized images, in listing order.
    pub images: Vec<NormalizedImage>,
    /// One record per failed item, in listing order.
    pub failures: Vec<FailureRecord>,
    /// Directory markers that were silently dropped.
    pub skipped: usize,
}

enum ItemOutcome {
    Skipped,
    Normalized(NormalizedImage),
    Failed(FailureReason),
}

/// Turns a listing into embeddable JPEG payloads.
pub struct Normalizer<'a> {
    source: &'a dyn BlobSource,
    policy: KeyPolicy,
}

impl<'a> Normalizer<'a> {
    pub fn new(source: &'a dyn BlobSource, policy: KeyPolicy) -> Self {
        Self { source, policy }
    }

    /// Normalize every reference, sequentially.
    pub async fn normalize_all(&self, refs: &[ImageRef]) -> NormalizationReport {
        let mut report = NormalizationReport::default();

        for image_ref in refs {
            match self.normalize_one(image_ref).await {
                ItemOutcome::Skipped => {
                    report.skipped += 1;
                }
                ItemOutcome::Normalized(image) => {
                    tracing::debug!(key = %image_ref.key, "Image normalized");
                    metrics::counter!("trip_images_normalized_total", "result" => "ok")
                        .increment(1);
                    report.images.push(image);
                }
                ItemOutcome::Failed(reason) => {
                    tracing::warn!(key = %image_ref.key, reason = %reason, "Image skipped");
                    metrics::counter!("trip_images_normalized_total", "result" => reason.label())
                        .increment(1);
                    report
                        .failures
                        .push(FailureRecord::new(image_ref.key.clone(), &reason));
                }
            }
        }

        tracing::info!(
            normalized = report.images.len(),
            failed = report.failures.len(),
            skipped = report.skipped,
            "Normalization finished"
        );

        report
    }

    async fn normalize_one(&self, image_ref: &ImageRef) -> ItemOutcome {
        if self.policy == KeyPolicy::StorageKeys {
            if image_ref.is_directory_marker() {
                return ItemOutcome::Skipped;
            }
            if !image_ref.has_supported_extension() {
                return ItemOutcome::Failed(FailureReason::UnsupportedFileType {
                    extension: image_ref.extension.clone(),
                });
            }
        }

        let data = match self.source.fetch(&image_ref.key).await {
            Ok(data) => data,
            Err(e) => {
                return ItemOutcome::Failed(FailureReason::DownloadFailed {
                    detail: e.to_string(),
                })
            }
        };

        // Decoding is CPU-bound; keep it off the async workers but still
        // wait for it before touching the next item.
        let blob = data.clone();
        let transcoded = tokio::task::spawn_blocking(move || transcode_to_jpeg(&blob)).await;

        match transcoded {
            Ok(Ok(jpeg)) => ItemOutcome::Normalized(NormalizedImage::from_jpeg(
                image_ref.key.clone(),
                &jpeg,
            )),
            Ok(Err(reason)) => {
                if matches!(reason, FailureReason::Unidentified { .. }) {
                    let head = &data[..data.len().min(32)];
                    tracing::debug!(
                        key = %image_ref.key,
                        size = data.len(),
                        head = ?head,
                        "Undecodable blob"
                    );
                }
                ItemOutcome::Failed(reason)
            }
            Err(join_err) => ItemOutcome::Failed(FailureReason::Unexpected {
                detail: join_err.to_string(),
            }),
        }
    }
}

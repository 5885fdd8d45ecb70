#![deny(unused)]
//! Trip Insight - travel photo analysis service.
//!
//! Lists a trip's photos in object storage, normalizes them to JPEG, and asks
//! a multimodal model for a structured summary of the trip.

use std::sync::Arc;
use std::time::Duration;

use trip_insight_core::config::AppConfig;
use trip_insight_gateway::{GatewayConfig, GatewayServer};
use trip_insight_model_gateway::create_client_from_config;
use trip_insight_pipeline::TripAnalysisPipeline;
use trip_insight_store::{HttpBlobSource, S3ObjectStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    trip_insight_observability::configure_tracing(config.observability.json_logs)?;

    tracing::info!("Starting Trip Insight v{}", env!("CARGO_PKG_VERSION"));

    // =========================================================================
    // Object storage
    // =========================================================================
    let storage = &config.storage;
    tracing::info!(
        bucket = ?storage.bucket,
        region = ?storage.region,
        endpoint = ?storage.endpoint,
        "Initializing S3 object store"
    );
    if storage.bucket.is_none() {
        tracing::warn!(
            "No storage bucket configured; trip analysis requests will fail until AWS_S3_BUCKET is set"
        );
    }
    let store = Arc::new(
        S3ObjectStore::new(storage.region.as_deref(), storage.endpoint.as_deref()).await,
    );

    let remote = Arc::new(HttpBlobSource::new(Duration::from_secs(
        storage.remote_fetch_timeout_secs,
    ))?);

    // =========================================================================
    // Vision model
    // =========================================================================
    let vision = Arc::new(create_client_from_config(&config.model)?);
    tracing::info!(
        model = %config.model.model,
        base_url = %config.model.base_url,
        "Vision model configured"
    );

    let pipeline = TripAnalysisPipeline::new(store, vision)
        .with_bucket(storage.bucket.clone())
        .with_remote_source(remote);

    // =========================================================================
    // HTTP gateway
    // =========================================================================
    let mut server = GatewayServer::new(GatewayConfig::from(&config.server), Arc::new(pipeline));

    if config.observability.metrics_enabled {
        let handle = trip_insight_observability::setup_metrics_recorder()?;
        server = server.with_metrics(handle);
    }

    server.run().await?;

    Ok(())
}

// src/lib.rs
// Public library surface for integration tests (and the binary).

pub mod api;
pub mod config;
pub mod error;
pub mod expand;
pub mod ingest;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod response;
pub mod scheduler;
pub mod select;
pub mod sources;
pub mod tagger;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tracing::info;

pub use crate::api::{router, FeedState};
pub use crate::config::FeedConfig;
pub use crate::error::PipelineError;
pub use crate::ingest::types::{FeedItem, RawItem, SourceProvider};
pub use crate::pipeline::Aggregator;
pub use crate::response::FeedResponse;

/// Full application router for `cfg`: the feed API plus `/metrics`.
/// Spawns the refresh task when `refresh_secs` is set, so it must be called
/// inside a Tokio runtime.
pub fn build_app(cfg: &FeedConfig) -> anyhow::Result<Router> {
    let aggregator = Arc::new(Aggregator::from_config(cfg)?);
    let metrics = crate::metrics::Metrics::init(aggregator.directive())?;
    let state = FeedState::new(Arc::clone(&aggregator));

    if let Some(secs) = cfg.refresh_secs.filter(|s| *s > 0) {
        scheduler::spawn_refresh_task(state.clone(), Duration::from_secs(secs));
        info!(target: "media_feed", every_secs = secs, "refresh task started");
    }

    info!(
        target: "media_feed",
        sources = aggregator.source_count(),
        "media feed ready"
    );
    Ok(router(state).merge(metrics.router()))
}

/// Same as [`build_app`] with the configuration resolved from the
/// environment and `config/`.
pub fn app() -> anyhow::Result<Router> {
    let cfg = config::load_default()?;
    build_app(&cfg)
}

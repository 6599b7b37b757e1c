// src/ingest/mod.rs
pub mod parse;
pub mod providers;
pub mod types;

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use once_cell::sync::OnceCell;

use crate::ingest::types::{RawItem, SourceProvider};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_sources_total", "Sources polled by aggregation cycles.");
        describe_counter!(
            "feed_source_errors_total",
            "Source fetch/parse failures and timeouts."
        );
        describe_counter!("feed_items_raw_total", "Raw items parsed from sources.");
        describe_counter!(
            "feed_items_dropped_total",
            "Items dropped during normalization (audio, filing form)."
        );
        describe_counter!("feed_dedup_total", "Items removed by deduplication.");
        describe_counter!("feed_cache_hits_total", "Feed responses served from cache.");
        describe_counter!("feed_cache_misses_total", "Feed responses computed fresh.");
        describe_histogram!("feed_fetch_ms", "Per-source fetch + parse time in milliseconds.");
        describe_gauge!(
            "feed_pipeline_last_run_ts",
            "Unix ts when the aggregation pipeline last ran."
        );
    });
}

/// Fetch every provider concurrently and merge whatever came back.
///
/// A failing or slow source contributes nothing; it never blocks the others.
/// The merged order is not meaningful, ranking re-sorts everything.
pub async fn fetch_all(providers: &[Arc<dyn SourceProvider>], timeout: Duration) -> Vec<RawItem> {
    ensure_metrics_described();

    let tasks = providers.iter().map(|p| {
        let p = Arc::clone(p);
        async move {
            let t0 = Instant::now();
            let res = tokio::time::timeout(timeout, p.fetch_latest()).await;
            histogram!("feed_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
            match res {
                Ok(Ok(items)) => {
                    tracing::debug!(source = p.name(), items = items.len(), "source fetched");
                    items
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = ?e, source = p.name(), "source fetch failed");
                    counter!("feed_source_errors_total").increment(1);
                    Vec::new()
                }
                Err(_) => {
                    tracing::warn!(
                        source = p.name(),
                        timeout_ms = timeout.as_millis() as u64,
                        "source fetch timed out"
                    );
                    counter!("feed_source_errors_total").increment(1);
                    Vec::new()
                }
            }
        }
    });

    let batches = join_all(tasks).await;
    counter!("feed_sources_total").increment(providers.len() as u64);

    let raw: Vec<RawItem> = batches.into_iter().flatten().collect();
    counter!("feed_items_raw_total").increment(raw.len() as u64);
    raw
}

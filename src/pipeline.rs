// src/pipeline.rs
//! One aggregation cycle: fetch → normalize → (expand) → rank → dedup →
//! recency window → capped selection.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use tracing::{debug, info};

use crate::config::FeedConfig;
use crate::error::PipelineError;
use crate::expand::RedirectExpander;
use crate::ingest::providers::{build_client, HttpFeedProvider};
use crate::ingest::types::{FeedItem, RawItem, SourceProvider};
use crate::ingest::{ensure_metrics_described, fetch_all};
use crate::normalize::Normalizer;
use crate::rank::{dedup, recent_or_all, sort_newest_first, BoostTable};
use crate::response::{CacheDirective, FeedResponse};
use crate::select::{select_capped, CapTable};

pub struct Aggregator {
    providers: Vec<Arc<dyn SourceProvider>>,
    normalizer: Normalizer,
    boosts: BoostTable,
    top: CapTable,
    full_list: CapTable,
    recency_window: chrono::Duration,
    fetch_timeout: Duration,
    expander: Option<RedirectExpander>,
    directive: CacheDirective,
}

impl Aggregator {
    /// Production wiring: one HTTP provider per configured source.
    pub fn from_config(cfg: &FeedConfig) -> anyhow::Result<Self> {
        let client = build_client(&cfg.fetch)?;
        let providers: Vec<Arc<dyn SourceProvider>> = cfg
            .sources
            .iter()
            .map(|s| Arc::new(HttpFeedProvider::new(s.clone(), client.clone())) as Arc<dyn SourceProvider>)
            .collect();
        let mut agg = Self::with_providers(cfg, providers)?;
        if cfg.expand.enabled {
            agg.expander = Some(RedirectExpander::new(&cfg.expand, &cfg.fetch)?);
        }
        Ok(agg)
    }

    /// Wiring with caller-supplied providers (tests, fixtures).
    pub fn with_providers(
        cfg: &FeedConfig,
        providers: Vec<Arc<dyn SourceProvider>>,
    ) -> Result<Self, PipelineError> {
        cfg.validate()?;
        Ok(Self {
            providers,
            normalizer: Normalizer::from_config(cfg),
            boosts: BoostTable::new(cfg.boosts.clone()),
            top: CapTable::from_config(&cfg.top),
            full_list: CapTable::from_config(&cfg.full_list),
            recency_window: chrono::Duration::hours(cfg.recency_window_hours),
            // Margin over the client timeout so reqwest reports its own error first.
            fetch_timeout: Duration::from_secs(cfg.fetch.timeout_secs.saturating_add(2)),
            expander: None,
            directive: CacheDirective::from_config(&cfg.cache),
        })
    }

    pub fn with_expander(mut self, expander: RedirectExpander) -> Self {
        self.expander = Some(expander);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn directive(&self) -> CacheDirective {
        self.directive
    }

    pub fn source_count(&self) -> usize {
        self.providers.len()
    }

    pub async fn run(&self) -> Result<FeedResponse, PipelineError> {
        self.run_at(Utc::now()).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<FeedResponse, PipelineError> {
        if self.providers.is_empty() {
            return Err(PipelineError::NoSources);
        }
        ensure_metrics_described();

        let raw = fetch_all(&self.providers, self.fetch_timeout).await;
        let raw_count = raw.len();
        let mut items = self.normalize_all(&raw, now);

        if let Some(exp) = &self.expander {
            let changed = exp
                .expand_items(
                    &mut items,
                    self.normalizer.resolver(),
                    self.normalizer.cleaner(),
                )
                .await;
            debug!(changed = changed.len(), "redirect expansion done");
            items = self.refile_expanded(items, &changed);
        }

        let out = self.rank_and_select(items, now);
        gauge!("feed_pipeline_last_run_ts").set(now.timestamp() as f64);
        info!(
            target: "media_feed",
            sources = self.providers.len(),
            raw = raw_count,
            top = out.top10.len(),
            items = out.items.len(),
            "aggregation cycle finished"
        );
        Ok(out)
    }

    pub fn normalize_all(&self, raw: &[RawItem], now: DateTime<Utc>) -> Vec<FeedItem> {
        let mut out = Vec::with_capacity(raw.len());
        for r in raw {
            match self.normalizer.normalize(r, now) {
                Ok(it) => out.push(it),
                Err(reason) => {
                    debug!(reason = reason.as_str(), title = ?r.title, "item dropped");
                    counter!("feed_items_dropped_total", "reason" => reason.as_str())
                        .increment(1);
                }
            }
        }
        out
    }

    /// Filing rules again for items whose host changed during expansion.
    fn refile_expanded(&self, items: Vec<FeedItem>, changed: &[usize]) -> Vec<FeedItem> {
        let mut out = Vec::with_capacity(items.len());
        for (i, mut it) in items.into_iter().enumerate() {
            if changed.contains(&i) {
                let summary = it.summary.clone();
                if let Err(reason) = self.normalizer.apply_filings(&mut it, &summary, "") {
                    debug!(reason = reason.as_str(), title = %it.title, "expanded item dropped");
                    counter!("feed_items_dropped_total", "reason" => reason.as_str())
                        .increment(1);
                    continue;
                }
            }
            out.push(it);
        }
        out
    }

    /// Pure tail of the cycle: everything after items are normalized.
    pub fn rank_and_select(&self, mut items: Vec<FeedItem>, now: DateTime<Utc>) -> FeedResponse {
        sort_newest_first(&mut items, &self.boosts);
        let (deduped, removed) = dedup(items);
        counter!("feed_dedup_total").increment(removed as u64);

        let base = recent_or_all(&deduped, now, self.recency_window);
        FeedResponse {
            top10: select_capped(&base, &self.top),
            items: select_capped(&deduped, &self.full_list),
        }
    }
}

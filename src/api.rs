use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH},
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics::counter;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::error::PipelineError;
use crate::pipeline::Aggregator;
use crate::response::{CacheDirective, PIPELINE_FAILED};

pub const CACHE_STATUS_HEADER: &str = "x-feed-cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Stale,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Stale => "STALE",
        }
    }
}

/// A serialized feed response and when it was produced.
#[derive(Debug, Clone)]
pub struct CachedFeed {
    pub body: Bytes,
    pub etag: String,
    fetched_at: Instant,
}

/// Shared handler state: the pipeline plus the last good response.
///
/// Within `max_age` the cached body is served as is. Between `max_age` and
/// `max_age + stale` it is still served while one background refresh runs.
/// Past that a request recomputes inline; the cache lock is held meanwhile so
/// concurrent requests on a cold cache share one cycle.
#[derive(Clone)]
pub struct FeedState {
    inner: Arc<Inner>,
}

struct Inner {
    aggregator: Arc<Aggregator>,
    cache: Mutex<Option<CachedFeed>>,
    refreshing: AtomicBool,
    directive: CacheDirective,
}

impl FeedState {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        let directive = aggregator.directive();
        Self {
            inner: Arc::new(Inner {
                aggregator,
                cache: Mutex::new(None),
                refreshing: AtomicBool::new(false),
                directive,
            }),
        }
    }

    pub fn directive(&self) -> CacheDirective {
        self.inner.directive
    }

    fn max_age(&self) -> Duration {
        Duration::from_secs(self.inner.directive.max_age_secs)
    }

    fn stale_until(&self) -> Duration {
        Duration::from_secs(
            self.inner
                .directive
                .max_age_secs
                .saturating_add(self.inner.directive.stale_secs),
        )
    }

    /// Last stored response, regardless of age.
    pub async fn current(&self) -> Option<CachedFeed> {
        self.inner.cache.lock().await.clone()
    }

    /// Run one cycle and replace the cached response on success.
    pub async fn refresh(&self) -> Result<CachedFeed, PipelineError> {
        let fresh = run_cycle(&self.inner.aggregator).await?;
        *self.inner.cache.lock().await = Some(fresh.clone());
        Ok(fresh)
    }

    pub async fn get(&self) -> Result<(CachedFeed, CacheStatus), PipelineError> {
        let mut guard = self.inner.cache.lock().await;
        if let Some(c) = guard.as_ref() {
            let age = c.fetched_at.elapsed();
            if age < self.max_age() {
                counter!("feed_cache_hits_total").increment(1);
                return Ok((c.clone(), CacheStatus::Hit));
            }
            if age < self.stale_until() {
                counter!("feed_cache_hits_total").increment(1);
                self.spawn_background_refresh();
                return Ok((c.clone(), CacheStatus::Stale));
            }
        }

        counter!("feed_cache_misses_total").increment(1);
        let fresh = run_cycle(&self.inner.aggregator).await?;
        *guard = Some(fresh.clone());
        Ok((fresh, CacheStatus::Miss))
    }

    fn spawn_background_refresh(&self) {
        if self.inner.refreshing.swap(true, Ordering::AcqRel) {
            return;
        }
        let state = self.clone();
        tokio::spawn(async move {
            if let Err(e) = state.refresh().await {
                tracing::warn!(error = %e, "background feed refresh failed");
            }
            state.inner.refreshing.store(false, Ordering::Release);
        });
    }
}

/// Runs the pipeline on its own task so a panic inside it is reported as a
/// pipeline failure instead of dropping the connection.
async fn run_cycle(aggregator: &Arc<Aggregator>) -> Result<CachedFeed, PipelineError> {
    let agg = Arc::clone(aggregator);
    let resp = tokio::spawn(async move { agg.run().await })
        .await
        .map_err(|e| PipelineError::Aborted(e.to_string()))??;
    let body = serde_json::to_vec(&resp).map_err(|e| PipelineError::Aborted(e.to_string()))?;
    Ok(CachedFeed {
        etag: etag_for(&body),
        body: Bytes::from(body),
        fetched_at: Instant::now(),
    })
}

fn etag_for(body: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;
    let digest = Sha256::digest(body);
    let mut out = String::with_capacity(34);
    out.push('"');
    for b in digest.iter().take(16) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out.push('"');
    out
}

pub fn router(state: FeedState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/media-feed", get(media_feed))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
        .with_state(state)
}

async fn media_feed(State(state): State<FeedState>, headers: HeaderMap) -> Response {
    let (feed, status) = match state.get().await {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "media feed failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(PIPELINE_FAILED)).into_response();
        }
    };

    let not_modified = headers
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|t| t.trim() == feed.etag));

    let mut resp = if not_modified {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        ([(CONTENT_TYPE, "application/json")], feed.body.clone()).into_response()
    };

    let h = resp.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&state.directive().header_value()) {
        h.insert(CACHE_CONTROL, v);
    }
    if let Ok(v) = HeaderValue::from_str(&feed.etag) {
        h.insert(ETAG, v);
    }
    h.insert(CACHE_STATUS_HEADER, HeaderValue::from_static(status.as_str()));
    resp
}

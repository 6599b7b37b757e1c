// src/ingest/providers/http_feed.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::FetchConfig;
use crate::ingest::parse::parse_feed;
use crate::ingest::types::{RawItem, SourceProvider};
use crate::sources::Source;

/// Shared client for every source of a cycle. Some publishers reject requests
/// without a descriptive user agent.
pub fn build_client(cfg: &FetchConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(cfg.user_agent.clone())
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .gzip(true)
        .build()
        .context("building feed http client")
}

/// RSS/Atom endpoint fetched over HTTP(S).
pub struct HttpFeedProvider {
    source: Source,
    client: reqwest::Client,
}

impl HttpFeedProvider {
    pub fn new(source: Source, client: reqwest::Client) -> Self {
        Self { source, client }
    }
}

#[async_trait]
impl SourceProvider for HttpFeedProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>> {
        let url = self.source.url();
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} status"))?;
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        let items = parse_feed(&body).with_context(|| format!("parsing feed {url}"))?;
        Ok(items)
    }

    fn name(&self) -> &str {
        self.source.url()
    }
}

// src/expand.rs
//! Optional bounded expansion of aggregator article links.
//!
//! Some redirector links (`/articles/<opaque id>`) carry no recoverable target
//! in the query string; the only way to the publisher is to follow the
//! redirect. That costs one request per item, so it is capped per cycle.

use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::join_all;
use url::Url;

use crate::config::{ExpandConfig, FetchConfig};
use crate::ingest::types::FeedItem;
use crate::normalize::links::LinkResolver;
use crate::normalize::url_clean::{host_of, UrlCleaner};

pub struct RedirectExpander {
    client: reqwest::Client,
    max_expansions: usize,
}

impl RedirectExpander {
    pub fn new(cfg: &ExpandConfig, fetch: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(fetch.user_agent.clone())
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("building redirect expander client")?;
        Ok(Self {
            client,
            max_expansions: cfg.max_expansions,
        })
    }

    /// Follows redirects from `url`; the final location on success.
    pub async fn expand_one(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("expanding {url}"))?;
        Ok(resp.url().to_string())
    }

    /// Rewrites up to `max_expansions` redirector article links in place.
    /// Items whose expansion fails keep their link. Returns the indices of
    /// the items that changed.
    pub async fn expand_items(
        &self,
        items: &mut [FeedItem],
        resolver: &LinkResolver,
        cleaner: &UrlCleaner,
    ) -> Vec<usize> {
        let targets: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, it)| is_expandable(&it.url, resolver))
            .map(|(i, _)| i)
            .take(self.max_expansions)
            .collect();
        if targets.is_empty() {
            return Vec::new();
        }

        let results = join_all(targets.iter().map(|&i| {
            let url = items[i].url.clone();
            async move { (i, self.expand_one(&url).await) }
        }))
        .await;

        let mut changed = Vec::new();
        for (i, res) in results {
            match res {
                Ok(final_url) if !resolver.is_redirector(&final_url) => {
                    let cleaned = cleaner.clean(&final_url);
                    items[i].source = host_of(&cleaned);
                    items[i].url = cleaned;
                    changed.push(i);
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(error = ?e, "redirect expansion failed"),
            }
        }
        changed
    }
}

fn is_expandable(url: &str, resolver: &LinkResolver) -> bool {
    resolver.is_redirector(url)
        && Url::parse(url)
            .map(|u| u.path().contains("/articles/"))
            .unwrap_or(false)
}

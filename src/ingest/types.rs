// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Feed-native record as parsed from one RSS item or Atom entry.
///
/// Nothing here is trusted yet: links may point at redirectors, dates are raw
/// strings in whatever format the publisher chose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Every href seen on the item (Atom `link` elements, `atom:link` in RSS).
    pub links: Vec<String>,
    /// `feedburner:origLink`
    pub orig_link: Option<String>,
    /// RSS `guid` / Atom `id`
    pub guid: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub enclosure_type: Option<String>,
    /// Atom `published`/`updated`, `dc:date`
    pub iso_date: Option<String>,
    /// RSS `pubDate`
    pub pub_date: Option<String>,
}

/// Canonical item handed to ranking and serialized to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub url: String,
    pub source: String, // bare host, "www." stripped; empty if url did not parse
    pub published_at: DateTime<Utc>,
    pub summary: String,
    pub tags: Vec<String>,
}

impl FeedItem {
    /// Identity used by dedup: canonical url, or title when no url survived.
    pub fn dedup_key(&self) -> &str {
        if self.url.is_empty() {
            &self.title
        } else {
            &self.url
        }
    }

    /// Bucket used for domain caps.
    pub fn domain(&self) -> &str {
        if self.source.is_empty() {
            "unknown"
        } else {
            &self.source
        }
    }
}

impl From<&FeedItem> for RawItem {
    /// Re-feeds a canonical item through normalization (used to check that
    /// normalization is idempotent).
    fn from(it: &FeedItem) -> Self {
        RawItem {
            title: Some(it.title.clone()),
            link: Some(it.url.clone()),
            summary: Some(it.summary.clone()),
            iso_date: Some(it.published_at.to_rfc3339()),
            ..RawItem::default()
        }
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>>;
    fn name(&self) -> &str;
}

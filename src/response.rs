// src/response.rs
use serde::{Deserialize, Serialize};

use crate::config::CacheConfig;
use crate::ingest::types::FeedItem;

/// Body of `GET /api/media-feed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedResponse {
    pub top10: Vec<FeedItem>,
    pub items: Vec<FeedItem>,
}

/// Freshness directive attached to every successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheDirective {
    pub max_age_secs: u64,
    pub stale_secs: u64,
}

impl CacheDirective {
    pub fn from_config(cfg: &CacheConfig) -> Self {
        Self {
            max_age_secs: cfg.max_age_secs,
            stale_secs: cfg.stale_secs,
        }
    }

    pub fn header_value(&self) -> String {
        format!(
            "s-maxage={}, stale-while-revalidate={}",
            self.max_age_secs, self.stale_secs
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

pub const PIPELINE_FAILED: ErrorBody = ErrorBody {
    error: "media feed failed",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_header() {
        let d = CacheDirective::from_config(&CacheConfig::default());
        assert_eq!(d.header_value(), "s-maxage=900, stale-while-revalidate=900");
    }

    #[test]
    fn published_at_serializes_as_rfc3339() {
        use chrono::TimeZone;
        let it = FeedItem {
            title: "t".into(),
            url: "https://a.example.com/".into(),
            source: "a.example.com".into(),
            published_at: chrono::Utc.with_ymd_and_hms(2025, 10, 17, 14, 0, 0).unwrap(),
            summary: String::new(),
            tags: vec!["CLO".into()],
        };
        let v = serde_json::to_value(FeedResponse {
            top10: vec![it.clone()],
            items: vec![it],
        })
        .unwrap();
        assert_eq!(v["top10"][0]["published_at"], "2025-10-17T14:00:00Z");
        assert_eq!(v["items"][0]["tags"][0], "CLO");
    }
}

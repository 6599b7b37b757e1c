// src/config.rs
//! Pipeline configuration: source list, fetch settings, keyword and cap tables.
//!
//! Everything the pipeline treats as tunable lives here and is injected at
//! construction time. Missing sections fall back to the built-in seed, so a
//! config file only has to carry what it overrides.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::sources::{default_sources, Source};
use crate::tagger::TagRule;

pub const ENV_CONFIG_PATH: &str = "MEDIA_FEED_CONFIG_PATH";
pub const DEFAULT_CONFIG_TOML: &str = "config/media_feed.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/media_feed.json";

// Upper bounds checked by `validate`.
pub const MAX_RECENCY_WINDOW_HOURS: i64 = 24 * 365;
pub const MAX_BOOST_SECS: i64 = 24 * 3600;
pub const MAX_TIMEOUT_SECS: u64 = 600;
pub const MAX_CACHE_SECS: u64 = 7 * 24 * 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub sources: Vec<Source>,
    pub fetch: FetchConfig,
    /// Aggregator hosts whose links wrap the real publisher URL.
    pub redirector_hosts: Vec<String>,
    /// Query parameters removed during URL cleaning.
    pub tracking_params: Vec<String>,
    pub tags: Vec<TagRule>,
    pub filings: FilingsConfig,
    /// host → seconds the item's timestamp is advanced when ranking.
    pub boosts: HashMap<String, i64>,
    pub top: CapConfig,
    pub full_list: CapConfig,
    pub recency_window_hours: i64,
    pub expand: ExpandConfig,
    pub cache: CacheConfig,
    /// Background refresh interval; `None` disables the refresh task.
    pub refresh_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilingsConfig {
    pub host: String,
    /// Form codes worth showing; anything else from the filings host is dropped.
    pub forms: Vec<String>,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapConfig {
    pub limit: usize,
    pub default_cap: usize,
    pub caps: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandConfig {
    pub enabled: bool,
    pub max_expansions: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_age_secs: u64,
    pub stale_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            fetch: FetchConfig::default(),
            redirector_hosts: vec!["news.google.com".to_string()],
            tracking_params: [
                "utm_source",
                "utm_medium",
                "utm_campaign",
                "utm_term",
                "utm_content",
                "utm_id",
                "fbclid",
                "gclid",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            tags: default_tags(),
            filings: FilingsConfig::default(),
            boosts: [
                ("prnewswire.com", 600),
                ("businesswire.com", 600),
                ("globenewswire.com", 600),
                ("moodys.com", 600),
                ("ratings.spglobal.com", 600),
            ]
            .iter()
            .map(|(h, s)| (h.to_string(), *s))
            .collect(),
            top: CapConfig {
                limit: 10,
                default_cap: 3,
                caps: HashMap::from([("sec.gov".to_string(), 2)]),
            },
            full_list: CapConfig {
                limit: 300,
                default_cap: 30,
                caps: HashMap::from([("sec.gov".to_string(), 20)]),
            },
            recency_window_hours: 24,
            expand: ExpandConfig::default(),
            cache: CacheConfig::default(),
            refresh_secs: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("media-feed/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for FilingsConfig {
    fn default() -> Self {
        Self {
            host: "sec.gov".to_string(),
            forms: ["8-K", "10-Q", "10-K", "6-K", "20-F", "S-1", "S-3", "424B5", "DEF 14A"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            tag: "regulatory".to_string(),
        }
    }
}

impl Default for CapConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            default_cap: 3,
            caps: HashMap::new(),
        }
    }
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_expansions: 25,
            timeout_secs: 5,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 900,
            stale_secs: 900,
        }
    }
}

fn default_tags() -> Vec<TagRule> {
    let table: [(&str, &[&str]); 8] = [
        (
            "CLO",
            &[" clo ", " aaa ", " equity tranche", " reset", " refi", " manager"],
        ),
        (
            "Direct Lending",
            &["unitranche", "direct lending", "private debt", "sponsor", "club deal"],
        ),
        ("NAV", &["nav loan", "nav financing"]),
        (
            "BDC",
            &[" bdc ", "arcc", "bxsl", "ocsl", " main ", "psec", "cgbd", "fdus"],
        ),
        (
            "ABS",
            &["securitization", "warehouse", "term abs", "asset-backed"],
        ),
        (
            "Ratings",
            &[
                "rating action",
                "downgrade",
                "upgrade",
                "outlook revised",
                "criteria update",
                "methodology",
            ],
        ),
        (
            "Bankruptcy",
            &[
                "chapter 11",
                "prepack",
                "pre-negotiated plan",
                "dip financing",
                "restructuring support agreement",
                " rsa ",
            ],
        ),
        (
            "Private Equity",
            &[
                "private equity",
                "buyout",
                "portfolio company",
                "sponsor-backed",
                "add-on acquisition",
            ],
        ),
    ];
    table
        .iter()
        .map(|(label, kws)| TagRule::new(label, kws))
        .collect()
}

impl FeedConfig {
    /// Reject tables the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.top.limit == 0 || self.full_list.limit == 0 {
            return Err(PipelineError::InvalidConfig(
                "selection limits must be positive".into(),
            ));
        }
        if self.recency_window_hours <= 0 || self.recency_window_hours > MAX_RECENCY_WINDOW_HOURS {
            return Err(PipelineError::InvalidConfig(format!(
                "recency_window_hours must be in 1..={MAX_RECENCY_WINDOW_HOURS}"
            )));
        }
        if self.fetch.timeout_secs == 0 || self.fetch.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(PipelineError::InvalidConfig(format!(
                "fetch.timeout_secs must be in 1..={MAX_TIMEOUT_SECS}"
            )));
        }
        if self.expand.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(PipelineError::InvalidConfig(format!(
                "expand.timeout_secs must be at most {MAX_TIMEOUT_SECS}"
            )));
        }
        if let Some((host, secs)) = self
            .boosts
            .iter()
            .find(|(_, s)| s.unsigned_abs() > MAX_BOOST_SECS.unsigned_abs())
        {
            return Err(PipelineError::InvalidConfig(format!(
                "boost for {host} ({secs}s) exceeds {MAX_BOOST_SECS}s"
            )));
        }
        if self.cache.max_age_secs > MAX_CACHE_SECS || self.cache.stale_secs > MAX_CACHE_SECS {
            return Err(PipelineError::InvalidConfig(format!(
                "cache windows must be at most {MAX_CACHE_SECS}s"
            )));
        }
        Ok(())
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_from(path: &Path) -> Result<FeedConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing feed config {}", path.display()))
}

/// Load config using env var + fallbacks:
/// 1) $MEDIA_FEED_CONFIG_PATH
/// 2) config/media_feed.toml
/// 3) config/media_feed.json
/// 4) built-in defaults
pub fn load_default() -> Result<FeedConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    for p in [DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_JSON] {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
    }
    Ok(FeedConfig::default())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<FeedConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => {
            // No usable extension: JSON documents start with '{'.
            if s.trim_start().starts_with('{') {
                Ok(serde_json::from_str(s)?)
            } else {
                Ok(toml::from_str(s)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_seed_for_missing_sections() {
        let cfg = parse_config(
            r#"
recency_window_hours = 48

[top]
limit = 5
default_cap = 1

[top.caps]
"sec.gov" = 1
"#,
            "toml",
        )
        .unwrap();
        assert_eq!(cfg.recency_window_hours, 48);
        assert_eq!(cfg.top.limit, 5);
        assert_eq!(cfg.top.caps.get("sec.gov"), Some(&1));
        assert_eq!(cfg.full_list.limit, 300);
        assert_eq!(cfg.filings.tag, "regulatory");
        assert!(!cfg.sources.is_empty());
    }

    #[test]
    fn json_without_extension_is_detected() {
        let cfg = parse_config(r#"{"sources": ["https://a.example.com/feed"]}"#, "").unwrap();
        assert_eq!(cfg.sources, vec![Source::new("https://a.example.com/feed")]);
    }

    #[test]
    fn default_tag_table_has_unique_labels() {
        let tags = default_tags();
        let mut labels: Vec<_> = tags.iter().map(|t| t.label.clone()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), tags.len());
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let mut cfg = FeedConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.top.limit = 0;
        assert!(matches!(
            cfg.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_windows() {
        let invalid = |f: fn(&mut FeedConfig)| {
            let mut cfg = FeedConfig::default();
            f(&mut cfg);
            matches!(cfg.validate(), Err(PipelineError::InvalidConfig(_)))
        };
        assert!(invalid(|c| c.recency_window_hours = i64::MAX));
        assert!(invalid(|c| c.fetch.timeout_secs = u64::MAX));
        assert!(invalid(|c| c.expand.timeout_secs = u64::MAX));
        assert!(invalid(|c| {
            c.boosts.insert("wire.example.com".into(), i64::MIN);
        }));
        assert!(invalid(|c| c.cache.max_age_secs = u64::MAX));
        assert!(invalid(|c| c.cache.stale_secs = u64::MAX));

        let mut cfg = FeedConfig::default();
        cfg.recency_window_hours = MAX_RECENCY_WINDOW_HOURS;
        cfg.boosts.insert("wire.example.com".into(), -MAX_BOOST_SECS);
        assert!(cfg.validate().is_ok());
    }
}

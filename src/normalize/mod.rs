// src/normalize/mod.rs
//! Raw feed item → canonical `FeedItem`.

pub mod dates;
pub mod filings;
pub mod links;
pub mod url_clean;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::config::FeedConfig;
use crate::ingest::types::{FeedItem, RawItem};
use crate::tagger::Tagger;

use self::filings::FilingRules;
use self::links::LinkResolver;
use self::url_clean::{host_of, UrlCleaner};

const SUMMARY_MAX_CHARS: usize = 1000;

/// Why an item never became a `FeedItem`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Podcast episode or other audio enclosure.
    AudioEnclosure,
    /// Filing whose form code is not on the allow-list.
    FilingForm,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::AudioEnclosure => "audio",
            DropReason::FilingForm => "filing_form",
        }
    }
}

pub struct Normalizer {
    resolver: LinkResolver,
    cleaner: UrlCleaner,
    filings: FilingRules,
    tagger: Tagger,
}

impl Normalizer {
    pub fn new(
        resolver: LinkResolver,
        cleaner: UrlCleaner,
        filings: FilingRules,
        tagger: Tagger,
    ) -> Self {
        Self {
            resolver,
            cleaner,
            filings,
            tagger,
        }
    }

    pub fn from_config(cfg: &FeedConfig) -> Self {
        Self::new(
            LinkResolver::new(cfg.redirector_hosts.clone()),
            UrlCleaner::new(&cfg.tracking_params),
            FilingRules::from_config(&cfg.filings),
            Tagger::new(cfg.tags.clone()),
        )
    }

    pub fn resolver(&self) -> &LinkResolver {
        &self.resolver
    }

    pub fn cleaner(&self) -> &UrlCleaner {
        &self.cleaner
    }

    pub fn normalize(&self, raw: &RawItem, now: DateTime<Utc>) -> Result<FeedItem, DropReason> {
        let is_audio = raw
            .enclosure_type
            .as_deref()
            .is_some_and(|t| t.trim().to_ascii_lowercase().starts_with("audio"));
        if is_audio {
            return Err(DropReason::AudioEnclosure);
        }

        let url = self.cleaner.clean(&self.resolver.resolve(raw));
        let source = host_of(&url);
        let published_at = dates::published_at(raw, now);

        let title = clean_text(raw.title.as_deref().unwrap_or_default());
        let summary_src = raw
            .summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(raw.content.as_deref())
            .unwrap_or_default();
        let summary = snippet(summary_src, SUMMARY_MAX_CHARS);
        let tags = self.tagger.tag(&title, &summary);

        let mut item = FeedItem {
            title,
            url,
            source,
            published_at,
            summary,
            tags,
        };
        self.apply_filings(
            &mut item,
            raw.summary.as_deref().unwrap_or_default(),
            raw.content.as_deref().unwrap_or_default(),
        )?;
        Ok(item)
    }

    /// Allow-list, display title and tag for items on the filings host;
    /// anything else is left alone. Also run after redirect expansion, since
    /// an expanded link can land on the filings host.
    pub fn apply_filings(
        &self,
        item: &mut FeedItem,
        summary: &str,
        content: &str,
    ) -> Result<(), DropReason> {
        if !self.filings.applies_to(&item.source) {
            return Ok(());
        }
        let form = filings::extract_form(&item.title).unwrap_or_default();
        if !self.filings.is_allowed(&form) {
            return Err(DropReason::FilingForm);
        }
        item.title = filings::display_title(&item.title, summary, content);
        let tag = self.filings.tag();
        if !tag.is_empty() && !item.tags.iter().any(|t| t == tag) {
            item.tags.push(tag.to_string());
        }
        Ok(())
    }
}

/// Decode entities, drop markup, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[a-z!][^>]*>").expect("tag regex"));

    let decoded = html_escape::decode_html_entities(s);
    let stripped = re_tags.replace_all(&decoded, " ");
    stripped
        .split(|c: char| c.is_whitespace())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `clean_text` capped at `max` characters.
pub fn snippet(s: &str, max: usize) -> String {
    let out = clean_text(s);
    if out.chars().count() > max {
        return out.chars().take(max).collect::<String>().trim_end().to_string();
    }
    out
}

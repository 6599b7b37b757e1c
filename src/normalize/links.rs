// src/normalize/links.rs
//! Canonical link resolution.
//!
//! Aggregator search feeds, syndicated blogs and podcast feeds each expose the
//! publisher URL through a different field. Resolution runs an ordered list of
//! independent steps; the first candidate that is not a redirector link wins.

use url::Url;

use crate::ingest::types::RawItem;
use crate::normalize::url_clean::{host_matches, host_of, is_http_url};

/// One heuristic: propose a candidate link for the item, or nothing.
pub type LinkStep = fn(&LinkResolver, &RawItem) -> Option<String>;

pub struct LinkResolver {
    redirectors: Vec<String>,
    steps: Vec<LinkStep>,
}

impl LinkResolver {
    pub fn new(redirectors: Vec<String>) -> Self {
        Self::with_steps(
            redirectors,
            vec![primary_unwrapped, orig_link, first_alternate, guid_url],
        )
    }

    pub fn with_steps(redirectors: Vec<String>, steps: Vec<LinkStep>) -> Self {
        let redirectors = redirectors
            .into_iter()
            .map(|h| h.trim().trim_start_matches("www.").to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self { redirectors, steps }
    }

    pub fn is_redirector(&self, url: &str) -> bool {
        let host = host_of(url);
        !host.is_empty() && self.redirectors.iter().any(|r| host_matches(&host, r))
    }

    /// `https://news.example.com/...?url=https%3A%2F%2Fpub.com%2Fa` → `https://pub.com/a`.
    /// Links without a usable `url`/`q` parameter come back unchanged.
    pub fn unwrap_redirect(&self, link: &str) -> String {
        if !self.is_redirector(link) {
            return link.to_string();
        }
        let Ok(u) = Url::parse(link.trim()) else {
            return link.to_string();
        };
        for key in ["url", "q"] {
            let target = u
                .query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.trim().to_string());
            // `q` on search links is the query itself, not a URL.
            if let Some(t) = target.filter(|t| is_http_url(t)) {
                return t;
            }
        }
        link.to_string()
    }

    /// Best-known publisher link; a redirector link only when nothing better
    /// exists, and the empty string when the item carries no link at all.
    pub fn resolve(&self, item: &RawItem) -> String {
        let mut fallback: Option<String> = None;
        for step in &self.steps {
            let Some(candidate) = step(self, item)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
            else {
                continue;
            };
            if !self.is_redirector(&candidate) {
                return candidate;
            }
            fallback.get_or_insert(candidate);
        }
        fallback.unwrap_or_default()
    }
}

pub fn primary_unwrapped(r: &LinkResolver, item: &RawItem) -> Option<String> {
    item.link.as_deref().map(|l| r.unwrap_redirect(l))
}

pub fn orig_link(_: &LinkResolver, item: &RawItem) -> Option<String> {
    item.orig_link.clone()
}

pub fn first_alternate(r: &LinkResolver, item: &RawItem) -> Option<String> {
    item.links
        .iter()
        .find(|l| is_http_url(l) && !r.is_redirector(l))
        .cloned()
}

pub fn guid_url(_: &LinkResolver, item: &RawItem) -> Option<String> {
    item.guid.clone().filter(|g| is_http_url(g))
}

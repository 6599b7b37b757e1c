// src/normalize/url_clean.rs
use std::collections::HashSet;

use url::{form_urlencoded, Url};

/// Strips fragments and tracking parameters so the same article reached via
/// different campaigns compares equal.
#[derive(Debug, Clone, Default)]
pub struct UrlCleaner {
    tracking: HashSet<String>,
}

impl UrlCleaner {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tracking: params
                .into_iter()
                .map(|p| p.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    fn is_tracking(&self, key: &str) -> bool {
        self.tracking.contains(&key.to_ascii_lowercase())
    }

    /// `segment` is one raw `key=value` piece of a query string.
    fn is_tracking_segment(&self, segment: &str) -> bool {
        form_urlencoded::parse(segment.as_bytes())
            .next()
            .is_some_and(|(k, _)| self.is_tracking(&k))
    }

    /// Returns the cleaned URL; input that does not parse comes back trimmed
    /// but otherwise untouched.
    pub fn clean(&self, raw: &str) -> String {
        let raw = raw.trim();
        let Ok(mut url) = Url::parse(raw) else {
            return raw.to_string();
        };
        url.set_fragment(None);

        // Kept segments stay byte-for-byte so cleaned and already-clean links
        // share one encoding.
        let kept = url.query().map(|q| {
            q.split('&')
                .filter(|seg| !seg.is_empty() && !self.is_tracking_segment(seg))
                .collect::<Vec<_>>()
                .join("&")
        });
        match kept {
            Some(q) if !q.is_empty() => url.set_query(Some(&q)),
            _ => url.set_query(None),
        }
        url.to_string()
    }
}

/// Lower-cased hostname without a leading `www.`; empty when `url` does not parse.
pub fn host_of(url: &str) -> String {
    let Some(host) = Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
    else {
        return String::new();
    };
    match host.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => host,
    }
}

/// `host` is `domain` itself or one of its subdomains.
pub fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

pub fn is_http_url(s: &str) -> bool {
    Url::parse(s.trim())
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> UrlCleaner {
        UrlCleaner::new(["utm_source", "utm_medium", "fbclid", "gclid"])
    }

    #[test]
    fn strips_tracking_and_fragment() {
        let c = cleaner();
        assert_eq!(
            c.clean("https://example.com/a?id=7&utm_source=x&fbclid=abc#top"),
            "https://example.com/a?id=7"
        );
        assert_eq!(
            c.clean("https://example.com/a?utm_source=x&utm_medium=rss"),
            "https://example.com/a"
        );
    }

    #[test]
    fn untouched_query_keeps_encoding() {
        let c = cleaner();
        let u = "https://news.example.com/rss/search?q=site:x.com%20(a%20OR%20b)";
        assert_eq!(c.clean(u), u);
    }

    #[test]
    fn tracked_and_plain_links_compare_equal() {
        let c = cleaner();
        assert_eq!(
            c.clean("https://pub.example.com/story?id=a/b:c&utm_source=gn"),
            c.clean("https://pub.example.com/story?id=a/b:c")
        );
        assert_eq!(
            c.clean("https://pub.example.com/story?utm_source=x&q=a%20b"),
            "https://pub.example.com/story?q=a%20b"
        );
        assert_eq!(c.clean("https://pub.example.com/story?"), "https://pub.example.com/story");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let c = cleaner();
        let once = c.clean("HTTPS://WWW.Example.com/a/../b?gclid=1&x=a+b#f");
        assert_eq!(c.clean(&once), once);
    }

    #[test]
    fn unparseable_is_kept() {
        let c = cleaner();
        assert_eq!(c.clean("  not a url "), "not a url");
        assert_eq!(c.clean(""), "");
    }

    #[test]
    fn host_strips_www_and_handles_garbage() {
        assert_eq!(host_of("https://www.Reuters.com/x"), "reuters.com");
        assert_eq!(host_of("https://ratings.spglobal.com/x"), "ratings.spglobal.com");
        assert_eq!(host_of("garbage"), "");
    }

    #[test]
    fn domain_matching() {
        assert!(host_matches("news.google.com", "news.google.com"));
        assert!(host_matches("ratings.spglobal.com", "spglobal.com"));
        assert!(!host_matches("notspglobal.com", "spglobal.com"));
    }
}

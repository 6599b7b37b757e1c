//! # Ranking
//!
//! Newest-first ordering with per-host time boosts, identity dedup and the
//! recency window.
//!
//! Press wires and rating agencies publish first, but aggregator mirrors of
//! the same story often carry a later crawl timestamp. Advancing the trusted
//! hosts by a few minutes keeps the primary source on top, and since dedup
//! keeps the first occurrence, it also decides which copy survives.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};

use crate::ingest::types::FeedItem;
use crate::normalize::url_clean::host_matches;

#[derive(Debug, Clone, Default)]
pub struct BoostTable {
    offsets: HashMap<String, i64>,
}

impl BoostTable {
    /// `offsets`: host → seconds of advance. Matches the host or any subdomain.
    pub fn new(offsets: HashMap<String, i64>) -> Self {
        Self { offsets }
    }

    pub fn offset_for(&self, host: &str) -> Duration {
        if host.is_empty() {
            return Duration::zero();
        }
        if let Some(&s) = self.offsets.get(host) {
            return secs(s);
        }
        // Most specific parent domain wins.
        self.offsets
            .iter()
            .filter(|(d, _)| host_matches(host, d))
            .max_by_key(|(d, _)| d.len())
            .map(|(_, &s)| secs(s))
            .unwrap_or_else(Duration::zero)
    }

    pub fn effective_ts(&self, item: &FeedItem) -> DateTime<Utc> {
        item.published_at
            .checked_add_signed(self.offset_for(&item.source))
            .unwrap_or(item.published_at)
    }
}

// Out-of-range offsets count as no boost.
fn secs(s: i64) -> Duration {
    Duration::try_seconds(s).unwrap_or_else(Duration::zero)
}

/// Stable sort, newest effective timestamp first.
pub fn sort_newest_first(items: &mut [FeedItem], boosts: &BoostTable) {
    items.sort_by_cached_key(|it| std::cmp::Reverse(boosts.effective_ts(it)));
}

/// Keep the first occurrence of every identity key. Returns the kept items and
/// how many were removed.
pub fn dedup(items: Vec<FeedItem>) -> (Vec<FeedItem>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let before = items.len();
    let kept: Vec<FeedItem> = items
        .into_iter()
        .filter(|it| seen.insert(it.dedup_key().to_string()))
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Items published inside the window; all items when none are.
pub fn recent_or_all(items: &[FeedItem], now: DateTime<Utc>, window: Duration) -> Vec<FeedItem> {
    let cutoff = now - window;
    let recent: Vec<FeedItem> = items
        .iter()
        .filter(|it| it.published_at >= cutoff)
        .cloned()
        .collect();
    if recent.is_empty() {
        items.to_vec()
    } else {
        recent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(min: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap() + Duration::minutes(min)
    }

    fn item(url: &str, source: &str, min: i64) -> FeedItem {
        FeedItem {
            title: format!("t {url}"),
            url: url.to_string(),
            source: source.to_string(),
            published_at: at(min),
            summary: String::new(),
            tags: vec![],
        }
    }

    fn boosts() -> BoostTable {
        BoostTable::new(HashMap::from([
            ("prnewswire.com".to_string(), 600),
            ("spglobal.com".to_string(), 60),
            ("ratings.spglobal.com".to_string(), 300),
        ]))
    }

    #[test]
    fn offsets_prefer_most_specific_domain() {
        let b = boosts();
        assert_eq!(b.offset_for("prnewswire.com"), Duration::seconds(600));
        assert_eq!(b.offset_for("ratings.spglobal.com"), Duration::seconds(300));
        assert_eq!(b.offset_for("x.ratings.spglobal.com"), Duration::seconds(300));
        assert_eq!(b.offset_for("www2.spglobal.com"), Duration::seconds(60));
        assert_eq!(b.offset_for("reuters.com"), Duration::zero());
        assert_eq!(b.offset_for(""), Duration::zero());
    }

    #[test]
    fn extreme_offsets_do_not_panic() {
        let b = BoostTable::new(HashMap::from([
            ("huge.example.com".to_string(), i64::MAX),
            ("tiny.example.com".to_string(), i64::MIN),
        ]));
        assert_eq!(b.offset_for("huge.example.com"), Duration::zero());
        let it = item("https://tiny.example.com/a", "tiny.example.com", 0);
        assert_eq!(b.effective_ts(&it), it.published_at);

        let late = FeedItem {
            published_at: DateTime::<Utc>::MAX_UTC,
            ..item("https://prnewswire.com/a", "prnewswire.com", 0)
        };
        assert_eq!(boosts().effective_ts(&late), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn boosted_wire_outranks_later_mirror() {
        let b = boosts();
        let mut v = vec![
            item("https://mirror.example.com/a", "mirror.example.com", 5),
            item("https://prnewswire.com/a", "prnewswire.com", 0),
            item("https://old.example.com/a", "old.example.com", -60),
        ];
        sort_newest_first(&mut v, &b);
        assert_eq!(v[0].source, "prnewswire.com");
        assert_eq!(v[1].source, "mirror.example.com");
        assert_eq!(v[2].source, "old.example.com");
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let b = BoostTable::default();
        let mut v = vec![
            item("https://a.example.com/1", "a.example.com", 0),
            item("https://b.example.com/1", "b.example.com", 0),
            item("https://c.example.com/1", "c.example.com", 0),
        ];
        sort_newest_first(&mut v, &b);
        let order: Vec<_> = v.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(order, vec!["a.example.com", "b.example.com", "c.example.com"]);
    }

    #[test]
    fn dedup_keeps_boosted_copy() {
        let b = boosts();
        let mut v = vec![
            item("https://x.example.com/same", "x.example.com", 3),
            item("https://x.example.com/same", "prnewswire.com", 0),
            item("", "", 1),
            item("", "", 2),
        ];
        // The two url-less items share a title key only if titles match.
        v[2].title = "dup".into();
        v[3].title = "dup".into();
        sort_newest_first(&mut v, &b);
        let (kept, removed) = dedup(v);
        assert_eq!(removed, 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].source, "prnewswire.com");
        assert_eq!(kept[1].published_at, at(2));
    }

    #[test]
    fn recency_window_with_fallback() {
        let now = at(0);
        let window = Duration::hours(24);
        let v = vec![
            item("https://a.example.com/1", "a.example.com", -30),
            item("https://a.example.com/2", "a.example.com", -60 * 30),
        ];
        let recent = recent_or_all(&v, now, window);
        assert_eq!(recent.len(), 1);

        let stale = vec![
            item("https://a.example.com/3", "a.example.com", -60 * 48),
            item("https://a.example.com/4", "a.example.com", -60 * 72),
        ];
        assert_eq!(recent_or_all(&stale, now, window), stale);
        assert!(recent_or_all(&[], now, window).is_empty());
    }
}

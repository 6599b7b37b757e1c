// tests/pipeline_ranking.rs
//
// Ranking and selection behaviour through the public `Aggregator` surface,
// on hand-built items (no XML involved).

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use media_feed::ingest::providers::FixtureProvider;
use media_feed::{Aggregator, FeedConfig, FeedItem, RawItem, SourceProvider};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap()
}

fn item(host: &str, slug: &str, age_min: i64) -> FeedItem {
    FeedItem {
        title: format!("{host} {slug}"),
        url: format!("https://{host}/{slug}"),
        source: host.to_string(),
        published_at: now() - Duration::minutes(age_min),
        summary: String::new(),
        tags: vec![],
    }
}

fn aggregator(cfg: &FeedConfig) -> Aggregator {
    let p: Arc<dyn SourceProvider> =
        Arc::new(FixtureProvider::from_fixture("empty", "<rss><channel/></rss>"));
    Aggregator::with_providers(cfg, vec![p]).expect("valid config")
}

fn hosts(items: &[FeedItem]) -> Vec<&str> {
    items.iter().map(|i| i.source.as_str()).collect()
}

#[test]
fn dominant_host_is_capped_then_topped_up() {
    // 8 fresh items from one host, 4 older ones from distinct hosts.
    let mut items: Vec<FeedItem> = (0..8).map(|i| item("big.com", &format!("p{i}"), i)).collect();
    for (i, h) in ["a.com", "b.com", "c.com", "d.com"].iter().enumerate() {
        items.push(item(h, "x", 100 + i as i64));
    }

    let out = aggregator(&FeedConfig::default()).rank_and_select(items, now());

    assert_eq!(out.top10.len(), 10);
    // Pass 1: big.com p0..p2 and the four others; top-up: big.com p3..p5.
    assert_eq!(out.top10.iter().filter(|i| i.source == "big.com").count(), 6);
    for h in ["a.com", "b.com", "c.com", "d.com"] {
        assert!(hosts(&out.top10).contains(&h), "{h} missing from top10");
    }
    let big: Vec<_> = out
        .top10
        .iter()
        .filter(|i| i.source == "big.com")
        .map(|i| i.url.as_str())
        .collect();
    assert_eq!(
        big,
        vec![
            "https://big.com/p0",
            "https://big.com/p1",
            "https://big.com/p2",
            "https://big.com/p3",
            "https://big.com/p4",
            "https://big.com/p5",
        ]
    );
    // Output stays newest-first.
    assert!(out
        .top10
        .windows(2)
        .all(|w| w[0].published_at >= w[1].published_at));
    assert_eq!(out.items.len(), 12);
}

#[test]
fn filings_host_gets_two_slots_when_others_can_fill() {
    let mut items: Vec<FeedItem> = (0..5).map(|i| item("sec.gov", &format!("f{i}"), i)).collect();
    for (i, h) in ["a.com", "b.com", "c.com", "d.com", "e.com", "f.com", "g.com", "h.com"]
        .iter()
        .enumerate()
    {
        items.push(item(h, "x", 10 + i as i64));
    }
    let out = aggregator(&FeedConfig::default()).rank_and_select(items, now());
    assert_eq!(out.top10.len(), 10);
    assert_eq!(out.top10.iter().filter(|i| i.source == "sec.gov").count(), 2);
}

#[test]
fn recency_window_falls_back_to_everything_when_all_old() {
    let items = vec![
        item("a.com", "old1", 60 * 48),
        item("b.com", "old2", 60 * 72),
        item("c.com", "old3", 60 * 30),
    ];
    let out = aggregator(&FeedConfig::default()).rank_and_select(items, now());
    assert_eq!(hosts(&out.top10), vec!["c.com", "a.com", "b.com"]);
}

#[test]
fn recency_window_excludes_old_items_from_top10_only() {
    let items = vec![item("a.com", "fresh", 30), item("b.com", "stale", 60 * 30)];
    let out = aggregator(&FeedConfig::default()).rank_and_select(items, now());
    assert_eq!(hosts(&out.top10), vec!["a.com"]);
    assert_eq!(hosts(&out.items), vec!["a.com", "b.com"]);
}

#[test]
fn boosted_press_wire_outranks_slightly_newer_mirror() {
    // Same story: the wire at 11:50, a mirror at 11:55; a 10 minute boost
    // puts the wire first.
    let wire = item("prnewswire.com", "deal", 10);
    let mirror = item("mirror.example.com", "deal", 5);
    let out = aggregator(&FeedConfig::default()).rank_and_select(vec![mirror, wire], now());
    assert_eq!(hosts(&out.top10), vec!["prnewswire.com", "mirror.example.com"]);
    // Boost affects order only, never the published timestamp.
    assert_eq!(out.top10[0].published_at, now() - Duration::minutes(10));
}

#[test]
fn duplicates_keep_the_highest_ranked_copy() {
    let newer = FeedItem {
        title: "newer".into(),
        ..item("a.com", "same", 5)
    };
    let older = FeedItem {
        title: "older".into(),
        ..item("a.com", "same", 50)
    };
    let out = aggregator(&FeedConfig::default()).rank_and_select(vec![older, newer], now());
    assert_eq!(out.items.len(), 1);
    assert_eq!(out.items[0].title, "newer");
}

#[test]
fn linkless_items_dedup_by_title_and_share_the_uncapped_bucket() {
    let bare = |t: &str, age: i64| FeedItem {
        title: t.to_string(),
        url: String::new(),
        source: String::new(),
        ..item("x", "y", age)
    };
    let items = vec![
        bare("one", 1),
        bare("two", 2),
        bare("one", 3),
        bare("three", 4),
        bare("four", 5),
    ];
    let out = aggregator(&FeedConfig::default()).rank_and_select(items, now());
    let titles: Vec<_> = out.top10.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["one", "two", "three", "four"]);
}

#[test]
fn configured_caps_override_defaults() {
    let mut cfg = FeedConfig::default();
    cfg.top.limit = 3;
    cfg.top.default_cap = 1;
    let items = vec![
        item("a.com", "1", 1),
        item("a.com", "2", 2),
        item("b.com", "1", 3),
        item("c.com", "1", 4),
    ];
    let out = aggregator(&cfg).rank_and_select(items, now());
    assert_eq!(hosts(&out.top10), vec!["a.com", "b.com", "c.com"]);
}

#[test]
fn normalization_is_idempotent_on_its_own_output() {
    let mut cfg = FeedConfig::default();
    cfg.redirector_hosts.push("news.example.com".into());
    let agg = aggregator(&cfg);

    let raw = vec![
        RawItem {
            title: Some("<b>CLO</b> manager prices &amp; resets deal".into()),
            link: Some(
                "https://news.example.com/r?url=https%3A%2F%2Fwww.pub.example.com%2Fclo%3Futm_medium%3Dx%23top"
                    .into(),
            ),
            pub_date: Some("Sat, 18 Oct 2025 08:00:00 GMT".into()),
            summary: Some("<p>Warehouse facility converts to a term ABS.</p>".into()),
            ..RawItem::default()
        },
        RawItem {
            title: Some("FORM 10-K".into()),
            link: Some("https://www.sec.gov/Archives/edgar/data/1/z-index.htm".into()),
            summary: Some("Company Name: Gamma Credit Fund".into()),
            ..RawItem::default()
        },
    ];

    let first = agg.normalize_all(&raw, now());
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].url, "https://www.pub.example.com/clo");
    assert_eq!(first[1].title, "10-K: Gamma Credit Fund");

    let again_raw: Vec<RawItem> = first.iter().map(RawItem::from).collect();
    let second = agg.normalize_all(&again_raw, now());
    assert_eq!(first, second);
}

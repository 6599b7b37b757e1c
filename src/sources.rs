//! # Source Registry
//!
//! Feed endpoints polled once per aggregation cycle. Each source is an opaque
//! URI; what kind of feed sits behind it (publisher blog, aggregator search,
//! filings registry, press wire) only matters to the normalizer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Source(String);

impl Source {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

const GN: &str = "https://news.google.com/rss/search?q=";
const GN_TAIL: &str = "&hl=en-US&gl=US&ceid=US:en";
const EDGAR: &str = "https://www.sec.gov/cgi-bin/browse-edgar?action=getcurrent";

/// Built-in registry used when the config file does not list sources.
pub fn default_sources() -> Vec<Source> {
    let direct = [
        "https://www.privatedebtinvestor.com/feed/",
        "https://www.hedgeweek.com/feed/",
        "https://alpha-week.com/rss.xml",
        "https://www.livewiremarkets.com/feeds",
        "https://privatemarketsreview.substack.com/feed",
        "https://www.privatemarketsmagazine.com/feed/",
        "https://feeds.buzzsprout.com/1811593.rss",
    ];

    // Aggregator searches, one per publisher/sponsor/wire.
    let searches = [
        "site:globalcapital.com%20(securitization%20OR%20CLO%20OR%20%22private%20credit%22)",
        "(private+credit%20OR%20%22direct%20lending%22%20OR%20CLO%20OR%20BDC%20OR%20%22NAV%20loan%22%20OR%20securitization)",
        "site:pitchbook.com%20(private%20credit%20OR%20direct%20lending)",
        "site:bloomberg.com%20(private%20credit%20OR%20direct%20lending%20OR%20CLO%20OR%20%22NAV%20financing%22)",
        "site:reuters.com%20(private%20credit%20OR%20%22direct%20lending%22%20OR%20CLO)",
        "site:spglobal.com%20(direct%20lending%20OR%20CLO%20OR%20BDC)",
        "site:wsj.com%20(private%20credit%20OR%20direct%20lending)",
        "site:ft.com%20(private%20credit%20OR%20direct%20lending)",
        "site:barrons.com%20(private%20credit%20OR%20direct%20lending)",
        "site:moodys.com%20(%22rating%20action%22%20OR%20downgrade%20OR%20upgrade%20OR%20methodology)",
        "site:ratings.spglobal.com%20(%22rating%20action%22%20OR%20downgrade%20OR%20upgrade%20OR%20criteria%20update)",
        "site:prnewswire.com%20(private%20credit%20OR%20direct%20lending%20OR%20CLO%20OR%20BDC)",
        "site:businesswire.com%20(private%20credit%20OR%20direct%20lending%20OR%20CLO%20OR%20BDC)",
        "site:globenewswire.com%20(private%20credit%20OR%20direct%20lending%20OR%20CLO%20OR%20BDC)",
        "site:kkr.com%20(%22press%20release%22%20OR%20credit)",
        "site:apollo.com%20(%22press%20release%22%20OR%20credit)",
        "site:blackstone.com%20(%22press%20release%22%20OR%20credit)",
        "site:carlyle.com%20(%22press%20release%22%20OR%20credit)",
        "site:aresmgmt.com%20(%22press%20release%22%20OR%20credit)",
        "site:barings.com%20(private%20credit%20OR%20direct%20lending%20OR%20press%20release)",
        "site:golubcapital.com%20(private%20credit%20OR%20direct%20lending%20OR%20BDC)",
        "site:blueowl.com%20(owl%20rock%20OR%20direct%20lending%20OR%20BDC)",
        "site:hpspartners.com%20(private%20credit%20OR%20direct%20lending)",
        "site:antares.com%20(private%20credit%20OR%20direct%20lending)",
        "site:monroecap.com%20(private%20credit%20OR%20direct%20lending)",
        "site:courtlistener.com%20(chapter%2011%20OR%20bankruptcy%20OR%20DIP)",
        "site:gov.uk%20(Companies%20House%20charge%20OR%20mortgage)",
    ];

    // Filings registry: broad current feed plus form-specific ones.
    let forms = ["", "8-K", "10-Q", "10-K", "S-1", "DEF+14A", "S-3", "424B5"];

    let mut out: Vec<Source> = direct.iter().map(|u| Source::new(*u)).collect();
    out.extend(
        searches
            .iter()
            .map(|q| Source::new(format!("{GN}{q}{GN_TAIL}"))),
    );
    out.extend(forms.iter().map(|f| {
        let ty = if f.is_empty() {
            String::new()
        } else {
            format!("&type={f}")
        };
        Source::new(format!(
            "{EDGAR}{ty}&owner=include&count=100&output=atom"
        ))
    }));
    out
}

// src/ingest/providers/fixture.rs
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ingest::parse::parse_feed;
use crate::ingest::types::{RawItem, SourceProvider};

/// Feed body held in memory (tests, demos, offline runs).
/// Parsed on every fetch, so a malformed fixture fails like a bad upstream would.
pub struct FixtureProvider {
    name: String,
    xml: String,
}

impl FixtureProvider {
    pub fn from_fixture(name: &str, xml: &str) -> Self {
        Self {
            name: name.to_string(),
            xml: xml.to_string(),
        }
    }
}

#[async_trait]
impl SourceProvider for FixtureProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>> {
        parse_feed(&self.xml).with_context(|| format!("parsing fixture {}", self.name))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// src/ingest/providers/mod.rs
pub mod fixture;
pub mod http_feed;

pub use fixture::FixtureProvider;
pub use http_feed::{build_client, HttpFeedProvider};

// src/scheduler.rs
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::api::FeedState;

/// Keep the response cache warm by running a cycle every `interval`.
/// The first tick fires immediately. Failed cycles leave the previous
/// response in place.
pub fn spawn_refresh_task(state: FeedState, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match state.refresh().await {
                Ok(feed) => {
                    counter!("feed_refresh_runs_total", "outcome" => "ok").increment(1);
                    tracing::info!(
                        target: "media_feed",
                        bytes = feed.body.len(),
                        "scheduled refresh"
                    );
                }
                Err(e) => {
                    counter!("feed_refresh_runs_total", "outcome" => "error").increment(1);
                    tracing::warn!(target: "media_feed", error = %e, "scheduled refresh failed");
                }
            }
        }
    })
}

//! Background refresh of the first page while the feed is open.

use super::controller::Feed;
use crate::cancel::CancellationToken;
use crate::config::FeedConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Refresh `feed` every `period` until `cancel` fires.
///
/// The first refresh happens one full period after spawning; the initial load
/// belongs to [`Feed::start`]. Ticks missed while a refresh was slow are
/// delayed rather than replayed back to back.
pub fn spawn_refresh_loop(
    feed: Arc<Feed>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let period = if period < FeedConfig::MIN_REFRESH_INTERVAL {
        warn!(
            "Refresh period {:?} too short, using {:?}",
            period, FeedConfig::MIN_REFRESH_INTERVAL
        );
        FeedConfig::MIN_REFRESH_INTERVAL
    } else {
        period
    };

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Refresh loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    match feed.refresh().await {
                        Ok(()) => debug!("Periodic refresh done"),
                        Err(e) => warn!("Periodic refresh failed: {}", e),
                    }
                }
            }
        }
    })
}

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{error, info};

use super::{BuildOutcome, CatalogCache};

/// Rebuilds the catalog every `period`, starting one period from now.
///
/// The startup build is the caller's responsibility; a failure here is
/// logged and the previous listing stays in place.
pub fn spawn_refresh(cache: Arc<CatalogCache>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            info!("starting scheduled catalog refresh");
            match cache.build().await {
                Ok(BuildOutcome::Rebuilt { items, elapsed }) => {
                    info!(items, ?elapsed, "scheduled catalog refresh rebuilt listing");
                }
                Ok(BuildOutcome::Unchanged { items }) => {
                    info!(items, "scheduled catalog refresh found no change");
                }
                Err(err) => {
                    error!(error = %err, "scheduled catalog refresh failed; keeping previous listing");
                }
            }
        }
    })
}

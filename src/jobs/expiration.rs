// Background sweep that expires listings whose deadline has passed.
use std::sync::Arc;

use tokio::time::{interval, Duration};
use tracing::{error, info};

use crate::services::ListingService;

/// Runs one pass at startup, then repeats on the configured interval.
/// Each pass is a single UPDATE, so a missed tick just means the next
/// one catches up.
pub fn start_listing_expiration_sweep(listing_service: Arc<ListingService>, every_secs: u64) {
    info!(
        "Starting listing expiration sweep (every {}s)",
        every_secs
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(every_secs.max(1)));

        loop {
            ticker.tick().await;

            match listing_service.expire_overdue().await {
                Ok(0) => {}
                Ok(count) => info!("Expired {} overdue listings", count),
                Err(e) => error!("Listing expiration sweep failed: {}", e),
            }
        }
    });
}

//! Background sweeper driving hold expiry and overdue detection
//!
//! Both sweeps take the reference time as a parameter; only this task feeds
//! them the wall clock.

use std::time::Duration;

use chrono::Utc;

use crate::services::Services;

/// Run both sweeps forever on the configured cadence. Spawned once at
/// startup; any cadence is safe because the underlying transitions are
/// conditional and idempotent.
pub async fn run(services: Services, interval_secs: u64) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    // The first tick fires immediately; catch up on state from before restart
    loop {
        ticker.tick().await;
        let now = Utc::now();

        let expired = services.reservations.sweep_expired(now);
        let overdue = services.lending.sweep_overdue(now).await;

        tracing::info!(
            expired_holds = expired,
            overdue_loans = overdue,
            "Sweep pass completed"
        );
    }
}

//! Background reconciliation for bookings the normal flow left open.
//!
//! Two idempotent batch jobs: paid-but-never-verified bookings past
//! their checkout expire, and verified/in-use bookings past checkout
//! auto-complete. Every row is closed with a conditional update, so a
//! sweep racing a live transition simply no-ops on that row and picks
//! it up again next tick if needed.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::domain::{DomainResult, RepositoryProvider};
use crate::shared::shutdown::ShutdownSignal;

/// Rows processed per job per tick, bounding lock/contention time.
const SWEEP_PAGE_SIZE: u64 = 100;

/// Timer-driven reconciliation over the booking store.
pub struct BookingSweeper {
    repos: Arc<dyn RepositoryProvider>,
}

impl BookingSweeper {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Expire `Paid` bookings whose checkout time passed without a
    /// check-in. Returns how many rows this call closed; per-row
    /// failures are logged and retried on the next tick.
    pub async fn process_expired_bookings(&self) -> DomainResult<u64> {
        let now = Utc::now();
        let overdue = self
            .repos
            .bookings()
            .find_expired_paid(now, SWEEP_PAGE_SIZE)
            .await?;

        let mut swept = 0;
        for booking in overdue {
            match self.repos.bookings().mark_expired(booking.id).await {
                Ok(true) => swept += 1,
                // A live transition got there first; nothing to do.
                Ok(false) => {}
                Err(e) => {
                    warn!(booking_no = %booking.booking_no, error = %e, "Failed to expire booking");
                }
            }
        }

        if swept > 0 {
            info!(count = swept, "Expired overdue bookings");
        }
        Ok(swept)
    }

    /// Auto-complete `Verified`/`InUse` bookings whose checkout time
    /// passed without an explicit check-out.
    pub async fn process_completed_bookings(&self) -> DomainResult<u64> {
        let now = Utc::now();
        let overdue = self
            .repos
            .bookings()
            .find_overdue_active(now, SWEEP_PAGE_SIZE)
            .await?;

        let mut swept = 0;
        for booking in overdue {
            match self.repos.bookings().mark_completed(booking.id, now).await {
                Ok(true) => swept += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(booking_no = %booking.booking_no, error = %e, "Failed to complete booking");
                }
            }
        }

        if swept > 0 {
            info!(count = swept, "Auto-completed overdue bookings");
        }
        Ok(swept)
    }
}

/// Start the booking sweep background task.
///
/// The task runs both reconciliation jobs every `check_interval_secs`
/// until the shutdown signal fires.
pub fn start_booking_sweeper_task(
    repos: Arc<dyn RepositoryProvider>,
    shutdown: ShutdownSignal,
    check_interval_secs: u64,
) {
    tokio::spawn(async move {
        info!(
            check_interval = check_interval_secs,
            "Booking sweeper task started"
        );

        let sweeper = BookingSweeper::new(repos);
        let mut interval = tokio::time::interval(Duration::from_secs(check_interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = sweeper.process_expired_bookings().await {
                        warn!(error = %e, "Booking expiry sweep error");
                    }
                    if let Err(e) = sweeper.process_completed_bookings().await {
                        warn!(error = %e, "Booking completion sweep error");
                    }
                }
                _ = shutdown.notified().wait() => {
                    info!("Booking sweeper task shutting down");
                    break;
                }
            }
        }

        info!("Booking sweeper task stopped");
    });
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    use crate::domain::booking::BookingStatus;
    use crate::infrastructure::storage::memory::InMemoryRepositoryProvider;

    fn repos_with_booking(status: BookingStatus, hours_past_checkout: i64) -> (Arc<InMemoryRepositoryProvider>, i64) {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let check_out = Utc::now() - ChronoDuration::hours(hours_past_checkout);
        let id = repos.mem_bookings().seed_booking(
            10,
            7,
            status,
            check_out - ChronoDuration::hours(2),
            check_out,
        );
        (repos, id)
    }

    #[tokio::test]
    async fn paid_past_checkout_expires() {
        let (repos, id) = repos_with_booking(BookingStatus::Paid, 1);
        let sweeper = BookingSweeper::new(repos.clone());

        assert_eq!(sweeper.process_expired_bookings().await.unwrap(), 1);
        assert_eq!(
            repos.mem_bookings().get(id).unwrap().status,
            BookingStatus::Expired
        );

        // Idempotent: a second sweep finds nothing.
        assert_eq!(sweeper.process_expired_bookings().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn paid_inside_window_is_left_alone() {
        let (repos, id) = repos_with_booking(BookingStatus::Paid, -1); // checkout in 1h
        let sweeper = BookingSweeper::new(repos.clone());

        assert_eq!(sweeper.process_expired_bookings().await.unwrap(), 0);
        assert_eq!(
            repos.mem_bookings().get(id).unwrap().status,
            BookingStatus::Paid
        );
    }

    #[tokio::test]
    async fn verified_past_checkout_completes() {
        let (repos, id) = repos_with_booking(BookingStatus::Verified, 1);
        let sweeper = BookingSweeper::new(repos.clone());

        assert_eq!(sweeper.process_completed_bookings().await.unwrap(), 1);
        let swept = repos.mem_bookings().get(id).unwrap();
        assert_eq!(swept.status, BookingStatus::Completed);
        assert!(swept.completed_at.is_some());
    }

    #[tokio::test]
    async fn in_use_past_checkout_completes() {
        let (repos, id) = repos_with_booking(BookingStatus::InUse, 1);
        let sweeper = BookingSweeper::new(repos.clone());

        assert_eq!(sweeper.process_completed_bookings().await.unwrap(), 1);
        assert_eq!(
            repos.mem_bookings().get(id).unwrap().status,
            BookingStatus::Completed
        );
    }

    #[tokio::test]
    async fn pending_bookings_are_not_swept() {
        let (repos, id) = repos_with_booking(BookingStatus::Pending, 1);
        let sweeper = BookingSweeper::new(repos.clone());

        assert_eq!(sweeper.process_expired_bookings().await.unwrap(), 0);
        assert_eq!(sweeper.process_completed_bookings().await.unwrap(), 0);
        assert_eq!(
            repos.mem_bookings().get(id).unwrap().status,
            BookingStatus::Pending
        );
    }

    #[tokio::test]
    async fn terminal_states_never_revert() {
        let (repos, id) = repos_with_booking(BookingStatus::Expired, 1);
        let sweeper = BookingSweeper::new(repos.clone());

        assert_eq!(sweeper.process_expired_bookings().await.unwrap(), 0);
        assert_eq!(sweeper.process_completed_bookings().await.unwrap(), 0);
        assert_eq!(
            repos.mem_bookings().get(id).unwrap().status,
            BookingStatus::Expired
        );
    }
}

//! Booking repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::model::Booking;
use crate::domain::DomainResult;

/// Everything needed to persist a new booking and its payment order.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub booking_no: String,
    pub room_id: i64,
    pub device_id: Option<String>,
    pub user_id: i64,
    pub duration_hours: i32,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: DateTime<Utc>,
    pub amount: Decimal,
    pub verification_code: String,
    pub unlock_code: String,
    pub qr_code: String,
    pub order_no: String,
}

/// Storage operations for bookings.
///
/// Two contracts matter for correctness and are binding on every
/// implementation:
///
/// 1. [`create_if_available`](Self::create_if_available) performs the
///    room-availability check and the inserts of the payment order and
///    the booking as ONE atomic unit. Of two concurrent calls with
///    overlapping windows for the same room, at most one may succeed;
///    the other gets `DomainError::BookingConflict`.
/// 2. Every `mark_*` transition is a conditional update keyed on the
///    expected prior status and returns whether a row was affected.
///    Callers never read-modify-write a status.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Atomically check availability and persist the booking together
    /// with its payment order. Returns the stored booking in `Pending`.
    async fn create_if_available(&self, new: NewBooking) -> DomainResult<Booking>;

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Booking>>;

    async fn find_by_no(&self, booking_no: &str) -> DomainResult<Option<Booking>>;

    async fn find_by_order_id(&self, order_id: i64) -> DomainResult<Option<Booking>>;

    async fn find_by_verification_code(&self, code: &str) -> DomainResult<Option<Booking>>;

    /// Find the booking a device PIN currently identifies: matching
    /// `(device_id, unlock_code)` with a room-holding status.
    async fn find_active_for_device_code(
        &self,
        device_id: &str,
        unlock_code: &str,
    ) -> DomainResult<Option<Booking>>;

    /// Whether an active booking already uses `unlock_code` on this
    /// device. Creation retries generation while this returns true.
    async fn active_unlock_code_exists(
        &self,
        device_id: &str,
        unlock_code: &str,
    ) -> DomainResult<bool>;

    /// `Pending → Paid`. True if this call won the transition.
    async fn mark_paid(&self, id: i64) -> DomainResult<bool>;

    /// `Paid → Verified`, stamping `verified_at`/`verified_by`.
    async fn mark_verified(
        &self,
        id: i64,
        verified_by: i64,
        at: DateTime<Utc>,
    ) -> DomainResult<bool>;

    /// `Verified → InUse`, stamping `unlocked_at`.
    async fn mark_in_use(&self, id: i64, at: DateTime<Utc>) -> DomainResult<bool>;

    /// `Verified|InUse → Completed`, stamping `completed_at`.
    async fn mark_completed(&self, id: i64, at: DateTime<Utc>) -> DomainResult<bool>;

    /// `Pending → Cancelled`.
    async fn mark_cancelled(&self, id: i64) -> DomainResult<bool>;

    /// `Pending|Paid → Expired`.
    async fn mark_expired(&self, id: i64) -> DomainResult<bool>;

    /// `Paid` bookings whose checkout time has passed (sweep page).
    async fn find_expired_paid(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> DomainResult<Vec<Booking>>;

    /// `Verified`/`InUse` bookings whose checkout time has passed
    /// (sweep page).
    async fn find_overdue_active(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> DomainResult<Vec<Booking>>;
}

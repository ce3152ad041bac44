//! Booking domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Booking lifecycle status.
///
/// Forward path: `Pending → Paid → Verified → InUse → Completed`.
/// Side branches: `Pending → Cancelled`, and the sweeper moves
/// `Paid → Expired` and `Verified/InUse → Completed`.
/// `Completed`, `Cancelled` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    /// Created, awaiting payment
    Pending,
    /// Payment confirmed
    Paid,
    /// Checked in at the front desk
    Verified,
    /// Door unlocked, guest inside the paid window
    InUse,
    /// Stay finished
    Completed,
    /// Cancelled by the owner before payment
    Cancelled,
    /// Never followed through before checkout time
    Expired,
}

impl BookingStatus {
    /// Statuses that hold the room (block overlapping bookings).
    pub const ACTIVE: [BookingStatus; 4] = [
        Self::Pending,
        Self::Paid,
        Self::Verified,
        Self::InUse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Verified => "Verified",
            Self::InUse => "InUse",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Expired => "Expired",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Paid" => Self::Paid,
            "Verified" => Self::Verified,
            "InUse" => Self::InUse,
            "Completed" => Self::Completed,
            "Cancelled" => Self::Cancelled,
            "Expired" => Self::Expired,
            _ => Self::Cancelled,
        }
    }

    /// Whether this status still holds the room.
    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    /// Terminal statuses permit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Room booking with its access codes and paid time window.
#[derive(Debug, Clone)]
pub struct Booking {
    /// Unique booking ID
    pub id: i64,
    /// Human-facing booking number (unique, externally visible)
    pub booking_no: String,
    /// Reserved room
    pub room_id: i64,
    /// 1:1 payment-bearing order
    pub order_id: i64,
    /// Smart-lock serial of the room, if one is installed
    pub device_id: Option<String>,
    /// Owning user
    pub user_id: i64,
    /// Booked duration in hours
    pub duration_hours: i32,
    /// Start of the paid window
    pub check_in_time: DateTime<Utc>,
    /// End of the paid window (`check_in_time + duration_hours`)
    pub check_out_time: DateTime<Utc>,
    /// Price copied from the matched time slot at creation
    pub amount: Decimal,
    /// Front-desk check-in secret
    pub verification_code: String,
    /// Door PIN
    pub unlock_code: String,
    /// Staff-facing scan URL
    pub qr_code: String,
    /// Current status
    pub status: BookingStatus,
    /// Set once by the verify transition
    pub verified_at: Option<DateTime<Utc>>,
    /// Staff member who checked the guest in
    pub verified_by: Option<i64>,
    /// Set once by the unlock transition
    pub unlocked_at: Option<DateTime<Utc>>,
    /// Set once by completion (explicit or swept)
    pub completed_at: Option<DateTime<Utc>>,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Whether this booking still holds the room.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether the paid window is already behind us.
    pub fn is_past_checkout(&self, now: DateTime<Utc>) -> bool {
        now >= self.check_out_time
    }

    /// Whether `[start, end)` overlaps this booking's window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.check_in_time < end && self.check_out_time > start
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_booking() -> Booking {
        let check_in = Utc::now() + Duration::hours(1);
        Booking {
            id: 1,
            booking_no: "R20250301120000123456".into(),
            room_id: 10,
            order_id: 100,
            device_id: Some("LOCK-001".into()),
            user_id: 7,
            duration_hours: 2,
            check_in_time: check_in,
            check_out_time: check_in + Duration::hours(2),
            amount: Decimal::new(100, 0),
            verification_code: "Vabc123def456abc123d".into(),
            unlock_code: "123456".into(),
            qr_code: "/hotel/verify/R20250301120000123456?code=Vabc123def456abc123d".into(),
            status: BookingStatus::Pending,
            verified_at: None,
            verified_by: None,
            unlocked_at: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn new_booking_is_active() {
        let b = sample_booking();
        assert!(b.is_active());
        assert_eq!(b.status, BookingStatus::Pending);
        assert!(!b.status.is_terminal());
    }

    #[test]
    fn terminal_statuses() {
        for status in [
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::Expired,
        ] {
            assert!(status.is_terminal());
            assert!(!status.is_active());
        }
    }

    #[test]
    fn active_statuses_hold_the_room() {
        for status in BookingStatus::ACTIVE {
            assert!(status.is_active());
            assert!(!status.is_terminal());
        }
    }

    #[test]
    fn status_display_roundtrip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Paid,
            BookingStatus::Verified,
            BookingStatus::InUse,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::Expired,
        ] {
            let s = status.as_str();
            assert_eq!(BookingStatus::from_str(s), status);
        }
    }

    #[test]
    fn unknown_status_defaults_to_cancelled() {
        assert_eq!(BookingStatus::from_str("Unknown"), BookingStatus::Cancelled);
    }

    #[test]
    fn overlap_detection() {
        let b = sample_booking();
        // fully inside
        assert!(b.overlaps(
            b.check_in_time + Duration::minutes(30),
            b.check_out_time - Duration::minutes(30),
        ));
        // straddles the start
        assert!(b.overlaps(
            b.check_in_time - Duration::hours(1),
            b.check_in_time + Duration::minutes(1),
        ));
        // half-open ranges: touching windows do not overlap
        assert!(!b.overlaps(b.check_out_time, b.check_out_time + Duration::hours(2)));
        assert!(!b.overlaps(b.check_in_time - Duration::hours(2), b.check_in_time));
    }

    #[test]
    fn past_checkout_is_inclusive() {
        let b = sample_booking();
        assert!(b.is_past_checkout(b.check_out_time));
        assert!(b.is_past_checkout(b.check_out_time + Duration::seconds(1)));
        assert!(!b.is_past_checkout(b.check_out_time - Duration::seconds(1)));
    }
}

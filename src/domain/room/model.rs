//! Room, hotel and time-slot read models
//!
//! The engine never administers these; it only reads them when
//! creating a booking.

use rust_decimal::Decimal;

/// Operational status shared by rooms and hotels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueStatus {
    Active,
    Disabled,
}

impl VenueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Disabled => "Disabled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Active" => Self::Active,
            _ => Self::Disabled,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A bookable room served by an optional smart lock.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: i64,
    pub hotel_id: i64,
    pub name: String,
    /// Serial of the smart lock installed in this room
    pub device_id: Option<String>,
    pub status: VenueStatus,
}

impl Room {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// The venue a room belongs to.
#[derive(Debug, Clone)]
pub struct Hotel {
    pub id: i64,
    pub name: String,
    pub status: VenueStatus,
}

impl Hotel {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// A priced duration option for a room, e.g. "2 hours for 100".
#[derive(Debug, Clone)]
pub struct TimeSlot {
    pub id: i64,
    pub room_id: i64,
    pub duration_hours: i32,
    pub price: Decimal,
    pub is_active: bool,
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venue_status_roundtrip() {
        for status in [VenueStatus::Active, VenueStatus::Disabled] {
            assert_eq!(VenueStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_venue_status_is_disabled() {
        assert_eq!(VenueStatus::from_str("???"), VenueStatus::Disabled);
        assert!(!VenueStatus::from_str("???").is_active());
    }
}

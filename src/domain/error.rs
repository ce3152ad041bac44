use thiserror::Error;

/// Domain-level error types for the reservation engine.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Room not found: {0}")]
    RoomNotFound(i64),

    #[error("Hotel not found: {0}")]
    HotelNotFound(i64),

    #[error("No time slot for room {room_id} with duration {duration_hours}h")]
    TimeSlotNotFound { room_id: i64, duration_hours: i32 },

    #[error("Time slot for room {room_id} with duration {duration_hours}h is disabled")]
    TimeSlotDisabled { room_id: i64, duration_hours: i32 },

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Room is already booked for an overlapping time window")]
    BookingConflict,

    #[error("Booking not found: {field}={value}")]
    BookingNotFound { field: &'static str, value: String },

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Booking is not paid yet")]
    BookingNotPaid,

    #[error("Booking is already verified")]
    BookingAlreadyVerified,

    #[error("Booking is cancelled")]
    BookingCancelled,

    #[error("Booking has expired")]
    BookingExpired,

    #[error("Booking is already unlocked")]
    BookingAlreadyUnlocked,

    #[error("Illegal booking status: {0}")]
    BookingStatusError(String),

    #[error("Verification code is invalid")]
    VerificationCodeInvalid,

    #[error("Unlock code is invalid")]
    UnlockCodeInvalid,

    #[error("Unlock code has expired")]
    UnlockCodeExpired,

    #[error("Booking time has not arrived yet")]
    BookingTimeNotArrived,

    #[error("Unlock failed: {0}")]
    UnlockFailed(String),

    #[error("Code generation failed: {0}")]
    CodeGeneration(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    /// Whether this error is likely transient (storage or device-gateway
    /// hiccup) and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Database(_) | DomainError::UnlockFailed(_))
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(DomainError::Database("connection reset".into()).is_transient());
        assert!(DomainError::UnlockFailed("device timeout".into()).is_transient());
        assert!(!DomainError::BookingConflict.is_transient());
        assert!(!DomainError::PermissionDenied.is_transient());
    }
}

//! Booking business logic service
//!
//! The reservation engine: owns booking creation and every lifecycle
//! transition. All status changes go through conditional repository
//! updates, so concurrent callers resolve to exactly one winner.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::application::ports::LockGateway;
use crate::domain::access_code;
use crate::domain::booking::{is_unlock_window_open, Booking, BookingStatus, NewBooking};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

/// Tolerance in minutes for "check-in not in the past", absorbing
/// client clock skew.
const CHECK_IN_GRACE_MINUTES: i64 = 5;

/// How often to re-roll a colliding unlock code before giving up.
const UNLOCK_CODE_ATTEMPTS: u32 = 5;

/// Default deadline for a lock-gateway round trip.
const DEFAULT_UNLOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Booking as shown to collaborators. The secret codes are present
/// only while the booking is in a redeemable status (Paid, Verified,
/// InUse); before payment and after the lifecycle ends they are
/// omitted.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    pub id: i64,
    pub booking_no: String,
    pub room_id: i64,
    pub order_id: i64,
    pub user_id: i64,
    pub duration_hours: i32,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: DateTime<Utc>,
    pub amount: Decimal,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl BookingView {
    fn from_booking(b: &Booking) -> Self {
        let codes_visible = matches!(
            b.status,
            BookingStatus::Paid | BookingStatus::Verified | BookingStatus::InUse
        );
        Self {
            id: b.id,
            booking_no: b.booking_no.clone(),
            room_id: b.room_id,
            order_id: b.order_id,
            user_id: b.user_id,
            duration_hours: b.duration_hours,
            check_in_time: b.check_in_time,
            check_out_time: b.check_out_time,
            amount: b.amount,
            status: b.status.as_str().to_string(),
            verification_code: codes_visible.then(|| b.verification_code.clone()),
            unlock_code: codes_visible.then(|| b.unlock_code.clone()),
            qr_code: codes_visible.then(|| b.qr_code.clone()),
            verified_at: b.verified_at,
            unlocked_at: b.unlocked_at,
            completed_at: b.completed_at,
            created_at: b.created_at,
        }
    }
}

/// Service for booking business operations
pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
    gateway: Arc<dyn LockGateway>,
    unlock_timeout: Duration,
}

impl BookingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, gateway: Arc<dyn LockGateway>) -> Self {
        Self {
            repos,
            gateway,
            unlock_timeout: DEFAULT_UNLOCK_TIMEOUT,
        }
    }

    pub fn with_unlock_timeout(mut self, timeout: Duration) -> Self {
        self.unlock_timeout = timeout;
        self
    }

    /// Create a booking for `room_id` starting at `check_in_time` for
    /// one of the room's priced durations. Returns the booking in
    /// `Pending`; the availability check and the inserts happen as one
    /// atomic repository operation.
    pub async fn create_booking(
        &self,
        user_id: i64,
        room_id: i64,
        duration_hours: i32,
        check_in_time: DateTime<Utc>,
    ) -> DomainResult<BookingView> {
        if duration_hours <= 0 {
            return Err(DomainError::InvalidParams(
                "duration_hours must be positive".into(),
            ));
        }
        let now = Utc::now();
        if check_in_time < now - chrono::Duration::minutes(CHECK_IN_GRACE_MINUTES) {
            return Err(DomainError::InvalidParams(
                "check-in time is in the past".into(),
            ));
        }

        let room = self
            .repos
            .rooms()
            .find_by_id(room_id)
            .await?
            .filter(|r| r.is_active())
            .ok_or(DomainError::RoomNotFound(room_id))?;

        let hotel_id = room.hotel_id;
        self.repos
            .rooms()
            .find_hotel_by_id(hotel_id)
            .await?
            .filter(|h| h.is_active())
            .ok_or(DomainError::HotelNotFound(hotel_id))?;

        let slot = self
            .repos
            .rooms()
            .find_time_slot(room_id, duration_hours)
            .await?
            .ok_or(DomainError::TimeSlotNotFound {
                room_id,
                duration_hours,
            })?;
        if !slot.is_active {
            return Err(DomainError::TimeSlotDisabled {
                room_id,
                duration_hours,
            });
        }

        let check_out_time = check_in_time + chrono::Duration::hours(duration_hours as i64);

        let verification_code = access_code::generate_verification_code()?;
        let unlock_code = self.allocate_unlock_code(room.device_id.as_deref()).await?;
        let booking_no = access_code::generate_booking_no()?;
        let qr_code = access_code::qr_code_url(&booking_no, &verification_code);

        let booking = self
            .repos
            .bookings()
            .create_if_available(NewBooking {
                booking_no,
                room_id,
                device_id: room.device_id,
                user_id,
                duration_hours,
                check_in_time,
                check_out_time,
                amount: slot.price,
                verification_code,
                unlock_code,
                qr_code,
                order_no: uuid::Uuid::new_v4().to_string(),
            })
            .await?;

        info!(
            booking_no = %booking.booking_no,
            room_id,
            user_id,
            "Booking created"
        );

        Ok(BookingView::from_booking(&booking))
    }

    /// Pick an unlock code that no active booking on the same device
    /// currently uses. The 6-digit space is small, so a collision is a
    /// re-roll, not an error; persistent collisions are.
    async fn allocate_unlock_code(&self, device_id: Option<&str>) -> DomainResult<String> {
        let Some(device_id) = device_id else {
            return access_code::generate_unlock_code();
        };

        for _ in 0..UNLOCK_CODE_ATTEMPTS {
            let code = access_code::generate_unlock_code()?;
            if !self
                .repos
                .bookings()
                .active_unlock_code_exists(device_id, &code)
                .await?
            {
                return Ok(code);
            }
        }
        Err(DomainError::CodeGeneration(format!(
            "no free unlock code for device {} after {} attempts",
            device_id, UNLOCK_CODE_ATTEMPTS
        )))
    }

    /// Payment callback. Idempotent: repeated invocations (or a race
    /// with another replica) settle on `Paid` exactly once and report
    /// success either way.
    pub async fn on_payment_success(&self, order_id: i64) -> DomainResult<()> {
        let booking = self
            .repos
            .bookings()
            .find_by_order_id(order_id)
            .await?
            .ok_or(DomainError::BookingNotFound {
                field: "order_id",
                value: order_id.to_string(),
            })?;

        if booking.status != BookingStatus::Pending {
            // Duplicate callback; the first one already applied.
            return Ok(());
        }

        if self.repos.bookings().mark_paid(booking.id).await? {
            info!(booking_no = %booking.booking_no, order_id, "Booking paid");
        }
        Ok(())
    }

    /// Front-desk check-in by verification code.
    pub async fn verify_booking(
        &self,
        verification_code: &str,
        verified_by: i64,
    ) -> DomainResult<BookingView> {
        let mut booking = self
            .repos
            .bookings()
            .find_by_verification_code(verification_code)
            .await?
            .ok_or(DomainError::VerificationCodeInvalid)?;

        let now = Utc::now();
        if booking.is_past_checkout(now) {
            // Best effort; the sweeper will retry if this loses a race.
            if let Err(e) = self.repos.bookings().mark_expired(booking.id).await {
                warn!(booking_no = %booking.booking_no, error = %e, "Failed to expire booking on verify");
            }
            return Err(DomainError::BookingExpired);
        }

        if booking.status != BookingStatus::Paid {
            return Err(Self::verify_status_error(booking.status));
        }

        if !self
            .repos
            .bookings()
            .mark_verified(booking.id, verified_by, now)
            .await?
        {
            // Lost a race; report what the winner left behind.
            let current = self.repos.bookings().find_by_id(booking.id).await?;
            return Err(current
                .map(|b| Self::verify_status_error(b.status))
                .unwrap_or(DomainError::VerificationCodeInvalid));
        }

        booking.status = BookingStatus::Verified;
        booking.verified_at = Some(now);
        booking.verified_by = Some(verified_by);

        info!(booking_no = %booking.booking_no, verified_by, "Booking verified");

        Ok(BookingView::from_booking(&booking))
    }

    fn verify_status_error(status: BookingStatus) -> DomainError {
        match status {
            BookingStatus::Pending => DomainError::BookingNotPaid,
            BookingStatus::Verified | BookingStatus::InUse => DomainError::BookingAlreadyVerified,
            BookingStatus::Cancelled => DomainError::BookingCancelled,
            BookingStatus::Expired => DomainError::BookingExpired,
            other => DomainError::BookingStatusError(other.to_string()),
        }
    }

    /// PIN entry at the door lock. Validates the code, enforces the
    /// paid window, dispatches the unlock command and only then
    /// commits the `InUse` transition; a gateway failure leaves the
    /// booking `Verified`.
    pub async fn unlock_by_code(
        &self,
        device_id: &str,
        unlock_code: &str,
    ) -> DomainResult<BookingView> {
        if !access_code::validate_unlock_code(unlock_code) {
            return Err(DomainError::UnlockCodeInvalid);
        }

        // An unknown code answers exactly like a malformed one, so the
        // keypad cannot be used to probe which codes exist.
        let mut booking = self
            .repos
            .bookings()
            .find_active_for_device_code(device_id, unlock_code)
            .await?
            .ok_or(DomainError::UnlockCodeInvalid)?;

        match booking.status {
            BookingStatus::InUse => return Err(DomainError::BookingAlreadyUnlocked),
            BookingStatus::Verified => {}
            BookingStatus::Pending => return Err(DomainError::BookingNotPaid),
            other => {
                return Err(DomainError::BookingStatusError(format!(
                    "booking not verified yet ({})",
                    other
                )))
            }
        }

        let now = Utc::now();
        if !is_unlock_window_open(booking.check_in_time, booking.check_out_time, now) {
            return Err(if now <= booking.check_in_time {
                DomainError::BookingTimeNotArrived
            } else {
                DomainError::UnlockCodeExpired
            });
        }

        match tokio::time::timeout(self.unlock_timeout, self.gateway.send_unlock(device_id)).await
        {
            Err(_) => {
                return Err(DomainError::UnlockFailed(format!(
                    "no reply from device {} within {:?}",
                    device_id, self.unlock_timeout
                )))
            }
            Ok(Err(e)) => return Err(DomainError::UnlockFailed(e.to_string())),
            Ok(Ok(())) => {}
        }

        if !self.repos.bookings().mark_in_use(booking.id, now).await? {
            let current = self.repos.bookings().find_by_id(booking.id).await?;
            return Err(match current.map(|b| b.status) {
                Some(BookingStatus::InUse) => DomainError::BookingAlreadyUnlocked,
                Some(other) => DomainError::BookingStatusError(other.to_string()),
                None => DomainError::UnlockCodeInvalid,
            });
        }

        booking.status = BookingStatus::InUse;
        booking.unlocked_at = Some(now);

        info!(booking_no = %booking.booking_no, device_id, "Booking unlocked");

        Ok(BookingView::from_booking(&booking))
    }

    /// Explicit check-out. Allowed only from `Verified` or `InUse`.
    pub async fn complete_booking(&self, booking_id: i64) -> DomainResult<()> {
        let now = Utc::now();
        if self.repos.bookings().mark_completed(booking_id, now).await? {
            info!(booking_id, "Booking completed");
            return Ok(());
        }

        match self.repos.bookings().find_by_id(booking_id).await? {
            None => Err(DomainError::BookingNotFound {
                field: "id",
                value: booking_id.to_string(),
            }),
            Some(b) => Err(DomainError::BookingStatusError(b.status.to_string())),
        }
    }

    /// Owner-initiated cancellation, only while still `Pending`.
    pub async fn cancel_booking(&self, booking_id: i64, user_id: i64) -> DomainResult<()> {
        let booking = self
            .repos
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or(DomainError::BookingNotFound {
                field: "id",
                value: booking_id.to_string(),
            })?;

        if booking.user_id != user_id {
            return Err(DomainError::PermissionDenied);
        }

        if !self.repos.bookings().mark_cancelled(booking.id).await? {
            let current = self.repos.bookings().find_by_id(booking.id).await?;
            return Err(DomainError::BookingStatusError(
                current
                    .map(|b| b.status.as_str().to_string())
                    .unwrap_or_else(|| "unknown".into()),
            ));
        }

        info!(booking_no = %booking.booking_no, "Booking cancelled");
        Ok(())
    }

    pub async fn get_booking(&self, booking_id: i64, user_id: i64) -> DomainResult<BookingView> {
        let booking = self
            .repos
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or(DomainError::BookingNotFound {
                field: "id",
                value: booking_id.to_string(),
            })?;
        if booking.user_id != user_id {
            return Err(DomainError::PermissionDenied);
        }
        Ok(BookingView::from_booking(&booking))
    }

    pub async fn get_booking_by_no(
        &self,
        booking_no: &str,
        user_id: i64,
    ) -> DomainResult<BookingView> {
        let booking = self
            .repos
            .bookings()
            .find_by_no(booking_no)
            .await?
            .ok_or(DomainError::BookingNotFound {
                field: "booking_no",
                value: booking_no.to_string(),
            })?;
        if booking.user_id != user_id {
            return Err(DomainError::PermissionDenied);
        }
        Ok(BookingView::from_booking(&booking))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;

    use crate::application::ports::GatewayError;
    use crate::domain::access_code;
    use crate::domain::room::{Hotel, Room, TimeSlot, VenueStatus};
    use crate::infrastructure::storage::memory::InMemoryRepositoryProvider;

    const USER: i64 = 7;
    const STAFF: i64 = 42;
    const ROOM: i64 = 10;
    const HOTEL: i64 = 1;
    const DEVICE: &str = "LOCK-001";

    struct MockLockGateway {
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl MockLockGateway {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                fail: false,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                fail: true,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LockGateway for MockLockGateway {
        async fn send_unlock(&self, device_no: &str) -> Result<(), GatewayError> {
            self.calls.lock().unwrap().push(device_no.to_string());
            if self.fail {
                Err(GatewayError::DeviceOffline(device_no.to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn seeded_repos() -> Arc<InMemoryRepositoryProvider> {
        let repos = InMemoryRepositoryProvider::new();
        repos.mem_rooms().add_hotel(Hotel {
            id: HOTEL,
            name: "Harbor View".into(),
            status: VenueStatus::Active,
        });
        repos.mem_rooms().add_room(Room {
            id: ROOM,
            hotel_id: HOTEL,
            name: "201".into(),
            device_id: Some(DEVICE.into()),
            status: VenueStatus::Active,
        });
        repos.mem_rooms().add_time_slot(TimeSlot {
            id: 1,
            room_id: ROOM,
            duration_hours: 2,
            price: Decimal::new(100, 0),
            is_active: true,
        });
        repos.mem_rooms().add_time_slot(TimeSlot {
            id: 2,
            room_id: ROOM,
            duration_hours: 4,
            price: Decimal::new(180, 0),
            is_active: false,
        });
        Arc::new(repos)
    }

    fn service(repos: Arc<InMemoryRepositoryProvider>, gateway: Arc<MockLockGateway>) -> BookingService {
        BookingService::new(repos, gateway)
    }

    /// Drive a booking to `Verified` with a window already open.
    async fn verified_booking(
        repos: &Arc<InMemoryRepositoryProvider>,
        svc: &BookingService,
    ) -> Booking {
        let check_in = Utc::now() - ChronoDuration::minutes(2);
        let view = svc
            .create_booking(USER, ROOM, 2, check_in)
            .await
            .expect("create");
        let booking = repos
            .mem_bookings()
            .get(view.id)
            .expect("stored booking");
        svc.on_payment_success(booking.order_id).await.expect("pay");
        svc.verify_booking(&booking.verification_code, STAFF)
            .await
            .expect("verify");
        repos.mem_bookings().get(view.id).expect("verified booking")
    }

    #[tokio::test]
    async fn create_booking_happy_path() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());

        let check_in = Utc::now() + ChronoDuration::hours(1);
        let view = svc.create_booking(USER, ROOM, 2, check_in).await.unwrap();

        assert_eq!(view.status, "Pending");
        assert_eq!(view.amount, Decimal::new(100, 0));
        assert_eq!(view.duration_hours, 2);
        assert_eq!(view.check_out_time, check_in + ChronoDuration::hours(2));
        // Codes are hidden until payment.
        assert!(view.verification_code.is_none());
        assert!(view.unlock_code.is_none());

        let stored = repos.mem_bookings().get(view.id).unwrap();
        assert!(access_code::validate_verification_code(&stored.verification_code));
        assert!(access_code::validate_unlock_code(&stored.unlock_code));
        assert_eq!(
            stored.qr_code,
            access_code::qr_code_url(&stored.booking_no, &stored.verification_code)
        );
    }

    #[tokio::test]
    async fn create_booking_rejects_overlap() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());

        let check_in = Utc::now() + ChronoDuration::hours(1);
        svc.create_booking(USER, ROOM, 2, check_in).await.unwrap();

        // Same window
        let err = svc
            .create_booking(USER, ROOM, 2, check_in)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BookingConflict));

        // Partial overlap
        let err = svc
            .create_booking(USER, ROOM, 2, check_in + ChronoDuration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BookingConflict));
    }

    #[tokio::test]
    async fn back_to_back_windows_do_not_conflict() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());

        let check_in = Utc::now() + ChronoDuration::hours(1);
        svc.create_booking(USER, ROOM, 2, check_in).await.unwrap();
        svc.create_booking(USER, ROOM, 2, check_in + ChronoDuration::hours(2))
            .await
            .expect("touching window must be bookable");
    }

    #[tokio::test]
    async fn cancelled_booking_frees_the_window() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());

        let check_in = Utc::now() + ChronoDuration::hours(1);
        let view = svc.create_booking(USER, ROOM, 2, check_in).await.unwrap();
        svc.cancel_booking(view.id, USER).await.unwrap();

        svc.create_booking(USER, ROOM, 2, check_in)
            .await
            .expect("window freed by cancellation");
    }

    #[tokio::test]
    async fn create_booking_validates_inputs() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());
        let future = Utc::now() + ChronoDuration::hours(1);

        // Past check-in beyond the grace window
        let err = svc
            .create_booking(USER, ROOM, 2, Utc::now() - ChronoDuration::minutes(10))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidParams(_)));

        // Inside the grace window is fine
        svc.create_booking(USER, ROOM, 2, Utc::now() - ChronoDuration::minutes(2))
            .await
            .expect("grace tolerance");

        let err = svc.create_booking(USER, 999, 2, future).await.unwrap_err();
        assert!(matches!(err, DomainError::RoomNotFound(999)));

        // No slot for this duration
        let err = svc.create_booking(USER, ROOM, 3, future).await.unwrap_err();
        assert!(matches!(err, DomainError::TimeSlotNotFound { .. }));

        // Slot exists but is disabled
        let err = svc.create_booking(USER, ROOM, 4, future).await.unwrap_err();
        assert!(matches!(err, DomainError::TimeSlotDisabled { .. }));
    }

    #[tokio::test]
    async fn create_booking_rejects_disabled_room_and_hotel() {
        let repos = seeded_repos();
        repos.mem_rooms().add_room(Room {
            id: 11,
            hotel_id: HOTEL,
            name: "202".into(),
            device_id: None,
            status: VenueStatus::Disabled,
        });
        repos.mem_rooms().add_hotel(Hotel {
            id: 2,
            name: "Closed Annex".into(),
            status: VenueStatus::Disabled,
        });
        repos.mem_rooms().add_room(Room {
            id: 12,
            hotel_id: 2,
            name: "301".into(),
            device_id: None,
            status: VenueStatus::Active,
        });
        repos.mem_rooms().add_time_slot(TimeSlot {
            id: 3,
            room_id: 12,
            duration_hours: 2,
            price: Decimal::new(80, 0),
            is_active: true,
        });
        let svc = service(repos.clone(), MockLockGateway::ok());
        let future = Utc::now() + ChronoDuration::hours(1);

        let err = svc.create_booking(USER, 11, 2, future).await.unwrap_err();
        assert!(matches!(err, DomainError::RoomNotFound(11)));

        let err = svc.create_booking(USER, 12, 2, future).await.unwrap_err();
        assert!(matches!(err, DomainError::HotelNotFound(2)));
    }

    #[tokio::test]
    async fn concurrent_creates_have_a_single_winner() {
        let repos = seeded_repos();
        let svc = Arc::new(service(repos.clone(), MockLockGateway::ok()));
        let check_in = Utc::now() + ChronoDuration::hours(1);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.create_booking(USER, ROOM, 2, check_in).await
            }));
        }

        let mut won = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.expect("task") {
                Ok(_) => won += 1,
                Err(DomainError::BookingConflict) => conflicts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(won, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn payment_callback_is_idempotent() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());

        let view = svc
            .create_booking(USER, ROOM, 2, Utc::now() + ChronoDuration::hours(1))
            .await
            .unwrap();
        let order_id = view.order_id;

        svc.on_payment_success(order_id).await.unwrap();
        svc.on_payment_success(order_id).await.unwrap();

        let stored = repos.mem_bookings().get(view.id).unwrap();
        assert_eq!(stored.status, BookingStatus::Paid);

        let err = svc.on_payment_success(99999).await.unwrap_err();
        assert!(matches!(err, DomainError::BookingNotFound { .. }));
    }

    #[tokio::test]
    async fn full_lifecycle_end_to_end() {
        let repos = seeded_repos();
        let gateway = MockLockGateway::ok();
        let svc = service(repos.clone(), gateway.clone());

        // Window already open so unlock is possible right away.
        let check_in = Utc::now() - ChronoDuration::minutes(2);
        let view = svc.create_booking(USER, ROOM, 2, check_in).await.unwrap();
        assert_eq!(view.status, "Pending");
        assert_eq!(view.amount, Decimal::new(100, 0));

        let stored = repos.mem_bookings().get(view.id).unwrap();
        svc.on_payment_success(stored.order_id).await.unwrap();

        let paid = svc.get_booking(view.id, USER).await.unwrap();
        assert_eq!(paid.status, "Paid");
        assert!(paid.verification_code.is_some());
        assert!(paid.qr_code.is_some());

        let verified = svc
            .verify_booking(&stored.verification_code, STAFF)
            .await
            .unwrap();
        assert_eq!(verified.status, "Verified");
        assert!(verified.verified_at.is_some());

        let unlocked = svc
            .unlock_by_code(DEVICE, &stored.unlock_code)
            .await
            .unwrap();
        assert_eq!(unlocked.status, "InUse");
        assert!(unlocked.unlocked_at.is_some());
        assert_eq!(gateway.calls(), vec![DEVICE.to_string()]);

        svc.complete_booking(view.id).await.unwrap();
        let done = repos.mem_bookings().get(view.id).unwrap();
        assert_eq!(done.status, BookingStatus::Completed);
        assert!(done.completed_at.is_some());

        // Terminal: further transitions are illegal.
        let err = svc.complete_booking(view.id).await.unwrap_err();
        assert!(matches!(err, DomainError::BookingStatusError(_)));
    }

    #[tokio::test]
    async fn verify_rejects_bad_states() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());

        let err = svc.verify_booking("Vdeadbeefdeadbeef00", STAFF).await.unwrap_err();
        assert!(matches!(err, DomainError::VerificationCodeInvalid));

        let view = svc
            .create_booking(USER, ROOM, 2, Utc::now() + ChronoDuration::hours(1))
            .await
            .unwrap();
        let stored = repos.mem_bookings().get(view.id).unwrap();

        // Unpaid
        let err = svc
            .verify_booking(&stored.verification_code, STAFF)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BookingNotPaid));

        svc.on_payment_success(stored.order_id).await.unwrap();
        svc.verify_booking(&stored.verification_code, STAFF)
            .await
            .unwrap();

        // Second scan
        let err = svc
            .verify_booking(&stored.verification_code, STAFF)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BookingAlreadyVerified));
    }

    #[tokio::test]
    async fn verify_past_checkout_expires_booking() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());

        let view = svc
            .create_booking(USER, ROOM, 2, Utc::now() + ChronoDuration::hours(1))
            .await
            .unwrap();
        let stored = repos.mem_bookings().get(view.id).unwrap();
        svc.on_payment_success(stored.order_id).await.unwrap();

        // Push the whole window into the past behind the engine's back.
        repos.mem_bookings().set_window(
            view.id,
            Utc::now() - ChronoDuration::hours(3),
            Utc::now() - ChronoDuration::hours(1),
        );

        let err = svc
            .verify_booking(&stored.verification_code, STAFF)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BookingExpired));
        assert_eq!(
            repos.mem_bookings().get(view.id).unwrap().status,
            BookingStatus::Expired
        );
    }

    #[tokio::test]
    async fn unlock_rejects_bad_codes() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());

        let err = svc.unlock_by_code(DEVICE, "12345").await.unwrap_err();
        assert!(matches!(err, DomainError::UnlockCodeInvalid));
        let err = svc.unlock_by_code(DEVICE, "12345a").await.unwrap_err();
        assert!(matches!(err, DomainError::UnlockCodeInvalid));

        // Well-formed but unknown: indistinguishable from malformed.
        let err = svc.unlock_by_code(DEVICE, "123456").await.unwrap_err();
        assert!(matches!(err, DomainError::UnlockCodeInvalid));
    }

    #[tokio::test]
    async fn unlock_outside_window() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());

        // Window opens in an hour.
        let view = svc
            .create_booking(USER, ROOM, 2, Utc::now() + ChronoDuration::hours(1))
            .await
            .unwrap();
        let stored = repos.mem_bookings().get(view.id).unwrap();
        svc.on_payment_success(stored.order_id).await.unwrap();
        svc.verify_booking(&stored.verification_code, STAFF)
            .await
            .unwrap();

        let err = svc
            .unlock_by_code(DEVICE, &stored.unlock_code)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BookingTimeNotArrived));

        // Checkout boundary: now >= check_out means the code is spent.
        repos.mem_bookings().set_window(
            view.id,
            Utc::now() - ChronoDuration::hours(2),
            Utc::now(),
        );
        let err = svc
            .unlock_by_code(DEVICE, &stored.unlock_code)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UnlockCodeExpired));
    }

    #[tokio::test]
    async fn unlock_gateway_failure_keeps_booking_verified() {
        let repos = seeded_repos();
        let gateway = MockLockGateway::failing();
        let svc = service(repos.clone(), gateway.clone());

        let booking = verified_booking(&repos, &svc).await;

        let err = svc
            .unlock_by_code(DEVICE, &booking.unlock_code)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UnlockFailed(_)));
        assert_eq!(
            repos.mem_bookings().get(booking.id).unwrap().status,
            BookingStatus::Verified
        );
        assert!(repos.mem_bookings().get(booking.id).unwrap().unlocked_at.is_none());
    }

    #[tokio::test]
    async fn unlock_twice_reports_already_unlocked() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());

        let booking = verified_booking(&repos, &svc).await;
        svc.unlock_by_code(DEVICE, &booking.unlock_code).await.unwrap();

        let err = svc
            .unlock_by_code(DEVICE, &booking.unlock_code)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BookingAlreadyUnlocked));
    }

    #[tokio::test]
    async fn cancel_enforces_owner_and_status() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());

        let view = svc
            .create_booking(USER, ROOM, 2, Utc::now() + ChronoDuration::hours(1))
            .await
            .unwrap();

        let err = svc.cancel_booking(view.id, USER + 1).await.unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied));

        svc.on_payment_success(view.order_id).await.unwrap();
        let err = svc.cancel_booking(view.id, USER).await.unwrap_err();
        assert!(matches!(err, DomainError::BookingStatusError(_)));
    }

    #[tokio::test]
    async fn views_redact_codes_outside_redeemable_statuses() {
        let repos = seeded_repos();
        let svc = service(repos.clone(), MockLockGateway::ok());

        let view = svc
            .create_booking(USER, ROOM, 2, Utc::now() + ChronoDuration::hours(1))
            .await
            .unwrap();
        let pending = svc.get_booking(view.id, USER).await.unwrap();
        assert!(pending.verification_code.is_none());
        assert!(pending.unlock_code.is_none());
        assert!(pending.qr_code.is_none());

        // Hidden codes are absent from the wire format, not null.
        let json = serde_json::to_value(&pending).unwrap();
        assert!(json.get("verification_code").is_none());
        assert!(json.get("unlock_code").is_none());
        assert_eq!(json["status"], "Pending");

        svc.on_payment_success(view.order_id).await.unwrap();
        let paid = svc.get_booking_by_no(&view.booking_no, USER).await.unwrap();
        assert!(paid.verification_code.is_some());
        assert!(paid.unlock_code.is_some());

        let err = svc.get_booking(view.id, USER + 1).await.unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied));
    }
}

//! In-memory repository implementations.
//!
//! Used by the test suite and for running the engine without a
//! database. The booking store serializes every operation through one
//! mutex, which makes `create_if_available` and the conditional
//! transitions atomic exactly as the repository contract requires.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::booking::{Booking, BookingRepository, BookingStatus, NewBooking};
use crate::domain::room::{Hotel, Room, RoomRepository, TimeSlot};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

// ── Bookings ───────────────────────────────────────────────────

#[derive(Default)]
struct BookingStore {
    bookings: Vec<Booking>,
    next_booking_id: i64,
    next_order_id: i64,
}

/// Mutex-backed booking store.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    inner: Mutex<BookingStore>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BookingStore> {
        self.inner.lock().expect("booking store mutex poisoned")
    }

    /// Fetch a stored booking by id (test/seeding helper).
    pub fn get(&self, id: i64) -> Option<Booking> {
        self.lock().bookings.iter().find(|b| b.id == id).cloned()
    }

    /// Rewrite a booking's time window (test/seeding helper).
    pub fn set_window(&self, id: i64, check_in: DateTime<Utc>, check_out: DateTime<Utc>) {
        let mut store = self.lock();
        if let Some(b) = store.bookings.iter_mut().find(|b| b.id == id) {
            b.check_in_time = check_in;
            b.check_out_time = check_out;
        }
    }

    /// Insert a booking directly in the given status (test/seeding
    /// helper); codes are derived deterministically from the id.
    pub fn seed_booking(
        &self,
        room_id: i64,
        user_id: i64,
        status: BookingStatus,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> i64 {
        let mut store = self.lock();
        store.next_booking_id += 1;
        store.next_order_id += 1;
        let id = store.next_booking_id;
        let order_id = store.next_order_id;
        store.bookings.push(Booking {
            id,
            booking_no: format!("R-SEED-{:06}", id),
            room_id,
            order_id,
            device_id: Some("LOCK-001".into()),
            user_id,
            duration_hours: 2,
            check_in_time: check_in,
            check_out_time: check_out,
            amount: rust_decimal::Decimal::new(100, 0),
            verification_code: format!("V{:019x}", id),
            unlock_code: format!("{:06}", id % 1_000_000),
            qr_code: format!("/hotel/verify/R-SEED-{:06}?code=V{:019x}", id, id),
            status,
            verified_at: None,
            verified_by: None,
            unlocked_at: None,
            completed_at: None,
            created_at: Utc::now(),
        });
        id
    }

    /// Conditionally transition `id` if its status is in `from`,
    /// applying `apply` to the row. Returns whether a row changed.
    fn transition<F>(&self, id: i64, from: &[BookingStatus], apply: F) -> bool
    where
        F: FnOnce(&mut Booking),
    {
        let mut store = self.lock();
        match store.bookings.iter_mut().find(|b| b.id == id) {
            Some(b) if from.contains(&b.status) => {
                apply(b);
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn create_if_available(&self, new: NewBooking) -> DomainResult<Booking> {
        let mut store = self.lock();

        let conflict = store.bookings.iter().any(|b| {
            b.room_id == new.room_id
                && b.is_active()
                && b.overlaps(new.check_in_time, new.check_out_time)
        });
        if conflict {
            return Err(DomainError::BookingConflict);
        }

        store.next_booking_id += 1;
        store.next_order_id += 1;
        let booking = Booking {
            id: store.next_booking_id,
            booking_no: new.booking_no,
            room_id: new.room_id,
            order_id: store.next_order_id,
            device_id: new.device_id,
            user_id: new.user_id,
            duration_hours: new.duration_hours,
            check_in_time: new.check_in_time,
            check_out_time: new.check_out_time,
            amount: new.amount,
            verification_code: new.verification_code,
            unlock_code: new.unlock_code,
            qr_code: new.qr_code,
            status: BookingStatus::Pending,
            verified_at: None,
            verified_by: None,
            unlocked_at: None,
            completed_at: None,
            created_at: Utc::now(),
        };
        store.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Booking>> {
        Ok(self.get(id))
    }

    async fn find_by_no(&self, booking_no: &str) -> DomainResult<Option<Booking>> {
        Ok(self
            .lock()
            .bookings
            .iter()
            .find(|b| b.booking_no == booking_no)
            .cloned())
    }

    async fn find_by_order_id(&self, order_id: i64) -> DomainResult<Option<Booking>> {
        Ok(self
            .lock()
            .bookings
            .iter()
            .find(|b| b.order_id == order_id)
            .cloned())
    }

    async fn find_by_verification_code(&self, code: &str) -> DomainResult<Option<Booking>> {
        Ok(self
            .lock()
            .bookings
            .iter()
            .find(|b| b.verification_code == code)
            .cloned())
    }

    async fn find_active_for_device_code(
        &self,
        device_id: &str,
        unlock_code: &str,
    ) -> DomainResult<Option<Booking>> {
        Ok(self
            .lock()
            .bookings
            .iter()
            .find(|b| {
                b.is_active()
                    && b.unlock_code == unlock_code
                    && b.device_id.as_deref() == Some(device_id)
            })
            .cloned())
    }

    async fn active_unlock_code_exists(
        &self,
        device_id: &str,
        unlock_code: &str,
    ) -> DomainResult<bool> {
        Ok(self.lock().bookings.iter().any(|b| {
            b.is_active()
                && b.unlock_code == unlock_code
                && b.device_id.as_deref() == Some(device_id)
        }))
    }

    async fn mark_paid(&self, id: i64) -> DomainResult<bool> {
        Ok(self.transition(id, &[BookingStatus::Pending], |b| {
            b.status = BookingStatus::Paid;
        }))
    }

    async fn mark_verified(
        &self,
        id: i64,
        verified_by: i64,
        at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        Ok(self.transition(id, &[BookingStatus::Paid], |b| {
            b.status = BookingStatus::Verified;
            b.verified_at = Some(at);
            b.verified_by = Some(verified_by);
        }))
    }

    async fn mark_in_use(&self, id: i64, at: DateTime<Utc>) -> DomainResult<bool> {
        Ok(self.transition(id, &[BookingStatus::Verified], |b| {
            b.status = BookingStatus::InUse;
            b.unlocked_at = Some(at);
        }))
    }

    async fn mark_completed(&self, id: i64, at: DateTime<Utc>) -> DomainResult<bool> {
        Ok(self.transition(
            id,
            &[BookingStatus::Verified, BookingStatus::InUse],
            |b| {
                b.status = BookingStatus::Completed;
                b.completed_at = Some(at);
            },
        ))
    }

    async fn mark_cancelled(&self, id: i64) -> DomainResult<bool> {
        Ok(self.transition(id, &[BookingStatus::Pending], |b| {
            b.status = BookingStatus::Cancelled;
        }))
    }

    async fn mark_expired(&self, id: i64) -> DomainResult<bool> {
        Ok(self.transition(
            id,
            &[BookingStatus::Pending, BookingStatus::Paid],
            |b| {
                b.status = BookingStatus::Expired;
            },
        ))
    }

    async fn find_expired_paid(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> DomainResult<Vec<Booking>> {
        Ok(self
            .lock()
            .bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Paid && b.is_past_checkout(now))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_overdue_active(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> DomainResult<Vec<Booking>> {
        Ok(self
            .lock()
            .bookings
            .iter()
            .filter(|b| {
                matches!(b.status, BookingStatus::Verified | BookingStatus::InUse)
                    && b.is_past_checkout(now)
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ── Rooms ──────────────────────────────────────────────────────

#[derive(Default)]
struct RoomStore {
    rooms: Vec<Room>,
    hotels: Vec<Hotel>,
    time_slots: Vec<TimeSlot>,
}

/// Mutex-backed room/hotel/time-slot catalogue.
#[derive(Default)]
pub struct InMemoryRoomRepository {
    inner: Mutex<RoomStore>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RoomStore> {
        self.inner.lock().expect("room store mutex poisoned")
    }

    pub fn add_room(&self, room: Room) {
        self.lock().rooms.push(room);
    }

    pub fn add_hotel(&self, hotel: Hotel) {
        self.lock().hotels.push(hotel);
    }

    pub fn add_time_slot(&self, slot: TimeSlot) {
        self.lock().time_slots.push(slot);
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Room>> {
        Ok(self.lock().rooms.iter().find(|r| r.id == id).cloned())
    }

    async fn find_hotel_by_id(&self, id: i64) -> DomainResult<Option<Hotel>> {
        Ok(self.lock().hotels.iter().find(|h| h.id == id).cloned())
    }

    async fn find_time_slot(
        &self,
        room_id: i64,
        duration_hours: i32,
    ) -> DomainResult<Option<TimeSlot>> {
        Ok(self
            .lock()
            .time_slots
            .iter()
            .find(|s| s.room_id == room_id && s.duration_hours == duration_hours)
            .cloned())
    }
}

// ── Provider ───────────────────────────────────────────────────

/// In-memory [`RepositoryProvider`].
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    bookings: InMemoryBookingRepository,
    rooms: InMemoryRoomRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concrete booking store, exposing the seeding helpers.
    pub fn mem_bookings(&self) -> &InMemoryBookingRepository {
        &self.bookings
    }

    /// Concrete room store, exposing the seeding helpers.
    pub fn mem_rooms(&self) -> &InMemoryRoomRepository {
        &self.rooms
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn rooms(&self) -> &dyn RoomRepository {
        &self.rooms
    }
}

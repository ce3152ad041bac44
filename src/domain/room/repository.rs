//! Room lookup interface (read-only for this engine)

use async_trait::async_trait;

use super::model::{Hotel, Room, TimeSlot};
use crate::domain::DomainResult;

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Room>>;

    async fn find_hotel_by_id(&self, id: i64) -> DomainResult<Option<Hotel>>;

    /// The priced slot for a room and duration, if one is configured.
    async fn find_time_slot(
        &self,
        room_id: i64,
        duration_hours: i32,
    ) -> DomainResult<Option<TimeSlot>>;
}

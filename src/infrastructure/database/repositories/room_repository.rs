//! SeaORM implementation of RoomRepository

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::room::{Hotel, Room, RoomRepository, TimeSlot, VenueStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{hotel, room, time_slot};

pub struct SeaOrmRoomRepository {
    db: DatabaseConnection,
}

impl SeaOrmRoomRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn room_to_domain(m: room::Model) -> Room {
    Room {
        id: m.id,
        hotel_id: m.hotel_id,
        name: m.name,
        device_id: m.device_id,
        status: VenueStatus::from_str(&m.status),
    }
}

fn hotel_to_domain(m: hotel::Model) -> Hotel {
    Hotel {
        id: m.id,
        name: m.name,
        status: VenueStatus::from_str(&m.status),
    }
}

fn slot_to_domain(m: time_slot::Model) -> TimeSlot {
    TimeSlot {
        id: m.id,
        room_id: m.room_id,
        duration_hours: m.duration_hours,
        price: m.price,
        is_active: m.is_active,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

// ── RoomRepository impl ─────────────────────────────────────────

#[async_trait]
impl RoomRepository for SeaOrmRoomRepository {
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Room>> {
        let model = room::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(room_to_domain))
    }

    async fn find_hotel_by_id(&self, id: i64) -> DomainResult<Option<Hotel>> {
        let model = hotel::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(hotel_to_domain))
    }

    async fn find_time_slot(
        &self,
        room_id: i64,
        duration_hours: i32,
    ) -> DomainResult<Option<TimeSlot>> {
        let model = time_slot::Entity::find()
            .filter(time_slot::Column::RoomId.eq(room_id))
            .filter(time_slot::Column::DurationHours.eq(duration_hours))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(slot_to_domain))
    }
}

//! Create time_slots table
//!
//! Priced duration options per room; the reservation engine only
//! reads these.

use sea_orm_migration::prelude::*;

use super::m20250301_000002_create_rooms::Rooms;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TimeSlots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TimeSlots::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TimeSlots::RoomId).big_integer().not_null())
                    .col(
                        ColumnDef::new(TimeSlots::DurationHours)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TimeSlots::Price).decimal().not_null())
                    .col(
                        ColumnDef::new(TimeSlots::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TimeSlots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_time_slots_room")
                            .from(TimeSlots::Table, TimeSlots::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_time_slots_room_duration")
                    .table(TimeSlots::Table)
                    .col(TimeSlots::RoomId)
                    .col(TimeSlots::DurationHours)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TimeSlots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum TimeSlots {
    Table,
    Id,
    RoomId,
    DurationHours,
    Price,
    IsActive,
    CreatedAt,
}

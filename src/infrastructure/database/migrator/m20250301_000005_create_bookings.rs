//! Create bookings table
//!
//! The only mutable table this engine owns. Indexes back the three
//! hot paths: the per-room availability check, the device PIN lookup,
//! and the sweep queries over `(status, check_out_time)`.

use sea_orm_migration::prelude::*;

use super::m20250301_000002_create_rooms::Rooms;
use super::m20250301_000004_create_payment_orders::PaymentOrders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Bookings::BookingNo)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Bookings::RoomId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Bookings::OrderId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Bookings::DeviceId).string())
                    .col(ColumnDef::new(Bookings::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Bookings::DurationHours)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::CheckInTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::CheckOutTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::Amount).decimal().not_null())
                    .col(
                        ColumnDef::new(Bookings::VerificationCode)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::UnlockCode).string().not_null())
                    .col(ColumnDef::new(Bookings::QrCode).string().not_null())
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string()
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(Bookings::VerifiedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Bookings::VerifiedBy).big_integer())
                    .col(ColumnDef::new(Bookings::UnlockedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Bookings::CompletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_room")
                            .from(Bookings::Table, Bookings::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_order")
                            .from(Bookings::Table, Bookings::OrderId)
                            .to(PaymentOrders::Table, PaymentOrders::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_room_status")
                    .table(Bookings::Table)
                    .col(Bookings::RoomId)
                    .col(Bookings::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_verification_code")
                    .table(Bookings::Table)
                    .col(Bookings::VerificationCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_device_unlock_code")
                    .table(Bookings::Table)
                    .col(Bookings::DeviceId)
                    .col(Bookings::UnlockCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_status_check_out")
                    .table(Bookings::Table)
                    .col(Bookings::Status)
                    .col(Bookings::CheckOutTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Bookings {
    Table,
    Id,
    BookingNo,
    RoomId,
    OrderId,
    DeviceId,
    UserId,
    DurationHours,
    CheckInTime,
    CheckOutTime,
    Amount,
    VerificationCode,
    UnlockCode,
    QrCode,
    Status,
    VerifiedAt,
    VerifiedBy,
    UnlockedAt,
    CompletedAt,
    CreatedAt,
}

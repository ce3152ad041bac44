//! Booking entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(unique)]
    pub booking_no: String,

    pub room_id: i64,

    #[sea_orm(unique)]
    pub order_id: i64,

    #[sea_orm(nullable)]
    pub device_id: Option<String>,

    pub user_id: i64,
    pub duration_hours: i32,

    pub check_in_time: DateTimeUtc,
    pub check_out_time: DateTimeUtc,

    pub amount: Decimal,

    pub verification_code: String,
    pub unlock_code: String,
    pub qr_code: String,

    /// Booking status: Pending, Paid, Verified, InUse, Completed,
    /// Cancelled, Expired
    pub status: String,

    #[sea_orm(nullable)]
    pub verified_at: Option<DateTimeUtc>,
    #[sea_orm(nullable)]
    pub verified_by: Option<i64>,
    #[sea_orm(nullable)]
    pub unlocked_at: Option<DateTimeUtc>,
    #[sea_orm(nullable)]
    pub completed_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id"
    )]
    Room,
    #[sea_orm(
        belongs_to = "super::payment_order::Entity",
        from = "Column::OrderId",
        to = "super::payment_order::Column::Id"
    )]
    PaymentOrder,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::payment_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! SeaORM implementation of BookingRepository
//!
//! Availability is decided inside a single database transaction and
//! every lifecycle transition is a conditional `UPDATE … WHERE status`
//! so concurrent callers always resolve to one winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionError, TransactionTrait,
};

use crate::domain::booking::{Booking, BookingRepository, BookingStatus, NewBooking};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{booking, payment_order};

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn active_status_strs() -> [&'static str; 4] {
    BookingStatus::ACTIVE.map(|s| s.as_str())
}

fn model_to_domain(m: booking::Model) -> Booking {
    Booking {
        id: m.id,
        booking_no: m.booking_no,
        room_id: m.room_id,
        order_id: m.order_id,
        device_id: m.device_id,
        user_id: m.user_id,
        duration_hours: m.duration_hours,
        check_in_time: m.check_in_time,
        check_out_time: m.check_out_time,
        amount: m.amount,
        verification_code: m.verification_code,
        unlock_code: m.unlock_code,
        qr_code: m.qr_code,
        status: BookingStatus::from_str(&m.status),
        verified_at: m.verified_at,
        verified_by: m.verified_by,
        unlocked_at: m.unlocked_at,
        completed_at: m.completed_at,
        created_at: m.created_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn create_if_available(&self, new: NewBooking) -> DomainResult<Booking> {
        debug!("Creating booking: {}", new.booking_no);

        // The overlap check and both inserts share one transaction, so
        // concurrent creators for the same room serialize at the
        // storage layer (SQLite allows one writer; on PostgreSQL the
        // connection must use SERIALIZABLE for the same guarantee).
        let result = self
            .db
            .transaction::<_, Booking, DomainError>(|txn| {
                Box::pin(async move {
                    let conflict = booking::Entity::find()
                        .filter(booking::Column::RoomId.eq(new.room_id))
                        .filter(booking::Column::Status.is_in(active_status_strs()))
                        .filter(booking::Column::CheckInTime.lt(new.check_out_time))
                        .filter(booking::Column::CheckOutTime.gt(new.check_in_time))
                        .one(txn)
                        .await
                        .map_err(db_err)?;
                    if conflict.is_some() {
                        return Err(DomainError::BookingConflict);
                    }

                    let order = payment_order::ActiveModel {
                        order_no: Set(new.order_no.clone()),
                        user_id: Set(new.user_id),
                        amount: Set(new.amount),
                        status: Set("Unpaid".to_string()),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(db_err)?;

                    let model = booking::ActiveModel {
                        booking_no: Set(new.booking_no),
                        room_id: Set(new.room_id),
                        order_id: Set(order.id),
                        device_id: Set(new.device_id),
                        user_id: Set(new.user_id),
                        duration_hours: Set(new.duration_hours),
                        check_in_time: Set(new.check_in_time),
                        check_out_time: Set(new.check_out_time),
                        amount: Set(new.amount),
                        verification_code: Set(new.verification_code),
                        unlock_code: Set(new.unlock_code),
                        qr_code: Set(new.qr_code),
                        status: Set(BookingStatus::Pending.as_str().to_string()),
                        verified_at: Set(None),
                        verified_by: Set(None),
                        unlocked_at: Set(None),
                        completed_at: Set(None),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(db_err)?;

                    Ok(model_to_domain(model))
                })
            })
            .await;

        match result {
            Ok(b) => Ok(b),
            Err(TransactionError::Connection(e)) => Err(db_err(e)),
            Err(TransactionError::Transaction(e)) => Err(e),
        }
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_no(&self, booking_no: &str) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find()
            .filter(booking::Column::BookingNo.eq(booking_no))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_order_id(&self, order_id: i64) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find()
            .filter(booking::Column::OrderId.eq(order_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_verification_code(&self, code: &str) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find()
            .filter(booking::Column::VerificationCode.eq(code))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_active_for_device_code(
        &self,
        device_id: &str,
        unlock_code: &str,
    ) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find()
            .filter(booking::Column::DeviceId.eq(device_id))
            .filter(booking::Column::UnlockCode.eq(unlock_code))
            .filter(booking::Column::Status.is_in(active_status_strs()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn active_unlock_code_exists(
        &self,
        device_id: &str,
        unlock_code: &str,
    ) -> DomainResult<bool> {
        Ok(self
            .find_active_for_device_code(device_id, unlock_code)
            .await?
            .is_some())
    }

    async fn mark_paid(&self, id: i64) -> DomainResult<bool> {
        debug!("Marking booking paid: {}", id);

        let res = booking::Entity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::Paid.as_str()),
            )
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(BookingStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected == 1)
    }

    async fn mark_verified(
        &self,
        id: i64,
        verified_by: i64,
        at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        debug!("Marking booking verified: {}", id);

        let res = booking::Entity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::Verified.as_str()),
            )
            .col_expr(booking::Column::VerifiedAt, Expr::value(at))
            .col_expr(booking::Column::VerifiedBy, Expr::value(verified_by))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(BookingStatus::Paid.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected == 1)
    }

    async fn mark_in_use(&self, id: i64, at: DateTime<Utc>) -> DomainResult<bool> {
        debug!("Marking booking in use: {}", id);

        let res = booking::Entity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::InUse.as_str()),
            )
            .col_expr(booking::Column::UnlockedAt, Expr::value(at))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(BookingStatus::Verified.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected == 1)
    }

    async fn mark_completed(&self, id: i64, at: DateTime<Utc>) -> DomainResult<bool> {
        debug!("Marking booking completed: {}", id);

        let res = booking::Entity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::Completed.as_str()),
            )
            .col_expr(booking::Column::CompletedAt, Expr::value(at))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.is_in([
                BookingStatus::Verified.as_str(),
                BookingStatus::InUse.as_str(),
            ]))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected == 1)
    }

    async fn mark_cancelled(&self, id: i64) -> DomainResult<bool> {
        debug!("Marking booking cancelled: {}", id);

        let res = booking::Entity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::Cancelled.as_str()),
            )
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(BookingStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected == 1)
    }

    async fn mark_expired(&self, id: i64) -> DomainResult<bool> {
        debug!("Marking booking expired: {}", id);

        let res = booking::Entity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::Expired.as_str()),
            )
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.is_in([
                BookingStatus::Pending.as_str(),
                BookingStatus::Paid.as_str(),
            ]))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected == 1)
    }

    async fn find_expired_paid(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::Status.eq(BookingStatus::Paid.as_str()))
            .filter(booking::Column::CheckOutTime.lte(now))
            .order_by_asc(booking::Column::CheckOutTime)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_overdue_active(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::Status.is_in([
                BookingStatus::Verified.as_str(),
                BookingStatus::InUse.as_str(),
            ]))
            .filter(booking::Column::CheckOutTime.lte(now))
            .order_by_asc(booking::Column::CheckOutTime)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}

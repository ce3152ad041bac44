//! Create payment_orders table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentOrders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentOrders::OrderNo)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PaymentOrders::UserId).big_integer().not_null())
                    .col(ColumnDef::new(PaymentOrders::Amount).decimal().not_null())
                    .col(
                        ColumnDef::new(PaymentOrders::Status)
                            .string()
                            .not_null()
                            .default("Unpaid"),
                    )
                    .col(
                        ColumnDef::new(PaymentOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentOrders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum PaymentOrders {
    Table,
    Id,
    OrderNo,
    UserId,
    Amount,
    Status,
    CreatedAt,
}

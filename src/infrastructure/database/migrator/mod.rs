//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_hotels;
mod m20250301_000002_create_rooms;
mod m20250301_000003_create_time_slots;
mod m20250301_000004_create_payment_orders;
mod m20250301_000005_create_bookings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_hotels::Migration),
            Box::new(m20250301_000002_create_rooms::Migration),
            Box::new(m20250301_000003_create_time_slots::Migration),
            Box::new(m20250301_000004_create_payment_orders::Migration),
            Box::new(m20250301_000005_create_bookings::Migration),
        ]
    }
}

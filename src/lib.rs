//! # Roomkey Reservation & Access-Control Engine
//!
//! Books smart-lock hotel rooms for bounded time windows and controls
//! check-in and physical unlock through two secret codes.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities, the booking state machine,
//!   access-code issuing/validation and repository traits
//! - **application**: The reservation engine, the reconciliation
//!   sweeper and the outbound lock-gateway port
//! - **infrastructure**: External concerns (SeaORM persistence,
//!   migrations, in-memory storage)
//! - **shared**: Cross-cutting concerns (graceful shutdown)
//!
//! The HTTP transport and the physical device transport are external
//! collaborators: this crate exposes [`BookingService`] as its inbound
//! surface and consumes a [`application::ports::LockGateway`]
//! implementation for unlock dispatch.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

// Re-export the engine surface
pub use application::booking::{
    start_booking_sweeper_task, BookingService, BookingSweeper, BookingView,
};

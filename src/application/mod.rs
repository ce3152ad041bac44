//! Application layer — use cases and ports

pub mod booking;
pub mod ports;

pub use booking::{BookingService, BookingSweeper, BookingView};

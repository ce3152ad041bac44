//! Booking application services

pub mod service;
pub mod sweeper;

pub use service::{BookingService, BookingView};
pub use sweeper::{start_booking_sweeper_task, BookingSweeper};

//! Booking aggregate
//!
//! Contains the Booking entity, the lifecycle status machine, the
//! access-window check and the repository interface.

pub mod model;
pub mod repository;
pub mod window;

pub use model::{Booking, BookingStatus};
pub use repository::{BookingRepository, NewBooking};
pub use window::is_unlock_window_open;

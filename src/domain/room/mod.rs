//! Room aggregate (read-only)

pub mod model;
pub mod repository;

pub use model::{Hotel, Room, TimeSlot, VenueStatus};
pub use repository::RoomRepository;

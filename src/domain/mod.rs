pub mod access_code;
pub mod booking;
pub mod error;
pub mod repositories;
pub mod room;

// Re-export commonly used types
pub use booking::{Booking, BookingRepository, BookingStatus, NewBooking};
pub use error::{DomainError, DomainResult};
pub use repositories::RepositoryProvider;
pub use room::{Hotel, Room, RoomRepository, TimeSlot, VenueStatus};

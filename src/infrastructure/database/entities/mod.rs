//! Database entities module

pub mod booking;
pub mod hotel;
pub mod payment_order;
pub mod room;
pub mod time_slot;

pub use booking::Entity as Booking;
pub use hotel::Entity as Hotel;
pub use payment_order::Entity as PaymentOrder;
pub use room::Entity as Room;
pub use time_slot::Entity as TimeSlot;

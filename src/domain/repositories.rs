//! Repository access for the domain layer

use super::booking::BookingRepository;
use super::room::RoomRepository;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let room = repos.rooms().find_by_id(10).await?;
///     let booking = repos.bookings().find_by_no("R2025...").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn bookings(&self) -> &dyn BookingRepository;
    fn rooms(&self) -> &dyn RoomRepository;
}

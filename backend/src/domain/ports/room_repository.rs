//! Port for reading rooms and their availability.

use async_trait::async_trait;

use crate::domain::{Room, RoomId, StayDates};

use super::PersistenceError;

/// Read access to rooms and the restrictions that make them unavailable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Every room, ordered by id.
    async fn all_rooms(&self) -> Result<Vec<Room>, PersistenceError>;

    /// Fetch one room; `NotFound` when absent.
    async fn find_room(&self, id: RoomId) -> Result<Room, PersistenceError>;

    /// Rooms with no restriction overlapping `stay`, ordered by id.
    async fn available_rooms(&self, stay: &StayDates) -> Result<Vec<Room>, PersistenceError>;

    /// True when no restriction for `room` overlaps `stay`.
    async fn is_room_available(
        &self,
        room: RoomId,
        stay: &StayDates,
    ) -> Result<bool, PersistenceError>;
}

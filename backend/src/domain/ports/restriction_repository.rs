//! Port for room restrictions and owner blocks.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{NewRoomRestriction, RestrictionId, RoomId, RoomRestriction, StayDates};

use super::PersistenceError;

/// Storage for restriction rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestrictionRepository: Send + Sync {
    /// Insert an arbitrary restriction row.
    async fn insert_room_restriction(
        &self,
        restriction: &NewRoomRestriction,
    ) -> Result<RestrictionId, PersistenceError>;

    /// Block `room` for the single night starting on `night`.
    async fn insert_block(
        &self,
        room: RoomId,
        night: NaiveDate,
    ) -> Result<RestrictionId, PersistenceError>;

    /// Remove an owner block; `NotFound` when `id` is not a block.
    async fn delete_block(&self, id: RestrictionId) -> Result<(), PersistenceError>;

    /// Restrictions on `room` overlapping `range`, ordered by start date.
    async fn restrictions_for_room(
        &self,
        room: RoomId,
        range: &StayDates,
    ) -> Result<Vec<RoomRestriction>, PersistenceError>;
}

//! PostgreSQL-backed `RoomRepository`.
//!
//! Availability is a single anti-join: a room is free for a stay when no
//! restriction row for it overlaps `[start, end)`.

use async_trait::async_trait;
use diesel::dsl::{count_star, not};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, RoomRepository};
use crate::domain::{Room, RoomId, StayDates};

use super::diesel_basic_error_mapping::{map_diesel_error, map_diesel_error_for, map_pool_error};
use super::diesel_helpers::bounded;
use super::models::RoomRow;
use super::pool::DbPool;
use super::schema::{room_restrictions, rooms};

/// Diesel-backed implementation of the `RoomRepository` port.
#[derive(Clone)]
pub struct DieselRoomRepository {
    pool: DbPool,
}

impl DieselRoomRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for DieselRoomRepository {
    async fn all_rooms(&self) -> Result<Vec<Room>, PersistenceError> {
        bounded(self.pool.operation_timeout(), "all rooms", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let rows: Vec<RoomRow> = rooms::table
                .order(rooms::id.asc())
                .select(RoomRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Room::from).collect())
        })
        .await
    }

    async fn find_room(&self, id: RoomId) -> Result<Room, PersistenceError> {
        bounded(self.pool.operation_timeout(), "find room", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row: RoomRow = rooms::table
                .find(id.get())
                .select(RoomRow::as_select())
                .first(&mut conn)
                .await
                .map_err(map_diesel_error_for(format!("room {id}")))?;
            Ok(row.into())
        })
        .await
    }

    async fn available_rooms(&self, stay: &StayDates) -> Result<Vec<Room>, PersistenceError> {
        let (start, end) = (stay.start(), stay.end());
        bounded(self.pool.operation_timeout(), "available rooms", async move {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let restricted = room_restrictions::table
                .filter(room_restrictions::start_date.lt(end))
                .filter(room_restrictions::end_date.gt(start))
                .select(room_restrictions::room_id);
            let rows: Vec<RoomRow> = rooms::table
                .filter(not(rooms::id.eq_any(restricted)))
                .order(rooms::id.asc())
                .select(RoomRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Room::from).collect())
        })
        .await
    }

    async fn is_room_available(
        &self,
        room: RoomId,
        stay: &StayDates,
    ) -> Result<bool, PersistenceError> {
        let (start, end) = (stay.start(), stay.end());
        bounded(self.pool.operation_timeout(), "room availability", async move {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let overlapping: i64 = room_restrictions::table
                .filter(room_restrictions::room_id.eq(room.get()))
                .filter(room_restrictions::start_date.lt(end))
                .filter(room_restrictions::end_date.gt(start))
                .select(count_star())
                .first(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(overlapping == 0)
        })
        .await
    }
}

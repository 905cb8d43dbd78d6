//! PostgreSQL-backed `RestrictionRepository`.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, RestrictionRepository};
use crate::domain::{
    NewRoomRestriction, RestrictionId, RestrictionKind, RoomId, RoomRestriction, StayDates,
};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_helpers::bounded;
use super::models::{NewRoomRestrictionRow, RoomRestrictionRow};
use super::pool::DbPool;
use super::schema::room_restrictions;

/// Diesel-backed implementation of the `RestrictionRepository` port.
#[derive(Clone)]
pub struct DieselRestrictionRepository {
    pool: DbPool,
}

impl DieselRestrictionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn insert_row(
        &self,
        operation: &'static str,
        row: NewRoomRestrictionRow,
    ) -> Result<RestrictionId, PersistenceError> {
        bounded(self.pool.operation_timeout(), operation, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let id: i32 = diesel::insert_into(room_restrictions::table)
                .values(&row)
                .returning(room_restrictions::id)
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(RestrictionId::new(id))
        })
        .await
    }
}

#[async_trait]
impl RestrictionRepository for DieselRestrictionRepository {
    async fn insert_room_restriction(
        &self,
        restriction: &NewRoomRestriction,
    ) -> Result<RestrictionId, PersistenceError> {
        let row = NewRoomRestrictionRow {
            start_date: restriction.stay.start(),
            end_date: restriction.stay.end(),
            room_id: restriction.room_id.get(),
            reservation_id: restriction.reservation_id.map(|id| id.get()),
            restriction_id: restriction.kind.code(),
        };
        self.insert_row("insert restriction", row).await
    }

    async fn insert_block(
        &self,
        room: RoomId,
        night: NaiveDate,
    ) -> Result<RestrictionId, PersistenceError> {
        let end = night
            .checked_add_days(Days::new(1))
            .ok_or_else(|| PersistenceError::query(format!("no night after {night}")))?;
        let row = NewRoomRestrictionRow {
            start_date: night,
            end_date: end,
            room_id: room.get(),
            reservation_id: None,
            restriction_id: RestrictionKind::OwnerBlock.code(),
        };
        self.insert_row("insert block", row).await
    }

    async fn delete_block(&self, id: RestrictionId) -> Result<(), PersistenceError> {
        bounded(self.pool.operation_timeout(), "delete block", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let deleted = diesel::delete(
                room_restrictions::table
                    .find(id.get())
                    .filter(room_restrictions::reservation_id.is_null()),
            )
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(PersistenceError::not_found(format!("owner block {id}")));
            }
            Ok(())
        })
        .await
    }

    async fn restrictions_for_room(
        &self,
        room: RoomId,
        range: &StayDates,
    ) -> Result<Vec<RoomRestriction>, PersistenceError> {
        let (start, end) = (range.start(), range.end());
        bounded(self.pool.operation_timeout(), "restrictions for room", async move {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let rows: Vec<RoomRestrictionRow> = room_restrictions::table
                .filter(room_restrictions::room_id.eq(room.get()))
                .filter(room_restrictions::start_date.lt(end))
                .filter(room_restrictions::end_date.gt(start))
                .order((room_restrictions::start_date.asc(), room_restrictions::id.asc()))
                .select(RoomRestrictionRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            rows.into_iter().map(RoomRestriction::try_from).collect()
        })
        .await
    }
}

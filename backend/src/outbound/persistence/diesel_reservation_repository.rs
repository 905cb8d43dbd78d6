//! PostgreSQL-backed `ReservationRepository`.
//!
//! A reservation and its `Reservation` restriction row are written in one
//! transaction, after locking the room and checking that no restriction
//! overlaps the stay. They are removed together in another transaction.
//! Reads always join the room.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{PersistenceError, ReservationRepository};
use crate::domain::{
    ContactDetails, NewReservation, Reservation, ReservationId, RestrictionKind,
};

use super::diesel_basic_error_mapping::{map_diesel_error, map_diesel_error_for, map_pool_error};
use super::diesel_helpers::bounded;
use super::models::{
    NewReservationRow, NewRoomRestrictionRow, ReservationContactUpdate, ReservationRow, RoomRow,
    row_to_reservation,
};
use super::pool::DbPool;
use super::schema::{reservations, room_restrictions, rooms};

/// Diesel-backed implementation of the `ReservationRepository` port.
#[derive(Clone)]
pub struct DieselReservationRepository {
    pool: DbPool,
}

impl DieselReservationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_joined(
        &self,
        operation: &'static str,
        only_new: bool,
    ) -> Result<Vec<Reservation>, PersistenceError> {
        bounded(self.pool.operation_timeout(), operation, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let mut query = reservations::table
                .inner_join(rooms::table)
                .select((ReservationRow::as_select(), RoomRow::as_select()))
                .order((reservations::start_date.asc(), reservations::id.asc()))
                .into_boxed();
            if only_new {
                query = query.filter(reservations::processed.eq(0));
            }
            let rows: Vec<(ReservationRow, RoomRow)> =
                query.load(&mut conn).await.map_err(map_diesel_error)?;
            rows.into_iter().map(row_to_reservation).collect()
        })
        .await
    }
}

/// Result of the booking transaction.
enum Booking {
    Stored(i32),
    RoomMissing,
    Unavailable,
}

fn missing(id: ReservationId) -> PersistenceError {
    PersistenceError::not_found(format!("reservation {id}"))
}

#[async_trait]
impl ReservationRepository for DieselReservationRepository {
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<ReservationId, PersistenceError> {
        let row = NewReservationRow {
            first_name: &reservation.contact.first_name,
            last_name: &reservation.contact.last_name,
            email: &reservation.contact.email,
            phone: &reservation.contact.phone,
            start_date: reservation.stay.start(),
            end_date: reservation.stay.end(),
            room_id: reservation.room_id.get(),
        };

        let (room_id, start, end) = (row.room_id, row.start_date, row.end_date);

        bounded(self.pool.operation_timeout(), "insert reservation", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let outcome = conn
                .transaction(|conn| {
                    async move {
                        // Lock the room so concurrent bookings for it serialise.
                        let locked: Vec<i32> = rooms::table
                            .find(row.room_id)
                            .select(rooms::id)
                            .for_update()
                            .load(conn)
                            .await?;
                        if locked.is_empty() {
                            return Ok(Booking::RoomMissing);
                        }

                        let clashes: i64 = room_restrictions::table
                            .filter(room_restrictions::room_id.eq(row.room_id))
                            .filter(room_restrictions::start_date.lt(row.end_date))
                            .filter(room_restrictions::end_date.gt(row.start_date))
                            .count()
                            .get_result(conn)
                            .await?;
                        if clashes > 0 {
                            return Ok(Booking::Unavailable);
                        }

                        let id: i32 = diesel::insert_into(reservations::table)
                            .values(&row)
                            .returning(reservations::id)
                            .get_result(conn)
                            .await?;

                        diesel::insert_into(room_restrictions::table)
                            .values(&NewRoomRestrictionRow {
                                start_date: row.start_date,
                                end_date: row.end_date,
                                room_id: row.room_id,
                                reservation_id: Some(id),
                                restriction_id: RestrictionKind::Reservation.code(),
                            })
                            .execute(conn)
                            .await?;

                        Ok(Booking::Stored(id))
                    }
                    .scope_boxed()
                })
                .await
                .map_err(map_diesel_error)?;

            match outcome {
                Booking::Stored(id) => {
                    debug!(reservation_id = id, "reservation stored");
                    Ok(ReservationId::new(id))
                }
                Booking::RoomMissing => Err(PersistenceError::not_found(format!("room {room_id}"))),
                Booking::Unavailable => Err(PersistenceError::conflict(format!(
                    "room {room_id} is not available from {start} to {end}"
                ))),
            }
        })
        .await
    }

    async fn all_reservations(&self) -> Result<Vec<Reservation>, PersistenceError> {
        self.load_joined("all reservations", false).await
    }

    async fn new_reservations(&self) -> Result<Vec<Reservation>, PersistenceError> {
        self.load_joined("new reservations", true).await
    }

    async fn find_reservation(&self, id: ReservationId) -> Result<Reservation, PersistenceError> {
        bounded(self.pool.operation_timeout(), "find reservation", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row: (ReservationRow, RoomRow) = reservations::table
                .inner_join(rooms::table)
                .filter(reservations::id.eq(id.get()))
                .select((ReservationRow::as_select(), RoomRow::as_select()))
                .first(&mut conn)
                .await
                .map_err(map_diesel_error_for(format!("reservation {id}")))?;
            row_to_reservation(row)
        })
        .await
    }

    async fn update_contact(
        &self,
        id: ReservationId,
        contact: &ContactDetails,
    ) -> Result<(), PersistenceError> {
        let changes = ReservationContactUpdate {
            first_name: &contact.first_name,
            last_name: &contact.last_name,
            email: &contact.email,
            phone: &contact.phone,
            updated_at: Utc::now(),
        };
        bounded(self.pool.operation_timeout(), "update reservation", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let updated = diesel::update(reservations::table.find(id.get()))
                .set(&changes)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            if updated == 0 {
                return Err(missing(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_reservation(&self, id: ReservationId) -> Result<(), PersistenceError> {
        bounded(self.pool.operation_timeout(), "delete reservation", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let deleted = conn
                .transaction(|conn| {
                    async move {
                        diesel::delete(
                            room_restrictions::table
                                .filter(room_restrictions::reservation_id.eq(id.get())),
                        )
                        .execute(conn)
                        .await?;
                        diesel::delete(reservations::table.find(id.get()))
                            .execute(conn)
                            .await
                    }
                    .scope_boxed()
                })
                .await
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(missing(id));
            }
            debug!(reservation_id = %id, "reservation deleted");
            Ok(())
        })
        .await
    }

    async fn set_processed(
        &self,
        id: ReservationId,
        processed: bool,
    ) -> Result<(), PersistenceError> {
        bounded(self.pool.operation_timeout(), "mark reservation", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let updated = diesel::update(reservations::table.find(id.get()))
                .set((
                    reservations::processed.eq(i32::from(processed)),
                    reservations::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            if updated == 0 {
                return Err(missing(id));
            }
            Ok(())
        })
        .await
    }
}

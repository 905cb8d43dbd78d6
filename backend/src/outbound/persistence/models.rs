//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::domain::{
    AccessLevel, ContactDetails, Reservation, ReservationId, RestrictionId, RestrictionKind, Room,
    RoomId, RoomRestriction, StayDates, UserCredentials, UserId,
};
use crate::domain::ports::PersistenceError;

use super::schema::{reservations, room_restrictions, rooms, users};

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

/// Row struct for reading from the rooms table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoomRow {
    pub id: i32,
    pub room_name: String,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Self::new(RoomId::new(row.id), row.room_name)
    }
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

/// Row struct for reading from the reservations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReservationRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub processed: i32,
}

/// Insertable struct for creating reservations.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservations)]
pub(crate) struct NewReservationRow<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i32,
}

/// Changeset for the admin edit form.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = reservations)]
pub(crate) struct ReservationContactUpdate<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub updated_at: DateTime<Utc>,
}

/// Convert a joined reservation/room row into the domain type.
pub(crate) fn row_to_reservation(
    (row, room): (ReservationRow, RoomRow),
) -> Result<Reservation, PersistenceError> {
    let stay = StayDates::new(row.start_date, row.end_date)
        .map_err(|err| PersistenceError::query(format!("reservation {}: {err}", row.id)))?;
    Ok(Reservation {
        id: ReservationId::new(row.id),
        contact: ContactDetails {
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
        },
        stay,
        room: room.into(),
        processed: row.processed != 0,
    })
}

// ---------------------------------------------------------------------------
// Room restrictions
// ---------------------------------------------------------------------------

/// Row struct for reading from the room_restrictions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = room_restrictions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoomRestrictionRow {
    pub id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i32,
    pub reservation_id: Option<i32>,
    pub restriction_id: i32,
}

impl TryFrom<RoomRestrictionRow> for RoomRestriction {
    type Error = PersistenceError;

    fn try_from(row: RoomRestrictionRow) -> Result<Self, Self::Error> {
        let stay = StayDates::new(row.start_date, row.end_date)
            .map_err(|err| PersistenceError::query(format!("restriction {}: {err}", row.id)))?;
        Ok(Self {
            id: RestrictionId::new(row.id),
            room_id: RoomId::new(row.room_id),
            stay,
            reservation_id: row.reservation_id.map(ReservationId::new),
            kind: RestrictionKind::from_code(row.restriction_id),
        })
    }
}

/// Insertable struct for creating restriction rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = room_restrictions)]
pub(crate) struct NewRoomRestrictionRow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i32,
    pub reservation_id: Option<i32>,
    pub restriction_id: i32,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Credential columns of the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserCredentialsRow {
    pub id: i32,
    pub password: String,
    pub access_level: i32,
}

impl From<UserCredentialsRow> for UserCredentials {
    fn from(row: UserCredentialsRow) -> Self {
        Self {
            id: UserId::new(row.id),
            password_hash: row.password,
            access_level: AccessLevel::new(row.access_level),
        }
    }
}

/// Insertable struct for provisioning users.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub access_level: i32,
}

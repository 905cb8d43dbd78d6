//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Bookable rooms (reference data seeded by the initial migration).
    rooms (id) {
        id -> Int4,
        room_name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Restriction types: 1 = reservation, 2 = owner block.
    restrictions (id) {
        id -> Int4,
        restriction_name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Guest reservations. `processed` is 0 for new, 1 for handled.
    reservations (id) {
        id -> Int4,
        first_name -> Varchar,
        last_name -> Varchar,
        email -> Varchar,
        phone -> Varchar,
        start_date -> Date,
        end_date -> Date,
        room_id -> Int4,
        processed -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Date ranges during which a room is unavailable.
    ///
    /// `reservation_id` is null for owner blocks.
    room_restrictions (id) {
        id -> Int4,
        start_date -> Date,
        end_date -> Date,
        room_id -> Int4,
        reservation_id -> Nullable<Int4>,
        restriction_id -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Back-office accounts. `password` holds a bcrypt hash.
    users (id) {
        id -> Int4,
        first_name -> Varchar,
        last_name -> Varchar,
        email -> Varchar,
        password -> Varchar,
        access_level -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(reservations -> rooms (room_id));
diesel::joinable!(room_restrictions -> rooms (room_id));
diesel::joinable!(room_restrictions -> reservations (reservation_id));
diesel::joinable!(room_restrictions -> restrictions (restriction_id));

diesel::allow_tables_to_appear_in_same_query!(
    reservations,
    restrictions,
    room_restrictions,
    rooms,
    users,
);

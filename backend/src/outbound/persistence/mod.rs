//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via Diesel, with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Bounded operations**: every repository call runs under the pool's
//!   operation timeout and fails with `PersistenceError::Timeout` past it.
//! - **Atomic bookings**: a reservation and its restriction row are written
//!   and deleted together in one transaction.
//!
//! # Example
//!
//! ```ignore
//! use bookings::outbound::persistence::{DbPool, DieselRoomRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/bookings")).await?;
//! let rooms = DieselRoomRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_helpers;
mod diesel_reservation_repository;
mod diesel_restriction_repository;
mod diesel_room_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_reservation_repository::DieselReservationRepository;
pub use diesel_restriction_repository::DieselRestrictionRepository;
pub use diesel_room_repository::DieselRoomRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};

//! Port for persisting and administering reservations.

use async_trait::async_trait;

use crate::domain::{ContactDetails, NewReservation, Reservation, ReservationId};

use super::PersistenceError;

/// Storage for reservations.
///
/// Adapters keep a reservation and its restriction row consistent: both are
/// written, and later deleted, in a single transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert the reservation together with its `Reservation` restriction.
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<ReservationId, PersistenceError>;

    /// Every reservation, ordered by arrival date.
    async fn all_reservations(&self) -> Result<Vec<Reservation>, PersistenceError>;

    /// Reservations not yet processed, ordered by arrival date.
    async fn new_reservations(&self) -> Result<Vec<Reservation>, PersistenceError>;

    /// Fetch one reservation; `NotFound` when absent.
    async fn find_reservation(&self, id: ReservationId) -> Result<Reservation, PersistenceError>;

    /// Overwrite the guest contact fields.
    async fn update_contact(
        &self,
        id: ReservationId,
        contact: &ContactDetails,
    ) -> Result<(), PersistenceError>;

    /// Delete the reservation and its restriction rows.
    async fn delete_reservation(&self, id: ReservationId) -> Result<(), PersistenceError>;

    /// Mark the reservation processed (or new again).
    async fn set_processed(&self, id: ReservationId, processed: bool)
    -> Result<(), PersistenceError>;
}

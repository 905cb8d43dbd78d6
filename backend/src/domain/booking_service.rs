//! Guest booking workflow: search, room lookup, and confirmation.
//!
//! Confirmation persists the reservation (with its restriction, atomically,
//! inside the repository) and then queues two messages: a confirmation for
//! the guest and a notice for the property owner. Queueing never blocks the
//! request; a full or closed queue is logged and otherwise ignored.

use std::sync::Arc;

use tracing::{info, warn};

use super::ports::{Mailer, ReservationRepository, RoomRepository};
use super::{Error, MailMessage, NewReservation, Reservation, Room, RoomId, StayDates};

/// Booking use-cases shared by the public HTTP handlers.
#[derive(Clone)]
pub struct BookingService {
    rooms: Arc<dyn RoomRepository>,
    reservations: Arc<dyn ReservationRepository>,
    mailer: Arc<dyn Mailer>,
    owner_email: String,
}

impl BookingService {
    /// Wire the service to its ports.
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        reservations: Arc<dyn ReservationRepository>,
        mailer: Arc<dyn Mailer>,
        owner_email: impl Into<String>,
    ) -> Self {
        Self {
            rooms,
            reservations,
            mailer,
            owner_email: owner_email.into(),
        }
    }

    /// Rooms free for the whole stay.
    pub async fn search(&self, stay: &StayDates) -> Result<Vec<Room>, Error> {
        Ok(self.rooms.available_rooms(stay).await?)
    }

    /// Whether `room` is free for the whole stay.
    pub async fn is_available(&self, room: RoomId, stay: &StayDates) -> Result<bool, Error> {
        Ok(self.rooms.is_room_available(room, stay).await?)
    }

    /// Look up a room by id.
    pub async fn room(&self, id: RoomId) -> Result<Room, Error> {
        Ok(self.rooms.find_room(id).await?)
    }

    /// Persist a validated reservation and queue its notifications.
    pub async fn confirm(&self, reservation: NewReservation) -> Result<Reservation, Error> {
        let room = self.rooms.find_room(reservation.room_id).await?;
        let id = self.reservations.insert_reservation(&reservation).await?;
        let NewReservation { contact, stay, .. } = reservation;
        let confirmed = Reservation {
            id,
            contact,
            stay,
            room,
            processed: false,
        };
        info!(reservation_id = %id, room_id = %confirmed.room.id, "reservation confirmed");

        self.notify(MailMessage::guest_confirmation(&confirmed, &self.owner_email));
        self.notify(MailMessage::owner_notification(&confirmed, &self.owner_email));
        Ok(confirmed)
    }

    fn notify(&self, message: MailMessage) {
        let subject = message.subject.clone();
        if let Err(error) = self.mailer.enqueue(message) {
            warn!(%error, %subject, "confirmation mail dropped");
        }
    }
}

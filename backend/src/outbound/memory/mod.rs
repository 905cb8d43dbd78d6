//! In-process repository adapter.
//!
//! Implements every repository port over a single mutex-guarded state so the
//! application can run without PostgreSQL and tests can drive the full HTTP
//! surface. Semantics follow the Diesel adapters: half-open overlap checks,
//! reservation and restriction rows written and removed together, bookings
//! refused with `Conflict` when the room is already taken, and `NotFound`
//! when a mutation matches nothing.
//!
//! [`FailureInjection`] makes selected inserts fail so error paths can be
//! exercised. A failed insert leaves no partial rows behind.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::domain::ports::{
    PersistenceError, ReservationRepository, RestrictionRepository, RoomRepository,
    UserRepository,
};
use crate::domain::{
    ContactDetails, NewReservation, NewRoomRestriction, NewUser, Reservation, ReservationId,
    RestrictionId, RestrictionKind, Room, RoomId, RoomRestriction, StayDates, UserCredentials,
    UserId,
};

/// Inserts that should fail, keyed by room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureInjection {
    /// Reservation inserts for this room fail before anything is written.
    pub reservation_room: Option<RoomId>,
    /// Restriction inserts for this room fail; an enclosing reservation
    /// insert is rolled back.
    pub restriction_room: Option<RoomId>,
}

impl FailureInjection {
    /// Reservations for room 2 and restrictions for room 100 fail.
    #[must_use]
    pub const fn reference() -> Self {
        Self {
            reservation_room: Some(RoomId::new(2)),
            restriction_room: Some(RoomId::new(100)),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredReservation {
    contact: ContactDetails,
    stay: StayDates,
    room_id: RoomId,
    processed: bool,
}

#[derive(Debug, Clone)]
struct StoredUser {
    email: String,
    credentials: UserCredentials,
}

#[derive(Debug, Default)]
struct State {
    rooms: BTreeMap<RoomId, Room>,
    reservations: BTreeMap<i32, StoredReservation>,
    restrictions: BTreeMap<i32, RoomRestriction>,
    users: BTreeMap<i32, StoredUser>,
    next_reservation: i32,
    next_restriction: i32,
    next_user: i32,
}

impl State {
    fn seeded() -> Self {
        let rooms = [
            Room::new(RoomId::new(1), "General's Quarters"),
            Room::new(RoomId::new(2), "Major's Suite"),
        ];
        Self {
            rooms: rooms.into_iter().map(|room| (room.id, room)).collect(),
            next_reservation: 1,
            next_restriction: 1,
            next_user: 1,
            ..Self::default()
        }
    }

    fn room(&self, id: RoomId) -> Result<&Room, PersistenceError> {
        self.rooms
            .get(&id)
            .ok_or_else(|| PersistenceError::not_found(format!("room {id}")))
    }

    fn is_available(&self, room: RoomId, stay: &StayDates) -> bool {
        !self
            .restrictions
            .values()
            .any(|r| r.room_id == room && r.stay.overlaps(stay))
    }

    fn joined(&self, id: i32, stored: &StoredReservation) -> Result<Reservation, PersistenceError> {
        Ok(Reservation {
            id: ReservationId::new(id),
            contact: stored.contact.clone(),
            stay: stored.stay,
            room: self.room(stored.room_id)?.clone(),
            processed: stored.processed,
        })
    }

    fn reservation_mut(
        &mut self,
        id: ReservationId,
    ) -> Result<&mut StoredReservation, PersistenceError> {
        self.reservations
            .get_mut(&id.get())
            .ok_or_else(|| PersistenceError::not_found(format!("reservation {id}")))
    }

    fn push_restriction(&mut self, restriction: &NewRoomRestriction) -> RestrictionId {
        let id = RestrictionId::new(self.next_restriction);
        self.next_restriction += 1;
        self.restrictions.insert(
            id.get(),
            RoomRestriction {
                id,
                room_id: restriction.room_id,
                stay: restriction.stay,
                reservation_id: restriction.reservation_id,
                kind: restriction.kind,
            },
        );
        id
    }
}

/// Shared in-memory store implementing all repository ports.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    failures: FailureInjection,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Empty store seeded with the two reference rooms.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::seeded())),
            failures: FailureInjection::default(),
        }
    }

    /// Store that fails the inserts named by `failures`.
    #[must_use]
    pub fn with_failures(failures: FailureInjection) -> Self {
        Self {
            failures,
            ..Self::new()
        }
    }

    /// Number of stored reservations.
    #[must_use]
    pub fn reservation_count(&self) -> usize {
        self.lock().reservations.len()
    }

    /// Number of stored restriction rows.
    #[must_use]
    pub fn restriction_count(&self) -> usize {
        self.lock().restrictions.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_restriction_failure(&self, room: RoomId) -> Result<(), PersistenceError> {
        if self.failures.restriction_room == Some(room) {
            return Err(PersistenceError::query(format!(
                "simulated restriction insert failure for room {room}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
    async fn all_rooms(&self) -> Result<Vec<Room>, PersistenceError> {
        Ok(self.lock().rooms.values().cloned().collect())
    }

    async fn find_room(&self, id: RoomId) -> Result<Room, PersistenceError> {
        self.lock().room(id).cloned()
    }

    async fn available_rooms(&self, stay: &StayDates) -> Result<Vec<Room>, PersistenceError> {
        let state = self.lock();
        Ok(state
            .rooms
            .values()
            .filter(|room| state.is_available(room.id, stay))
            .cloned()
            .collect())
    }

    async fn is_room_available(
        &self,
        room: RoomId,
        stay: &StayDates,
    ) -> Result<bool, PersistenceError> {
        Ok(self.lock().is_available(room, stay))
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<ReservationId, PersistenceError> {
        let room = reservation.room_id;
        if self.failures.reservation_room == Some(room) {
            return Err(PersistenceError::query(format!(
                "simulated reservation insert failure for room {room}"
            )));
        }
        self.check_restriction_failure(room)?;

        let mut state = self.lock();
        state.room(room)?;
        if !state.is_available(room, &reservation.stay) {
            return Err(PersistenceError::conflict(format!(
                "room {room} is not available from {} to {}",
                reservation.stay.start(),
                reservation.stay.end()
            )));
        }
        let id = ReservationId::new(state.next_reservation);
        state.next_reservation += 1;
        state.reservations.insert(
            id.get(),
            StoredReservation {
                contact: reservation.contact.clone(),
                stay: reservation.stay,
                room_id: room,
                processed: false,
            },
        );
        state.push_restriction(&NewRoomRestriction::for_reservation(room, reservation.stay, id));
        debug!(reservation_id = %id, "reservation stored in memory");
        Ok(id)
    }

    async fn all_reservations(&self) -> Result<Vec<Reservation>, PersistenceError> {
        let state = self.lock();
        let mut rows = state
            .reservations
            .iter()
            .map(|(id, stored)| state.joined(*id, stored))
            .collect::<Result<Vec<_>, _>>()?;
        rows.sort_by_key(|r| (r.stay.start(), r.id.get()));
        Ok(rows)
    }

    async fn new_reservations(&self) -> Result<Vec<Reservation>, PersistenceError> {
        let mut rows = self.all_reservations().await?;
        rows.retain(|r| !r.processed);
        Ok(rows)
    }

    async fn find_reservation(&self, id: ReservationId) -> Result<Reservation, PersistenceError> {
        let state = self.lock();
        let stored = state
            .reservations
            .get(&id.get())
            .ok_or_else(|| PersistenceError::not_found(format!("reservation {id}")))?;
        state.joined(id.get(), stored)
    }

    async fn update_contact(
        &self,
        id: ReservationId,
        contact: &ContactDetails,
    ) -> Result<(), PersistenceError> {
        self.lock().reservation_mut(id)?.contact = contact.clone();
        Ok(())
    }

    async fn delete_reservation(&self, id: ReservationId) -> Result<(), PersistenceError> {
        let mut state = self.lock();
        state
            .reservations
            .remove(&id.get())
            .ok_or_else(|| PersistenceError::not_found(format!("reservation {id}")))?;
        state.restrictions.retain(|_, r| r.reservation_id != Some(id));
        Ok(())
    }

    async fn set_processed(
        &self,
        id: ReservationId,
        processed: bool,
    ) -> Result<(), PersistenceError> {
        self.lock().reservation_mut(id)?.processed = processed;
        Ok(())
    }
}

#[async_trait]
impl RestrictionRepository for InMemoryStore {
    async fn insert_room_restriction(
        &self,
        restriction: &NewRoomRestriction,
    ) -> Result<RestrictionId, PersistenceError> {
        self.check_restriction_failure(restriction.room_id)?;
        Ok(self.lock().push_restriction(restriction))
    }

    async fn insert_block(
        &self,
        room: RoomId,
        night: NaiveDate,
    ) -> Result<RestrictionId, PersistenceError> {
        let stay = night
            .checked_add_days(Days::new(1))
            .and_then(|end| StayDates::new(night, end).ok())
            .ok_or_else(|| PersistenceError::query(format!("no night after {night}")))?;
        self.insert_room_restriction(&NewRoomRestriction::block(room, stay))
            .await
    }

    async fn delete_block(&self, id: RestrictionId) -> Result<(), PersistenceError> {
        let mut state = self.lock();
        let is_block = state
            .restrictions
            .get(&id.get())
            .is_some_and(|r| r.reservation_id.is_none());
        if !is_block {
            return Err(PersistenceError::not_found(format!("owner block {id}")));
        }
        state.restrictions.remove(&id.get());
        Ok(())
    }

    async fn restrictions_for_room(
        &self,
        room: RoomId,
        range: &StayDates,
    ) -> Result<Vec<RoomRestriction>, PersistenceError> {
        let mut rows: Vec<_> = self
            .lock()
            .restrictions
            .values()
            .filter(|r| r.room_id == room && r.stay.overlaps(range))
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.stay.start(), r.id.get()));
        Ok(rows)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, PersistenceError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| user.email == email)
            .map(|user| user.credentials.clone()))
    }

    async fn ensure_user(&self, user: &NewUser) -> Result<UserId, PersistenceError> {
        let mut state = self.lock();
        if let Some(existing) = state.users.values().find(|u| u.email == user.email) {
            return Ok(existing.credentials.id);
        }
        let id = UserId::new(state.next_user);
        state.next_user += 1;
        state.users.insert(
            id.get(),
            StoredUser {
                email: user.email.clone(),
                credentials: UserCredentials {
                    id,
                    password_hash: user.password_hash.clone(),
                    access_level: user.access_level,
                },
            },
        );
        Ok(id)
    }
}

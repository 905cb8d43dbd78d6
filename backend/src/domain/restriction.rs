//! Date ranges during which a room cannot be booked.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::reservation::{ReservationId, StayDates};
use super::room::RoomId;

/// Primary key of a room restriction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestrictionId(i32);

impl RestrictionId {
    /// Wrap a raw database identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw database identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for RestrictionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a room is unavailable. Codes match the `restrictions` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestrictionKind {
    /// Held by a guest reservation.
    Reservation,
    /// Blocked manually by the owner.
    OwnerBlock,
}

impl RestrictionKind {
    /// Code stored in `room_restrictions.restriction_id`.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Reservation => 1,
            Self::OwnerBlock => 2,
        }
    }

    /// Decode a stored code. Anything other than `1` is a manual block.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Reservation,
            _ => Self::OwnerBlock,
        }
    }
}

/// A restriction row to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoomRestriction {
    /// Room being restricted.
    pub room_id: RoomId,
    /// Nights covered.
    pub stay: StayDates,
    /// Owning reservation; `None` for manual blocks.
    pub reservation_id: Option<ReservationId>,
    /// Restriction type.
    pub kind: RestrictionKind,
}

impl NewRoomRestriction {
    /// Restriction created alongside a reservation.
    #[must_use]
    pub const fn for_reservation(room_id: RoomId, stay: StayDates, reservation_id: ReservationId) -> Self {
        Self {
            room_id,
            stay,
            reservation_id: Some(reservation_id),
            kind: RestrictionKind::Reservation,
        }
    }

    /// One-night owner block.
    #[must_use]
    pub const fn block(room_id: RoomId, night: StayDates) -> Self {
        Self {
            room_id,
            stay: night,
            reservation_id: None,
            kind: RestrictionKind::OwnerBlock,
        }
    }
}

/// A persisted restriction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRestriction {
    /// Primary key.
    pub id: RestrictionId,
    /// Room restricted.
    pub room_id: RoomId,
    /// Nights covered.
    pub stay: StayDates,
    /// Owning reservation; `None` for manual blocks.
    pub reservation_id: Option<ReservationId>,
    /// Restriction type.
    pub kind: RestrictionKind,
}

impl RoomRestriction {
    /// True for a manual owner block.
    #[must_use]
    pub fn is_block(&self) -> bool {
        self.reservation_id.is_none()
    }
}

//! Reservations, stay ranges and the draft carried between booking steps.
//!
//! ## Invariants
//! - [`StayDates`] always satisfies `start < end`; a stay covers the nights
//!   `[start, end)`.
//! - A [`Reservation`] read from storage carries its joined [`Room`].

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::room::{Room, RoomId};

/// Date format used by forms, query strings and the JSON endpoint.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Primary key of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(i32);

impl ReservationId {
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

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReservationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Errors raised while building a [`StayDates`] value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StayDatesError {
    /// The start date was not `YYYY-MM-DD`.
    #[error("Unable to parse start date")]
    InvalidStart,
    /// The end date was not `YYYY-MM-DD`.
    #[error("Unable to parse end date")]
    InvalidEnd,
    /// The end date is on or before the start date.
    #[error("Departure must be after arrival")]
    NotAfterStart,
}

/// Half-open range of nights `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StayDatesDto", into = "StayDatesDto")]
pub struct StayDates {
    start: NaiveDate,
    end: NaiveDate,
}

impl StayDates {
    /// Validate and construct a stay.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, StayDatesError> {
        if end <= start {
            return Err(StayDatesError::NotAfterStart);
        }
        Ok(Self { start, end })
    }

    /// Parse `YYYY-MM-DD` strings into a validated stay.
    pub fn parse(start: &str, end: &str) -> Result<Self, StayDatesError> {
        let start = parse_date(start).ok_or(StayDatesError::InvalidStart)?;
        let end = parse_date(end).ok_or(StayDatesError::InvalidEnd)?;
        Self::new(start, end)
    }

    /// A single night beginning on `date`.
    pub fn single_night(date: NaiveDate) -> Result<Self, StayDatesError> {
        let end = date
            .checked_add_days(Days::new(1))
            .ok_or(StayDatesError::NotAfterStart)?;
        Self::new(date, end)
    }

    /// Range from `start` to the last representable date.
    ///
    /// Only used where `start` is the first of a month, which is always
    /// before `NaiveDate::MAX`.
    pub(crate) const fn until_max(start: NaiveDate) -> Self {
        Self {
            start,
            end: NaiveDate::MAX,
        }
    }

    /// Arrival date.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Departure date (exclusive).
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// True when the two ranges share at least one night.
    ///
    /// Touching ranges (`a.end == b.start`) do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Every night in the stay.
    pub fn nights(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day < end)
    }
}

/// Parse a `YYYY-MM-DD` date, trimming surrounding whitespace.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

#[derive(Serialize, Deserialize)]
struct StayDatesDto {
    start: NaiveDate,
    end: NaiveDate,
}

impl From<StayDates> for StayDatesDto {
    fn from(value: StayDates) -> Self {
        Self {
            start: value.start,
            end: value.end,
        }
    }
}

impl TryFrom<StayDatesDto> for StayDates {
    type Error = StayDatesError;

    fn try_from(value: StayDatesDto) -> Result<Self, Self::Error> {
        Self::new(value.start, value.end)
    }
}

/// Guest contact fields captured by the reservation form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Guest first name.
    pub first_name: String,
    /// Guest last name.
    pub last_name: String,
    /// Guest email address.
    pub email: String,
    /// Guest phone number (free text).
    pub phone: String,
}

/// A reservation that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    /// Guest contact fields.
    pub contact: ContactDetails,
    /// Nights booked.
    pub stay: StayDates,
    /// Room booked.
    pub room_id: RoomId,
}

/// A persisted reservation with its joined room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Primary key.
    pub id: ReservationId,
    /// Guest contact fields.
    pub contact: ContactDetails,
    /// Nights booked.
    pub stay: StayDates,
    /// Room booked.
    pub room: Room,
    /// Whether an administrator has handled this reservation.
    pub processed: bool,
}

/// In-progress booking held in the visitor's session.
///
/// Created by a search, given a room by room selection or a direct link, and
/// replaced by the confirmed reservation once the booking succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftReservation {
    /// Requested nights.
    pub stay: StayDates,
    /// Chosen room, if the visitor has picked one.
    #[serde(default)]
    pub room_id: Option<RoomId>,
    /// Name of the chosen room once it has been looked up.
    #[serde(default)]
    pub room_name: Option<String>,
    /// Contact fields, filled once the booking is confirmed.
    #[serde(default)]
    pub contact: ContactDetails,
    /// Identifier assigned on confirmation.
    #[serde(default)]
    pub reservation_id: Option<ReservationId>,
}

impl DraftReservation {
    /// Start a draft for the given stay.
    #[must_use]
    pub fn for_stay(stay: StayDates) -> Self {
        Self {
            stay,
            room_id: None,
            room_name: None,
            contact: ContactDetails::default(),
            reservation_id: None,
        }
    }

    /// Select a room by id; its name is resolved later.
    #[must_use]
    pub fn choose_room(mut self, id: RoomId) -> Self {
        self.room_id = Some(id);
        self.room_name = None;
        self
    }

    /// Attach a room that has already been looked up.
    #[must_use]
    pub fn with_room(mut self, room: Room) -> Self {
        self.room_id = Some(room.id);
        self.room_name = Some(room.name);
        self
    }
}

impl From<Reservation> for DraftReservation {
    fn from(value: Reservation) -> Self {
        Self {
            stay: value.stay,
            room_id: Some(value.room.id),
            room_name: Some(value.room.name),
            contact: value.contact,
            reservation_id: Some(value.id),
        }
    }
}

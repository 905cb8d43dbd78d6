//! Domain primitives, services and ports.
//!
//! Purpose: define the booking entities (rooms, reservations, restrictions,
//! users), the use-cases that operate on them, and the ports through which
//! adapters are plugged in. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - `Error`/`ErrorCode` — transport-agnostic failures.
//! - `BookingService` — search, room lookup, confirmation.
//! - `CalendarService` — month view and owner-block reconciliation.
//! - `PasswordLoginService` — bcrypt authentication.

pub mod auth;
pub mod booking_service;
pub mod calendar;
pub mod calendar_service;
pub mod error;
pub mod mail;
pub mod password_login;
pub mod ports;
pub mod reservation;
pub mod restriction;
pub mod room;
pub mod trace_id;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::booking_service::BookingService;
pub use self::calendar::{BlockChanges, BlockMap, CalendarMonth, PostedBlocks};
pub use self::calendar_service::{CalendarService, ReconciledBlocks, RoomMonth};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::mail::MailMessage;
pub use self::password_login::{
    AdministratorSeed, INVALID_CREDENTIALS, PasswordLoginService, ensure_administrator,
};
pub use self::reservation::{
    ContactDetails, DATE_FORMAT, DraftReservation, NewReservation, Reservation, ReservationId,
    StayDates, StayDatesError, parse_date,
};
pub use self::restriction::{NewRoomRestriction, RestrictionId, RestrictionKind, RoomRestriction};
pub use self::room::{Room, RoomId};
pub use self::trace_id::TraceId;
pub use self::user::{AccessLevel, AuthenticatedUser, NewUser, UserCredentials, UserId};

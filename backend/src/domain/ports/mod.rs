//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the database, the mail queue) and how inbound adapters drive it. Each
//! trait exposes strongly typed errors so adapters map their failures into
//! predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod mailer;
mod persistence_error;
mod reservation_repository;
mod restriction_repository;
mod room_repository;
mod user_repository;

#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{Mailer, MailerError};
pub use persistence_error::PersistenceError;
#[cfg(test)]
pub use reservation_repository::MockReservationRepository;
pub use reservation_repository::ReservationRepository;
#[cfg(test)]
pub use restriction_repository::MockRestrictionRepository;
pub use restriction_repository::RestrictionRepository;
#[cfg(test)]
pub use room_repository::MockRoomRepository;
pub use room_repository::RoomRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;

//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, Mailer, ReservationRepository, RestrictionRepository, RoomRepository,
    UserRepository,
};
use crate::domain::{BookingService, CalendarService, PasswordLoginService};

use super::render::Templates;

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub rooms: Arc<dyn RoomRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub restrictions: Arc<dyn RestrictionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub mailer: Arc<dyn Mailer>,
    /// Address receiving new-booking notices; also the sender of guest mail.
    pub owner_email: String,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub bookings: BookingService,
    pub calendar: CalendarService,
    pub reservations: Arc<dyn ReservationRepository>,
    pub login: Arc<dyn LoginService>,
    pub templates: Arc<Templates>,
    pub owner_email: String,
}

impl HttpState {
    /// Wire services over `ports`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use bookings::inbound::http::render::Templates;
    /// use bookings::inbound::http::state::{HttpState, HttpStatePorts};
    /// use bookings::outbound::mail::{LogMailTransport, spawn_mail_worker};
    /// use bookings::outbound::memory::InMemoryStore;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let store = Arc::new(InMemoryStore::new());
    /// let (mailer, _worker) = spawn_mail_worker(Arc::new(LogMailTransport), 10);
    /// let ports = HttpStatePorts {
    ///     rooms: store.clone(),
    ///     reservations: store.clone(),
    ///     restrictions: store.clone(),
    ///     users: store,
    ///     mailer: Arc::new(mailer),
    ///     owner_email: "owner@example.com".to_owned(),
    /// };
    /// let state = HttpState::new(ports, Arc::new(Templates::new().unwrap()));
    /// assert_eq!(state.owner_email, "owner@example.com");
    /// # });
    /// ```
    pub fn new(ports: HttpStatePorts, templates: Arc<Templates>) -> Self {
        let HttpStatePorts {
            rooms,
            reservations,
            restrictions,
            users,
            mailer,
            owner_email,
        } = ports;
        Self {
            bookings: BookingService::new(
                rooms.clone(),
                reservations.clone(),
                mailer,
                owner_email.clone(),
            ),
            calendar: CalendarService::new(rooms, restrictions),
            reservations,
            login: Arc::new(PasswordLoginService::new(users)),
            templates,
            owner_email,
        }
    }
}

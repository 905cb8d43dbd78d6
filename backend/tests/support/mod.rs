//! Shared helpers for the site integration tests.
//!
//! Each test drives the fully configured application over the in-memory
//! store. Outbound mail goes through the real queue and worker into a
//! recording transport so tests can await delivered messages.

use std::sync::Arc;
use std::time::Duration;

use actix_session::SessionMiddleware;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test::TestRequest;
use async_trait::async_trait;
use tokio::sync::mpsc;

use bookings::domain::ports::ReservationRepository;
use bookings::domain::{AdministratorSeed, MailMessage, ensure_administrator};
use bookings::inbound::http::render::Templates;
use bookings::inbound::http::session_store::MemorySessionStore;
use bookings::inbound::http::state::{HttpState, HttpStatePorts};
use bookings::outbound::mail::{MailDeliveryError, MailTransport, spawn_mail_worker};
use bookings::outbound::memory::{FailureInjection, InMemoryStore};
use zeroize::Zeroizing;

pub const ADMIN_EMAIL: &str = "admin@admin.com";
pub const ADMIN_PASSWORD: &str = "password";
pub const OWNER_EMAIL: &str = "owner@example.com";

/// Build the site with every route, the session layer and tracing.
macro_rules! booking_site {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap($crate::support::session_layer())
                .wrap(bookings::Trace)
                .configure(bookings::inbound::http::configure),
        )
        .await
    };
}
pub(crate) use booking_site;

struct RecordingTransport {
    delivered: mpsc::UnboundedSender<MailMessage>,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn deliver(&self, message: &MailMessage) -> Result<(), MailDeliveryError> {
        self.delivered
            .send(message.clone())
            .map_err(|err| MailDeliveryError::Send {
                message: err.to_string(),
            })
    }
}

/// Application state plus handles for inspecting side effects.
pub struct Site {
    pub state: HttpState,
    pub store: InMemoryStore,
    pub mail: mpsc::UnboundedReceiver<MailMessage>,
}

impl Site {
    /// Next delivered message, or `None` when nothing arrives in time.
    pub async fn next_mail(&mut self) -> Option<MailMessage> {
        tokio::time::timeout(Duration::from_secs(2), self.mail.recv())
            .await
            .ok()
            .flatten()
    }
}

/// Site over the reference fixture: rooms 1 and 2, reservations for room 2
/// fail to insert, and an administrator account exists.
pub async fn site() -> Site {
    let store = InMemoryStore::with_failures(FailureInjection::reference());
    ensure_administrator(
        &store,
        AdministratorSeed {
            email: ADMIN_EMAIL.to_owned(),
            password: Zeroizing::new(ADMIN_PASSWORD.to_owned()),
            cost: 4,
        },
    )
    .await
    .expect("administrator provisioned");

    let (delivered, mail) = mpsc::unbounded_channel();
    let (mailer, _worker) = spawn_mail_worker(Arc::new(RecordingTransport { delivered }), 10);

    let shared = Arc::new(store.clone());
    let reservations: Arc<dyn ReservationRepository> = shared.clone();
    let state = HttpState::new(
        HttpStatePorts {
            rooms: shared.clone(),
            reservations,
            restrictions: shared.clone(),
            users: shared,
            mailer: Arc::new(mailer),
            owner_email: OWNER_EMAIL.to_owned(),
        },
        Arc::new(Templates::new().expect("templates compile")),
    );
    Site { state, store, mail }
}

/// Session middleware over a fresh server-side store, without `Secure`.
pub fn session_layer() -> SessionMiddleware<MemorySessionStore> {
    SessionMiddleware::builder(MemorySessionStore::new(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Remembers the latest session cookie, like a browser would.
#[derive(Default)]
pub struct Browser {
    cookie: Option<Cookie<'static>>,
}

impl Browser {
    /// Attach the current session cookie, if any.
    pub fn send(&self, request: TestRequest) -> actix_http::Request {
        match &self.cookie {
            Some(cookie) => request.cookie(cookie.clone()).to_request(),
            None => request.to_request(),
        }
    }

    /// Keep a session cookie set by `response`.
    pub fn remember(&mut self, response: &ServiceResponse) {
        if let Some(cookie) = response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
        {
            self.cookie = Some(cookie.into_owned());
        }
    }
}

/// `Location` header of a redirect.
pub fn location(response: &ServiceResponse) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
        .to_owned()
}

//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, web};

use crate::domain::ports::{Mailer, ReservationRepository};
use crate::domain::{AccessLevel, AuthenticatedUser, Error, UserId};
use crate::inbound::http::render::Templates;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::session_store::MemorySessionStore;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{FailureInjection, InMemoryStore};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<MemorySessionStore> {
    SessionMiddleware::builder(MemorySessionStore::new(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `response`.
pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// `Location` header of a redirect.
pub fn location(response: &ServiceResponse) -> &str {
    response
        .headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
}

/// HTTP state over the reference in-memory fixture.
pub fn fixture_state(mailer: Arc<dyn Mailer>) -> (HttpState, InMemoryStore) {
    let store = InMemoryStore::with_failures(FailureInjection::reference());
    let shared = Arc::new(store.clone());
    let reservations: Arc<dyn ReservationRepository> = shared.clone();
    let ports = HttpStatePorts {
        rooms: shared.clone(),
        reservations,
        restrictions: shared.clone(),
        users: shared,
        mailer,
        owner_email: "owner@example.com".to_owned(),
    };
    let state = HttpState::new(ports, Arc::new(Templates::new().expect("templates load")));
    (state, store)
}

/// Sign the visitor in with the access level in the path.
///
/// Mount at `/test/sign-in/{level}`.
pub async fn sign_in_as(
    session: SessionContext,
    level: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    session.log_in(&AuthenticatedUser {
        id: UserId::new(1),
        access_level: AccessLevel::new(level.into_inner()),
    })?;
    Ok(HttpResponse::Ok().finish())
}

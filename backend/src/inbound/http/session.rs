//! Typed access to the visitor's session.
//!
//! Handlers never touch raw session keys: every value the application keeps
//! between requests has one accessor here, and values are serde-typed.

use std::collections::BTreeMap;

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::{AccessLevel, AuthenticatedUser, BlockMap, DraftReservation, Error, RoomId, UserId};

pub(crate) const DRAFT_RESERVATION_KEY: &str = "draft_reservation";
pub(crate) const FLASH_KEY: &str = "flash";
pub(crate) const WARNING_KEY: &str = "warning";
pub(crate) const ERROR_KEY: &str = "error";
pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ACCESS_LEVEL_KEY: &str = "access_level";
const BLOCK_MAP_PREFIX: &str = "block_map_";

/// One-shot messages shown on the next rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notices {
    /// Success message.
    pub flash: Option<String>,
    /// Warning message.
    pub warning: Option<String>,
    /// Error message.
    pub error: Option<String>,
}

/// Newtype wrapper that exposes typed session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to write session: {error}")))
    }

    /// Read `key`; a value that no longer deserialises is discarded.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.0.get::<T>(key) {
            Ok(value) => value,
            Err(error) => {
                warn!(key, %error, "discarding unreadable session value");
                self.0.remove(key);
                None
            }
        }
    }

    fn take<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.read(key);
        self.0.remove(key);
        value
    }

    /// Queue a success message.
    pub fn flash(&self, message: &str) -> Result<(), Error> {
        self.put(FLASH_KEY, &message)
    }

    /// Queue a warning message.
    pub fn warning(&self, message: &str) -> Result<(), Error> {
        self.put(WARNING_KEY, &message)
    }

    /// Queue an error message.
    pub fn error(&self, message: &str) -> Result<(), Error> {
        self.put(ERROR_KEY, &message)
    }

    /// Remove and return every queued message.
    pub fn take_notices(&self) -> Notices {
        Notices {
            flash: self.take(FLASH_KEY),
            warning: self.take(WARNING_KEY),
            error: self.take(ERROR_KEY),
        }
    }

    /// The in-progress booking, if any.
    pub fn draft(&self) -> Option<DraftReservation> {
        self.read(DRAFT_RESERVATION_KEY)
    }

    /// Replace the in-progress booking.
    pub fn set_draft(&self, draft: &DraftReservation) -> Result<(), Error> {
        self.put(DRAFT_RESERVATION_KEY, draft)
    }

    /// Remove and return the in-progress booking.
    pub fn take_draft(&self) -> Option<DraftReservation> {
        self.take(DRAFT_RESERVATION_KEY)
    }

    /// Record a successful login under a fresh session key.
    pub fn log_in(&self, user: &AuthenticatedUser) -> Result<(), Error> {
        self.0.renew();
        self.put(USER_ID_KEY, &user.id.get())?;
        self.put(ACCESS_LEVEL_KEY, &user.access_level.get())
    }

    /// Destroy the session; the next request starts a new one.
    pub fn log_out(&self) {
        self.0.purge();
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<AuthenticatedUser> {
        let id = self.read::<i32>(USER_ID_KEY)?;
        let level = self.read::<i32>(ACCESS_LEVEL_KEY)?;
        Some(AuthenticatedUser {
            id: UserId::new(id),
            access_level: AccessLevel::new(level),
        })
    }

    /// True when a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// Remember the blocks shown for `room` on the calendar.
    pub fn set_block_map(&self, room: RoomId, blocks: &BlockMap) -> Result<(), Error> {
        self.put(&format!("{BLOCK_MAP_PREFIX}{room}"), blocks)
    }

    /// Every remembered block map, keyed by room.
    pub fn block_maps(&self) -> BTreeMap<RoomId, BlockMap> {
        let rooms: Vec<(String, RoomId)> = self
            .0
            .entries()
            .keys()
            .filter_map(|key| {
                let room = key.strip_prefix(BLOCK_MAP_PREFIX)?.parse().ok()?;
                Some((key.clone(), room))
            })
            .collect();
        rooms
            .into_iter()
            .filter_map(|(key, room)| Some((room, self.read::<BlockMap>(&key)?)))
            .collect()
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RestrictionId, StayDates, parse_date};
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    #[actix_web::test]
    async fn notices_are_shown_once() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        session.flash("Changes saved")?;
                        session.error("No availability")?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/take",
                    web::get().to(|session: SessionContext| async move {
                        HttpResponse::Ok().json(session.take_notices())
                    }),
                ),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&res);

        let first: Notices = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/take")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(first.flash.as_deref(), Some("Changes saved"));
        assert_eq!(first.error.as_deref(), Some("No availability"));

        let second: Notices = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/take").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(second, Notices::default());
    }

    #[actix_web::test]
    async fn draft_and_block_maps_round_trip() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        let stay = StayDates::parse("2050-01-01", "2050-01-02").expect("stay");
                        session.set_draft(&DraftReservation::for_stay(stay))?;
                        let night = parse_date("2050-01-01").expect("date");
                        session.set_block_map(
                            RoomId::new(2),
                            &BlockMap::from([(night, RestrictionId::new(9))]),
                        )?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        let draft = session.take_draft();
                        let maps = session.block_maps();
                        HttpResponse::Ok().body(format!(
                            "{}|{}|{}",
                            draft.is_some(),
                            maps.len(),
                            session.take_draft().is_some()
                        ))
                    }),
                ),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = session_cookie(&res);
        let body = test::call_and_read_body(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(body, "true|1|false");
    }

    #[actix_web::test]
    async fn user_requires_both_id_and_access_level() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/partial",
                    web::get().to(|session: Session| async move {
                        session.insert(USER_ID_KEY, 1).expect("insert");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/who",
                    web::get().to(|session: SessionContext| async move {
                        HttpResponse::Ok().body(session.is_authenticated().to_string())
                    }),
                ),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/partial").to_request()).await;
        let cookie = session_cookie(&res);
        let body = test::call_and_read_body(
            &app,
            test::TestRequest::get().uri("/who").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(body, "false");
    }
}

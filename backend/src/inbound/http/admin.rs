//! Back-office reservation management.
//!
//! ```text
//! GET  /admin/dashboard
//! GET  /admin/reservations-new
//! GET  /admin/reservations-all
//! GET  /admin/reservations/{src}/{id}/show[?y=&m=]
//! POST /admin/reservations/{src}/{id}
//! GET  /admin/process-reservation/{src}/{id}/do[?y=&m=]
//! GET  /admin/delete-reservation/{src}/{id}/do[?y=&m=]
//! ```
//!
//! `src` records which list the administrator came from (`new`, `all` or
//! `cal`) so that every action can send them back there. Failures on these
//! pages are internal errors: the back office never hides a broken row
//! behind a notice.

use std::collections::HashMap;
use std::str::FromStr;

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, get, post, web};
use futures_util::future::LocalBoxFuture;
use minijinja::context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ports::PersistenceError;
use crate::domain::{ContactDetails, Error, Reservation, ReservationId};

use super::error::PageResult;
use super::redirect::{date_text, with_flash};
use super::session::SessionContext;
use super::state::HttpState;

/// Calendar page path.
pub const CALENDAR_PATH: &str = "/admin/reservations-calendar";

const LOG_IN_FIRST: &str = "Log in first!";

/// Session of a signed-in administrator.
///
/// Extracting this type is the access check for the back office. Anyone
/// else gets an error notice and is sent to the login form.
pub struct AdminSession(SessionContext);

impl AdminSession {
    /// The underlying session.
    pub fn session(&self) -> &SessionContext {
        &self.0
    }
}

impl FromRequest for AdminSession {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let session = fut.await.map_err(Error::from)?;
            match session.user() {
                Some(user) if user.access_level.is_administrator() => Ok(Self(session)),
                _ => {
                    session.error(LOG_IN_FIRST)?;
                    Err(Error::unauthorized(LOG_IN_FIRST))
                }
            }
        })
    }
}

/// Reservation list an action was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    New,
    All,
    Calendar,
}

impl ListSource {
    fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::All => "all",
            Self::Calendar => "cal",
        }
    }

    fn list_path(self) -> String {
        match self {
            Self::Calendar => CALENDAR_PATH.to_owned(),
            other => format!("/admin/reservations-{}", other.as_str()),
        }
    }
}

impl FromStr for ListSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "all" => Ok(Self::All),
            "cal" => Ok(Self::Calendar),
            other => Err(Error::not_found(format!("unknown reservation list {other}"))),
        }
    }
}

/// Calendar month to return to after acting on a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarReturn {
    pub year: i32,
    pub month: u32,
}

impl CalendarReturn {
    /// Both values must be present and numeric.
    pub fn parse(year: Option<&str>, month: Option<&str>) -> Option<Self> {
        Some(Self {
            year: year?.trim().parse().ok()?,
            month: month?.trim().parse().ok()?,
        })
    }

    fn query(self) -> String {
        format!("?y={}&m={}", self.year, self.month)
    }
}

/// Optional `?y=&m=` carried by links from the calendar.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub y: Option<String>,
    pub m: Option<String>,
}

impl CalendarQuery {
    pub(crate) fn calendar_return(&self) -> Option<CalendarReturn> {
        CalendarReturn::parse(self.y.as_deref(), self.m.as_deref())
    }
}

pub(crate) fn return_path(src: ListSource, back: Option<CalendarReturn>) -> String {
    match back {
        Some(month) => format!("{CALENDAR_PATH}{}", month.query()),
        None => src.list_path(),
    }
}

fn parse_target(src: &str, id: &str) -> Result<(ListSource, ReservationId), Error> {
    let src = src.parse()?;
    let id = id
        .parse()
        .map_err(|_| Error::internal(format!("invalid reservation id {id}")))?;
    Ok((src, id))
}

fn admin_failure(err: PersistenceError) -> Error {
    Error::internal(err.to_string())
}

#[get("/admin/dashboard")]
pub async fn dashboard(state: web::Data<HttpState>, admin: AdminSession) -> PageResult<HttpResponse> {
    state
        .templates
        .page(admin.session(), "admin-dashboard.html", context! {})
}

#[derive(Debug, Serialize)]
struct ReservationRow {
    id: ReservationId,
    last_name: String,
    room_name: String,
    start_date: String,
    end_date: String,
}

impl From<Reservation> for ReservationRow {
    fn from(value: Reservation) -> Self {
        Self {
            id: value.id,
            last_name: value.contact.last_name,
            room_name: value.room.name,
            start_date: date_text(value.stay.start()),
            end_date: date_text(value.stay.end()),
        }
    }
}

fn list_page(
    state: &HttpState,
    admin: &AdminSession,
    src: ListSource,
    heading: &str,
    reservations: Vec<Reservation>,
) -> PageResult<HttpResponse> {
    let rows: Vec<ReservationRow> = reservations.into_iter().map(ReservationRow::from).collect();
    state.templates.page(
        admin.session(),
        "admin-reservations.html",
        context! { heading => heading, src => src.as_str(), reservations => rows },
    )
}

/// Reservations not yet processed.
#[get("/admin/reservations-new")]
pub async fn new_reservations(
    state: web::Data<HttpState>,
    admin: AdminSession,
) -> PageResult<HttpResponse> {
    let reservations = state
        .reservations
        .new_reservations()
        .await
        .map_err(admin_failure)?;
    list_page(&state, &admin, ListSource::New, "New Reservations", reservations)
}

/// Every reservation.
#[get("/admin/reservations-all")]
pub async fn all_reservations(
    state: web::Data<HttpState>,
    admin: AdminSession,
) -> PageResult<HttpResponse> {
    let reservations = state
        .reservations
        .all_reservations()
        .await
        .map_err(admin_failure)?;
    list_page(&state, &admin, ListSource::All, "All Reservations", reservations)
}

/// Edit form for one reservation.
#[get("/admin/reservations/{src}/{id}/show")]
pub async fn show_reservation(
    state: web::Data<HttpState>,
    admin: AdminSession,
    path: web::Path<(String, String)>,
    query: web::Query<CalendarQuery>,
) -> PageResult<HttpResponse> {
    let (src, id) = parse_target(&path.0, &path.1)?;
    let reservation = state
        .reservations
        .find_reservation(id)
        .await
        .map_err(admin_failure)?;
    let back = query.calendar_return();

    state.templates.page(
        admin.session(),
        "admin-reservations-show.html",
        context! {
            src => src.as_str(),
            start_date => date_text(reservation.stay.start()),
            end_date => date_text(reservation.stay.end()),
            year => back.map(|b| b.year),
            month => back.map(|b| b.month),
            back => return_path(src, back),
            calendar_query => back.map(CalendarReturn::query).unwrap_or_default(),
            reservation => reservation,
        },
    )
}

/// Overwrite the guest contact fields.
#[post("/admin/reservations/{src}/{id}")]
pub async fn update_reservation(
    state: web::Data<HttpState>,
    admin: AdminSession,
    path: web::Path<(String, String)>,
    fields: web::Form<HashMap<String, String>>,
) -> PageResult<HttpResponse> {
    let (src, id) = parse_target(&path.0, &path.1)?;
    let field = |name: &str| fields.get(name).map_or("", String::as_str).trim().to_owned();
    let contact = ContactDetails {
        first_name: field("first_name"),
        last_name: field("last_name"),
        email: field("email"),
        phone: field("phone"),
    };
    state
        .reservations
        .update_contact(id, &contact)
        .await
        .map_err(admin_failure)?;
    info!(reservation_id = %id, "reservation updated");

    let back = CalendarReturn::parse(
        fields.get("year").map(String::as_str),
        fields.get("month").map(String::as_str),
    );
    with_flash(admin.session(), "Changes saved", &return_path(src, back))
}

/// Mark a reservation as handled.
#[get("/admin/process-reservation/{src}/{id}/do")]
pub async fn process_reservation(
    state: web::Data<HttpState>,
    admin: AdminSession,
    path: web::Path<(String, String)>,
    query: web::Query<CalendarQuery>,
) -> PageResult<HttpResponse> {
    let (src, id) = parse_target(&path.0, &path.1)?;
    state
        .reservations
        .set_processed(id, true)
        .await
        .map_err(admin_failure)?;
    info!(reservation_id = %id, "reservation processed");
    with_flash(
        admin.session(),
        "Reservation marked as processed",
        &return_path(src, query.calendar_return()),
    )
}

/// Delete a reservation together with its restriction.
#[get("/admin/delete-reservation/{src}/{id}/do")]
pub async fn delete_reservation(
    state: web::Data<HttpState>,
    admin: AdminSession,
    path: web::Path<(String, String)>,
    query: web::Query<CalendarQuery>,
) -> PageResult<HttpResponse> {
    let (src, id) = parse_target(&path.0, &path.1)?;
    state
        .reservations
        .delete_reservation(id)
        .await
        .map_err(admin_failure)?;
    info!(reservation_id = %id, "reservation deleted");
    with_flash(
        admin.session(),
        "Reservation deleted",
        &return_path(src, query.calendar_return()),
    )
}

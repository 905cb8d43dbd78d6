//! Availability search handlers.
//!
//! ```text
//! POST /search-availability       start=2050-01-01&end=2050-01-02
//! POST /search-availability-json  start=2050-01-01&end=2050-01-02&room_id=1
//! ```

use actix_web::{HttpResponse, post, web};
use minijinja::context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{DraftReservation, RoomId, StayDates};

use super::error::PageResult;
use super::redirect::{date_text, with_error};
use super::session::SessionContext;
use super::state::HttpState;

/// Where failed searches return to.
pub const SEARCH_PATH: &str = "/search-availability";

/// Search form fields. Missing fields are treated as blank.
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

/// Search every room and offer the free ones.
#[post("/search-availability")]
pub async fn search(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<SearchForm>,
) -> PageResult<HttpResponse> {
    let stay = match StayDates::parse(&form.start, &form.end) {
        Ok(stay) => stay,
        Err(err) => return with_error(&session, &err.to_string(), SEARCH_PATH),
    };

    let rooms = match state.bookings.search(&stay).await {
        Ok(rooms) => rooms,
        Err(err) => {
            warn!(error = %err, "availability search failed");
            return with_error(&session, "Unable to search availability", SEARCH_PATH);
        }
    };
    if rooms.is_empty() {
        return with_error(&session, "No availability", SEARCH_PATH);
    }

    info!(rooms = rooms.len(), "availability found");
    session.set_draft(&DraftReservation::for_stay(stay))?;
    state.templates.page(
        &session,
        "choose-room.html",
        context! {
            rooms => rooms,
            start_date => date_text(stay.start()),
            end_date => date_text(stay.end()),
        },
    )
}

/// Single-room availability request from a room page.
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub room_id: String,
}

/// Body of every `/search-availability-json` response.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub ok: bool,
    pub message: String,
    pub room_id: String,
    pub start_date: String,
    pub end_date: String,
}

impl AvailabilityResponse {
    fn refused(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Check one room for a stay.
///
/// Always answers `200 OK`; problems are reported through `ok` and
/// `message` so the page script has a single response shape to handle.
#[post("/search-availability-json")]
pub async fn availability_json(
    state: web::Data<HttpState>,
    form: Option<web::Form<AvailabilityQuery>>,
) -> HttpResponse {
    let Some(form) = form else {
        return HttpResponse::Ok().json(AvailabilityResponse::refused("Unable to parse form"));
    };
    HttpResponse::Ok().json(check_room(&state, &form).await)
}

async fn check_room(state: &HttpState, form: &AvailabilityQuery) -> AvailabilityResponse {
    let stay = match StayDates::parse(&form.start, &form.end) {
        Ok(stay) => stay,
        Err(err) => return AvailabilityResponse::refused(err.to_string()),
    };
    let Ok(room_id) = form.room_id.parse::<RoomId>() else {
        return AvailabilityResponse::refused("Unable to parse room id");
    };

    match state.bookings.is_available(room_id, &stay).await {
        Ok(available) => AvailabilityResponse {
            ok: available,
            message: String::new(),
            room_id: room_id.to_string(),
            start_date: date_text(stay.start()),
            end_date: date_text(stay.end()),
        },
        Err(err) => {
            warn!(error = %err, %room_id, "room availability check failed");
            AvailabilityResponse::refused("Error querying database")
        }
    }
}

//! Guest booking flow after a successful search.
//!
//! ```text
//! GET  /choose-room/{id}
//! GET  /book-room?id=1&s=2050-01-01&e=2050-01-02
//! GET  /make-reservation
//! POST /make-reservation
//! GET  /reservation-summary
//! ```
//!
//! The draft reservation travels in the session between these steps. The
//! final POST re-reads the dates and room from the form itself, so a stale
//! draft cannot change what gets booked.

use std::collections::HashMap;

use actix_web::{HttpResponse, get, post, web};
use minijinja::context;
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{
    ContactDetails, DraftReservation, NewReservation, RoomId, StayDates, StayDatesError,
};

use super::error::PageResult;
use super::forms::{Form, FormErrors};
use super::redirect::{HOME_PATH, date_text, see_other, with_error};
use super::session::SessionContext;
use super::state::HttpState;

/// Contact form page.
pub const MAKE_RESERVATION_PATH: &str = "/make-reservation";
/// Confirmation page.
pub const SUMMARY_PATH: &str = "/reservation-summary";

const NO_DRAFT: &str = "Can't get reservation from session";

/// Attach the chosen room to the draft from the last search.
#[get("/choose-room/{id}")]
pub async fn choose_room(
    session: SessionContext,
    path: web::Path<String>,
) -> PageResult<HttpResponse> {
    let Ok(room_id) = path.parse::<RoomId>() else {
        return with_error(&session, "Unable to parse room id", HOME_PATH);
    };
    let Some(draft) = session.draft() else {
        return with_error(&session, NO_DRAFT, HOME_PATH);
    };

    session.set_draft(&draft.choose_room(room_id))?;
    Ok(see_other(MAKE_RESERVATION_PATH))
}

/// Query string of the "Book now" link on room pages.
#[derive(Debug, Default, Deserialize)]
pub struct BookRoomQuery {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub s: String,
    #[serde(default)]
    pub e: String,
}

/// Start a fresh draft from a direct booking link.
#[get("/book-room")]
pub async fn book_room(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<BookRoomQuery>,
) -> PageResult<HttpResponse> {
    let Ok(room_id) = query.id.parse::<RoomId>() else {
        return with_error(&session, "Unable to parse room id", HOME_PATH);
    };
    let stay = match StayDates::parse(&query.s, &query.e) {
        Ok(stay) => stay,
        Err(err) => return with_error(&session, &err.to_string(), HOME_PATH),
    };
    let room = match state.bookings.room(room_id).await {
        Ok(room) => room,
        Err(err) => {
            warn!(error = %err, %room_id, "direct booking for unknown room");
            return with_error(&session, "Can't find room", HOME_PATH);
        }
    };

    session.set_draft(&DraftReservation::for_stay(stay).with_room(room))?;
    Ok(see_other(MAKE_RESERVATION_PATH))
}

fn reservation_page(
    state: &HttpState,
    session: &SessionContext,
    draft: &DraftReservation,
    errors: &FormErrors,
) -> PageResult<HttpResponse> {
    state.templates.page(
        session,
        "make-reservation.html",
        context! {
            room_id => draft.room_id,
            room_name => draft.room_name.as_deref(),
            start_date => date_text(draft.stay.start()),
            end_date => date_text(draft.stay.end()),
            contact => &draft.contact,
            errors => errors,
        },
    )
}

/// Empty contact form for the drafted stay.
#[get("/make-reservation")]
pub async fn reservation_form(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> PageResult<HttpResponse> {
    let Some(draft) = session.draft() else {
        return with_error(&session, NO_DRAFT, HOME_PATH);
    };
    let Some(room_id) = draft.room_id else {
        return with_error(&session, "Can't find room", HOME_PATH);
    };
    let room = match state.bookings.room(room_id).await {
        Ok(room) => room,
        Err(err) => {
            warn!(error = %err, %room_id, "drafted room could not be loaded");
            return with_error(&session, "Can't find room", HOME_PATH);
        }
    };

    let draft = draft.with_room(room);
    session.set_draft(&draft)?;
    reservation_page(&state, &session, &draft, &FormErrors::default())
}

fn parse_stay(form: &Form) -> Result<StayDates, StayDatesError> {
    StayDates::parse(form.get("start_date"), form.get("end_date"))
}

/// Validate contact details, then book.
#[post("/make-reservation")]
pub async fn make_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    fields: web::Form<HashMap<String, String>>,
) -> PageResult<HttpResponse> {
    let mut form = Form::new(fields.into_inner());
    let stay = match parse_stay(&form) {
        Ok(stay) => stay,
        Err(err) => return with_error(&session, &err.to_string(), HOME_PATH),
    };
    let Ok(room_id) = form.get("room_id").parse::<RoomId>() else {
        return with_error(&session, "Unable to parse room id", HOME_PATH);
    };
    let contact = ContactDetails {
        first_name: form.get("first_name").trim().to_owned(),
        last_name: form.get("last_name").trim().to_owned(),
        email: form.get("email").trim().to_owned(),
        phone: form.get("phone").trim().to_owned(),
    };

    form.required(&["first_name", "last_name", "email"])
        .min_length("first_name", 3)
        .is_email("email");
    if !form.valid() {
        let candidate = DraftReservation {
            contact,
            ..DraftReservation::for_stay(stay).choose_room(room_id)
        };
        let candidate = match state.bookings.room(room_id).await {
            Ok(room) => candidate.with_room(room),
            Err(_) => candidate,
        };
        return reservation_page(&state, &session, &candidate, form.errors());
    }

    let confirmed = match state
        .bookings
        .confirm(NewReservation {
            contact,
            stay,
            room_id,
        })
        .await
    {
        Ok(confirmed) => confirmed,
        Err(err) => {
            warn!(error = %err, %room_id, "reservation could not be stored");
            return with_error(&session, "Can't insert reservation into database", HOME_PATH);
        }
    };

    info!(reservation_id = %confirmed.id, "booking complete");
    session.set_draft(&DraftReservation::from(confirmed))?;
    Ok(see_other(SUMMARY_PATH))
}

/// Show the confirmed booking once.
#[get("/reservation-summary")]
pub async fn summary(state: web::Data<HttpState>, session: SessionContext) -> PageResult<HttpResponse> {
    let Some(reservation) = session.take_draft() else {
        return with_error(&session, NO_DRAFT, HOME_PATH);
    };

    state.templates.page(
        &session,
        "reservation-summary.html",
        context! {
            room_name => reservation.room_name.as_deref(),
            start_date => date_text(reservation.stay.start()),
            end_date => date_text(reservation.stay.end()),
            reservation => reservation,
        },
    )
}

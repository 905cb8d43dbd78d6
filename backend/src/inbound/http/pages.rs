//! Static pages and the search form.
//!
//! ```text
//! GET /
//! GET /about
//! GET /contact
//! GET /generals-quarters
//! GET /majors-suite
//! GET /search-availability
//! ```

use actix_web::{HttpResponse, get, web};
use minijinja::context;

use super::error::PageResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Room shown on the General's Quarters page.
const GENERALS_ROOM_ID: i32 = 1;
/// Room shown on the Major's Suite page.
const MAJORS_ROOM_ID: i32 = 2;

#[get("/")]
pub async fn home(state: web::Data<HttpState>, session: SessionContext) -> PageResult<HttpResponse> {
    state.templates.page(&session, "home.html", context! {})
}

#[get("/about")]
pub async fn about(state: web::Data<HttpState>, session: SessionContext) -> PageResult<HttpResponse> {
    state.templates.page(&session, "about.html", context! {})
}

/// Contact page; shows the property owner's address.
#[get("/contact")]
pub async fn contact(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> PageResult<HttpResponse> {
    state.templates.page(
        &session,
        "contact.html",
        context! { owner_email => state.owner_email.as_str() },
    )
}

#[get("/generals-quarters")]
pub async fn generals(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> PageResult<HttpResponse> {
    state
        .templates
        .page(&session, "generals.html", context! { room_id => GENERALS_ROOM_ID })
}

#[get("/majors-suite")]
pub async fn majors(state: web::Data<HttpState>, session: SessionContext) -> PageResult<HttpResponse> {
    state
        .templates
        .page(&session, "majors.html", context! { room_id => MAJORS_ROOM_ID })
}

/// Empty search form.
#[get("/search-availability")]
pub async fn search_form(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> PageResult<HttpResponse> {
    state
        .templates
        .page(&session, "search-availability.html", context! {})
}

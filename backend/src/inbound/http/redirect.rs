//! Redirect helpers shared by the page handlers.
//!
//! Every redirect is a `303 See Other`, so the browser follows with a GET
//! whatever the original method was.

use actix_web::HttpResponse;
use actix_web::http::header::LOCATION;
use chrono::NaiveDate;

use crate::domain::DATE_FORMAT;

use super::error::PageResult;
use super::session::SessionContext;

/// Home page.
pub const HOME_PATH: &str = "/";

/// `303 See Other` to `path`.
pub fn see_other(path: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, path))
        .finish()
}

/// Queue `message` as an error notice and redirect to `path`.
pub fn with_error(session: &SessionContext, message: &str, path: &str) -> PageResult<HttpResponse> {
    session.error(message)?;
    Ok(see_other(path))
}

/// Queue `message` as a success notice and redirect to `path`.
pub fn with_flash(session: &SessionContext, message: &str, path: &str) -> PageResult<HttpResponse> {
    session.flash(message)?;
    Ok(see_other(path))
}

/// Dates as they appear in forms and links.
pub(crate) fn date_text(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

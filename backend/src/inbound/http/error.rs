//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while letting Actix
//! handlers turn domain failures into consistent HTML error pages and status
//! codes. `Unauthorized` is not an error page: the visitor is sent to the
//! login form instead.

use actix_web::http::header::{ContentType, LOCATION};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use minijinja::HtmlEscape;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type PageResult<T> = Result<T, Error>;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/user/login";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::SEE_OTHER,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn public_message(error: &Error) -> &str {
    if matches!(error.code(), ErrorCode::InternalError) {
        "Internal server error"
    } else {
        error.message()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if matches!(self.code(), ErrorCode::Unauthorized) {
            return builder.insert_header((LOCATION, LOGIN_PATH)).finish();
        }
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(trace_id = ?self.trace_id(), message = self.message(), "request failed");
        }

        let reason = status.canonical_reason().unwrap_or("Error");
        let trace = self
            .trace_id()
            .map(|id| format!("<p><small>Reference: {}</small></p>", HtmlEscape(id)))
            .unwrap_or_default();
        builder.content_type(ContentType::html()).body(format!(
            "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
             <title>{code} {reason}</title></head><body><h1>{reason}</h1>\
             <p>{message}</p>{trace}<p><a href=\"/\">Home</a></p></body></html>",
            code = status.as_u16(),
            message = HtmlEscape(public_message(self)),
        ))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

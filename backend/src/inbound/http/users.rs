//! Login and logout.
//!
//! ```text
//! GET  /user/login
//! POST /user/login   email=admin@example.com&password=secret
//! GET  /user/logout
//! ```

use std::collections::HashMap;

use actix_web::{HttpResponse, get, post, web};
use minijinja::context;
use tracing::{info, warn};

use crate::domain::{Error, ErrorCode, INVALID_CREDENTIALS, LoginCredentials};

use super::error::{LOGIN_PATH, PageResult};
use super::forms::{Form, FormErrors};
use super::redirect::{HOME_PATH, see_other, with_error, with_flash};
use super::session::SessionContext;
use super::state::HttpState;

#[get("/user/login")]
pub async fn login_form(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> PageResult<HttpResponse> {
    state.templates.page(
        &session,
        "login.html",
        context! { email => "", errors => FormErrors::default() },
    )
}

/// Authenticate and start a signed-in session.
///
/// Unknown emails and wrong passwords produce the same notice.
#[post("/user/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    fields: web::Form<HashMap<String, String>>,
) -> PageResult<HttpResponse> {
    let mut form = Form::new(fields.into_inner());
    form.required(&["email", "password"]).is_email("email");
    if !form.valid() {
        return state.templates.page(
            &session,
            "login.html",
            context! { email => form.get("email"), errors => form.errors() },
        );
    }

    let credentials = LoginCredentials::try_from_parts(form.get("email"), form.get("password"))
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    match state.login.authenticate(&credentials).await {
        Ok(user) => {
            session.log_in(&user)?;
            info!(user_id = %user.id, "user logged in");
            with_flash(&session, "Logged in successfully", HOME_PATH)
        }
        Err(err) if err.code() == ErrorCode::Unauthorized => {
            warn!(email = credentials.email(), "login rejected");
            with_error(&session, INVALID_CREDENTIALS, LOGIN_PATH)
        }
        Err(err) => Err(err),
    }
}

/// Forget the visitor entirely.
#[get("/user/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.log_out();
    see_other(LOGIN_PATH)
}

#[cfg(test)]
mod tests;

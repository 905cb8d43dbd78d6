//! Page rendering.
//!
//! Templates are compiled into the binary and loaded once at start-up.
//! Every page receives the visitor's pending notices and the
//! authentication flag in addition to its own data.

use actix_web::HttpResponse;
use actix_web::http::header::ContentType;
use minijinja::{Environment, Value, context};
use tracing::error;

use crate::domain::Error;

use super::session::SessionContext;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../../templates/base.html")),
    ("home.html", include_str!("../../../templates/home.html")),
    ("about.html", include_str!("../../../templates/about.html")),
    ("contact.html", include_str!("../../../templates/contact.html")),
    ("generals.html", include_str!("../../../templates/generals.html")),
    ("majors.html", include_str!("../../../templates/majors.html")),
    (
        "room-availability.html",
        include_str!("../../../templates/room-availability.html"),
    ),
    (
        "search-availability.html",
        include_str!("../../../templates/search-availability.html"),
    ),
    ("choose-room.html", include_str!("../../../templates/choose-room.html")),
    (
        "make-reservation.html",
        include_str!("../../../templates/make-reservation.html"),
    ),
    (
        "reservation-summary.html",
        include_str!("../../../templates/reservation-summary.html"),
    ),
    ("login.html", include_str!("../../../templates/login.html")),
    ("admin-base.html", include_str!("../../../templates/admin-base.html")),
    (
        "admin-dashboard.html",
        include_str!("../../../templates/admin-dashboard.html"),
    ),
    (
        "admin-reservations.html",
        include_str!("../../../templates/admin-reservations.html"),
    ),
    (
        "admin-reservations-show.html",
        include_str!("../../../templates/admin-reservations-show.html"),
    ),
    (
        "admin-reservations-calendar.html",
        include_str!("../../../templates/admin-reservations-calendar.html"),
    ),
];

/// Compiled page templates.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Compile every bundled template.
    ///
    /// # Errors
    /// Returns the first template syntax error.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Render `name` with `data`.
    pub fn render(&self, name: &str, data: Value) -> Result<String, Error> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(data))
            .map_err(|err| {
                error!(template = name, error = %err, "template rendering failed");
                Error::internal(format!("failed to render {name}"))
            })
    }

    /// Render a full page for the visitor owning `session`.
    ///
    /// Pending notices are consumed: they appear on this page only.
    pub fn page(
        &self,
        session: &SessionContext,
        name: &str,
        data: Value,
    ) -> Result<HttpResponse, Error> {
        let notices = session.take_notices();
        let body = self.render(
            name,
            context! {
                flash => notices.flash,
                warning => notices.warning,
                error => notices.error,
                is_authenticated => session.is_authenticated(),
                ..data
            },
        )?;
        Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("home.html")]
    #[case("search-availability.html")]
    #[case("login.html")]
    #[case("admin-dashboard.html")]
    fn bundled_templates_render_with_defaults(#[case] name: &str) {
        let templates = Templates::new().expect("templates compile");
        let html = templates
            .render(name, context! { flash => "Changes saved" })
            .expect("renders");
        assert!(html.contains("Changes saved"));
    }

    #[rstest]
    fn values_are_html_escaped() {
        let templates = Templates::new().expect("templates compile");
        let html = templates
            .render("home.html", context! { error => "<script>" })
            .expect("renders");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[rstest]
    fn unknown_templates_are_internal_errors() {
        let templates = Templates::new().expect("templates compile");
        let err = templates.render("missing.html", context! {}).expect_err("fails");
        assert_eq!(err.code(), crate::domain::ErrorCode::InternalError);
    }
}

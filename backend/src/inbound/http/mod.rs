//! HTTP inbound adapter serving the public site and the back office.
//!
//! Handlers render server-side pages or redirect with `303 See Other`; the
//! single JSON endpoint backs the room pages' availability check. Shared
//! state arrives through [`state::HttpState`], per-visitor state through
//! [`session::SessionContext`].

pub mod admin;
pub mod admin_calendar;
pub mod availability;
pub mod error;
pub mod forms;
pub mod pages;
pub mod redirect;
pub mod render;
pub mod reservations;
pub mod session;
pub mod session_config;
pub mod session_store;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::PageResult;

/// Register every route on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use bookings::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(pages::home)
        .service(pages::about)
        .service(pages::contact)
        .service(pages::generals)
        .service(pages::majors)
        .service(pages::search_form)
        .service(availability::search)
        .service(availability::availability_json)
        .service(reservations::choose_room)
        .service(reservations::book_room)
        .service(reservations::reservation_form)
        .service(reservations::make_reservation)
        .service(reservations::summary)
        .service(users::login_form)
        .service(users::login)
        .service(users::logout)
        .service(admin::dashboard)
        .service(admin::new_reservations)
        .service(admin::all_reservations)
        .service(admin::show_reservation)
        .service(admin::update_reservation)
        .service(admin::process_reservation)
        .service(admin::delete_reservation)
        .service(admin_calendar::calendar)
        .service(admin_calendar::save_calendar);
}

//! Owner-block calendar.
//!
//! ```text
//! GET  /admin/reservations-calendar?y=2050&m=1
//! POST /admin/reservations-calendar
//! ```
//!
//! The GET remembers which nights were shown as blocked for each room; the
//! POST compares the submitted checkboxes against that memory and writes
//! only the difference.

use std::collections::HashMap;

use actix_web::{HttpResponse, get, post, web};
use chrono::{Datelike, Utc};
use minijinja::context;
use serde::Serialize;
use tracing::info;

use crate::domain::calendar::block_field_name;
use crate::domain::{CalendarMonth, Error, ErrorCode, PostedBlocks, ReservationId, RoomMonth};

use super::admin::{AdminSession, CalendarQuery, CalendarReturn, ListSource, return_path};
use super::error::PageResult;
use super::redirect::with_flash;
use super::state::HttpState;

#[derive(Debug, Serialize)]
struct MonthLink {
    year: i32,
    month: u32,
}

impl From<CalendarMonth> for MonthLink {
    fn from(value: CalendarMonth) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DayCell {
    day: u32,
    reservation_id: Option<ReservationId>,
    blocked: bool,
    field: String,
}

#[derive(Debug, Serialize)]
struct RoomRow {
    name: String,
    cells: Vec<DayCell>,
}

fn room_row(row: &RoomMonth, month: CalendarMonth) -> RoomRow {
    let cells = month
        .days()
        .into_iter()
        .map(|night| {
            let blocked = row.blocks.contains_key(&night);
            DayCell {
                day: night.day(),
                reservation_id: row.reserved.get(&night).copied(),
                blocked,
                field: block_field_name(row.room.id, night, blocked),
            }
        })
        .collect();
    RoomRow {
        name: row.room.name.clone(),
        cells,
    }
}

/// Back-office failures surface as internal errors whatever their cause.
fn as_internal(err: Error) -> Error {
    if err.code() == ErrorCode::InternalError {
        err
    } else {
        Error::internal(err.message())
    }
}

/// One month of reservations and blocks for every room.
#[get("/admin/reservations-calendar")]
pub async fn calendar(
    state: web::Data<HttpState>,
    admin: AdminSession,
    query: web::Query<CalendarQuery>,
) -> PageResult<HttpResponse> {
    let today = Utc::now().date_naive();
    let month = CalendarMonth::from_query(query.y.as_deref(), query.m.as_deref(), today);
    let rows = state.calendar.month_view(month).await.map_err(as_internal)?;

    let session = admin.session();
    for row in &rows {
        session.set_block_map(row.room.id, &row.blocks)?;
    }
    let rooms: Vec<RoomRow> = rows.iter().map(|row| room_row(row, month)).collect();

    state.templates.page(
        session,
        "admin-reservations-calendar.html",
        context! {
            year => month.year(),
            month => month.month(),
            month_name => month.first_day().format("%B").to_string(),
            previous => MonthLink::from(month.previous()),
            next => MonthLink::from(month.next()),
            rooms => rooms,
        },
    )
}

/// Apply the submitted checkboxes.
#[post("/admin/reservations-calendar")]
pub async fn save_calendar(
    state: web::Data<HttpState>,
    admin: AdminSession,
    fields: web::Form<HashMap<String, String>>,
) -> PageResult<HttpResponse> {
    let posted = PostedBlocks::from_fields(fields.keys().map(String::as_str))?;
    let session = admin.session();
    let outcome = state
        .calendar
        .apply_blocks(session.block_maps(), &posted)
        .await
        .map_err(as_internal)?;
    for (room, blocks) in &outcome.blocks {
        session.set_block_map(*room, blocks)?;
    }
    if outcome.already_removed > 0 {
        session.warning(&format!(
            "{} block(s) had already been removed by someone else",
            outcome.already_removed
        ))?;
    }
    info!(rooms = outcome.blocks.len(), "calendar saved");

    let back = CalendarReturn::parse(
        fields.get("y").map(String::as_str),
        fields.get("m").map(String::as_str),
    );
    with_flash(session, "Changes saved", &return_path(ListSource::Calendar, back))
}

#[cfg(test)]
mod tests;

//! Handler tests for the owner-block calendar.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockMailer, ReservationRepository, RestrictionRepository};
use crate::domain::{ContactDetails, NewReservation, RoomId, StayDates, parse_date};
use crate::inbound::http::admin::CALENDAR_PATH;
use crate::inbound::http::error::LOGIN_PATH;
use crate::inbound::http::test_utils::{
    fixture_state, location, session_cookie, sign_in_as, test_session_middleware,
};

const JANUARY: &str = "/admin/reservations-calendar?y=2050&m=1";

macro_rules! calendar_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new($state))
                .route("/test/sign-in/{level}", web::get().to(sign_in_as))
                .service(calendar)
                .service(save_calendar),
        )
        .await
    };
}

macro_rules! signed_in {
    ($app:expr) => {{
        let res = test::call_service(
            &$app,
            test::TestRequest::get().uri("/test/sign-in/3").to_request(),
        )
        .await;
        session_cookie(&res)
    }};
}

async fn render(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &Cookie<'static>,
) -> String {
    let res = test::call_service(
        app,
        test::TestRequest::get()
            .uri(JANUARY)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    String::from_utf8_lossy(&test::read_body(res).await).into_owned()
}

fn save(cookie: &Cookie<'static>, fields: &[&str]) -> actix_http::Request {
    let mut form: Vec<(&str, &str)> = vec![("y", "2050"), ("m", "1")];
    form.extend(fields.iter().map(|field| (*field, "on")));
    test::TestRequest::post()
        .uri(CALENDAR_PATH)
        .cookie(cookie.clone())
        .set_form(form)
        .to_request()
}

#[actix_web::test]
async fn anonymous_visitors_are_sent_to_login() {
    let (state, _store) = fixture_state(Arc::new(MockMailer::new()));
    let app = calendar_app!(state);
    let res = test::call_service(&app, test::TestRequest::get().uri(JANUARY).to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), LOGIN_PATH);
}

#[actix_web::test]
async fn month_view_shows_rooms_reservations_and_blocks() {
    let (state, store) = fixture_state(Arc::new(MockMailer::new()));
    let id = store
        .insert_reservation(&NewReservation {
            contact: ContactDetails::default(),
            stay: StayDates::parse("2050-01-10", "2050-01-12").expect("stay"),
            room_id: RoomId::new(1),
        })
        .await
        .expect("reservation");
    store
        .insert_block(RoomId::new(2), parse_date("2050-01-20").expect("date"))
        .await
        .expect("block");
    let app = calendar_app!(state);
    let cookie = signed_in!(app);

    let html = render(&app, &cookie).await;
    assert!(html.contains("January 2050"));
    assert!(html.contains("Quarters") && html.contains("Suite"));
    assert!(html.contains(&format!("/admin/reservations/cal/{id}/show?y=2050")));
    assert!(html.contains("name=\"remove_block_2_2050-01-20\" checked"));
    assert!(html.contains("name=\"add_block_1_2050-01-01\""));
    assert!(html.contains("y=2049&m=12") || html.contains("y=2049&amp;m=12"));
}

#[actix_web::test]
async fn saving_twice_changes_nothing_the_second_time() {
    let (state, store) = fixture_state(Arc::new(MockMailer::new()));
    let app = calendar_app!(state);
    let cookie = signed_in!(app);
    render(&app, &cookie).await;

    let res = test::call_service(&app, save(&cookie, &["add_block_1_2050-01-05"])).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), JANUARY);
    assert_eq!(store.restriction_count(), 1);

    let res = test::call_service(&app, save(&cookie, &["add_block_1_2050-01-05"])).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(store.restriction_count(), 1);
}

#[actix_web::test]
async fn clearing_a_checkbox_unblocks_the_night() {
    let (state, store) = fixture_state(Arc::new(MockMailer::new()));
    store
        .insert_block(RoomId::new(1), parse_date("2050-01-07").expect("date"))
        .await
        .expect("block");
    store
        .insert_block(RoomId::new(2), parse_date("2050-01-08").expect("date"))
        .await
        .expect("block");
    let app = calendar_app!(state);
    let cookie = signed_in!(app);
    render(&app, &cookie).await;

    let res = test::call_service(&app, save(&cookie, &["remove_block_2_2050-01-08"])).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(store.restriction_count(), 1);

    let html = render(&app, &cookie).await;
    assert!(html.contains("name=\"add_block_1_2050-01-07\""));
    assert!(html.contains("name=\"remove_block_2_2050-01-08\" checked"));
}

#[actix_web::test]
async fn blocks_removed_elsewhere_raise_a_warning() {
    let (state, store) = fixture_state(Arc::new(MockMailer::new()));
    let block = store
        .insert_block(RoomId::new(1), parse_date("2050-01-07").expect("date"))
        .await
        .expect("block");
    let app = calendar_app!(state);
    let cookie = signed_in!(app);
    render(&app, &cookie).await;
    store.delete_block(block).await.expect("removed elsewhere");

    let res = test::call_service(&app, save(&cookie, &[])).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let html = render(&app, &cookie).await;
    assert!(html.contains("1 block(s) had already been removed by someone else"));
}

#[rstest]
#[case("add_block_9_2050-01-05")]
#[case("add_block_1_someday")]
#[actix_web::test]
async fn bad_fields_are_internal_errors(#[case] field: &str) {
    let (state, store) = fixture_state(Arc::new(MockMailer::new()));
    let app = calendar_app!(state);
    let cookie = signed_in!(app);
    render(&app, &cookie).await;

    let res = test::call_service(&app, save(&cookie, &[field])).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.restriction_count(), 0);
}

//! End-to-end flows through the fully configured site: booking as a guest,
//! the availability endpoint and the administrator back office.

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use rstest::rstest;
use serde_json::Value;

mod support;

use support::{ADMIN_EMAIL, ADMIN_PASSWORD, Browser, OWNER_EMAIL, booking_site, location, site};

fn guest_details(room_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("start_date", "2050-01-01".to_owned()),
        ("end_date", "2050-01-02".to_owned()),
        ("room_id", room_id.to_owned()),
        ("first_name", "John".to_owned()),
        ("last_name", "Smith".to_owned()),
        ("email", "a@b.com".to_owned()),
        ("phone", "123".to_owned()),
    ]
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[actix_web::test]
async fn guest_books_a_room_and_both_parties_are_mailed() {
    let mut site = site().await;
    let store = site.store.clone();
    let app = booking_site!(site.state.clone());
    let mut browser = Browser::default();

    let res = test::call_service(
        &app,
        browser.send(
            TestRequest::post()
                .uri("/search-availability")
                .set_form([("start", "2050-01-01"), ("end", "2050-01-02")]),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    browser.remember(&res);
    let html = text(&test::read_body(res).await);
    assert!(html.contains("/choose-room/1"));

    let res = test::call_service(&app, browser.send(TestRequest::get().uri("/choose-room/1"))).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/make-reservation");
    browser.remember(&res);

    let res =
        test::call_service(&app, browser.send(TestRequest::get().uri("/make-reservation"))).await;
    assert_eq!(res.status(), StatusCode::OK);
    browser.remember(&res);

    let res = test::call_service(
        &app,
        browser.send(
            TestRequest::post()
                .uri("/make-reservation")
                .set_form(guest_details("1")),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/reservation-summary");
    browser.remember(&res);
    assert_eq!(store.reservation_count(), 1);
    assert_eq!(store.restriction_count(), 1);

    let res =
        test::call_service(&app, browser.send(TestRequest::get().uri("/reservation-summary")))
            .await;
    assert_eq!(res.status(), StatusCode::OK);
    browser.remember(&res);
    let html = text(&test::read_body(res).await);
    assert!(html.contains("John Smith"));
    assert!(html.contains("2050-01-01"));

    let mut recipients = vec![
        site.next_mail().await.expect("first mail").to,
        site.next_mail().await.expect("second mail").to,
    ];
    recipients.sort();
    assert_eq!(recipients, vec!["a@b.com".to_owned(), OWNER_EMAIL.to_owned()]);

    // The summary consumes the draft.
    let res = test::call_service(&app, browser.send(TestRequest::get().uri("/reservation-summary")))
        .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
}

#[actix_web::test]
async fn failed_insert_leaves_no_rows_and_explains_on_the_home_page() {
    let site = site().await;
    let store = site.store.clone();
    let app = booking_site!(site.state.clone());
    let mut browser = Browser::default();

    let res = test::call_service(
        &app,
        browser.send(
            TestRequest::post()
                .uri("/make-reservation")
                .set_form(guest_details("2")),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    browser.remember(&res);
    assert_eq!(store.reservation_count(), 0);
    assert_eq!(store.restriction_count(), 0);

    let res = test::call_service(&app, browser.send(TestRequest::get().uri("/"))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = text(&test::read_body(res).await);
    assert!(html.contains("insert reservation into database"));
}

#[actix_web::test]
async fn edited_form_cannot_book_a_taken_room() {
    let site = site().await;
    let store = site.store.clone();
    let app = booking_site!(site.state.clone());

    let res = test::call_service(
        &app,
        TestRequest::post()
            .uri("/make-reservation")
            .set_form(guest_details("1"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/reservation-summary");

    let mut second = Browser::default();
    let res = test::call_service(
        &app,
        second.send(
            TestRequest::post()
                .uri("/make-reservation")
                .set_form(guest_details("1")),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    second.remember(&res);
    assert_eq!(store.reservation_count(), 1);
    assert_eq!(store.restriction_count(), 1);

    let res = test::call_service(&app, second.send(TestRequest::get().uri("/"))).await;
    let html = text(&test::read_body(res).await);
    assert!(html.contains("insert reservation into database"));
}

#[actix_web::test]
async fn short_first_name_is_sent_back_to_the_form() {
    let site = site().await;
    let store = site.store.clone();
    let app = booking_site!(site.state.clone());

    let mut form = guest_details("1");
    if let Some(field) = form.iter_mut().find(|(name, _)| *name == "first_name") {
        field.1 = "Jo".to_owned();
    }
    let res = test::call_service(
        &app,
        TestRequest::post()
            .uri("/make-reservation")
            .set_form(form)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(store.reservation_count(), 0);
}

#[rstest]
#[case(&[], false)]
#[case(&[("start", "2050-01-01"), ("end", "someday"), ("room_id", "1")], false)]
#[case(&[("start", "2050-01-01"), ("end", "2050-01-02"), ("room_id", "x")], false)]
#[case(&[("start", "2050-01-01"), ("end", "2050-01-02"), ("room_id", "1")], true)]
#[actix_web::test]
async fn availability_json_always_answers_ok(
    #[case] fields: &[(&str, &str)],
    #[case] expected: bool,
) {
    let site = site().await;
    let app = booking_site!(site.state.clone());

    let res = test::call_service(
        &app,
        TestRequest::post()
            .uri("/search-availability-json")
            .set_form(fields.to_vec())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&test::read_body(res).await).expect("json body");
    assert_eq!(body["ok"], Value::Bool(expected));
}

#[rstest]
#[case("/admin/dashboard")]
#[case("/admin/reservations-new")]
#[case("/admin/reservations-all")]
#[case("/admin/reservations-calendar")]
#[case("/admin/reservations/new/1/show")]
#[case("/admin/process-reservation/new/1/do")]
#[case("/admin/delete-reservation/all/1/do")]
#[actix_web::test]
async fn back_office_sends_anonymous_visitors_to_login(#[case] uri: &str) {
    let site = site().await;
    let app = booking_site!(site.state.clone());

    let res = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/user/login");
    assert!(res.headers().contains_key("trace-id"));
}

#[actix_web::test]
async fn wrong_password_returns_to_login_with_a_notice() {
    let site = site().await;
    let app = booking_site!(site.state.clone());
    let mut browser = Browser::default();

    let res = test::call_service(
        &app,
        browser.send(
            TestRequest::post()
                .uri("/user/login")
                .set_form([("email", ADMIN_EMAIL), ("password", "nope")]),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/user/login");
    browser.remember(&res);

    let res = test::call_service(&app, browser.send(TestRequest::get().uri("/user/login"))).await;
    let html = text(&test::read_body(res).await);
    assert!(html.contains("Invalid login credentials"));
}

#[actix_web::test]
async fn administrator_manages_a_booking_and_the_calendar() {
    let site = site().await;
    let store = site.store.clone();
    let app = booking_site!(site.state.clone());
    let mut guest = Browser::default();
    let mut admin = Browser::default();

    let res = test::call_service(
        &app,
        guest.send(
            TestRequest::post()
                .uri("/make-reservation")
                .set_form(guest_details("1")),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    guest.remember(&res);

    let res = test::call_service(
        &app,
        admin.send(
            TestRequest::post()
                .uri("/user/login")
                .set_form([("email", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)]),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    admin.remember(&res);

    let res = test::call_service(
        &app,
        admin.send(TestRequest::get().uri("/admin/reservations-new")),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    admin.remember(&res);
    let html = text(&test::read_body(res).await);
    assert!(html.contains("Smith"));
    assert!(html.contains("/admin/reservations/new/1/show"));

    let res = test::call_service(
        &app,
        admin.send(TestRequest::get().uri("/admin/process-reservation/new/1/do")),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/admin/reservations-new");
    admin.remember(&res);

    let res = test::call_service(
        &app,
        admin.send(TestRequest::get().uri("/admin/reservations-new")),
    )
    .await;
    admin.remember(&res);
    let html = text(&test::read_body(res).await);
    assert!(!html.contains("/admin/reservations/new/1/show"));

    let january = "/admin/reservations-calendar?y=2050&m=1";
    let res = test::call_service(&app, admin.send(TestRequest::get().uri(january))).await;
    assert_eq!(res.status(), StatusCode::OK);
    admin.remember(&res);
    let html = text(&test::read_body(res).await);
    assert!(html.contains("/admin/reservations/cal/1/show?y=2050"));

    for _ in 0..2 {
        let res = test::call_service(
            &app,
            admin.send(TestRequest::post().uri("/admin/reservations-calendar").set_form([
                ("y", "2050"),
                ("m", "1"),
                ("add_block_2_2050-01-15", "on"),
            ])),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), january);
        admin.remember(&res);
        assert_eq!(store.restriction_count(), 2);
    }

    let res = test::call_service(&app, admin.send(TestRequest::get().uri("/user/logout"))).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    admin.remember(&res);
    let res = test::call_service(&app, admin.send(TestRequest::get().uri(january))).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/user/login");
}

//! Handler tests for login and logout.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use rstest::rstest;
use zeroize::Zeroizing;

use super::*;
use crate::domain::ports::MockMailer;
use crate::domain::{AdministratorSeed, ensure_administrator};
use crate::inbound::http::pages::home;
use crate::inbound::http::test_utils::{
    fixture_state, location, session_cookie, test_session_middleware,
};

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "correct horse";

macro_rules! login_app {
    () => {{
        let (state, store) = fixture_state(Arc::new(MockMailer::new()));
        ensure_administrator(
            &store,
            AdministratorSeed {
                email: ADMIN_EMAIL.to_owned(),
                password: Zeroizing::new(ADMIN_PASSWORD.to_owned()),
                cost: 4,
            },
        )
        .await
        .expect("administrator provisioned");
        test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new(state))
                .service(home)
                .service(login_form)
                .service(login)
                .service(logout),
        )
        .await
    }};
}

fn login_request(email: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(LOGIN_PATH)
        .set_form([("email", email), ("password", password)])
}

#[actix_web::test]
async fn login_form_renders() {
    let app = login_app!();
    let res = test::call_service(&app, test::TestRequest::get().uri(LOGIN_PATH).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[case("", ADMIN_PASSWORD, "This field cannot be blank")]
#[case("not-an-email", ADMIN_PASSWORD, "Invalid email address")]
#[case(ADMIN_EMAIL, "", "This field cannot be blank")]
#[actix_web::test]
async fn malformed_submissions_re_render(
    #[case] email: &str,
    #[case] password: &str,
    #[case] message: &str,
) {
    let app = login_app!();
    let res = test::call_service(&app, login_request(email, password).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = test::read_body(res).await;
    assert!(String::from_utf8_lossy(&body).contains(message));
}

#[rstest]
#[case(ADMIN_EMAIL, "wrong password")]
#[case("stranger@example.com", ADMIN_PASSWORD)]
#[actix_web::test]
async fn bad_credentials_redirect_with_one_notice(#[case] email: &str, #[case] password: &str) {
    let app = login_app!();
    let res = test::call_service(&app, login_request(email, password).to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), LOGIN_PATH);

    let body = test::call_and_read_body(
        &app,
        test::TestRequest::get()
            .uri(LOGIN_PATH)
            .cookie(session_cookie(&res))
            .to_request(),
    )
    .await;
    assert!(String::from_utf8_lossy(&body).contains(INVALID_CREDENTIALS));
}

#[actix_web::test]
async fn login_then_logout() {
    let app = login_app!();
    let res = test::call_service(&app, login_request(ADMIN_EMAIL, ADMIN_PASSWORD).to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), HOME_PATH);
    let cookie = session_cookie(&res);

    let body = test::call_and_read_body(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie.clone()).to_request(),
    )
    .await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("Logged in successfully"));
    assert!(html.contains("/user/logout"));

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/user/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), LOGIN_PATH);

    let body = test::call_and_read_body(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    assert!(!String::from_utf8_lossy(&body).contains("/user/logout"));
}

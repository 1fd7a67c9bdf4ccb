//! API verification scenarios against a deployed backend.
//!
//! These run the backend-only verification path for real, so they are
//! ignored by default; point `NAVEGAR_API_URL` at a deployed
//! contact-list backend and run with `--ignored` to exercise them.
//!
//! The literal validation strings asserted here are the deployed
//! backend's observed behavior, matched by substring so wording
//! drift does not break the suite.

use navegar::api::{ApiClient, UserPayload};
use navegar::data::UserData;

fn client() -> ApiClient {
    let base = std::env::var("NAVEGAR_API_URL")
        .unwrap_or_else(|_| "https://thinking-tester-contact-list.herokuapp.com".to_string());
    ApiClient::new(&base).expect("valid API base URL")
}

#[tokio::test]
#[ignore = "requires a deployed contact-list backend"]
async fn empty_registration_is_rejected_per_field() {
    let response = client()
        .register_user(&UserPayload::empty())
        .await
        .expect("request sent");

    assert_eq!(response.status, 400);
    assert_eq!(
        response.error_keys(),
        ["email", "firstName", "lastName", "password"]
    );
}

#[tokio::test]
#[ignore = "requires a deployed contact-list backend"]
async fn duplicate_email_registration_is_rejected() {
    let api = client();
    let user = UserData::random();
    let payload = UserPayload::from(&user);

    let first = api.register_user(&payload).await.expect("request sent");
    assert_eq!(first.status, 201, "first registration should be created");
    let token = first.token().expect("token issued").to_string();

    let second = api.register_user(&payload).await.expect("request sent");
    assert_eq!(second.status, 400);
    let message = second.message().unwrap_or_default().to_string();
    assert!(
        message.contains("already in use"),
        "unexpected duplicate-email message: {message}"
    );

    // Clean up the account this test created
    let deleted = api
        .delete_current_user(&token)
        .await
        .expect("cleanup request sent");
    assert_eq!(deleted.status, 200);
}

#[tokio::test]
#[ignore = "requires a deployed contact-list backend"]
async fn login_round_trip_issues_and_honors_a_token() {
    let api = client();
    let user = UserData::random();
    let registered = api
        .register_user(&UserPayload::from(&user))
        .await
        .expect("request sent");
    assert_eq!(registered.status, 201);

    let login = api
        .login(&user.email, &user.password)
        .await
        .expect("request sent");
    assert_eq!(login.status, 200);
    let token = login.token().expect("token issued").to_string();

    let deleted = api
        .delete_current_user(&token)
        .await
        .expect("cleanup request sent");
    assert_eq!(deleted.status, 200);
}

//! End-to-end scenarios over a scripted page.
//!
//! These tests exercise the page objects through the full stack
//! (page object → driver → session → backend) against a `MockPage`
//! scripted to behave like the contact-list application: validation
//! banners appear on submit, successful logins navigate, and the
//! contact table renders after a delay.

use std::sync::Arc;
use std::time::Duration;

use navegar::diagnostics::TestStatus;
use navegar::harness::TestContext;
use navegar::mock::{ClickEffect, MockElement, MockPage};
use navegar::pages::{AddUserPage, ContactListPage, LoginPage, PageObject, SignupPage};
use navegar::{Driver, Session, SessionConfig};

const VALIDATION_MESSAGE: &str = "User validation failed: firstName: Path `firstName` is \
     required., lastName: Path `lastName` is required., email: Email is invalid, password: \
     Path `password` is required.";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

fn fast_config() -> SessionConfig {
    SessionConfig::new("https://app.example")
        .with_timeout_ms(500)
        .with_poll_interval_ms(10)
}

fn driver_over(page: &MockPage) -> Driver {
    let session = Session::with_backend(page.clone(), fast_config()).unwrap();
    Driver::new(Arc::new(session))
}

/// Script the signup/add-user form with its validation behavior
fn script_registration_form(page: &MockPage) {
    page.set_url("https://app.example/addUser");
    for id in ["firstName", "lastName", "email", "password"] {
        page.add_element(id, MockElement::input(id));
    }
    page.add_element("submit", MockElement::button("submit"))
        .add_element("cancel", MockElement::button("cancel"))
        .add_element("error", MockElement::new("span").with_id("error").hidden());
}

/// Script the login page; a successful submit lands on the contact
/// list, whose table renders asynchronously
fn script_login_success(page: &MockPage) {
    page.set_url("https://app.example/");
    page.add_element("email", MockElement::input("email"))
        .add_element("password", MockElement::input("password"))
        .add_element("submit", MockElement::button("submit"))
        .add_element(
            "signup-link",
            MockElement::link("Not yet a user? Click here to sign up!"),
        )
        .add_element(
            "table",
            MockElement::new("table")
                .with_id("myTable")
                .visible_after(Duration::from_millis(60)),
        )
        .add_element("logout", MockElement::button("logout").hidden());
    page.on_click(
        "submit",
        vec![
            ClickEffect::Navigate("https://app.example/contactList".to_string()),
            ClickEffect::Show("logout".to_string()),
        ],
    );
}

#[tokio::test]
async fn empty_form_submission_reports_every_missing_field() {
    init_tracing();
    let page = MockPage::new();
    script_registration_form(&page);
    page.on_click(
        "submit",
        vec![
            ClickEffect::Show("error".to_string()),
            ClickEffect::SetText {
                target: "error".to_string(),
                text: VALIDATION_MESSAGE.to_string(),
            },
        ],
    );

    let form = AddUserPage::new(driver_over(&page));
    assert!(form.is_displayed().await.unwrap());
    form.submit_form().await.unwrap();

    let banner = form.error_message().await.unwrap().expect("banner shown");
    for field in ["firstName", "lastName", "password"] {
        assert!(
            banner.contains(&format!("{field}` is required")),
            "missing complaint for {field}: {banner}"
        );
    }
    assert!(banner.contains("Email is invalid"));
}

#[tokio::test]
async fn absent_error_banner_is_a_negative_assertion_not_a_crash() {
    init_tracing();
    let page = MockPage::new();
    script_registration_form(&page);

    let form = AddUserPage::new(driver_over(&page));
    // Nothing was submitted: the banner must read as absent, quietly
    assert!(form.error_message().await.unwrap().is_none());
    assert!(form
        .driver()
        .is_invisible(&navegar::Locator::id("error"))
        .await
        .unwrap());
}

#[tokio::test]
async fn successful_login_lands_on_the_contact_list() {
    init_tracing();
    let page = MockPage::new();
    script_login_success(&page);

    let driver = driver_over(&page);
    let login = LoginPage::new(driver.clone());
    assert!(login.is_displayed().await.unwrap());

    login
        .login("ada.lovelace@example.test", "S3cret!pass")
        .await
        .unwrap();

    let contacts = ContactListPage::new(driver);
    // The table renders on the page's own schedule; is_displayed waits
    assert!(contacts.is_displayed().await.unwrap());
}

#[tokio::test]
async fn failed_login_shows_a_banner_and_stays_put() {
    init_tracing();
    let page = MockPage::new();
    page.set_url("https://app.example/");
    page.add_element("email", MockElement::input("email"))
        .add_element("password", MockElement::input("password"))
        .add_element("submit", MockElement::button("submit"))
        .add_element("error", MockElement::new("span").with_id("error").hidden())
        .on_click(
            "submit",
            vec![
                ClickEffect::Show("error".to_string()),
                ClickEffect::SetText {
                    target: "error".to_string(),
                    text: "Incorrect username or password".to_string(),
                },
            ],
        );

    let driver = driver_over(&page);
    let login = LoginPage::new(driver.clone());
    login.login("wrong@example.test", "nope").await.unwrap();

    let banner = login.error_message().await.unwrap().expect("banner shown");
    assert!(banner.contains("Incorrect"));
    assert!(!driver.wait_for_url_contains("/contactList", 200).await.unwrap());
}

#[tokio::test]
async fn signup_link_reaches_the_signup_form() {
    init_tracing();
    let page = MockPage::new();
    page.set_url("https://app.example/");
    page.add_element(
        "signup-link",
        MockElement::link("Not yet a user? Click here to sign up!"),
    )
    .add_element("email", MockElement::input("email"))
    .add_element("password", MockElement::input("password"))
    .add_element("submit", MockElement::button("submit"))
    .on_click(
        "signup-link",
        vec![ClickEffect::Navigate("https://app.example/addUser".to_string())],
    );

    let driver = driver_over(&page);
    let login = LoginPage::new(driver.clone());
    login.click_signup_link().await.unwrap();
    assert!(driver.wait_for_url_contains("/addUser", 200).await.unwrap());
}

#[tokio::test]
async fn signup_with_generated_data_submits_the_whole_form() {
    init_tracing();
    let page = MockPage::new();
    script_registration_form(&page);

    let signup = SignupPage::new(driver_over(&page));
    let user = navegar::data::UserData::random();
    signup.signup(&user).await.unwrap();

    assert_eq!(page.value_of("email").as_deref(), Some(user.email.as_str()));
    assert_eq!(
        page.value_of("password").as_deref(),
        Some(user.password.as_str())
    );
}

#[tokio::test]
async fn a_failing_scenario_leaves_artifacts_behind() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let page = MockPage::new();
    script_registration_form(&page);
    page.set_screenshot(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a]);

    let ctx = TestContext::with_backend(
        "contact_list_never_renders",
        page,
        fast_config(),
        dir.path(),
    )
    .unwrap();

    let contacts = ContactListPage::new(ctx.driver().clone());
    // The scripted page never navigates, so this read honestly fails
    let result = match contacts.is_displayed().await {
        Ok(true) => Ok(()),
        Ok(false) => Err(navegar::NavegarError::backend(
            "contact list not displayed after login",
        )),
        Err(e) => Err(e),
    };
    let (outcome, artifacts) = ctx.finish(result).await;

    assert_eq!(outcome.status, TestStatus::Failed);
    let kinds: Vec<_> = artifacts.iter().map(|a| a.kind).collect();
    assert!(kinds.contains(&navegar::diagnostics::ArtifactKind::Screenshot));
    assert!(kinds.contains(&navegar::diagnostics::ArtifactKind::LogDump));
    for artifact in &artifacts {
        assert!(artifact.path.exists());
        assert!(artifact
            .path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .contains("contact_list_never_renders"));
    }
}

#[tokio::test]
async fn sessions_are_isolated_between_scenarios() {
    init_tracing();
    let first_page = MockPage::new();
    first_page.add_element("email", MockElement::input("email"));
    let second_page = MockPage::new();
    second_page.add_element("email", MockElement::input("email"));

    let first = driver_over(&first_page);
    let second = driver_over(&second_page);

    first
        .type_text(&navegar::Locator::id("email"), "first@example.test")
        .await
        .unwrap();

    // The second session's field is untouched; no shared state
    assert_eq!(second_page.value_of("email").as_deref(), Some(""));
    first.session().close().await.unwrap();

    // Closing one session does not affect the other
    second
        .type_text(&navegar::Locator::id("email"), "second@example.test")
        .await
        .unwrap();
}

//! Signup page object.

use async_trait::async_trait;

use crate::data::UserData;
use crate::driver::Driver;
use crate::locator::Locator;
use crate::pages::PageObject;
use crate::result::NavegarResult;

/// The account-signup screen
#[derive(Debug, Clone)]
pub struct SignupPage {
    driver: Driver,
}

impl SignupPage {
    /// Bind the page to a driver
    #[must_use]
    pub fn new(driver: Driver) -> Self {
        Self { driver }
    }

    fn first_name_input() -> Locator {
        Locator::id("firstName")
    }

    fn last_name_input() -> Locator {
        Locator::id("lastName")
    }

    fn email_input() -> Locator {
        Locator::id("email")
    }

    fn password_input() -> Locator {
        Locator::id("password")
    }

    fn submit_button() -> Locator {
        Locator::id("submit")
    }

    fn error_banner() -> Locator {
        Locator::id("error")
    }

    /// Fill the whole form and submit
    pub async fn signup(&self, user: &UserData) -> NavegarResult<()> {
        self.driver
            .type_text(&Self::first_name_input(), &user.first_name)
            .await?;
        self.driver
            .type_text(&Self::last_name_input(), &user.last_name)
            .await?;
        self.driver
            .type_text(&Self::email_input(), &user.email)
            .await?;
        self.driver
            .type_text(&Self::password_input(), &user.password)
            .await?;
        self.driver.click(&Self::submit_button()).await
    }

    /// The validation banner's text, if one is showing
    pub async fn error_message(&self) -> NavegarResult<Option<String>> {
        self.driver.text(&Self::error_banner()).await
    }
}

#[async_trait]
impl PageObject for SignupPage {
    fn driver(&self) -> &Driver {
        &self.driver
    }

    fn url_fragment(&self) -> &'static str {
        "/addUser"
    }

    async fn is_displayed(&self) -> NavegarResult<bool> {
        for locator in [
            Self::first_name_input(),
            Self::last_name_input(),
            Self::email_input(),
            Self::password_input(),
            Self::submit_button(),
        ] {
            if !self.driver.is_visible(&locator).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockPage};
    use crate::session::{Session, SessionConfig};
    use std::sync::Arc;

    fn signup_page_over(page: &MockPage) -> SignupPage {
        let config = SessionConfig::new("https://app.example")
            .with_timeout_ms(200)
            .with_poll_interval_ms(10);
        let session = Session::with_backend(page.clone(), config).unwrap();
        SignupPage::new(Driver::new(Arc::new(session)))
    }

    fn scripted_signup_form(page: &MockPage) {
        for id in ["firstName", "lastName", "email", "password"] {
            page.add_element(id, MockElement::input(id));
        }
        page.add_element("submit", MockElement::button("submit"));
    }

    #[tokio::test]
    async fn test_signup_fills_every_field() {
        let page = MockPage::new();
        scripted_signup_form(&page);
        let signup = signup_page_over(&page);
        let user = UserData::random();

        signup.signup(&user).await.unwrap();
        assert_eq!(page.value_of("firstName").as_deref(), Some(user.first_name.as_str()));
        assert_eq!(page.value_of("lastName").as_deref(), Some(user.last_name.as_str()));
        assert_eq!(page.value_of("email").as_deref(), Some(user.email.as_str()));
        assert_eq!(page.value_of("password").as_deref(), Some(user.password.as_str()));
    }

    #[tokio::test]
    async fn test_repeated_signup_replaces_field_content() {
        let page = MockPage::new();
        scripted_signup_form(&page);
        let signup = signup_page_over(&page);

        let first = UserData::random();
        let second = UserData::random();
        signup.signup(&first).await.unwrap();
        signup.signup(&second).await.unwrap();

        // Re-entry leaves exactly the second user's data, never a
        // concatenation with the first attempt's
        assert_eq!(page.value_of("email").as_deref(), Some(second.email.as_str()));
    }

    #[tokio::test]
    async fn test_is_displayed_and_open() {
        let page = MockPage::new();
        scripted_signup_form(&page);
        let signup = signup_page_over(&page);

        signup.open().await.unwrap();
        assert_eq!(
            signup.driver().current_url().await.unwrap(),
            "https://app.example/addUser"
        );
        assert!(signup.is_displayed().await.unwrap());
    }
}

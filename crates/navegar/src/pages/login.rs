//! Login page object.

use async_trait::async_trait;

use crate::driver::Driver;
use crate::locator::Locator;
use crate::pages::PageObject;
use crate::result::NavegarResult;

/// The application's login screen
#[derive(Debug, Clone)]
pub struct LoginPage {
    driver: Driver,
}

impl LoginPage {
    /// Bind the page to a driver
    #[must_use]
    pub fn new(driver: Driver) -> Self {
        Self { driver }
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

    fn signup_link() -> Locator {
        Locator::link_text("Not yet a user? Click here to sign up!")
    }

    fn error_banner() -> Locator {
        Locator::id("error")
    }

    /// Enter credentials and submit. Interaction failures propagate as
    /// typed errors; success here means the form was submitted, not
    /// that the backend accepted it.
    pub async fn login(&self, email: &str, password: &str) -> NavegarResult<()> {
        self.driver.type_text(&Self::email_input(), email).await?;
        self.driver
            .type_text(&Self::password_input(), password)
            .await?;
        self.driver.click(&Self::submit_button()).await
    }

    /// The validation banner's text, if one is showing
    pub async fn error_message(&self) -> NavegarResult<Option<String>> {
        self.driver.text(&Self::error_banner()).await
    }

    /// Follow the signup link
    pub async fn click_signup_link(&self) -> NavegarResult<()> {
        self.driver.click(&Self::signup_link()).await
    }
}

#[async_trait]
impl PageObject for LoginPage {
    fn driver(&self) -> &Driver {
        &self.driver
    }

    fn url_fragment(&self) -> &'static str {
        "/"
    }

    async fn is_displayed(&self) -> NavegarResult<bool> {
        for locator in [
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

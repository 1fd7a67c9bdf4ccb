//! Add-user page object.
//!
//! The same form as signup, driven field by field. Negative validation
//! scenarios use this page: submit with holes in the form, then read
//! the banner.

use async_trait::async_trait;

use crate::driver::Driver;
use crate::locator::Locator;
use crate::pages::PageObject;
use crate::result::NavegarResult;

/// The add-user form, field-granular
#[derive(Debug, Clone)]
pub struct AddUserPage {
    driver: Driver,
}

impl AddUserPage {
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

    fn cancel_button() -> Locator {
        Locator::id("cancel")
    }

    fn error_banner() -> Locator {
        Locator::id("error")
    }

    /// Fill the first-name field
    pub async fn fill_first_name(&self, value: &str) -> NavegarResult<()> {
        self.driver.type_text(&Self::first_name_input(), value).await
    }

    /// Fill the last-name field
    pub async fn fill_last_name(&self, value: &str) -> NavegarResult<()> {
        self.driver.type_text(&Self::last_name_input(), value).await
    }

    /// Fill the email field
    pub async fn fill_email(&self, value: &str) -> NavegarResult<()> {
        self.driver.type_text(&Self::email_input(), value).await
    }

    /// Fill the password field
    pub async fn fill_password(&self, value: &str) -> NavegarResult<()> {
        self.driver.type_text(&Self::password_input(), value).await
    }

    /// Submit the form as it stands
    pub async fn submit_form(&self) -> NavegarResult<()> {
        self.driver.click(&Self::submit_button()).await
    }

    /// Abandon the form
    pub async fn click_cancel(&self) -> NavegarResult<()> {
        self.driver.click(&Self::cancel_button()).await
    }

    /// Empty every field
    pub async fn clear_form(&self) -> NavegarResult<()> {
        for locator in [
            Self::first_name_input(),
            Self::last_name_input(),
            Self::email_input(),
            Self::password_input(),
        ] {
            self.driver.type_text(&locator, "").await?;
        }
        Ok(())
    }

    /// The validation banner's text, if one is showing
    pub async fn error_message(&self) -> NavegarResult<Option<String>> {
        self.driver.text(&Self::error_banner()).await
    }
}

#[async_trait]
impl PageObject for AddUserPage {
    fn driver(&self) -> &Driver {
        &self.driver
    }

    fn url_fragment(&self) -> &'static str {
        "/addUser"
    }

    async fn is_displayed(&self) -> NavegarResult<bool> {
        self.driver.is_visible(&Self::submit_button()).await
    }
}

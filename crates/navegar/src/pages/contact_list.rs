//! Contact-list page object.

use async_trait::async_trait;

use crate::driver::Driver;
use crate::locator::Locator;
use crate::pages::PageObject;
use crate::result::NavegarResult;

/// The authenticated contact-list screen
#[derive(Debug, Clone)]
pub struct ContactListPage {
    driver: Driver,
}

impl ContactListPage {
    /// Bind the page to a driver
    #[must_use]
    pub fn new(driver: Driver) -> Self {
        Self { driver }
    }

    fn contact_table() -> Locator {
        Locator::id("myTable")
    }

    fn table_rows() -> Locator {
        Locator::css("#myTable tr")
    }

    fn add_contact_button() -> Locator {
        Locator::id("add-contact")
    }

    fn logout_button() -> Locator {
        Locator::id("logout")
    }

    /// Number of contacts shown: table rows minus the header row.
    /// An empty (or still-loading) table reads as zero, not an error.
    pub async fn contact_count(&self) -> NavegarResult<usize> {
        let rows = self.driver.find_all(&Self::table_rows()).await?;
        Ok(rows.len().saturating_sub(1))
    }

    /// Start adding a contact
    pub async fn click_add_contact(&self) -> NavegarResult<()> {
        self.driver.click(&Self::add_contact_button()).await
    }

    /// Log out of the application
    pub async fn logout(&self) -> NavegarResult<()> {
        self.driver.click(&Self::logout_button()).await
    }
}

#[async_trait]
impl PageObject for ContactListPage {
    fn driver(&self) -> &Driver {
        &self.driver
    }

    fn url_fragment(&self) -> &'static str {
        "/contactList"
    }

    /// Displayed means both the URL landed and the table rendered
    async fn is_displayed(&self) -> NavegarResult<bool> {
        let timeout = self.driver.session().config().wait.timeout_ms;
        if !self
            .driver
            .wait_for_url_contains(self.url_fragment(), timeout)
            .await?
        {
            return Ok(false);
        }
        self.driver.is_visible(&Self::contact_table()).await
    }
}

//! Page objects for the contact-list application.
//!
//! A page object is a locator + action catalog for one screen,
//! expressed purely in terms of the [`Driver`]'s wait-qualified
//! operations; direct DOM access from a page object is disallowed by
//! design. Page objects hold nothing but a driver handle; all state
//! lives in the page itself.
//!
//! Interaction errors propagate through these actions unchanged: a
//! failed click surfaces as the typed error it is, never as an
//! ambiguous `false`.

mod add_user;
mod contact_list;
mod login;
mod signup;

pub use add_user::AddUserPage;
pub use contact_list::ContactListPage;
pub use login::LoginPage;
pub use signup::SignupPage;

use async_trait::async_trait;

use crate::driver::Driver;
use crate::result::NavegarResult;

/// Common surface of a page object
#[async_trait]
pub trait PageObject {
    /// The driver this page acts through
    fn driver(&self) -> &Driver;

    /// Path of this page relative to the application base URL
    fn url_fragment(&self) -> &'static str;

    /// Whether the page's identifying elements are visible
    async fn is_displayed(&self) -> NavegarResult<bool>;

    /// Navigate the session to this page
    async fn open(&self) -> NavegarResult<()> {
        self.driver().goto(self.url_fragment()).await
    }
}

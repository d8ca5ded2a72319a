//! Page Object Model.
//!
//! Each page binds its named [`Locator`]s against a [`Session`](crate::Session)
//! and exposes action methods (interact, then await a settling signal) and
//! verification methods (assert, fail with [`ShopError::Assertion`]).
//!
//! [`ShopError::Assertion`]: crate::ShopError::Assertion

mod cart;
mod checkout;
mod login;
mod payment;
mod products;
mod view_cart;

pub use cart::{CartPage, CartRow, CartSnapshot};
pub use checkout::{CheckoutPage, TOTAL_AMOUNT_PATTERN};
pub use login::LoginPage;
pub use payment::PaymentPage;
pub use products::ProductsPage;
pub use view_cart::{ViewCartPage, CART_TABLE_HEADERS};

use crate::locator::Locator;

/// A page or component in the storefront UI.
///
/// ```ignore
/// let cart = CartPage::new(&session);
/// for (name, locator) in cart.locators() {
///     println!("{}.{name}: {locator}", cart.page_name());
/// }
/// ```
pub trait PageObject {
    /// URL pattern that matches this page (e.g. `/view_cart`)
    fn url_pattern(&self) -> &str;

    /// Page name for logging, without path or generic parameters
    fn page_name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.split('<')
            .next()
            .unwrap_or(full)
            .rsplit("::")
            .next()
            .unwrap_or("page")
    }

    /// Every named locator the page defines
    fn locators(&self) -> Vec<(&'static str, &Locator)>;
}

/// Session over a fresh mock driver with short timeouts
#[cfg(test)]
pub(crate) fn mock_session() -> (std::sync::Arc<crate::mock::MockDriver>, crate::session::Session) {
    use crate::config::{Environment, SuiteConfig, Timeouts};
    let driver = std::sync::Arc::new(crate::mock::MockDriver::new());
    let mut config = SuiteConfig::default();
    config.timeouts = Timeouts {
        expect_ms: 60,
        action_ms: 60,
        navigation_ms: 60,
        download_ms: 60,
        poll_interval_ms: 5,
    };
    let session = crate::session::Session::new(
        driver.clone(),
        Environment::new("https://shop.test"),
        config,
    );
    (driver, session)
}

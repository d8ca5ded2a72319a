//! Cart table layout and the path to checkout.

use super::PageObject;
use crate::locator::{AriaRole, Locator, Selector};
use crate::result::ShopResult;
use crate::session::{FlowStage, Session};
use crate::wait::LoadState;
use tracing::info;

/// Column headings of the cart table, in order
pub const CART_TABLE_HEADERS: [&str; 5] = ["Item", "Description", "Price", "Quantity", "Total"];

/// The cart table header and ` Proceed To Checkout`
#[derive(Debug)]
pub struct ViewCartPage<'a> {
    session: &'a Session,
    /// The cart table
    pub cart_table: Locator,
    /// First table row (headings)
    pub header_row: Locator,
    /// ` Proceed To Checkout`
    pub proceed_to_checkout_button: Locator,
}

impl<'a> ViewCartPage<'a> {
    /// Bind the page to `session`
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            cart_table: Locator::css("#cart_info_table"),
            header_row: Locator::new(Selector::Role {
                role: AriaRole::Row,
                name: None,
            })
            .first(),
            proceed_to_checkout_button: Locator::text("Proceed To Checkout"),
        }
    }

    /// Open `{BASE_URL}view_cart`
    pub async fn navigate(&self) -> ShopResult<()> {
        self.session.goto("view_cart").await?;
        self.session.settle(LoadState::DomContentLoaded).await
    }

    /// The table is visible and its first row names every column
    pub async fn verify_cart_table_headers(&self) -> ShopResult<()> {
        self.session.expect(&self.cart_table).to_be_visible().await?;
        let header = self.session.expect(&self.header_row);
        for heading in CART_TABLE_HEADERS {
            header.to_contain_text(heading).await?;
            info!(heading, "header is visible");
        }
        Ok(())
    }

    /// Continue to checkout
    pub async fn click_proceed_to_checkout(&self) -> ShopResult<()> {
        self.session.click(&self.proceed_to_checkout_button).await?;
        self.session.settle(LoadState::DomContentLoaded).await?;
        info!("Clicked on Proceed To Checkout");
        self.session.advance(FlowStage::CheckingOut)
    }
}

impl PageObject for ViewCartPage<'_> {
    fn url_pattern(&self) -> &str {
        "/view_cart"
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("cart_table", &self.cart_table),
            ("header_row", &self.header_row),
            ("proceed_to_checkout_button", &self.proceed_to_checkout_button),
        ]
    }
}

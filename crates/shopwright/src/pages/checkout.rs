//! Checkout: address review, order total and `Place Order`.

use super::PageObject;
use crate::expect::pattern;
use crate::fixtures::AddressFixture;
use crate::locator::{AriaRole, Locator};
use crate::result::{ShopError, ShopResult};
use crate::session::{FlowStage, Session};
use crate::wait::LoadState;
use tracing::info;

/// Every rendered order total matches this
pub const TOTAL_AMOUNT_PATTERN: &str = r"Rs\.\s*\d+";

/// Address blocks, totals and the order button
#[derive(Debug)]
pub struct CheckoutPage<'a> {
    session: &'a Session,
    /// `Address Details`
    pub address_details_heading: Locator,
    /// `Your delivery address`
    pub delivery_address_heading: Locator,
    /// `Your billing address`
    pub billing_address_heading: Locator,
    /// Delivery address block
    pub delivery_address: Locator,
    /// Billing address block
    pub billing_address: Locator,
    /// `Total Amount`
    pub total_amount_heading: Locator,
    /// Total values
    pub total_amount_values: Locator,
    /// `Place Order`
    pub place_order_button: Locator,
}

impl<'a> CheckoutPage<'a> {
    /// Bind the page to `session`
    pub fn new(session: &'a Session) -> Self {
        let texts = &session.fixtures().checkout_texts;
        Self {
            session,
            address_details_heading: Locator::css("h2").filter_has_text(&texts.address_details),
            delivery_address_heading: Locator::css("h3")
                .filter_has_text(&texts.delivery_address),
            billing_address_heading: Locator::css("h3").filter_has_text(&texts.billing_address),
            delivery_address: Locator::css("#address_delivery"),
            billing_address: Locator::css("#address_invoice"),
            total_amount_heading: Locator::css("h4").filter_has_text("Total Amount"),
            total_amount_values: Locator::css("td > p.cart_total_price"),
            place_order_button: Locator::role(AriaRole::Link, "Place Order"),
        }
    }

    /// Open `CHECKOUT_URL`
    pub async fn navigate_to_checkout(&self) -> ShopResult<()> {
        let url = self.session.env().checkout_url.clone();
        self.session.goto(&url).await?;
        self.session.advance(FlowStage::CheckingOut)
    }

    /// `Address Details` heading
    pub async fn verify_address_details_text(&self) -> ShopResult<()> {
        let expect = self.session.expect(&self.address_details_heading);
        expect.to_be_visible().await?;
        expect
            .to_have_text(&self.session.fixtures().checkout_texts.address_details)
            .await
    }

    /// `Your delivery address` heading
    pub async fn verify_delivery_address_heading(&self) -> ShopResult<()> {
        let expect = self.session.expect(&self.delivery_address_heading);
        expect.to_be_visible().await?;
        expect
            .to_contain_text(&self.session.fixtures().checkout_texts.delivery_address)
            .await
    }

    /// `Your billing address` heading
    pub async fn verify_billing_address_heading(&self) -> ShopResult<()> {
        let expect = self.session.expect(&self.billing_address_heading);
        expect.to_be_visible().await?;
        expect
            .to_contain_text(&self.session.fixtures().checkout_texts.billing_address)
            .await
    }

    async fn verify_address_block(&self, block: &Locator, address: &AddressFixture) -> ShopResult<()> {
        let expect = self.session.expect(block);
        for (_, value) in address.fields() {
            expect.to_contain_text(value).await?;
        }
        Ok(())
    }

    /// Delivery block shows all six address fields
    pub async fn verify_delivery_address_details(&self) -> ShopResult<()> {
        self.verify_address_block(&self.delivery_address, &self.session.fixtures().address)
            .await
    }

    /// Billing block shows all six address fields
    pub async fn verify_billing_address_details(&self) -> ShopResult<()> {
        self.verify_address_block(&self.billing_address, &self.session.fixtures().address)
            .await
    }

    /// Headings and both address blocks
    pub async fn verify_all_address_details(&self) -> ShopResult<()> {
        self.verify_address_details_text().await?;
        self.verify_delivery_address_heading().await?;
        self.verify_billing_address_heading().await?;
        self.verify_delivery_address_details().await?;
        self.verify_billing_address_details().await
    }

    /// `Total Amount` is visible and every total reads like `Rs. 500`.
    ///
    /// Totals are not reconciled against row prices.
    pub async fn verify_total_amount_text_and_value(&self) -> ShopResult<()> {
        self.session
            .expect(&self.total_amount_heading)
            .to_be_visible()
            .await?;
        let amount = pattern(TOTAL_AMOUNT_PATTERN)?;
        let values = self.session.text_contents(&self.total_amount_values).await?;
        if values.is_empty() {
            return Err(ShopError::assertion(
                self.total_amount_values.to_string(),
                "at least 1 element",
                "0 elements",
            ));
        }
        for value in &values {
            if !amount.is_match(value) {
                return Err(ShopError::assertion(
                    self.total_amount_values.to_string(),
                    format!("text matching /{TOTAL_AMOUNT_PATTERN}/"),
                    format!("{:?}", value.trim()),
                ));
            }
        }
        info!(?values, "Verified order totals");
        Ok(())
    }

    /// Submit the order and move on to payment
    pub async fn click_place_order(&self) -> ShopResult<()> {
        self.session.click(&self.place_order_button).await?;
        self.session.settle(LoadState::DomContentLoaded).await
    }
}

impl PageObject for CheckoutPage<'_> {
    fn url_pattern(&self) -> &str {
        "/checkout"
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("address_details_heading", &self.address_details_heading),
            ("delivery_address_heading", &self.delivery_address_heading),
            ("billing_address_heading", &self.billing_address_heading),
            ("delivery_address", &self.delivery_address),
            ("billing_address", &self.billing_address),
            ("total_amount_heading", &self.total_amount_heading),
            ("total_amount_values", &self.total_amount_values),
            ("place_order_button", &self.place_order_button),
        ]
    }
}

//! Payment form, order confirmation and invoice download.

use super::PageObject;
use crate::locator::{AriaRole, Locator};
use crate::result::ShopResult;
use crate::session::{FlowStage, Session};
use crate::wait::LoadState;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::info;

/// Filename used when the browser suggests none
const FALLBACK_INVOICE_NAME: &str = "invoice.txt";

/// Card form and the order-placed view that follows it
#[derive(Debug)]
pub struct PaymentPage<'a> {
    session: &'a Session,
    /// `Payment`
    pub heading: Locator,
    /// `Name on Card`
    pub name_on_card_label: Locator,
    /// `Card Number`
    pub card_number_label: Locator,
    /// `CVC`
    pub cvc_label: Locator,
    /// `Expiration`
    pub expiration_label: Locator,
    /// Name on card
    pub name_on_card_input: Locator,
    /// Card number
    pub card_number_input: Locator,
    /// CVC
    pub cvc_input: Locator,
    /// Expiry month
    pub expiration_month_input: Locator,
    /// Expiry year
    pub expiration_year_input: Locator,
    /// `Pay and Confirm Order`
    pub pay_and_confirm_button: Locator,
    /// `Order Placed!`
    pub order_placed_heading: Locator,
    /// Confirmation message
    pub congratulations_message: Locator,
    /// `Download Invoice`
    pub download_invoice_link: Locator,
    /// `Continue`
    pub continue_button: Locator,
}

impl<'a> PaymentPage<'a> {
    /// Bind the page to `session`
    pub fn new(session: &'a Session) -> Self {
        let texts = &session.fixtures().payment_texts;
        let label = |text: &str| Locator::css("label").filter_has_text(text);
        Self {
            session,
            heading: Locator::css(".heading").filter_has_text(&texts.heading),
            name_on_card_label: label(&texts.name_on_card),
            card_number_label: label(&texts.card_number),
            cvc_label: label(&texts.cvc),
            expiration_label: label(&texts.expiration),
            name_on_card_input: Locator::css("input[name=\"name_on_card\"]"),
            card_number_input: Locator::css("input[name=\"card_number\"]"),
            cvc_input: Locator::css("input[name=\"cvc\"]"),
            expiration_month_input: Locator::css("input[name=\"expiry_month\"]"),
            expiration_year_input: Locator::css("input[name=\"expiry_year\"]"),
            pay_and_confirm_button: Locator::role(AriaRole::Button, &texts.pay_and_confirm),
            order_placed_heading: Locator::css("h2").filter_has_text(&texts.order_placed),
            congratulations_message: Locator::text(&texts.congratulations),
            download_invoice_link: Locator::role(AriaRole::Link, "Download Invoice"),
            continue_button: Locator::css("[data-qa=\"continue-button\"]"),
        }
    }

    /// Open `PAYMENT_URL`
    pub async fn navigate_to_payment(&self) -> ShopResult<()> {
        let url = self.session.env().payment_url.clone();
        self.session.goto(&url).await?;
        self.session.advance(FlowStage::CheckingOut)
    }

    async fn verify_labelled(&self, locator: &Locator, text: &str) -> ShopResult<()> {
        let expect = self.session.expect(locator);
        expect.to_be_visible().await?;
        expect.to_contain_text(text).await
    }

    /// `Payment` heading
    pub async fn verify_payment_heading(&self) -> ShopResult<()> {
        let texts = &self.session.fixtures().payment_texts;
        self.verify_labelled(&self.heading, &texts.heading).await
    }

    /// `Name on Card` label
    pub async fn verify_name_on_card_label(&self) -> ShopResult<()> {
        let texts = &self.session.fixtures().payment_texts;
        self.verify_labelled(&self.name_on_card_label, &texts.name_on_card)
            .await
    }

    /// `Card Number` label
    pub async fn verify_card_number_label(&self) -> ShopResult<()> {
        let texts = &self.session.fixtures().payment_texts;
        self.verify_labelled(&self.card_number_label, &texts.card_number)
            .await
    }

    /// `CVC` label
    pub async fn verify_cvc_label(&self) -> ShopResult<()> {
        let texts = &self.session.fixtures().payment_texts;
        self.verify_labelled(&self.cvc_label, &texts.cvc).await
    }

    /// `Expiration` label
    pub async fn verify_expiration_label(&self) -> ShopResult<()> {
        let texts = &self.session.fixtures().payment_texts;
        self.verify_labelled(&self.expiration_label, &texts.expiration)
            .await
    }

    /// `Pay and Confirm Order` button
    pub async fn verify_pay_and_confirm_button(&self) -> ShopResult<()> {
        let texts = &self.session.fixtures().payment_texts;
        self.verify_labelled(&self.pay_and_confirm_button, &texts.pay_and_confirm)
            .await
    }

    /// Heading, every label and the submit button
    pub async fn verify_all_payment_labels(&self) -> ShopResult<()> {
        self.verify_payment_heading().await?;
        self.verify_name_on_card_label().await?;
        self.verify_card_number_label().await?;
        self.verify_cvc_label().await?;
        self.verify_expiration_label().await?;
        self.verify_pay_and_confirm_button().await
    }

    /// Fill the card form from the payment fixture
    pub async fn enter_payment_details(&self) -> ShopResult<()> {
        let card = &self.session.fixtures().payment;
        self.session
            .fill(&self.name_on_card_input, &card.name_on_card)
            .await?;
        self.session
            .fill(&self.card_number_input, &card.card_number)
            .await?;
        self.session.fill(&self.cvc_input, &card.cvc).await?;
        self.session
            .fill(&self.expiration_month_input, &card.expiration_month)
            .await?;
        self.session
            .fill(&self.expiration_year_input, &card.expiration_year)
            .await
    }

    /// Submit the card form
    pub async fn click_pay_and_confirm_order(&self) -> ShopResult<()> {
        self.session.click(&self.pay_and_confirm_button).await?;
        self.session.settle(LoadState::DomContentLoaded).await?;
        self.session.advance(FlowStage::Paid)
    }

    /// `Order Placed!` and the confirmation message are visible
    pub async fn verify_order_placed(&self) -> ShopResult<()> {
        self.session
            .expect(&self.order_placed_heading)
            .to_be_visible()
            .await?;
        self.session
            .expect(&self.congratulations_message)
            .to_be_visible()
            .await?;
        info!("Order placed");
        Ok(())
    }

    /// Download the invoice into `dir` (created if absent) and return the
    /// saved path, `dir/<suggested filename>`
    pub async fn download_invoice(&self, dir: &Path) -> ShopResult<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let driver = self.session.driver();
        driver.arm_downloads(dir).await?;
        self.session.click(&self.download_invoice_link).await?;
        let download = driver
            .next_download(self.session.config().timeouts.download())
            .await?;

        let name = Path::new(&download.suggested_filename)
            .file_name()
            .map_or_else(|| OsString::from(FALLBACK_INVOICE_NAME), OsStr::to_os_string);
        let saved = download.save_as(&dir.join(name))?;
        info!(path = %saved.display(), url = %download.url, "Invoice downloaded");
        Ok(saved)
    }

    /// Leave the order-placed view
    pub async fn click_continue(&self) -> ShopResult<()> {
        self.session.click(&self.continue_button).await?;
        self.session.settle(LoadState::DomContentLoaded).await
    }
}

impl PageObject for PaymentPage<'_> {
    fn url_pattern(&self) -> &str {
        "/payment"
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("heading", &self.heading),
            ("name_on_card_label", &self.name_on_card_label),
            ("card_number_label", &self.card_number_label),
            ("cvc_label", &self.cvc_label),
            ("expiration_label", &self.expiration_label),
            ("name_on_card_input", &self.name_on_card_input),
            ("card_number_input", &self.card_number_input),
            ("cvc_input", &self.cvc_input),
            ("expiration_month_input", &self.expiration_month_input),
            ("expiration_year_input", &self.expiration_year_input),
            ("pay_and_confirm_button", &self.pay_and_confirm_button),
            ("order_placed_heading", &self.order_placed_heading),
            ("congratulations_message", &self.congratulations_message),
            ("download_invoice_link", &self.download_invoice_link),
            ("continue_button", &self.continue_button),
        ]
    }
}

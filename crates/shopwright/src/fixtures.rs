//! Static test data.
//!
//! Address and payment records used for comparison and form fill, plus the
//! literal UI texts the checkout and payment pages are expected to show.
//! Defaults can be overridden from the suite YAML (`fixtures:` section)
//! when the test account's stored address differs.

use serde::{Deserialize, Serialize};

/// Address stored on the test account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressFixture {
    /// Title, first and last name as rendered
    pub full_name: String,
    /// Company line
    pub company: String,
    /// First address line
    pub address1: String,
    /// City, state and zip as rendered on one line
    pub city_state_zip: String,
    /// Country
    pub country: String,
    /// Mobile number
    pub phone: String,
}

impl Default for AddressFixture {
    fn default() -> Self {
        Self {
            full_name: "Mr. Test Automation".to_string(),
            company: "Test Automation Co".to_string(),
            address1: "123 Automation Street".to_string(),
            city_state_zip: "Austin Texas 73301".to_string(),
            country: "United States".to_string(),
            phone: "5551234567".to_string(),
        }
    }
}

impl AddressFixture {
    /// All six fields with their names, in display order
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("full name", &self.full_name),
            ("company", &self.company),
            ("address", &self.address1),
            ("city/state/zip", &self.city_state_zip),
            ("country", &self.country),
            ("phone", &self.phone),
        ]
    }
}

/// Card details entered on the payment page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentFixture {
    /// Name on card
    pub name_on_card: String,
    /// Card number
    pub card_number: String,
    /// CVC
    pub cvc: String,
    /// Expiration month (`MM`)
    pub expiration_month: String,
    /// Expiration year (`YYYY`)
    pub expiration_year: String,
}

impl Default for PaymentFixture {
    fn default() -> Self {
        Self {
            name_on_card: "testautomation".to_string(),
            card_number: "4242424242424242".to_string(),
            cvc: "123".to_string(),
            expiration_month: "06".to_string(),
            expiration_year: "2029".to_string(),
        }
    }
}

/// Headings on the checkout page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutTexts {
    /// Section heading
    pub address_details: String,
    /// Delivery block heading
    pub delivery_address: String,
    /// Billing block heading
    pub billing_address: String,
}

impl Default for CheckoutTexts {
    fn default() -> Self {
        Self {
            address_details: "Address Details".to_string(),
            delivery_address: "Your delivery address".to_string(),
            billing_address: "Your billing address".to_string(),
        }
    }
}

/// Texts on the payment and order-placed pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentTexts {
    /// Page heading
    pub heading: String,
    /// Label over the name input
    pub name_on_card: String,
    /// Label over the card number input
    pub card_number: String,
    /// Label over the CVC input
    pub cvc: String,
    /// Label over the expiry inputs
    pub expiration: String,
    /// Submit button
    pub pay_and_confirm: String,
    /// Heading after the order went through
    pub order_placed: String,
    /// Confirmation message
    pub congratulations: String,
}

impl Default for PaymentTexts {
    fn default() -> Self {
        Self {
            heading: "Payment".to_string(),
            name_on_card: "Name on Card".to_string(),
            card_number: "Card Number".to_string(),
            cvc: "CVC".to_string(),
            expiration: "Expiration".to_string(),
            pay_and_confirm: "Pay and Confirm Order".to_string(),
            order_placed: "Order Placed!".to_string(),
            congratulations: "Congratulations! Your order has been confirmed!".to_string(),
        }
    }
}

/// Every fixture the suite reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSet {
    /// Account address (delivery and billing)
    pub address: AddressFixture,
    /// Card details
    pub payment: PaymentFixture,
    /// Checkout headings
    pub checkout_texts: CheckoutTexts,
    /// Payment page texts
    pub payment_texts: PaymentTexts,
}

//! Shared helpers for the integration tests.
//!
//! `storefront` models the whole site on a `MockDriver`, wired from the page
//! objects' own locators. `live_session` opens a real Chromium session
//! against the configured environment, or returns `None` (with a log line)
//! when nothing is configured or the browser is missing.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use shopwright::mock::{MockDriver, MockElement, Reaction};
use shopwright::pages::{CartPage, CheckoutPage, LoginPage, PaymentPage, ProductsPage, ViewCartPage};
use shopwright::{
    Credentials, Environment, LoginVerifier, Session, ShopResult, SuiteConfig, Timeouts,
    VerifyLoginResponse,
};
use std::sync::Arc;
use tempfile::TempDir;

pub const BASE: &str = "https://shop.test/";
pub const EMAIL: &str = "qa@example.com";
pub const PASSWORD: &str = "secret";
pub const DISPLAY_NAME: &str = "QA";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

pub fn credentials() -> Credentials {
    Credentials::new(EMAIL, PASSWORD, DISPLAY_NAME)
}

/// Accepts only the test account, like the real endpoint
#[derive(Debug, Default)]
pub struct FakeVerifier;

#[async_trait]
impl LoginVerifier for FakeVerifier {
    async fn verify(&self, email: &str, password: &str) -> ShopResult<VerifyLoginResponse> {
        let known = email == EMAIL && password == PASSWORD;
        VerifyLoginResponse {
            response_code: if known { 200 } else { 404 },
            message: if known { "User exists!" } else { "User not found!" }.to_string(),
        }
        .ensure_success()
    }
}

/// A mock storefront session
pub struct Storefront {
    pub driver: Arc<MockDriver>,
    pub session: Session,
    pub downloads: TempDir,
}

fn navigate(path: &str) -> Reaction {
    Reaction::Navigate(format!("{BASE}{path}"))
}

/// Site with `catalogue` listed on `/products` and `cart` already in the cart
pub fn storefront(catalogue: &[&str], cart: &[&str]) -> Storefront {
    let downloads = tempfile::tempdir().unwrap();
    let driver = Arc::new(MockDriver::new());
    let config = SuiteConfig {
        timeouts: Timeouts {
            expect_ms: 80,
            action_ms: 80,
            navigation_ms: 80,
            download_ms: 80,
            poll_interval_ms: 5,
        },
        ..SuiteConfig::default()
    }
    .with_downloads_dir(downloads.path().join("downloads"));
    let session = Session::new(driver.clone(), Environment::new(BASE), config)
        .with_verifier(Arc::new(FakeVerifier));

    login_pages(&driver, &session);
    cart_pages(&driver, &session, cart);
    product_pages(&driver, &session, catalogue);
    checkout_pages(&driver, &session);
    payment_pages(&driver, &session);

    Storefront {
        driver,
        session,
        downloads,
    }
}

fn login_pages(driver: &MockDriver, session: &Session) {
    let page = LoginPage::new(session);
    driver.add_element(&page.logo, "");
    driver.add_element(&page.signup_login_link, " Signup / Login");
    driver.on_click(&page.signup_login_link, vec![navigate("login")]);
    driver.add_element(&page.login_form_heading, "Login to your account");
    driver.add_element(&page.signup_form_heading, "New User Signup!");
    driver.add_element(&page.login_email_input, "");
    driver.add_element(&page.login_password_input, "");
    driver.add_element(&page.login_button, "Login");

    let marker = LoginPage::logged_in_marker(DISPLAY_NAME);
    driver.push_element(&marker, MockElement::hidden(format!(" Logged in as {DISPLAY_NAME}")));
    driver.on_click(
        &page.login_button,
        vec![Reaction::when_filled(
            &page.login_email_input,
            EMAIL,
            vec![Reaction::when_filled(
                &page.login_password_input,
                PASSWORD,
                vec![Reaction::show(&marker), navigate("")],
                vec![],
            )],
            vec![],
        )],
    );
}

fn cart_row(cart: &CartPage<'_>, name: &str) -> Vec<Reaction> {
    vec![
        Reaction::append(&cart.rows, MockElement::new(name)),
        Reaction::append(&cart.names, MockElement::new(name)),
        Reaction::append(&cart.prices, MockElement::new("Rs. 500")),
        Reaction::append(&cart.quantities, MockElement::new("1")),
        Reaction::append(&cart.totals, MockElement::new("Rs. 500")),
        Reaction::append(&cart.delete_buttons, MockElement::new("")),
        Reaction::hide(&cart.empty_cart_indicator),
    ]
}

fn cart_pages(driver: &MockDriver, session: &Session, items: &[&str]) {
    let cart = CartPage::new(session);
    driver.add_element(&cart.cart_link, " Cart");
    driver.on_click(&cart.cart_link, vec![navigate("view_cart")]);
    driver.push_element(
        &cart.empty_cart_indicator,
        if items.is_empty() {
            MockElement::new("Cart is empty!")
        } else {
            MockElement::hidden("Cart is empty!")
        },
    );
    for item in items {
        driver.add_element(&cart.rows, *item);
        driver.add_element(&cart.names, *item);
        driver.add_element(&cart.prices, "Rs. 500");
        driver.add_element(&cart.quantities, "1");
        driver.add_element(&cart.totals, "Rs. 500");
        driver.add_element(&cart.delete_buttons, "");
    }
    driver.on_click(
        &cart.delete_buttons,
        vec![
            Reaction::remove_clicked(&cart.delete_buttons),
            Reaction::remove_clicked(&cart.rows),
            Reaction::remove_clicked(&cart.names),
            Reaction::remove_clicked(&cart.prices),
            Reaction::remove_clicked(&cart.quantities),
            Reaction::remove_clicked(&cart.totals),
            Reaction::when_empty(&cart.rows, vec![Reaction::show(&cart.empty_cart_indicator)]),
        ],
    );

    let view = ViewCartPage::new(session);
    driver.add_element(&view.cart_table, "");
    driver.add_element(&view.header_row, "Item Description Price Quantity Total");
    driver.add_element(&view.proceed_to_checkout_button, "Proceed To Checkout");
    driver.on_click(&view.proceed_to_checkout_button, vec![navigate("checkout")]);
}

fn product_pages(driver: &MockDriver, session: &Session, catalogue: &[&str]) {
    let page = ProductsPage::new(session);
    let cart = CartPage::new(session);
    driver.add_element(&page.products_link, " Products");
    driver.on_click(&page.products_link, vec![navigate("products")]);
    driver.add_element(&page.all_products_title, "All Products");
    driver.add_element(&page.results_title, "Searched Products");
    driver.add_element(&page.search_input, "");
    driver.add_element(&page.search_button, "");

    for (i, name) in catalogue.iter().enumerate() {
        driver.add_element(&page.product_cards, *name);
        driver.add_element(&page.product_names, format!("{name}\n"));
        driver.add_element(&page.product_tiles, *name);
        let add = page.add_to_cart_control(i);
        driver.push_element(&add, MockElement::new("Add to cart").revealed_by(&page.tile(i)));
        let mut reactions = cart_row(&cart, name);
        reactions.push(Reaction::show(&page.modal));
        driver.on_click(&add, reactions);
    }

    driver.push_element(&page.modal, MockElement::hidden("Added!"));
    driver.add_element(&page.continue_shopping_button, "Continue Shopping");
    driver.on_click(&page.continue_shopping_button, vec![Reaction::hide(&page.modal)]);
    driver.add_element(&page.view_cart_link, "View Cart");
    driver.on_click(
        &page.view_cart_link,
        vec![Reaction::hide(&page.modal), navigate("view_cart")],
    );
}

fn checkout_pages(driver: &MockDriver, session: &Session) {
    let page = CheckoutPage::new(session);
    let address = &session.fixtures().address;
    let rendered = address
        .fields()
        .iter()
        .map(|(_, value)| *value)
        .collect::<Vec<_>>()
        .join("\n  ");
    driver.add_element(&page.address_details_heading, "Address Details");
    driver.add_element(&page.delivery_address_heading, "Your delivery address");
    driver.add_element(&page.billing_address_heading, "Your billing address");
    driver.add_element(&page.delivery_address, rendered.clone());
    driver.add_element(&page.billing_address, rendered);
    driver.add_element(&page.total_amount_heading, "Total Amount");
    driver.add_element(&page.total_amount_values, "Rs. 1000");
    driver.add_element(&page.place_order_button, "Place Order");
    driver.on_click(&page.place_order_button, vec![navigate("payment")]);
}

fn payment_pages(driver: &MockDriver, session: &Session) {
    let page = PaymentPage::new(session);
    let card = &session.fixtures().payment;
    driver.add_element(&page.heading, "Payment");
    driver.add_element(&page.name_on_card_label, "Name on Card");
    driver.add_element(&page.card_number_label, "Card Number");
    driver.add_element(&page.cvc_label, "CVC");
    driver.add_element(&page.expiration_label, "Expiration");
    for input in [
        &page.name_on_card_input,
        &page.card_number_input,
        &page.cvc_input,
        &page.expiration_month_input,
        &page.expiration_year_input,
    ] {
        driver.add_element(input, "");
    }
    driver.add_element(&page.pay_and_confirm_button, "Pay and Confirm Order");
    driver.push_element(&page.order_placed_heading, MockElement::hidden("Order Placed!"));
    driver.push_element(
        &page.congratulations_message,
        MockElement::hidden("Congratulations! Your order has been confirmed!"),
    );
    driver.push_element(&page.download_invoice_link, MockElement::hidden("Download Invoice"));
    driver.add_element(&page.continue_button, "Continue");
    driver.on_click(&page.continue_button, vec![navigate("")]);

    let confirmed = vec![
        navigate("payment_done/1000"),
        Reaction::show(&page.order_placed_heading),
        Reaction::show(&page.congratulations_message),
        Reaction::show(&page.download_invoice_link),
    ];
    driver.on_click(
        &page.pay_and_confirm_button,
        vec![Reaction::when_filled(
            &page.card_number_input,
            card.card_number.clone(),
            vec![Reaction::when_filled(
                &page.cvc_input,
                card.cvc.clone(),
                confirmed,
                vec![],
            )],
            vec![],
        )],
    );
    driver.on_click(
        &page.download_invoice_link,
        vec![Reaction::Download {
            filename: "invoice.txt".to_string(),
            url: format!("{BASE}download_invoice/1000"),
            contents: b"Hi Test Automation, Your total purchase amount is 1000. Thank you".to_vec(),
        }],
    );
}

/// Variables the live suite reads
pub const SUITE_VARS: [&str; 6] = [
    "USERNAME",
    "PASSWORD",
    "USER_DISPLAY_NAME",
    "BASE_URL",
    "CHECKOUT_URL",
    "PAYMENT_URL",
];

/// How much of the live environment is present
#[derive(Debug, PartialEq, Eq)]
pub enum SuiteEnv {
    /// No env file and none of the variables
    Absent,
    /// Some variables set, or an env file that leaves some unset
    Partial(Vec<&'static str>),
    /// Every variable set
    Complete,
}

pub fn suite_env(env_file_loaded: bool, lookup: impl Fn(&str) -> Option<String>) -> SuiteEnv {
    let missing: Vec<&'static str> = SUITE_VARS
        .iter()
        .copied()
        .filter(|name| lookup(name).map_or(true, |v| v.is_empty()))
        .collect();
    if missing.is_empty() {
        SuiteEnv::Complete
    } else if missing.len() == SUITE_VARS.len() && !env_file_loaded {
        SuiteEnv::Absent
    } else {
        SuiteEnv::Partial(missing)
    }
}

/// A Chromium session on the configured environment, or `None` when the
/// suite is not configured here at all or Chromium is missing.
///
/// A half-configured environment or an unreadable env file panics.
#[cfg(feature = "browser")]
pub async fn live_session() -> Option<(Session, Credentials)> {
    use shopwright::{load_env_file, ShopError};

    init_tracing();
    let env_file = load_env_file(None).unwrap_or_else(|e| panic!("env file unreadable: {e}"));
    match suite_env(env_file.is_some(), |name| std::env::var(name).ok()) {
        SuiteEnv::Absent => {
            tracing::warn!("skipping: no env file and no suite variables set");
            return None;
        }
        SuiteEnv::Partial(missing) => panic!("suite environment incomplete, missing {missing:?}"),
        SuiteEnv::Complete => {}
    }
    let env = Environment::from_env().unwrap_or_else(|e| panic!("{e}"));
    let credentials = Credentials::from_env().unwrap_or_else(|e| panic!("{e}"));
    let config = SuiteConfig::default()
        .with_downloads_dir(std::env::temp_dir().join("shopwright-downloads"));
    match Session::launch(config, env).await {
        Ok(session) => Some((session, credentials)),
        Err(e @ ShopError::BrowserLaunch { .. }) => {
            tracing::warn!(error = %e, "skipping: chromium unavailable");
            None
        }
        Err(e) => panic!("session launch failed: {e}"),
    }
}

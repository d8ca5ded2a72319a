//! End-to-end scenarios.
//!
//! Each scenario takes a fresh [`Session`], logs in through one of the
//! [`login`](crate::login) helpers and drives the page objects in order,
//! stopping at the first failed verification. The same flows back the
//! `*_spec` integration tests and the `shopwright run` command.

use crate::config::{Credentials, CredentialsOverride};
use crate::login::{login_via_ui, login_with_api_verification, quick_login};
use crate::pages::{CartPage, CheckoutPage, LoginPage, PaymentPage, ProductsPage, ViewCartPage};
use crate::result::ShopResult;
use crate::session::Session;
use futures::future::BoxFuture;
use tracing::info;

/// Term searched for in the search scenario
pub const SEARCH_TERM: &str = "Tops";

/// Term searched for before adding products to the cart
pub const CART_SEARCH_TERM: &str = "Top";

/// Scenario entry point
pub type ScenarioFn =
    for<'a> fn(&'a Session, &'a Credentials) -> BoxFuture<'a, ShopResult<()>>;

/// A named end-to-end flow
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Name used on the command line and in reports
    pub name: &'static str,
    /// One-line summary
    pub description: &'static str,
    /// The flow
    pub run: ScenarioFn,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Every scenario, in suite order
#[must_use]
pub fn all() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "login",
            description: "Log in from the home page and see the display name",
            run: |s, c| Box::pin(login(s, c)),
        },
        Scenario {
            name: "search_products",
            description: "Search the catalogue and see matching products",
            run: |s, c| Box::pin(search_products(s, c)),
        },
        Scenario {
            name: "add_products_to_cart",
            description: "Add two searched products and verify the cart rows",
            run: |s, c| Box::pin(add_products_to_cart(s, c)),
        },
        Scenario {
            name: "view_cart",
            description: "Check the cart table headers and proceed to checkout",
            run: |s, c| Box::pin(view_cart(s, c)),
        },
        Scenario {
            name: "checkout",
            description: "Verify delivery and billing addresses and totals, then place the order",
            run: |s, c| Box::pin(checkout(s, c)),
        },
        Scenario {
            name: "payment",
            description: "Pay by card, confirm the order and download the invoice",
            run: |s, c| Box::pin(payment(s, c)),
        },
    ]
}

/// Look a scenario up by name
#[must_use]
pub fn find(name: &str) -> Option<Scenario> {
    all().into_iter().find(|scenario| scenario.name == name)
}

/// Home page, header checks, login form, `Logged in as`
pub async fn login(session: &Session, credentials: &Credentials) -> ShopResult<()> {
    let page = LoginPage::new(session);
    page.navigate().await?;
    page.verify_logo_visible().await?;
    page.verify_signup_login_link_visible().await?;
    page.go_to_login_page().await?;
    page.verify_login_page_loaded().await?;
    page.login(&credentials.username, &credentials.password)
        .await?;
    page.verify_logged_in_as(&credentials.display_name).await
}

/// Search for [`SEARCH_TERM`] and see results
pub async fn search_products(session: &Session, credentials: &Credentials) -> ShopResult<()> {
    login_with_api_verification(session, &CredentialsOverride::from(credentials.clone())).await?;

    let products = ProductsPage::new(session);
    products.click_on_products_button().await?;
    products.verify_all_products_page_visible().await?;
    products.search_product(SEARCH_TERM).await?;
    products.verify_searched_products_title_visible().await?;
    products
        .verify_search_results_contain_product(SEARCH_TERM)
        .await?;
    Ok(())
}

/// Add the first two search results and verify the cart
pub async fn add_products_to_cart(session: &Session, credentials: &Credentials) -> ShopResult<()> {
    login_with_api_verification(session, &CredentialsOverride::from(credentials.clone())).await?;

    let cart = CartPage::new(session);
    cart.clear_cart().await?;

    let products = ProductsPage::new(session);
    products.click_on_products_button().await?;
    products.verify_all_products_page_visible().await?;
    products.search_product(CART_SEARCH_TERM).await?;
    products.verify_searched_products_title_visible().await?;
    products
        .verify_search_results_contain_product(CART_SEARCH_TERM)
        .await?;

    let first = products.get_product_name(0).await?;
    let second = products.get_product_name(1).await?;
    info!(%first, %second, "Adding products");

    products.hover_and_add_to_cart(0).await?;
    products.click_continue_shopping().await?;
    products.hover_and_add_to_cart(1).await?;
    products.click_view_cart().await?;

    cart.verify_cart_page_visible().await?;
    cart.verify_product_count_in_cart(2).await?;
    cart.verify_products_in_cart(&[first, second]).await?;
    cart.verify_cart_product_details().await?;
    Ok(())
}

/// Cart table headers, then on to checkout
pub async fn view_cart(session: &Session, credentials: &Credentials) -> ShopResult<()> {
    quick_login(session, &CredentialsOverride::from(credentials.clone())).await?;

    let page = ViewCartPage::new(session);
    page.navigate().await?;
    page.verify_cart_table_headers().await?;
    page.click_proceed_to_checkout().await
}

/// Address blocks and totals on checkout, then place the order
pub async fn checkout(session: &Session, credentials: &Credentials) -> ShopResult<()> {
    login_via_ui(session, &CredentialsOverride::from(credentials.clone())).await?;

    let page = CheckoutPage::new(session);
    page.navigate_to_checkout().await?;
    page.verify_all_address_details().await?;
    page.verify_total_amount_text_and_value().await?;
    page.click_place_order().await
}

/// Card payment, confirmation and invoice download
pub async fn payment(session: &Session, credentials: &Credentials) -> ShopResult<()> {
    login_via_ui(session, &CredentialsOverride::from(credentials.clone())).await?;

    let page = PaymentPage::new(session);
    page.navigate_to_payment().await?;
    page.verify_all_payment_labels().await?;
    page.enter_payment_details().await?;
    page.click_pay_and_confirm_order().await?;
    page.verify_order_placed().await?;
    page.download_invoice(&session.config().downloads_dir)
        .await?;
    Ok(())
}

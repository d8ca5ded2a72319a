//! Cart contents on `/view_cart`.

use super::PageObject;
use crate::expect::pattern;
use crate::locator::{AriaRole, Locator};
use crate::result::{ShopError, ShopResult};
use crate::session::Session;
use crate::wait::LoadState;
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// One cart row as rendered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRow {
    /// Product name
    pub name: String,
    /// Unit price (`Rs. 500`)
    pub price: String,
    /// Quantity
    pub quantity: String,
    /// Row total
    pub total: String,
}

impl CartRow {
    /// Whether price, quantity and total are all present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.price.is_empty() && !self.quantity.is_empty() && !self.total.is_empty()
    }
}

/// Cart rows scraped at one point in time.
///
/// Rebuilt on every query; never reused after the cart changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Rows in table order
    pub rows: Vec<CartRow>,
}

impl CartSnapshot {
    /// Zip the scraped columns by row; a missing cell becomes empty.
    #[must_use]
    pub fn from_columns(
        names: &[String],
        prices: &[String],
        quantities: &[String],
        totals: &[String],
    ) -> Self {
        let cell = |column: &[String], i: usize| {
            column
                .get(i)
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };
        let rows = names
            .iter()
            .enumerate()
            .map(|(i, name)| CartRow {
                name: name.trim().to_string(),
                price: cell(prices, i),
                quantity: cell(quantities, i),
                total: cell(totals, i),
            })
            .collect();
        Self { rows }
    }

    /// Number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether any row name contains `name`, ignoring case
    #[must_use]
    pub fn contains_product(&self, name: &str) -> bool {
        let needle = name.to_lowercase();
        self.rows
            .iter()
            .any(|row| row.name.to_lowercase().contains(&needle))
    }

    /// Product names in table order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.name.as_str()).collect()
    }

    /// Rows missing a price, quantity or total
    #[must_use]
    pub fn incomplete_rows(&self) -> Vec<&CartRow> {
        self.rows.iter().filter(|row| !row.is_complete()).collect()
    }
}

// =============================================================================
// PAGE
// =============================================================================

/// The cart table and its controls
#[derive(Debug)]
pub struct CartPage<'a> {
    session: &'a Session,
    /// Header ` Cart` link
    pub cart_link: Locator,
    /// Product rows
    pub rows: Locator,
    /// Product names
    pub names: Locator,
    /// Unit prices
    pub prices: Locator,
    /// Quantities
    pub quantities: Locator,
    /// Row totals
    pub totals: Locator,
    /// Shown once the cart is empty
    pub empty_cart_indicator: Locator,
    /// Per-row delete controls
    pub delete_buttons: Locator,
}

impl<'a> CartPage<'a> {
    /// Bind the page to `session`
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            cart_link: Locator::role(AriaRole::Link, " Cart"),
            rows: Locator::css("#cart_info_table tbody tr"),
            names: Locator::css("#cart_info_table tbody tr .cart_description h4 a"),
            prices: Locator::css("#cart_info_table tbody tr .cart_price p"),
            quantities: Locator::css("#cart_info_table tbody tr .cart_quantity button"),
            totals: Locator::css("#cart_info_table tbody tr .cart_total p"),
            empty_cart_indicator: Locator::css("#empty_cart"),
            delete_buttons: Locator::css(".cart_quantity_delete"),
        }
    }

    /// Remove every product from the cart.
    ///
    /// Clicks the first delete control until no rows remain, re-resolving it
    /// after each removal. Resets the session's flow to `Authenticated`.
    pub async fn clear_cart(&self) -> ShopResult<()> {
        self.session.goto("/view_cart").await?;
        self.session.settle(LoadState::DomContentLoaded).await?;

        let count = self.session.count(&self.rows).await?;
        if count == 0 {
            info!("Cart is already empty");
        } else {
            info!(count, "Clearing products from cart");
            let first_delete = self.delete_buttons.clone().first();
            for remaining in (0..count).rev() {
                self.session.click(&first_delete).await?;
                self.session
                    .expect(&self.rows)
                    .to_have_count(remaining)
                    .await?;
            }
            info!("Cart cleared");
        }

        self.session
            .expect(&self.empty_cart_indicator)
            .to_be_visible()
            .await?;
        self.session.reset_to_authenticated()
    }

    /// Follow the header ` Cart` link
    pub async fn click_on_cart_button(&self) -> ShopResult<()> {
        self.session.click(&self.cart_link).await?;
        self.session.settle(LoadState::DomContentLoaded).await
    }

    /// URL matches `view_cart`
    pub async fn verify_cart_page_visible(&self) -> ShopResult<()> {
        self.session
            .expect_url()
            .to_match(&pattern("view_cart")?)
            .await
    }

    /// Exactly `expected` rows
    pub async fn verify_product_count_in_cart(&self, expected: usize) -> ShopResult<()> {
        self.session
            .expect(&self.rows)
            .to_have_count(expected)
            .await?;
        info!(expected, "Verified products in cart");
        Ok(())
    }

    /// Every name in `product_names` appears in some row (case-insensitive
    /// substring)
    pub async fn verify_products_in_cart<S: AsRef<str>>(
        &self,
        product_names: &[S],
    ) -> ShopResult<()> {
        let snapshot = self.get_cart_product_details().await?;
        info!(names = ?snapshot.names(), "Products in cart");
        for name in product_names {
            let name = name.as_ref();
            if !snapshot.contains_product(name) {
                return Err(ShopError::assertion(
                    self.names.to_string(),
                    format!("a row containing {name:?}"),
                    format!("{:?}", snapshot.names()),
                ));
            }
        }
        Ok(())
    }

    /// Scrape the cart table
    pub async fn get_cart_product_details(&self) -> ShopResult<CartSnapshot> {
        let names = self.session.text_contents(&self.names).await?;
        let prices = self.session.text_contents(&self.prices).await?;
        let quantities = self.session.text_contents(&self.quantities).await?;
        let totals = self.session.text_contents(&self.totals).await?;
        let snapshot = CartSnapshot::from_columns(&names, &prices, &quantities, &totals);
        info!(rows = ?snapshot.rows, "Cart product details");
        Ok(snapshot)
    }

    /// Every row shows a price, quantity and total
    pub async fn verify_cart_product_details(&self) -> ShopResult<CartSnapshot> {
        let snapshot = self.get_cart_product_details().await?;
        if let Some(row) = snapshot.incomplete_rows().first() {
            return Err(ShopError::assertion(
                self.rows.to_string(),
                format!("price, quantity and total for {:?}", row.name),
                format!(
                    "price {:?}, quantity {:?}, total {:?}",
                    row.price, row.quantity, row.total
                ),
            ));
        }
        for row in &snapshot.rows {
            info!(
                product = %row.name,
                price = %row.price,
                quantity = %row.quantity,
                total = %row.total,
                "cart row"
            );
        }
        Ok(snapshot)
    }
}

impl PageObject for CartPage<'_> {
    fn url_pattern(&self) -> &str {
        "/view_cart"
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("cart_link", &self.cart_link),
            ("rows", &self.rows),
            ("names", &self.names),
            ("prices", &self.prices),
            ("quantities", &self.quantities),
            ("totals", &self.totals),
            ("empty_cart_indicator", &self.empty_cart_indicator),
            ("delete_buttons", &self.delete_buttons),
        ]
    }
}

//! `/products` listing, search and the add-to-cart modal.

use super::PageObject;
use crate::expect::pattern;
use crate::locator::{AriaRole, Locator};
use crate::result::{ShopError, ShopResult};
use crate::session::{FlowStage, Session};
use crate::wait::LoadState;
use std::time::Duration;
use tracing::info;

/// Product listing and search results
#[derive(Debug)]
pub struct ProductsPage<'a> {
    session: &'a Session,
    /// Header ` Products` link
    pub products_link: Locator,
    /// `All Products` heading
    pub all_products_title: Locator,
    /// `Searched Products` heading
    pub searched_products_title: Locator,
    /// Listing title, whichever heading is shown
    pub results_title: Locator,
    /// Search input
    pub search_input: Locator,
    /// Search submit
    pub search_button: Locator,
    /// Product cards
    pub product_cards: Locator,
    /// Product names inside the cards
    pub product_names: Locator,
    /// Hoverable product tiles
    pub product_tiles: Locator,
    /// Add-to-cart confirmation modal
    pub modal: Locator,
    /// `Continue Shopping` in the modal
    pub continue_shopping_button: Locator,
    /// `View Cart` in the modal
    pub view_cart_link: Locator,
}

impl<'a> ProductsPage<'a> {
    /// Bind the page to `session`
    pub fn new(session: &'a Session) -> Self {
        let listing = Locator::css(".features_items");
        Self {
            session,
            products_link: Locator::role(AriaRole::Link, " Products"),
            all_products_title: listing.get_by_role(AriaRole::Heading, "All Products"),
            searched_products_title: listing.get_by_role(AriaRole::Heading, "Searched Products"),
            results_title: Locator::css(".features_items h2.title")
                .with_timeout(Duration::from_secs(10)),
            search_input: Locator::css("#search_product"),
            search_button: Locator::css("#submit_search"),
            product_cards: Locator::css(".features_items .productinfo"),
            product_names: Locator::css(".features_items .productinfo p"),
            product_tiles: Locator::css(".features_items .product-image-wrapper"),
            modal: Locator::css(".modal-content"),
            continue_shopping_button: Locator::role(AriaRole::Button, "Continue Shopping"),
            view_cart_link: Locator::css(".modal-body a[href=\"/view_cart\"]"),
        }
    }

    /// The tile at `index`
    pub fn tile(&self, index: usize) -> Locator {
        self.product_tiles.clone().nth(index)
    }

    /// The overlay `Add to cart` control revealed by hovering the tile at `index`
    pub fn add_to_cart_control(&self, index: usize) -> Locator {
        self.tile(index).locator(".overlay-content .add-to-cart")
    }

    /// Follow the header link to `/products`
    pub async fn click_on_products_button(&self) -> ShopResult<()> {
        self.session.click(&self.products_link).await?;
        self.session.settle(LoadState::DomContentLoaded).await?;
        self.session.advance(FlowStage::Browsing)
    }

    /// URL matches `/products` and the `All Products` heading is visible
    pub async fn verify_all_products_page_visible(&self) -> ShopResult<()> {
        self.session.expect_url().to_match(&pattern("products")?).await?;
        self.session
            .expect(&self.all_products_title)
            .to_be_visible()
            .await
    }

    /// Search for `product_name` and wait for the listing to re-render
    pub async fn search_product(&self, product_name: &str) -> ShopResult<()> {
        self.session.fill(&self.search_input, product_name).await?;
        self.session.click(&self.search_button).await?;
        self.session.settle(LoadState::DomContentLoaded).await?;
        self.session.expect(&self.results_title).to_be_visible().await
    }

    /// The listing title reads `Searched Products` (or `All Products` when
    /// the site falls back to the full listing)
    pub async fn verify_searched_products_title_visible(&self) -> ShopResult<()> {
        let expect = self.session.expect(&self.results_title);
        expect.to_be_visible().await?;
        expect
            .to_match_text(&pattern("Searched Products|All Products")?)
            .await
    }

    /// At least one card is shown for `search_term`; returns the names
    pub async fn verify_search_results_contain_product(
        &self,
        search_term: &str,
    ) -> ShopResult<Vec<String>> {
        let count = self.verify_products_are_visible().await?;
        info!(count, search_term, "Found products for search term");
        let names: Vec<String> = self
            .session
            .text_contents(&self.product_names)
            .await?
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        info!(?names, "Products found");
        Ok(names)
    }

    /// At least one card is visible; returns the card count
    pub async fn verify_products_are_visible(&self) -> ShopResult<usize> {
        self.session
            .expect(&self.product_cards.clone().first())
            .to_be_visible()
            .await?;
        let count = self.session.count(&self.product_cards).await?;
        if count == 0 {
            return Err(ShopError::assertion(
                self.product_cards.to_string(),
                "at least 1 element",
                "0 elements",
            ));
        }
        info!(count, "products are visible on the page");
        Ok(count)
    }

    /// Hover the tile at `index` to reveal its overlay, then add it to the
    /// cart and wait for the confirmation modal.
    pub async fn hover_and_add_to_cart(&self, index: usize) -> ShopResult<()> {
        let tile = self.tile(index);
        self.session.hover(&tile).await?;

        let add = self.add_to_cart_control(index);
        self.session.expect(&add).to_be_visible().await?;
        self.session.click(&add).await?;

        self.session.expect(&self.modal).to_be_visible().await?;
        self.session.advance(FlowStage::CartPopulated)
    }

    /// Dismiss the modal and wait for it to close
    pub async fn click_continue_shopping(&self) -> ShopResult<()> {
        self.session.click(&self.continue_shopping_button).await?;
        self.session.expect(&self.modal).to_be_hidden().await
    }

    /// Follow the modal's `View Cart` link
    pub async fn click_view_cart(&self) -> ShopResult<()> {
        self.session.click(&self.view_cart_link).await?;
        self.session.settle(LoadState::DomContentLoaded).await
    }

    /// Trimmed name of the product at `index`, empty if there is none
    pub async fn get_product_name(&self, index: usize) -> ShopResult<String> {
        let names = self
            .session
            .text_contents(&self.product_names.clone().nth(index))
            .await?;
        Ok(names
            .first()
            .map(|name| name.trim().to_string())
            .unwrap_or_default())
    }
}

impl PageObject for ProductsPage<'_> {
    fn url_pattern(&self) -> &str {
        "/products"
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("products_link", &self.products_link),
            ("all_products_title", &self.all_products_title),
            ("searched_products_title", &self.searched_products_title),
            ("results_title", &self.results_title),
            ("search_input", &self.search_input),
            ("search_button", &self.search_button),
            ("product_cards", &self.product_cards),
            ("product_names", &self.product_names),
            ("product_tiles", &self.product_tiles),
            ("modal", &self.modal),
            ("continue_shopping_button", &self.continue_shopping_button),
            ("view_cart_link", &self.view_cart_link),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement, Reaction};
    use crate::pages::mock_session;
    use crate::session::Session;
    use std::sync::Arc;

    fn logged_in() -> (Arc<MockDriver>, Session) {
        let (driver, session) = mock_session();
        session.begin_authentication().unwrap();
        session.complete_authentication("QA").unwrap();
        (driver, session)
    }

    fn listing(driver: &MockDriver, page: &ProductsPage<'_>, names: &[&str]) {
        for (i, name) in names.iter().enumerate() {
            driver.add_element(&page.product_cards, *name);
            driver.add_element(&page.product_names, format!("  {name} "));
            driver.add_element(&page.product_tiles, *name);
            let add = page.add_to_cart_control(i);
            driver.push_element(&add, MockElement::new("Add to cart").revealed_by(&page.tile(i)));
            driver.on_click(&add, vec![Reaction::show(&page.modal)]);
        }
        driver.push_element(&page.modal, MockElement::hidden("Added!"));
        driver.add_element(&page.continue_shopping_button, "Continue Shopping");
        driver.on_click(&page.continue_shopping_button, vec![Reaction::hide(&page.modal)]);
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_products_page_visible() {
            let (driver, session) = logged_in();
            let page = ProductsPage::new(&session);
            driver.add_element(&page.products_link, " Products");
            driver.on_click(
                &page.products_link,
                vec![Reaction::Navigate("https://shop.test/products".to_string())],
            );
            driver.add_element(&page.all_products_title, "All Products");

            page.click_on_products_button().await.unwrap();
            page.verify_all_products_page_visible().await.unwrap();
            assert_eq!(session.stage(), FlowStage::Browsing);
        }

        #[tokio::test]
        async fn test_wrong_url_fails() {
            let (driver, session) = logged_in();
            let page = ProductsPage::new(&session);
            driver.add_element(&page.all_products_title, "All Products");
            let err = page.verify_all_products_page_visible().await.unwrap_err();
            assert!(err.to_string().contains("page url"));
        }

        #[tokio::test]
        async fn test_browsing_requires_login() {
            let (driver, session) = mock_session();
            let page = ProductsPage::new(&session);
            driver.add_element(&page.products_link, " Products");
            assert!(page.click_on_products_button().await.is_err());
        }
    }

    mod search_tests {
        use super::*;

        #[tokio::test]
        async fn test_search_fills_and_waits_for_title() {
            let (driver, session) = logged_in();
            let page = ProductsPage::new(&session);
            driver.add_element(&page.search_input, "");
            driver.add_element(&page.search_button, "");
            driver.add_element(&page.results_title, "Searched Products");

            page.search_product("Tops").await.unwrap();
            page.verify_searched_products_title_visible().await.unwrap();
            assert_eq!(driver.filled(&page.search_input).as_deref(), Some("Tops"));
        }

        #[tokio::test]
        async fn test_all_products_title_accepted() {
            let (driver, session) = logged_in();
            let page = ProductsPage::new(&session);
            driver.add_element(&page.results_title, "All Products");
            page.verify_searched_products_title_visible().await.unwrap();
        }

        #[tokio::test]
        async fn test_other_title_rejected() {
            let (driver, session) = logged_in();
            let page = ProductsPage::new(&session);
            driver.add_element(&page.results_title, "Brands");
            assert!(page.verify_searched_products_title_visible().await.is_err());
        }

        #[tokio::test]
        async fn test_results_return_trimmed_names() {
            let (driver, session) = logged_in();
            let page = ProductsPage::new(&session);
            listing(&driver, &page, &["Blue Top", "Summer White Top"]);
            let names = page.verify_search_results_contain_product("Top").await.unwrap();
            assert_eq!(names, vec!["Blue Top", "Summer White Top"]);
            assert_eq!(page.get_product_name(1).await.unwrap(), "Summer White Top");
            assert_eq!(page.get_product_name(9).await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_empty_results_fail() {
            let (_, session) = logged_in();
            let page = ProductsPage::new(&session);
            let err = page.verify_products_are_visible().await.unwrap_err();
            assert!(err.is_verification_failure());
        }
    }

    mod cart_modal_tests {
        use super::*;

        #[tokio::test]
        async fn test_hover_then_add_opens_modal() {
            let (driver, session) = logged_in();
            let page = ProductsPage::new(&session);
            listing(&driver, &page, &["Blue Top", "Men Tshirt"]);

            page.hover_and_add_to_cart(1).await.unwrap();

            let history = driver.history();
            let hover = history.iter().position(|c| c.starts_with("hover:")).unwrap();
            let click = history.iter().position(|c| c.starts_with("click:")).unwrap();
            assert!(hover < click);
            assert!(history[hover].ends_with("nth=1"));
            assert!(session.is_visible(&page.modal).await.unwrap());
            assert_eq!(session.stage(), FlowStage::CartPopulated);
        }

        #[tokio::test]
        async fn test_add_without_hover_is_not_actionable() {
            let (driver, session) = logged_in();
            let page = ProductsPage::new(&session);
            listing(&driver, &page, &["Blue Top"]);
            let err = session.click(&page.add_to_cart_control(0)).await.unwrap_err();
            assert!(matches!(err, ShopError::Timeout { .. }));
        }

        #[tokio::test]
        async fn test_continue_shopping_closes_modal() {
            let (driver, session) = logged_in();
            let page = ProductsPage::new(&session);
            listing(&driver, &page, &["Blue Top"]);
            page.hover_and_add_to_cart(0).await.unwrap();
            page.click_continue_shopping().await.unwrap();
            assert!(!session.is_visible(&page.modal).await.unwrap());
        }
    }
}

//! Mock driver for unit testing.
//!
//! An in-memory page model keyed by [`Locator::key`]. Each key holds an
//! ordered list of [`MockElement`]s; a trailing pick (`first`, `nth`,
//! `last`) selects among them just as it would in the DOM. Clicks run
//! scripted [`Reaction`]s so multi-step flows (login, add to cart, delete
//! rows, download) can be exercised without a browser.

use crate::driver::{BrowserDriver, Download};
use crate::locator::Locator;
use crate::result::{ShopError, ShopResult};
use crate::storage::StorageState;
use crate::wait::{LoadState, WaitOptions};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One element in the mock page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Text content
    pub text: String,
    /// Rendered and non-empty
    pub visible: bool,
    /// Only visible while this locator description is hovered
    pub hover_gate: Option<String>,
}

impl MockElement {
    /// A visible element
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: true,
            hover_gate: None,
        }
    }

    /// An attached but hidden element
    #[must_use]
    pub fn hidden(text: impl Into<String>) -> Self {
        Self {
            visible: false,
            ..Self::new(text)
        }
    }

    /// Only visible while `trigger` is hovered
    #[must_use]
    pub fn revealed_by(mut self, trigger: &Locator) -> Self {
        self.hover_gate = Some(trigger.to_string());
        self
    }
}

/// What a click does to the mock page
#[derive(Debug, Clone)]
pub enum Reaction {
    /// Change the current URL
    Navigate(String),
    /// Make every element under the key visible
    Show(String),
    /// Hide every element under the key
    Hide(String),
    /// Remove the element at the clicked index from the key's list
    RemoveClicked(String),
    /// Append an element to the key's list
    Append(String, MockElement),
    /// Run `then` once the key's list is empty
    WhenEmpty {
        /// Watched key
        key: String,
        /// Reactions to run
        then: Vec<Reaction>,
    },
    /// Branch on a previously filled value
    WhenFilled {
        /// Input key
        key: String,
        /// Expected value
        value: String,
        /// Reactions when the value matches
        then: Vec<Reaction>,
        /// Reactions otherwise
        otherwise: Vec<Reaction>,
    },
    /// Emit a download into the armed directory
    Download {
        /// Suggested filename
        filename: String,
        /// Source URL
        url: String,
        /// File contents
        contents: Vec<u8>,
    },
}

impl Reaction {
    /// Show the elements under `locator`
    #[must_use]
    pub fn show(locator: &Locator) -> Self {
        Self::Show(locator.key())
    }

    /// Hide the elements under `locator`
    #[must_use]
    pub fn hide(locator: &Locator) -> Self {
        Self::Hide(locator.key())
    }

    /// Remove the clicked index from `locator`'s list
    #[must_use]
    pub fn remove_clicked(locator: &Locator) -> Self {
        Self::RemoveClicked(locator.key())
    }

    /// Append to `locator`'s list
    #[must_use]
    pub fn append(locator: &Locator, element: MockElement) -> Self {
        Self::Append(locator.key(), element)
    }

    /// Run `then` once `locator` has no elements
    #[must_use]
    pub fn when_empty(locator: &Locator, then: Vec<Self>) -> Self {
        Self::WhenEmpty {
            key: locator.key(),
            then,
        }
    }

    /// Branch on the value filled into `locator`
    #[must_use]
    pub fn when_filled(
        locator: &Locator,
        value: impl Into<String>,
        then: Vec<Self>,
        otherwise: Vec<Self>,
    ) -> Self {
        Self::WhenFilled {
            key: locator.key(),
            value: value.into(),
            then,
            otherwise,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    url: String,
    elements: HashMap<String, Vec<MockElement>>,
    reactions: HashMap<String, Vec<Reaction>>,
    values: HashMap<String, String>,
    hovered: Option<String>,
    history: Vec<String>,
    download_dir: Option<PathBuf>,
    downloads: VecDeque<Download>,
    storage: StorageState,
    closed: bool,
}

impl MockState {
    fn is_shown(&self, element: &MockElement) -> bool {
        element.visible
            && element
                .hover_gate
                .as_ref()
                .map_or(true, |gate| self.hovered.as_ref() == Some(gate))
    }

    /// Elements matched by `locator` with their index in the key's list
    fn resolve(&self, locator: &Locator) -> Vec<(usize, MockElement)> {
        let all: Vec<(usize, MockElement)> = self
            .elements
            .get(&locator.key())
            .map(|list| list.iter().cloned().enumerate().collect())
            .unwrap_or_default();
        match locator.trailing_pick() {
            Some(pick) => pick.apply(&all).to_vec(),
            None => all,
        }
    }

    fn actionable(&self, locator: &Locator, wait: WaitOptions) -> ShopResult<usize> {
        match self.resolve(locator).first() {
            Some((index, element)) if self.is_shown(element) => Ok(*index),
            _ => Err(ShopError::Timeout {
                ms: wait.timeout_ms,
                waited_for: format!("{locator} to be visible"),
            }),
        }
    }

    fn apply(&mut self, reactions: &[Reaction], clicked: usize) -> ShopResult<()> {
        for reaction in reactions {
            match reaction {
                Reaction::Navigate(url) => self.url.clone_from(url),
                Reaction::Show(key) => self.set_visible(key, true),
                Reaction::Hide(key) => self.set_visible(key, false),
                Reaction::RemoveClicked(key) => {
                    if let Some(list) = self.elements.get_mut(key) {
                        if clicked < list.len() {
                            list.remove(clicked);
                        }
                    }
                }
                Reaction::Append(key, element) => {
                    self.elements
                        .entry(key.clone())
                        .or_default()
                        .push(element.clone());
                }
                Reaction::WhenEmpty { key, then } => {
                    if self.elements.get(key).map_or(true, Vec::is_empty) {
                        self.apply(then, clicked)?;
                    }
                }
                Reaction::WhenFilled {
                    key,
                    value,
                    then,
                    otherwise,
                } => {
                    let branch = if self.values.get(key) == Some(value) {
                        then
                    } else {
                        otherwise
                    };
                    self.apply(branch, clicked)?;
                }
                Reaction::Download {
                    filename,
                    url,
                    contents,
                } => {
                    let dir = self.download_dir.clone().ok_or_else(|| ShopError::Download {
                        message: "download started before capture was armed".to_string(),
                    })?;
                    let path = dir.join(uuid::Uuid::new_v4().to_string());
                    std::fs::write(&path, contents)?;
                    self.downloads
                        .push_back(Download::new(filename.clone(), url.clone(), path));
                }
            }
        }
        Ok(())
    }

    fn set_visible(&mut self, key: &str, visible: bool) {
        if let Some(list) = self.elements.get_mut(key) {
            for element in list {
                element.visible = visible;
            }
        }
    }
}

/// Mock driver for unit testing
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at `url`
    #[must_use]
    pub fn with_url(self, url: impl Into<String>) -> Self {
        self.state().url = url.into();
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the elements matched by `locator`
    pub fn set_elements(&self, locator: &Locator, elements: Vec<MockElement>) {
        self.state().elements.insert(locator.key(), elements);
    }

    /// Add a single visible element with `text`
    pub fn add_element(&self, locator: &Locator, text: impl Into<String>) {
        self.push_element(locator, MockElement::new(text));
    }

    /// Append an element to `locator`'s list
    pub fn push_element(&self, locator: &Locator, element: MockElement) {
        self.state()
            .elements
            .entry(locator.key())
            .or_default()
            .push(element);
    }

    /// Register reactions for clicks on `locator`
    pub fn on_click(&self, locator: &Locator, reactions: Vec<Reaction>) {
        self.state()
            .reactions
            .entry(locator.key())
            .or_default()
            .extend(reactions);
    }

    /// Set mock storage state
    pub fn set_storage_state(&self, storage: StorageState) {
        self.state().storage = storage;
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state().history.iter().any(|c| c.starts_with(method))
    }

    /// Value last filled into `locator`
    #[must_use]
    pub fn filled(&self, locator: &Locator) -> Option<String> {
        self.state().values.get(&locator.key()).cloned()
    }

    /// Description of the last hovered locator
    #[must_use]
    pub fn hovered(&self) -> Option<String> {
        self.state().hovered.clone()
    }

    /// Current URL
    #[must_use]
    pub fn url(&self) -> String {
        self.state().url.clone()
    }

    /// Number of elements currently under `locator`
    #[must_use]
    pub fn element_count(&self, locator: &Locator) -> usize {
        self.state().resolve(locator).len()
    }

    /// Whether [`BrowserDriver::close`] ran
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn navigate(&self, url: &str, _wait: WaitOptions) -> ShopResult<()> {
        let mut state = self.state();
        state.history.push(format!("navigate:{url}"));
        state.url = url.to_string();
        state.hovered = None;
        Ok(())
    }

    async fn current_url(&self) -> ShopResult<String> {
        Ok(self.state().url.clone())
    }

    async fn wait_for_load_state(&self, state: LoadState, _wait: WaitOptions) -> ShopResult<()> {
        self.state().history.push(format!("wait_for_load_state:{state}"));
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> ShopResult<usize> {
        Ok(self.state().resolve(locator).len())
    }

    async fn is_visible(&self, locator: &Locator) -> ShopResult<bool> {
        let state = self.state();
        Ok(state
            .resolve(locator)
            .first()
            .is_some_and(|(_, element)| state.is_shown(element)))
    }

    async fn text_contents(&self, locator: &Locator) -> ShopResult<Vec<String>> {
        Ok(self
            .state()
            .resolve(locator)
            .into_iter()
            .map(|(_, element)| element.text)
            .collect())
    }

    async fn click(&self, locator: &Locator, wait: WaitOptions) -> ShopResult<()> {
        let mut state = self.state();
        let index = state.actionable(locator, wait)?;
        state.history.push(format!("click:{locator}"));
        let reactions = state
            .reactions
            .get(&locator.key())
            .cloned()
            .unwrap_or_default();
        state.apply(&reactions, index)
    }

    async fn hover(&self, locator: &Locator, wait: WaitOptions) -> ShopResult<()> {
        let mut state = self.state();
        state.actionable(locator, wait)?;
        state.history.push(format!("hover:{locator}"));
        state.hovered = Some(locator.to_string());
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str, wait: WaitOptions) -> ShopResult<()> {
        let mut state = self.state();
        state.actionable(locator, wait)?;
        state.history.push(format!("fill:{locator}={value}"));
        state.values.insert(locator.key(), value.to_string());
        Ok(())
    }

    async fn arm_downloads(&self, dir: &Path) -> ShopResult<()> {
        let mut state = self.state();
        state.history.push(format!("arm_downloads:{}", dir.display()));
        state.download_dir = Some(dir.to_path_buf());
        Ok(())
    }

    async fn next_download(&self, wait: WaitOptions) -> ShopResult<Download> {
        self.state()
            .downloads
            .pop_front()
            .ok_or_else(|| ShopError::Timeout {
                ms: wait.timeout_ms,
                waited_for: "download event".to_string(),
            })
    }

    async fn storage_state(&self) -> ShopResult<StorageState> {
        Ok(self.state().storage.clone())
    }

    async fn close(&self) -> ShopResult<()> {
        let mut state = self.state();
        state.history.push("close".to_string());
        if state.closed {
            return Err(ShopError::driver("browser already closed"));
        }
        state.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn wait() -> WaitOptions {
        WaitOptions::new().with_timeout(100)
    }

    mod element_tests {
        use super::*;

        #[test]
        fn test_hidden_element() {
            let element = MockElement::hidden("Order Placed!");
            assert!(!element.visible);
            assert!(element.hover_gate.is_none());
        }

        #[test]
        fn test_revealed_by_records_description() {
            let tile = Locator::css(".product-image-wrapper").nth(1);
            let element = MockElement::new("Add to cart").revealed_by(&tile);
            assert_eq!(
                element.hover_gate.as_deref(),
                Some("css=.product-image-wrapper >> nth=1")
            );
        }
    }

    mod query_tests {
        use super::*;

        #[tokio::test]
        async fn test_count_includes_hidden() {
            let driver = MockDriver::new();
            let rows = Locator::css("tr");
            driver.set_elements(&rows, vec![MockElement::new("a"), MockElement::hidden("b")]);
            assert_eq!(driver.count(&rows).await.unwrap(), 2);
            assert!(driver.is_visible(&rows).await.unwrap());
            assert!(!driver.is_visible(&rows.clone().nth(1)).await.unwrap());
        }

        #[tokio::test]
        async fn test_text_contents_respects_pick() {
            let driver = MockDriver::new();
            let names = Locator::css(".productinfo p");
            driver.add_element(&names, "Blue Top");
            driver.add_element(&names, "Men Tshirt");
            assert_eq!(
                driver.text_contents(&names.clone().nth(1)).await.unwrap(),
                vec!["Men Tshirt".to_string()]
            );
            assert_eq!(driver.text_contents(&names).await.unwrap().len(), 2);
        }

        #[tokio::test]
        async fn test_unknown_locator_is_empty() {
            let driver = MockDriver::new();
            let missing = Locator::css("#nope");
            assert_eq!(driver.count(&missing).await.unwrap(), 0);
            assert!(!driver.is_visible(&missing).await.unwrap());
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_missing_element_times_out() {
            let driver = MockDriver::new();
            let err = driver.click(&Locator::css("#nope"), wait()).await.unwrap_err();
            assert!(matches!(err, ShopError::Timeout { ms: 100, .. }));
        }

        #[tokio::test]
        async fn test_click_runs_reactions() {
            let driver = MockDriver::new().with_url("https://shop.test/");
            let link = Locator::css("a.cart");
            let empty = Locator::css("#empty_cart");
            driver.add_element(&link, "Cart");
            driver.push_element(&empty, MockElement::hidden("Cart is empty!"));
            driver.on_click(
                &link,
                vec![
                    Reaction::Navigate("https://shop.test/view_cart".to_string()),
                    Reaction::show(&empty),
                ],
            );

            driver.click(&link, wait()).await.unwrap();

            assert_eq!(driver.url(), "https://shop.test/view_cart");
            assert!(driver.is_visible(&empty).await.unwrap());
            assert!(driver.was_called("click:css=a.cart"));
        }

        #[tokio::test]
        async fn test_remove_clicked_uses_index() {
            let driver = MockDriver::new();
            let rows = Locator::css("tr");
            let delete = Locator::css(".cart_quantity_delete");
            for name in ["a", "b", "c"] {
                driver.add_element(&rows, name);
                driver.add_element(&delete, "x");
            }
            driver.on_click(
                &delete,
                vec![Reaction::remove_clicked(&rows), Reaction::remove_clicked(&delete)],
            );

            driver.click(&delete.clone().nth(1), wait()).await.unwrap();

            assert_eq!(
                driver.text_contents(&rows).await.unwrap(),
                vec!["a".to_string(), "c".to_string()]
            );
            assert_eq!(driver.element_count(&delete), 2);
        }

        #[tokio::test]
        async fn test_hover_gate() {
            let driver = MockDriver::new();
            let tiles = Locator::css(".product-image-wrapper");
            driver.add_element(&tiles, "Blue Top");
            driver.add_element(&tiles, "Men Tshirt");
            let tile = tiles.clone().nth(0);
            let control = tile.locator(".overlay-content .add-to-cart");
            driver.push_element(&control, MockElement::new("Add to cart").revealed_by(&tile));

            assert!(!driver.is_visible(&control).await.unwrap());
            assert!(driver.click(&control, wait()).await.is_err());

            driver.hover(&tile, wait()).await.unwrap();
            assert!(driver.is_visible(&control).await.unwrap());
            driver.click(&control, wait()).await.unwrap();

            driver.hover(&tiles.clone().nth(1), wait()).await.unwrap();
            assert!(!driver.is_visible(&control).await.unwrap());
        }

        #[tokio::test]
        async fn test_when_filled_branches() {
            let driver = MockDriver::new();
            let password = Locator::placeholder("Password");
            let submit = Locator::css("button");
            let ok = Locator::text("Logged in");
            let bad = Locator::text("incorrect");
            driver.add_element(&password, "");
            driver.add_element(&submit, "Login");
            driver.push_element(&ok, MockElement::hidden("Logged in"));
            driver.push_element(&bad, MockElement::hidden("incorrect"));
            driver.on_click(
                &submit,
                vec![Reaction::when_filled(
                    &password,
                    "secret",
                    vec![Reaction::show(&ok)],
                    vec![Reaction::show(&bad)],
                )],
            );

            driver.fill(&password, "wrong", wait()).await.unwrap();
            driver.click(&submit, wait()).await.unwrap();
            assert!(!driver.is_visible(&ok).await.unwrap());
            assert!(driver.is_visible(&bad).await.unwrap());
            assert_eq!(driver.filled(&password).as_deref(), Some("wrong"));
        }

        #[tokio::test]
        async fn test_when_empty_runs_once_list_drained() {
            let driver = MockDriver::new();
            let rows = Locator::css("tr");
            let empty = Locator::css("#empty_cart");
            driver.add_element(&rows, "a");
            driver.push_element(&empty, MockElement::hidden("Cart is empty!"));
            driver.on_click(
                &rows,
                vec![
                    Reaction::remove_clicked(&rows),
                    Reaction::when_empty(&rows, vec![Reaction::show(&empty)]),
                ],
            );

            driver.click(&rows, wait()).await.unwrap();
            assert!(driver.is_visible(&empty).await.unwrap());
        }
    }

    mod download_tests {
        use super::*;

        #[tokio::test]
        async fn test_download_requires_arming() {
            let driver = MockDriver::new();
            let link = Locator::text("Download Invoice");
            driver.add_element(&link, "Download Invoice");
            driver.on_click(
                &link,
                vec![Reaction::Download {
                    filename: "invoice.txt".to_string(),
                    url: "https://shop.test/download_invoice/500".to_string(),
                    contents: b"Hi, your total purchase amount is 500".to_vec(),
                }],
            );

            let err = driver.click(&link, wait()).await.unwrap_err();
            assert!(matches!(err, ShopError::Download { .. }));

            let dir = tempfile::tempdir().unwrap();
            driver.arm_downloads(dir.path()).await.unwrap();
            driver.click(&link, wait()).await.unwrap();
            let download = driver.next_download(wait()).await.unwrap();
            assert_eq!(download.suggested_filename, "invoice.txt");
            assert!(download.path.starts_with(dir.path()));
            assert!(download.path.exists());
        }

        #[tokio::test]
        async fn test_next_download_times_out_when_none() {
            let driver = MockDriver::new();
            let err = driver.next_download(wait()).await.unwrap_err();
            assert!(matches!(err, ShopError::Timeout { .. }));
        }
    }

    #[tokio::test]
    async fn test_close_marks_closed() {
        let driver = MockDriver::new();
        driver.close().await.unwrap();
        assert!(driver.is_closed());
        assert!(driver.was_called("close"));
    }

    #[tokio::test]
    async fn test_second_close_fails() {
        let driver = MockDriver::new();
        driver.close().await.unwrap();
        let err = driver.close().await.unwrap_err();
        assert!(err.to_string().contains("already closed"));
        assert!(driver.is_closed());
    }
}

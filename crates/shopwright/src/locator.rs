//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a declarative description of "which element(s)", resolved
//! afresh every time a driver touches it. Nothing here holds an element
//! handle, so a positional pick like `.first()` re-resolves after each DOM
//! mutation.
//!
//! # Design
//!
//! - **Scoping first**: `form >> has-text="Login" >> placeholder="Email Address"`
//!   narrows structurally before matching attributes.
//! - **Readable**: `Display` renders a stable description used in errors,
//!   logs, and as the [`MockDriver`](crate::mock::MockDriver) key.
//! - **Portable**: [`Locator::script`] compiles to a self-contained JavaScript
//!   expression for the CDP driver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default timeout for auto-waiting assertions (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Helpers shared by every compiled locator script.
const PRELUDE: &str = "const __norm = s => (s || '').replace(/\\s+/g, ' ').trim(); \
const __rendered = el => el.getClientRects().length > 0 && getComputedStyle(el).visibility !== 'hidden'; \
const __visible = el => { if (!el || !el.isConnected) return false; \
const s = getComputedStyle(el); const r = el.getBoundingClientRect(); \
return s.visibility !== 'hidden' && s.display !== 'none' && r.width > 0 && r.height > 0; }; \
const __name = el => __norm(el.getAttribute('aria-label') || el.getAttribute('alt') || \
(el.tagName === 'INPUT' ? el.value : el.textContent));";

/// Quote a string as a JavaScript (JSON) literal.
pub(crate) fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// ARIA roles the suite queries by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaRole {
    /// `<a href>` or `role=link`
    Link,
    /// `<button>`, submit inputs, or `role=button`
    Button,
    /// `<h1>`..`<h6>` or `role=heading`
    Heading,
    /// `<img>` or `role=img`
    Img,
    /// `<tr>` or `role=row`
    Row,
}

impl AriaRole {
    /// Role name as written in descriptions
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Button => "button",
            Self::Heading => "heading",
            Self::Img => "img",
            Self::Row => "row",
        }
    }

    const fn candidates(self) -> &'static str {
        match self {
            Self::Link => "a[href], [role=link]",
            Self::Button => {
                "button, input[type=submit], input[type=button], input[type=reset], [role=button]"
            }
            Self::Heading => "h1, h2, h3, h4, h5, h6, [role=heading]",
            Self::Img => "img, [role=img]",
            Self::Row => "tr, [role=row]",
        }
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., `#cart_info_table tbody tr`)
    Css(String),
    /// Innermost element whose normalized text contains the string
    Text(String),
    /// ARIA role with an optional accessible-name substring
    Role {
        /// Role
        role: AriaRole,
        /// Accessible name (case-insensitive substring)
        name: Option<String>,
    },
    /// Input whose placeholder contains the string
    Placeholder(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a role selector with an accessible name
    #[must_use]
    pub fn role(role: AriaRole, name: impl Into<String>) -> Self {
        Self::Role {
            role,
            name: Some(name.into()),
        }
    }

    /// Create a placeholder selector
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder(text.into())
    }

    /// JavaScript expression yielding the `Element[]` matched under `root`
    fn query_js(&self, root: &str) -> String {
        match self {
            Self::Css(css) => format!("Array.from({root}.querySelectorAll({}))", js_string(css)),
            Self::Text(text) => {
                let needle = js_string(text);
                format!(
                    "Array.from({root}.querySelectorAll('*')).filter(el => \
                     el.tagName !== 'SCRIPT' && el.tagName !== 'STYLE' && \
                     __norm(el.textContent).includes(__norm({needle})) && \
                     !Array.from(el.children).some(c => __norm(c.textContent).includes(__norm({needle}))))"
                )
            }
            Self::Role { role, name } => {
                let base = format!(
                    "Array.from({root}.querySelectorAll({})).filter(el => __rendered(el))",
                    js_string(role.candidates())
                );
                match name {
                    Some(name) => format!(
                        "{base}.filter(el => __name(el).toLowerCase().includes(__norm({}).toLowerCase()))",
                        js_string(name)
                    ),
                    None => base,
                }
            }
            Self::Placeholder(text) => format!(
                "Array.from({root}.querySelectorAll('[placeholder]')).filter(el => \
                 __norm(el.getAttribute('placeholder')).toLowerCase().includes(__norm({}).toLowerCase()))",
                js_string(text)
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "css={css}"),
            Self::Text(text) => write!(f, "text={}", js_string(text)),
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role={role}[name={}]", js_string(name)),
            Self::Placeholder(text) => write!(f, "placeholder={}", js_string(text)),
        }
    }
}

/// Positional pick among matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// First match
    First,
    /// Zero-based index
    Nth(usize),
}

impl Pick {
    /// Apply the pick to a resolved list
    #[must_use]
    pub fn apply<T>(self, items: &[T]) -> &[T] {
        match self {
            Self::First => &items[..items.len().min(1)],
            Self::Nth(n) if n < items.len() => &items[n..=n],
            Self::Nth(_) => &[],
        }
    }
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("nth=0"),
            Self::Nth(n) => write!(f, "nth={n}"),
        }
    }
}

/// Narrowing applied after the selector, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refinement {
    /// Keep matches whose text contains the string (case-insensitive)
    HasText(String),
    /// Keep one match by position
    Pick(Pick),
}

impl fmt::Display for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HasText(text) => write!(f, "has-text={}", js_string(text)),
            Self::Pick(pick) => pick.fmt(f),
        }
    }
}

/// A declarative element description, resolved on every use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    parent: Option<Box<Locator>>,
    selector: Selector,
    refinements: Vec<Refinement>,
    timeout: Option<Duration>,
}

impl Locator {
    /// Create a locator from a selector
    #[must_use]
    pub fn new(selector: Selector) -> Self {
        Self {
            parent: None,
            selector,
            refinements: Vec::new(),
            timeout: None,
        }
    }

    /// Locator for a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Selector::css(selector))
    }

    /// Locator for an element containing text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Selector::text(text))
    }

    /// Locator for an ARIA role with accessible name
    #[must_use]
    pub fn role(role: AriaRole, name: impl Into<String>) -> Self {
        Self::new(Selector::role(role, name))
    }

    /// Locator for an input by placeholder
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::new(Selector::placeholder(text))
    }

    /// Scope a new selector under every match of this locator
    #[must_use]
    pub fn child(&self, selector: Selector) -> Self {
        Self {
            parent: Some(Box::new(self.clone())),
            selector,
            refinements: Vec::new(),
            timeout: self.timeout,
        }
    }

    /// Scope a CSS selector under this locator
    #[must_use]
    pub fn locator(&self, css: impl Into<String>) -> Self {
        self.child(Selector::css(css))
    }

    /// Scope a role selector under this locator
    #[must_use]
    pub fn get_by_role(&self, role: AriaRole, name: impl Into<String>) -> Self {
        self.child(Selector::role(role, name))
    }

    /// Scope a placeholder selector under this locator
    #[must_use]
    pub fn get_by_placeholder(&self, text: impl Into<String>) -> Self {
        self.child(Selector::placeholder(text))
    }

    /// Keep matches whose text contains `text`
    #[must_use]
    pub fn filter_has_text(mut self, text: impl Into<String>) -> Self {
        self.refinements.push(Refinement::HasText(text.into()));
        self
    }

    /// Keep the first match
    #[must_use]
    pub fn first(self) -> Self {
        self.pick(Pick::First)
    }

    /// Keep the match at `index`
    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        self.pick(Pick::Nth(index))
    }

    fn pick(mut self, pick: Pick) -> Self {
        self.refinements.push(Refinement::Pick(pick));
        self
    }

    /// Override the default polling timeout for this locator
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Per-locator timeout, if overridden
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Trailing positional pick, if the locator ends with one
    #[must_use]
    pub fn trailing_pick(&self) -> Option<Pick> {
        match self.refinements.last() {
            Some(Refinement::Pick(pick)) => Some(*pick),
            _ => None,
        }
    }

    /// Description without the trailing pick.
    ///
    /// `rows.first()` and `rows.nth(3)` share the key of `rows`.
    #[must_use]
    pub fn key(&self) -> String {
        let mut base = self.clone();
        if base.trailing_pick().is_some() {
            base.refinements.pop();
        }
        base.to_string()
    }

    /// JavaScript expression yielding the matched `Element[]`
    #[must_use]
    pub fn resolve_js(&self) -> String {
        let mut expr = match &self.parent {
            None => self.selector.query_js("document"),
            Some(parent) => format!(
                "Array.from(new Set({}.flatMap(root => {})))",
                parent.resolve_js(),
                self.selector.query_js("root")
            ),
        };
        for refinement in &self.refinements {
            expr = match refinement {
                Refinement::HasText(text) => format!(
                    "{expr}.filter(el => __norm(el.textContent).toLowerCase().includes(__norm({}).toLowerCase()))",
                    js_string(text)
                ),
                Refinement::Pick(Pick::First) => format!("{expr}.slice(0, 1)"),
                Refinement::Pick(Pick::Nth(n)) => format!("{expr}.slice({n}, {})", n + 1),
            };
        }
        expr
    }

    /// Wrap `body` (statements ending in `return`) in a self-contained script
    /// where `__els` holds the resolved elements.
    #[must_use]
    pub fn script(&self, body: &str) -> String {
        format!(
            "(() => {{ {PRELUDE} const __els = {}; {body} }})()",
            self.resolve_js()
        )
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{parent} >> ")?;
        }
        write!(f, "{}", self.selector)?;
        for refinement in &self.refinements {
            write!(f, " >> {refinement}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_description() {
            assert_eq!(Selector::css("#empty_cart").to_string(), "css=#empty_cart");
        }

        #[test]
        fn test_role_description_quotes_name() {
            let selector = Selector::role(AriaRole::Link, " Signup / Login");
            assert_eq!(selector.to_string(), "role=link[name=\" Signup / Login\"]");
        }

        #[test]
        fn test_css_query_is_json_quoted() {
            let js = Selector::css(".modal-body a[href=\"/view_cart\"]").query_js("document");
            assert!(js.contains(r#"querySelectorAll(".modal-body a[href=\"/view_cart\"]")"#));
        }

        #[test]
        fn test_role_query_uses_candidates() {
            let js = Selector::role(AriaRole::Heading, "All Products").query_js("document");
            assert!(js.contains("h1, h2, h3, h4, h5, h6"));
            assert!(js.contains("\"All Products\""));
        }
    }

    mod pick_tests {
        use super::*;

        #[test]
        fn test_first_of_empty_is_empty() {
            let items: [u8; 0] = [];
            assert!(Pick::First.apply(&items).is_empty());
        }

        #[test]
        fn test_nth_in_and_out_of_range() {
            let items = [1, 2, 3];
            assert_eq!(Pick::Nth(1).apply(&items), &[2]);
            assert!(Pick::Nth(3).apply(&items).is_empty());
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_scoped_description() {
            let email = Locator::css("form")
                .filter_has_text("Login")
                .get_by_placeholder("Email Address");
            assert_eq!(
                email.to_string(),
                "css=form >> has-text=\"Login\" >> placeholder=\"Email Address\""
            );
        }

        #[test]
        fn test_key_strips_only_trailing_pick() {
            let rows = Locator::css("#cart_info_table tbody tr");
            assert_eq!(rows.clone().first().key(), rows.key());
            assert_eq!(rows.clone().nth(4).key(), rows.key());

            let inner = rows.clone().nth(1).locator("td");
            assert_eq!(
                inner.key(),
                "css=#cart_info_table tbody tr >> nth=1 >> css=td"
            );
        }

        #[test]
        fn test_trailing_pick() {
            let tiles = Locator::css(".product-image-wrapper");
            assert_eq!(tiles.trailing_pick(), None);
            assert_eq!(tiles.clone().first().trailing_pick(), Some(Pick::First));
            assert_eq!(tiles.clone().nth(5).trailing_pick(), Some(Pick::Nth(5)));
            assert_eq!(
                tiles.nth(2).filter_has_text("Top").trailing_pick(),
                None
            );
        }

        #[test]
        fn test_child_inherits_timeout() {
            let parent = Locator::css(".features_items").with_timeout(Duration::from_secs(10));
            let child = parent.locator("h2.title");
            assert_eq!(child.timeout(), Some(Duration::from_secs(10)));
        }

        #[test]
        fn test_resolve_js_scopes_through_parent() {
            let js = Locator::css(".features_items")
                .get_by_role(AriaRole::Heading, "Searched Products")
                .resolve_js();
            assert!(js.starts_with("Array.from(new Set("));
            assert!(js.contains("flatMap(root =>"));
            assert!(js.contains("root.querySelectorAll"));
        }

        #[test]
        fn test_resolve_js_applies_refinements_in_order() {
            let js = Locator::css(".cart_quantity_delete").first().resolve_js();
            assert!(js.ends_with(".slice(0, 1)"));
            let js = Locator::css("tr").nth(2).resolve_js();
            assert!(js.ends_with(".slice(2, 3)"));
        }

        #[test]
        fn test_script_defines_prelude_and_elements() {
            let script = Locator::css("#empty_cart").script("return __els.length;");
            assert!(script.starts_with("(() => {"));
            assert!(script.contains("const __norm"));
            assert!(script.contains("const __els = "));
            assert!(script.ends_with("return __els.length; })()"));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Picking never changes the key
        #[test]
        fn prop_pick_preserves_key(css in "[a-z#.][a-z_ ]{0,20}", index in 0usize..50) {
            let base = Locator::css(css);
            prop_assert_eq!(base.clone().nth(index).key(), base.key());
            prop_assert_eq!(base.clone().first().key(), base.key());
        }

        /// Text with quotes or backslashes stays a single JS string literal
        #[test]
        fn prop_has_text_is_escaped(text in ".{0,30}") {
            let js = Locator::css("form").filter_has_text(text.clone()).resolve_js();
            let literal = serde_json::to_string(&text).unwrap();
            prop_assert!(js.contains(&literal));
        }

        /// nth(i) renders as `nth=i`
        #[test]
        fn prop_nth_description(index in 0usize..1000) {
            let description = Locator::css("tr").nth(index).to_string();
            let expected_suffix = format!(">> nth={index}");
            prop_assert!(description.ends_with(&expected_suffix));
        }
    }
}

//! Expect-style verifications.
//!
//! Every assertion polls the driver until it holds or the window closes,
//! then fails with [`ShopError::Assertion`] carrying the locator, what was
//! expected, and the last value observed.
//!
//! ```ignore
//! session.expect(&cart.empty_cart_indicator).to_be_visible().await?;
//! session.expect(&cart.rows).to_have_count(2).await?;
//! ```

use crate::driver::BrowserDriver;
use crate::locator::Locator;
use crate::result::{ShopError, ShopResult};
use crate::wait::{Deadline, WaitOptions};
use regex::Regex;
use std::future::Future;

/// Collapse whitespace runs and trim, the way rendered text compares.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compile a pattern used by a verification
pub fn pattern(source: &str) -> ShopResult<Regex> {
    Regex::new(source).map_err(|e| ShopError::Config {
        message: format!("invalid pattern /{source}/: {e}"),
    })
}

async fn until<F, Fut>(
    subject: &str,
    wait: WaitOptions,
    expected: String,
    mut observe: F,
) -> ShopResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ShopResult<(bool, String)>>,
{
    let deadline = Deadline::start(wait);
    loop {
        let actual = match observe().await {
            Ok((true, _)) => return Ok(()),
            Ok((false, seen)) => seen,
            Err(e) => format!("error: {e}"),
        };
        if deadline.expired() {
            return Err(ShopError::assertion(subject, expected, actual));
        }
        deadline.tick().await;
    }
}

fn describe(texts: &[String]) -> String {
    match texts {
        [] => "no elements".to_string(),
        [one] => format!("{:?}", normalize_text(one)),
        many => format!(
            "{:?}",
            many.iter().map(|t| normalize_text(t)).collect::<Vec<_>>()
        ),
    }
}

/// Assertions on a locator
#[derive(Debug)]
pub struct Expect<'a> {
    driver: &'a dyn BrowserDriver,
    locator: Locator,
    wait: WaitOptions,
}

impl<'a> Expect<'a> {
    /// Assert on `locator` within `wait` (a locator timeout overrides it)
    pub fn new(driver: &'a dyn BrowserDriver, locator: &Locator, wait: WaitOptions) -> Self {
        Self {
            driver,
            locator: locator.clone(),
            wait: wait.for_locator(locator),
        }
    }

    /// Poll for the first match to be visible
    pub async fn to_be_visible(&self) -> ShopResult<()> {
        let (driver, locator) = (self.driver, &self.locator);
        until(&locator.to_string(), self.wait, "visible".to_string(), move || async move {
            let visible = driver.is_visible(locator).await?;
            let seen = if visible { "visible" } else if driver.count(locator).await? == 0 {
                "no elements"
            } else {
                "hidden"
            };
            Ok((visible, seen.to_string()))
        })
        .await
    }

    /// Poll for no visible match (absent or hidden)
    pub async fn to_be_hidden(&self) -> ShopResult<()> {
        let (driver, locator) = (self.driver, &self.locator);
        until(&locator.to_string(), self.wait, "hidden".to_string(), move || async move {
            let visible = driver.is_visible(locator).await?;
            Ok((!visible, if visible { "visible" } else { "hidden" }.to_string()))
        })
        .await
    }

    /// Poll for any match whose normalized text contains `text`
    pub async fn to_contain_text(&self, text: &str) -> ShopResult<()> {
        let (driver, locator) = (self.driver, &self.locator);
        let needle = normalize_text(text);
        let needle = needle.as_str();
        until(
            &locator.to_string(),
            self.wait,
            format!("text containing {needle:?}"),
            move || async move {
                let texts = driver.text_contents(locator).await?;
                let found = texts.iter().any(|t| normalize_text(t).contains(needle));
                Ok((found, describe(&texts)))
            },
        )
        .await
    }

    /// Poll for the first match's normalized text to equal `text`
    pub async fn to_have_text(&self, text: &str) -> ShopResult<()> {
        let (driver, locator) = (self.driver, &self.locator);
        let wanted = normalize_text(text);
        let wanted = wanted.as_str();
        until(
            &locator.to_string(),
            self.wait,
            format!("text {wanted:?}"),
            move || async move {
                let texts = driver.text_contents(locator).await?;
                let matches = texts.first().is_some_and(|t| normalize_text(t) == wanted);
                Ok((matches, describe(&texts)))
            },
        )
        .await
    }

    /// Poll for the first match's text to match `pattern`
    pub async fn to_match_text(&self, pattern: &Regex) -> ShopResult<()> {
        let (driver, locator) = (self.driver, &self.locator);
        until(
            &locator.to_string(),
            self.wait,
            format!("text matching /{pattern}/"),
            move || async move {
                let texts = driver.text_contents(locator).await?;
                let matches = texts.first().is_some_and(|t| pattern.is_match(t));
                Ok((matches, describe(&texts)))
            },
        )
        .await
    }

    /// Poll for exactly `count` matches
    pub async fn to_have_count(&self, count: usize) -> ShopResult<()> {
        let (driver, locator) = (self.driver, &self.locator);
        until(
            &locator.to_string(),
            self.wait,
            format!("{count} elements"),
            move || async move {
                let n = driver.count(locator).await?;
                Ok((n == count, format!("{n} elements")))
            },
        )
        .await
    }
}

/// Assertions on the page URL
#[derive(Debug)]
pub struct ExpectUrl<'a> {
    driver: &'a dyn BrowserDriver,
    wait: WaitOptions,
}

impl<'a> ExpectUrl<'a> {
    /// Assert on the current URL within `wait`
    pub fn new(driver: &'a dyn BrowserDriver, wait: WaitOptions) -> Self {
        Self { driver, wait }
    }

    /// Poll for the URL to match `pattern`
    pub async fn to_match(&self, pattern: &Regex) -> ShopResult<()> {
        let driver = self.driver;
        until(
            "page url",
            self.wait,
            format!("url matching /{pattern}/"),
            move || async move {
                let url = driver.current_url().await?;
                Ok((pattern.is_match(&url), url))
            },
        )
        .await
    }
}

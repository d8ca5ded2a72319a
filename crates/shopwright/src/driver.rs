//! BrowserDriver - abstract browser automation trait.
//!
//! Page objects and verifications talk to a `dyn BrowserDriver`, never to
//! a browser crate directly.
//!
//! # Implementations
//!
//! - [`ChromiumDriver`](crate::browser::ChromiumDriver) - real Chromium over
//!   CDP via chromiumoxide (feature `browser`)
//! - [`MockDriver`](crate::mock::MockDriver) - in-memory page model for unit
//!   testing

use crate::locator::Locator;
use crate::result::{ShopError, ShopResult};
use crate::storage::StorageState;
use crate::wait::{LoadState, WaitOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A file captured from a download event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Download {
    /// Filename the server suggested
    pub suggested_filename: String,
    /// Source URL
    pub url: String,
    /// Where the browser wrote the bytes
    pub path: PathBuf,
}

impl Download {
    /// Create a download record
    #[must_use]
    pub fn new(
        suggested_filename: impl Into<String>,
        url: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            suggested_filename: suggested_filename.into(),
            url: url.into(),
            path: path.into(),
        }
    }

    /// Move the file to `dest`, returning the new path
    pub fn save_as(&self, dest: &Path) -> ShopResult<PathBuf> {
        if !self.path.exists() {
            return Err(ShopError::Download {
                message: format!("{} was not written to disk", self.path.display()),
            });
        }
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        if self.path != dest {
            if std::fs::rename(&self.path, dest).is_err() {
                std::fs::copy(&self.path, dest)?;
                std::fs::remove_file(&self.path)?;
            }
        }
        Ok(dest.to_path_buf())
    }
}

/// Abstract driver trait for browser automation.
///
/// Every element operation takes a [`Locator`] and resolves it afresh.
/// Actions (`click`, `hover`, `fill`) wait up to `wait` for the element to
/// be actionable (attached and visible); queries answer immediately.
#[async_trait]
pub trait BrowserDriver: Send + Sync + std::fmt::Debug {
    /// Navigate to URL and wait for `DOMContentLoaded`
    async fn navigate(&self, url: &str, wait: WaitOptions) -> ShopResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ShopResult<String>;

    /// Wait until the document reaches `state`
    async fn wait_for_load_state(&self, state: LoadState, wait: WaitOptions) -> ShopResult<()>;

    /// Number of matching elements (visible or not)
    async fn count(&self, locator: &Locator) -> ShopResult<usize>;

    /// Whether the first match is visible
    async fn is_visible(&self, locator: &Locator) -> ShopResult<bool>;

    /// Text content of every match, in document order
    async fn text_contents(&self, locator: &Locator) -> ShopResult<Vec<String>>;

    /// Click the first match
    async fn click(&self, locator: &Locator, wait: WaitOptions) -> ShopResult<()>;

    /// Move the pointer over the first match
    async fn hover(&self, locator: &Locator, wait: WaitOptions) -> ShopResult<()>;

    /// Replace the value of the first matching input
    async fn fill(&self, locator: &Locator, value: &str, wait: WaitOptions) -> ShopResult<()>;

    /// Start capturing downloads into `dir`
    async fn arm_downloads(&self, dir: &Path) -> ShopResult<()>;

    /// Wait for the next completed download
    async fn next_download(&self, wait: WaitOptions) -> ShopResult<Download>;

    /// Cookies and local storage of the current context
    async fn storage_state(&self) -> ShopResult<StorageState>;

    /// Close the browser
    async fn close(&self) -> ShopResult<()>;
}

//! Browser control over the Chrome `DevTools` Protocol.
//!
//! With the `browser` feature, [`ChromiumDriver`] implements
//! [`BrowserDriver`](crate::driver::BrowserDriver) using chromiumoxide:
//! locator queries run as page scripts, hover and click are real mouse
//! events (so CSS `:hover` overlays appear), and downloads are captured
//! through `Browser.setDownloadBehavior` events.

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc)]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{BrowserDriver, Download};
    use crate::locator::Locator;
    use crate::result::{ShopError, ShopResult};
    use crate::storage::{Cookie, OriginState, SameSite, StorageEntry, StorageState};
    use crate::wait::{poll_until, Deadline, LoadState, WaitOptions};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::browser::{
        DownloadProgressState, EventDownloadProgress, EventDownloadWillBegin,
        SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
    };
    use chromiumoxide::cdp::browser_protocol::network::CookieSameSite;
    use chromiumoxide::layout::Point;
    use chromiumoxide::listeners::EventStream;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use tokio::sync::Mutex;
    use tracing::debug;

    /// Scroll the first match into view and report its center if actionable.
    const TARGET_BODY: &str = "const el = __els[0]; \
        if (!__visible(el)) return { ok: false, x: 0, y: 0 }; \
        el.scrollIntoView({ block: 'center', inline: 'center' }); \
        const r = el.getBoundingClientRect(); \
        return { ok: true, x: r.x + r.width / 2, y: r.y + r.height / 2 };";

    #[derive(Debug, Deserialize)]
    struct Target {
        ok: bool,
        x: f64,
        y: f64,
    }

    #[derive(Debug, Deserialize)]
    struct LocalStorage {
        origin: String,
        entries: Vec<(String, String)>,
    }

    struct DownloadCapture {
        dir: PathBuf,
        will_begin: EventStream<EventDownloadWillBegin>,
        progress: EventStream<EventDownloadProgress>,
        pending: HashMap<String, (String, String)>,
    }

    impl std::fmt::Debug for DownloadCapture {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DownloadCapture")
                .field("dir", &self.dir)
                .field("pending", &self.pending.len())
                .finish_non_exhaustive()
        }
    }

    enum DownloadEvent {
        Begin(std::sync::Arc<EventDownloadWillBegin>),
        Progress(std::sync::Arc<EventDownloadProgress>),
        Closed,
    }

    /// Chromium driven over CDP
    #[derive(Debug)]
    pub struct ChromiumDriver {
        browser: Mutex<CdpBrowser>,
        page: CdpPage,
        handle: tokio::task::JoinHandle<()>,
        downloads: Mutex<Option<DownloadCapture>>,
    }

    impl ChromiumDriver {
        /// Launch a new browser with one blank page
        pub async fn launch(config: BrowserConfig) -> ShopResult<Self> {
            let mut builder = CdpConfig::builder().window_size(
                config.viewport_width,
                config.viewport_height,
            );

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ShopError::BrowserLaunch { message })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| ShopError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            // Spawn handler task
            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ShopError::BrowserLaunch {
                    message: e.to_string(),
                })?;

            debug!(headless = config.headless, "chromium launched");

            Ok(Self {
                browser: Mutex::new(browser),
                page,
                handle,
                downloads: Mutex::new(None),
            })
        }

        async fn eval<T: DeserializeOwned>(&self, script: String) -> ShopResult<T> {
            let result = self
                .page
                .evaluate(script)
                .await
                .map_err(|e| ShopError::driver(e.to_string()))?;
            result
                .into_value()
                .map_err(|e| ShopError::driver(e.to_string()))
        }

        /// Wait until the first match is visible; return its center point.
        async fn actionable_point(&self, locator: &Locator, wait: WaitOptions) -> ShopResult<Point> {
            let script = locator.script(TARGET_BODY);
            let waited_for = format!("{locator} to be visible");
            let wait = wait.for_locator(locator);
            let script = script.as_str();
            poll_until(wait, &waited_for, move || async move {
                let target: Target = self.eval(script.to_string()).await?;
                Ok(target.ok.then(|| Point::new(target.x, target.y)))
            })
            .await
        }

        async fn next_download_event(capture: &mut DownloadCapture) -> DownloadEvent {
            tokio::select! {
                Some(begin) = capture.will_begin.next() => DownloadEvent::Begin(begin),
                Some(progress) = capture.progress.next() => DownloadEvent::Progress(progress),
                else => DownloadEvent::Closed,
            }
        }
    }

    #[async_trait]
    impl BrowserDriver for ChromiumDriver {
        async fn navigate(&self, url: &str, wait: WaitOptions) -> ShopResult<()> {
            debug!(url, "navigate");
            tokio::time::timeout(wait.timeout(), self.page.goto(url))
                .await
                .map_err(|_| ShopError::Navigation {
                    url: url.to_string(),
                    message: format!("no response within {}ms", wait.timeout_ms),
                })?
                .map_err(|e| ShopError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            self.wait_for_load_state(LoadState::DomContentLoaded, wait)
                .await
        }

        async fn current_url(&self) -> ShopResult<String> {
            let url = self
                .page
                .url()
                .await
                .map_err(|e| ShopError::driver(e.to_string()))?;
            Ok(url.unwrap_or_default())
        }

        async fn wait_for_load_state(&self, state: LoadState, wait: WaitOptions) -> ShopResult<()> {
            let waited_for = format!("load state {state}");
            poll_until(wait, &waited_for, move || async move {
                let ready: bool = self.eval(state.ready_script().to_string()).await?;
                Ok(ready.then_some(()))
            })
            .await
        }

        async fn count(&self, locator: &Locator) -> ShopResult<usize> {
            self.eval(locator.script("return __els.length;")).await
        }

        async fn is_visible(&self, locator: &Locator) -> ShopResult<bool> {
            self.eval(locator.script("return __visible(__els[0]);"))
                .await
        }

        async fn text_contents(&self, locator: &Locator) -> ShopResult<Vec<String>> {
            self.eval(locator.script("return __els.map(el => el.textContent || '');"))
                .await
        }

        async fn click(&self, locator: &Locator, wait: WaitOptions) -> ShopResult<()> {
            let point = self.actionable_point(locator, wait).await?;
            debug!(%locator, x = point.x, y = point.y, "click");
            self.page
                .click(point)
                .await
                .map_err(|e| ShopError::driver(e.to_string()))?;
            Ok(())
        }

        async fn hover(&self, locator: &Locator, wait: WaitOptions) -> ShopResult<()> {
            let point = self.actionable_point(locator, wait).await?;
            debug!(%locator, x = point.x, y = point.y, "hover");
            self.page
                .move_mouse(point)
                .await
                .map_err(|e| ShopError::driver(e.to_string()))?;
            Ok(())
        }

        async fn fill(&self, locator: &Locator, value: &str, wait: WaitOptions) -> ShopResult<()> {
            self.actionable_point(locator, wait).await?;
            debug!(%locator, "fill");
            let body = format!(
                "const el = __els[0]; if (!el) return false; el.focus(); \
                 const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
                 Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, {}); \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                 return true;",
                crate::locator::js_string(value)
            );
            let filled: bool = self.eval(locator.script(&body)).await?;
            if filled {
                Ok(())
            } else {
                Err(ShopError::driver(format!("{locator} detached before fill")))
            }
        }

        async fn arm_downloads(&self, dir: &Path) -> ShopResult<()> {
            let dir = std::fs::canonicalize(dir)?;
            let params = SetDownloadBehaviorParams::builder()
                .behavior(SetDownloadBehaviorBehavior::AllowAndName)
                .download_path(dir.to_string_lossy().into_owned())
                .events_enabled(true)
                .build()
                .map_err(|message| ShopError::Download { message })?;

            let browser = self.browser.lock().await;
            let will_begin = browser
                .event_listener::<EventDownloadWillBegin>()
                .await
                .map_err(|e| ShopError::Download {
                    message: e.to_string(),
                })?;
            let progress = browser
                .event_listener::<EventDownloadProgress>()
                .await
                .map_err(|e| ShopError::Download {
                    message: e.to_string(),
                })?;
            browser
                .execute(params)
                .await
                .map_err(|e| ShopError::Download {
                    message: e.to_string(),
                })?;
            drop(browser);

            debug!(dir = %dir.display(), "download capture armed");
            *self.downloads.lock().await = Some(DownloadCapture {
                dir,
                will_begin,
                progress,
                pending: HashMap::new(),
            });
            Ok(())
        }

        async fn next_download(&self, wait: WaitOptions) -> ShopResult<Download> {
            let mut guard = self.downloads.lock().await;
            let capture = guard.as_mut().ok_or_else(|| ShopError::Download {
                message: "download capture was not armed".to_string(),
            })?;
            let deadline = Deadline::start(wait);
            loop {
                let remaining = wait.timeout().saturating_sub(deadline.elapsed());
                let event = tokio::time::timeout(remaining, Self::next_download_event(capture))
                    .await
                    .map_err(|_| ShopError::Timeout {
                        ms: wait.timeout_ms,
                        waited_for: "download event".to_string(),
                    })?;
                match event {
                    DownloadEvent::Begin(begin) => {
                        debug!(file = %begin.suggested_filename, "download started");
                        capture.pending.insert(
                            begin.guid.clone(),
                            (begin.url.clone(), begin.suggested_filename.clone()),
                        );
                    }
                    DownloadEvent::Progress(progress) => match progress.state {
                        DownloadProgressState::Completed => {
                            if let Some((url, name)) = capture.pending.remove(&progress.guid) {
                                let path = capture.dir.join(&progress.guid);
                                return Ok(Download::new(name, url, path));
                            }
                        }
                        DownloadProgressState::Canceled => {
                            let name = capture
                                .pending
                                .remove(&progress.guid)
                                .map_or_else(|| progress.guid.clone(), |(_, name)| name);
                            return Err(ShopError::Download {
                                message: format!("download {name} was canceled"),
                            });
                        }
                        DownloadProgressState::InProgress => {}
                    },
                    DownloadEvent::Closed => {
                        return Err(ShopError::Download {
                            message: "browser closed before the download finished".to_string(),
                        })
                    }
                }
            }
        }

        async fn storage_state(&self) -> ShopResult<StorageState> {
            let cookies = self
                .page
                .get_cookies()
                .await
                .map_err(|e| ShopError::driver(e.to_string()))?
                .into_iter()
                .map(|c| Cookie {
                    name: c.name,
                    value: c.value,
                    domain: c.domain,
                    path: c.path,
                    expires: if c.session { -1.0 } else { c.expires },
                    http_only: c.http_only,
                    secure: c.secure,
                    same_site: match c.same_site {
                        Some(CookieSameSite::Strict) => SameSite::Strict,
                        Some(CookieSameSite::None) => SameSite::None,
                        _ => SameSite::Lax,
                    },
                })
                .collect();

            let local: LocalStorage = self
                .eval(
                    "({ origin: location.origin, entries: Object.entries(localStorage) })"
                        .to_string(),
                )
                .await?;
            let origins = if local.entries.is_empty() {
                Vec::new()
            } else {
                vec![OriginState {
                    origin: local.origin,
                    local_storage: local
                        .entries
                        .into_iter()
                        .map(|(name, value)| StorageEntry { name, value })
                        .collect(),
                }]
            };

            Ok(StorageState { cookies, origins })
        }

        async fn close(&self) -> ShopResult<()> {
            let mut browser = self.browser.lock().await;
            browser
                .close()
                .await
                .map_err(|e| ShopError::driver(e.to_string()))?;
            self.handle.abort();
            debug!("chromium closed");
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert!(config.sandbox);
        assert_eq!((config.viewport_width, config.viewport_height), (1280, 720));
        assert!(config.chromium_path.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = BrowserConfig::default()
            .with_headless(false)
            .with_viewport(1920, 1080)
            .with_chromium_path("/usr/bin/chromium")
            .with_no_sandbox();
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.viewport_width, 1920);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
    }

    #[test]
    fn test_config_yaml_partial() {
        let config: BrowserConfig = serde_yaml_ng::from_str("headless: false\n").unwrap_or_default();
        assert!(!config.headless);
        assert_eq!(config.viewport_width, 1280);
    }
}

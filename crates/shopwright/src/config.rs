//! Suite configuration.
//!
//! Two sources:
//!
//! - **Environment** (`USERNAME`, `PASSWORD`, `USER_DISPLAY_NAME`,
//!   `BASE_URL`, `CHECKOUT_URL`, `PAYMENT_URL`), optionally loaded from an
//!   env file with `dotenvy`. Variables already set win over the file.
//! - **Suite YAML** ([`SuiteConfig`]): browser, timeouts, artifact paths and
//!   fixture overrides. Every field has a default.

use crate::browser::BrowserConfig;
use crate::fixtures::FixtureSet;
use crate::locator::DEFAULT_TIMEOUT_MS;
use crate::result::{ShopError, ShopResult};
use crate::storage::DEFAULT_STORAGE_STATE_PATH;
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Env files tried, in order, when none is given explicitly
pub const DEFAULT_ENV_FILES: [&str; 2] = [".env.qa", ".env"];

/// Login verification endpoint
pub const DEFAULT_VERIFY_LOGIN_URL: &str = "https://automationexercise.com/api/verifyLogin";

/// Read a required variable; absent or empty is an error.
pub fn require_env(name: &str) -> ShopResult<String> {
    optional_env(name).ok_or_else(|| ShopError::MissingEnv {
        name: name.to_string(),
    })
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Load variables from an env file without overriding the process env.
///
/// With `path`, the file must exist. Without, the first of
/// [`DEFAULT_ENV_FILES`] that exists is loaded. Returns the file used.
pub fn load_env_file(path: Option<&Path>) -> ShopResult<Option<PathBuf>> {
    let candidate = match path {
        Some(path) => Some(path.to_path_buf()),
        None => DEFAULT_ENV_FILES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file()),
    };
    match candidate {
        Some(file) => {
            dotenvy::from_path(&file).map_err(|e| ShopError::Config {
                message: format!("{}: {e}", file.display()),
            })?;
            Ok(Some(file))
        }
        None => Ok(None),
    }
}

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Target site URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Site root, always ending in `/`
    pub base_url: String,
    /// Checkout page
    pub checkout_url: String,
    /// Payment page
    pub payment_url: String,
}

impl Environment {
    /// Environment for `base_url` with the site's default checkout and
    /// payment routes
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let base_url = normalize_base(base_url);
        Self {
            checkout_url: format!("{base_url}checkout"),
            payment_url: format!("{base_url}payment"),
            base_url,
        }
    }

    /// Read `BASE_URL`, `CHECKOUT_URL` and `PAYMENT_URL`
    pub fn from_env() -> ShopResult<Self> {
        Ok(Self {
            base_url: normalize_base(&require_env("BASE_URL")?),
            checkout_url: require_env("CHECKOUT_URL")?,
            payment_url: require_env("PAYMENT_URL")?,
        })
    }

    /// Resolve `path` against the base URL; absolute URLs pass through
    pub fn url_for(&self, path: &str) -> ShopResult<String> {
        let base = reqwest::Url::parse(&self.base_url).map_err(|e| ShopError::Config {
            message: format!("BASE_URL {:?} is not a URL: {e}", self.base_url),
        })?;
        let joined = base.join(path).map_err(|e| ShopError::Config {
            message: format!("cannot join {path:?} onto {}: {e}", self.base_url),
        })?;
        Ok(joined.to_string())
    }
}

fn normalize_base(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    }
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Test account credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login email
    pub username: String,
    /// Password
    pub password: String,
    /// Name shown in the `Logged in as` marker
    pub display_name: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .finish()
    }
}

impl Credentials {
    /// Create credentials
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            display_name: display_name.into(),
        }
    }

    /// Read `USERNAME`, `PASSWORD` and `USER_DISPLAY_NAME`
    pub fn from_env() -> ShopResult<Self> {
        CredentialsOverride::default().resolve()
    }
}

/// Optional fields merged over the environment credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsOverride {
    /// Login email
    pub username: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Display name
    pub display_name: Option<String>,
}

impl CredentialsOverride {
    /// No overrides
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Override the login email
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Override the password
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Override the display name
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Explicit values win; the environment fills the rest.
    ///
    /// The environment is only consulted for fields left unset.
    pub fn resolve(&self) -> ShopResult<Credentials> {
        let pick = |value: &Option<String>, name: &str| match value {
            Some(v) => Ok(v.clone()),
            None => require_env(name),
        };
        Ok(Credentials {
            username: pick(&self.username, "USERNAME")?,
            password: pick(&self.password, "PASSWORD")?,
            display_name: pick(&self.display_name, "USER_DISPLAY_NAME")?,
        })
    }
}

impl From<Credentials> for CredentialsOverride {
    fn from(credentials: Credentials) -> Self {
        Self {
            username: Some(credentials.username),
            password: Some(credentials.password),
            display_name: Some(credentials.display_name),
        }
    }
}

// =============================================================================
// SUITE CONFIG
// =============================================================================

/// Per-session timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Verification polling window
    pub expect_ms: u64,
    /// Actionability wait for click/hover/fill
    pub action_ms: u64,
    /// Navigation and load-state waits
    pub navigation_ms: u64,
    /// Download event wait
    pub download_ms: u64,
    /// Polling interval
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            expect_ms: DEFAULT_TIMEOUT_MS,
            action_ms: 10_000,
            navigation_ms: DEFAULT_WAIT_TIMEOUT_MS,
            download_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Timeouts {
    fn options(self, timeout_ms: u64) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }

    /// Options for verifications
    #[must_use]
    pub fn expect(self) -> WaitOptions {
        self.options(self.expect_ms)
    }

    /// Options for actions
    #[must_use]
    pub fn action(self) -> WaitOptions {
        self.options(self.action_ms)
    }

    /// Options for navigation
    #[must_use]
    pub fn navigation(self) -> WaitOptions {
        self.options(self.navigation_ms)
    }

    /// Options for downloads
    #[must_use]
    pub fn download(self) -> WaitOptions {
        self.options(self.download_ms)
    }
}

/// Suite configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Timeouts
    pub timeouts: Timeouts,
    /// Login verification endpoint
    pub verify_login_url: String,
    /// Where invoices are saved
    pub downloads_dir: PathBuf,
    /// Where the post-login storage state is saved
    pub storage_state_path: PathBuf,
    /// Fixture overrides
    pub fixtures: FixtureSet,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            timeouts: Timeouts::default(),
            verify_login_url: DEFAULT_VERIFY_LOGIN_URL.to_string(),
            downloads_dir: PathBuf::from("downloads"),
            storage_state_path: PathBuf::from(DEFAULT_STORAGE_STATE_PATH),
            fixtures: FixtureSet::default(),
        }
    }
}

impl SuiteConfig {
    /// Parse YAML and validate
    pub fn from_yaml_str(yaml: &str) -> ShopResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file and validate
    pub fn from_yaml_file(path: &Path) -> ShopResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| ShopError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> ShopResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject zero timeouts and an unparsable verification URL
    pub fn validate(&self) -> ShopResult<()> {
        let t = &self.timeouts;
        for (name, value) in [
            ("expect_ms", t.expect_ms),
            ("action_ms", t.action_ms),
            ("navigation_ms", t.navigation_ms),
            ("download_ms", t.download_ms),
            ("poll_interval_ms", t.poll_interval_ms),
        ] {
            if value == 0 {
                return Err(ShopError::Config {
                    message: format!("timeouts.{name} must be greater than zero"),
                });
            }
        }
        reqwest::Url::parse(&self.verify_login_url).map_err(|e| ShopError::Config {
            message: format!("verify_login_url {:?}: {e}", self.verify_login_url),
        })?;
        Ok(())
    }

    /// Set the verification timeout
    #[must_use]
    pub const fn with_expect_timeout(mut self, ms: u64) -> Self {
        self.timeouts.expect_ms = ms;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.browser.headless = headless;
        self
    }

    /// Set the downloads directory
    #[must_use]
    pub fn with_downloads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.downloads_dir = dir.into();
        self
    }

    /// Set the verification endpoint
    #[must_use]
    pub fn with_verify_login_url(mut self, url: impl Into<String>) -> Self {
        self.verify_login_url = url.into();
        self
    }
}

//! Test session.
//!
//! One browser context per test. The session owns the driver, the target
//! environment and suite config, and tracks two pieces of state: the
//! authentication attempt and how far the shopping flow has progressed.

use crate::api::{HttpLoginVerifier, LoginVerifier};
use crate::config::{Environment, SuiteConfig};
use crate::driver::BrowserDriver;
use crate::expect::{Expect, ExpectUrl};
use crate::fixtures::FixtureSet;
use crate::locator::Locator;
use crate::result::{ShopError, ShopResult};
use crate::wait::LoadState;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

// =============================================================================
// STATE
// =============================================================================

/// Authentication attempt state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No attempt yet
    #[default]
    Unauthenticated,
    /// Login form submitted, marker not yet seen
    Authenticating,
    /// Marker seen
    Authenticated {
        /// Name in the `Logged in as` marker
        display_name: String,
    },
    /// The attempt failed
    Failed,
}

impl AuthState {
    /// Whether the session is logged in
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Progress through the shopping flow. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FlowStage {
    /// Not logged in
    #[default]
    Unauthenticated,
    /// Logged in, nothing else done
    Authenticated,
    /// On product listings
    Browsing,
    /// At least one product in the cart
    CartPopulated,
    /// On checkout
    CheckingOut,
    /// Order paid
    Paid,
}

impl std::fmt::Display for FlowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated => "authenticated",
            Self::Browsing => "browsing",
            Self::CartPopulated => "cart populated",
            Self::CheckingOut => "checking out",
            Self::Paid => "paid",
        };
        f.write_str(name)
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// One browser context bound to a target environment
#[derive(Debug)]
pub struct Session {
    driver: Arc<dyn BrowserDriver>,
    env: Environment,
    config: SuiteConfig,
    verifier: Arc<dyn LoginVerifier>,
    auth: Mutex<AuthState>,
    stage: Mutex<FlowStage>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    /// Create a session over an existing driver
    pub fn new(driver: Arc<dyn BrowserDriver>, env: Environment, config: SuiteConfig) -> Self {
        let verifier = Arc::new(HttpLoginVerifier::new(config.verify_login_url.clone()));
        Self {
            driver,
            env,
            config,
            verifier,
            auth: Mutex::new(AuthState::default()),
            stage: Mutex::new(FlowStage::default()),
        }
    }

    /// Replace the login verifier
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn LoginVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Launch Chromium and open a session on it
    #[cfg(feature = "browser")]
    pub async fn launch(config: SuiteConfig, env: Environment) -> ShopResult<Self> {
        config.validate()?;
        let driver = crate::browser::ChromiumDriver::launch(config.browser.clone()).await?;
        Ok(Self::new(Arc::new(driver), env, config))
    }

    /// The underlying driver
    pub fn driver(&self) -> &dyn BrowserDriver {
        self.driver.as_ref()
    }

    /// Target environment
    pub const fn env(&self) -> &Environment {
        &self.env
    }

    /// Suite configuration
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Fixtures in effect
    pub const fn fixtures(&self) -> &FixtureSet {
        &self.config.fixtures
    }

    /// Login verifier
    pub fn verifier(&self) -> &dyn LoginVerifier {
        self.verifier.as_ref()
    }

    /// Resolve a route against the base URL
    pub fn url_for(&self, path: &str) -> ShopResult<String> {
        self.env.url_for(path)
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Navigate to `path` (relative to the base URL, or absolute)
    pub async fn goto(&self, path: &str) -> ShopResult<()> {
        let url = self.url_for(path)?;
        debug!(%url, "goto");
        self.driver
            .navigate(&url, self.config.timeouts.navigation())
            .await
    }

    /// Current page URL
    pub async fn current_url(&self) -> ShopResult<String> {
        self.driver.current_url().await
    }

    /// Wait for the page to reach `state`
    pub async fn settle(&self, state: LoadState) -> ShopResult<()> {
        self.driver
            .wait_for_load_state(state, self.config.timeouts.navigation())
            .await
    }

    // -------------------------------------------------------------------------
    // Element operations
    // -------------------------------------------------------------------------

    /// Click once `locator` is actionable
    pub async fn click(&self, locator: &Locator) -> ShopResult<()> {
        debug!(%locator, "click");
        self.driver
            .click(locator, self.config.timeouts.action())
            .await
    }

    /// Hover once `locator` is actionable
    pub async fn hover(&self, locator: &Locator) -> ShopResult<()> {
        debug!(%locator, "hover");
        self.driver
            .hover(locator, self.config.timeouts.action())
            .await
    }

    /// Fill once `locator` is actionable
    pub async fn fill(&self, locator: &Locator, value: &str) -> ShopResult<()> {
        debug!(%locator, "fill");
        self.driver
            .fill(locator, value, self.config.timeouts.action())
            .await
    }

    /// Number of elements `locator` matches right now
    pub async fn count(&self, locator: &Locator) -> ShopResult<usize> {
        self.driver.count(locator).await
    }

    /// Text of every element `locator` matches right now
    pub async fn text_contents(&self, locator: &Locator) -> ShopResult<Vec<String>> {
        self.driver.text_contents(locator).await
    }

    /// Whether the first match is visible right now
    pub async fn is_visible(&self, locator: &Locator) -> ShopResult<bool> {
        self.driver.is_visible(locator).await
    }

    /// Assertions on `locator` with the session's expect timeout
    pub fn expect(&self, locator: &Locator) -> Expect<'_> {
        Expect::new(self.driver(), locator, self.config.timeouts.expect())
    }

    /// Assertions on the page URL
    pub fn expect_url(&self) -> ExpectUrl<'_> {
        ExpectUrl::new(self.driver(), self.config.timeouts.expect())
    }

    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------

    /// Current authentication state
    pub fn auth_state(&self) -> AuthState {
        locked(&self.auth).clone()
    }

    /// Start the one authentication attempt this session allows
    pub fn begin_authentication(&self) -> ShopResult<()> {
        let mut auth = locked(&self.auth);
        match *auth {
            AuthState::Unauthenticated => {
                *auth = AuthState::Authenticating;
                Ok(())
            }
            AuthState::Authenticating => Err(ShopError::invalid_state(
                "authentication attempt already in progress",
            )),
            AuthState::Authenticated { .. } => Err(ShopError::invalid_state(
                "session already authenticated; re-authentication is not supported",
            )),
            AuthState::Failed => Err(ShopError::invalid_state(
                "previous authentication attempt failed",
            )),
        }
    }

    /// Mark the attempt successful
    pub fn complete_authentication(&self, display_name: &str) -> ShopResult<()> {
        let mut auth = locked(&self.auth);
        if *auth != AuthState::Authenticating {
            return Err(ShopError::invalid_state(format!(
                "no authentication attempt in progress (state: {auth:?})"
            )));
        }
        *auth = AuthState::Authenticated {
            display_name: display_name.to_string(),
        };
        drop(auth);
        let mut stage = locked(&self.stage);
        if *stage < FlowStage::Authenticated {
            *stage = FlowStage::Authenticated;
        }
        Ok(())
    }

    /// Mark the attempt failed
    pub fn fail_authentication(&self) {
        let mut auth = locked(&self.auth);
        if *auth == AuthState::Authenticating {
            *auth = AuthState::Failed;
        }
    }

    // -------------------------------------------------------------------------
    // Flow stage
    // -------------------------------------------------------------------------

    /// Current flow stage
    pub fn stage(&self) -> FlowStage {
        *locked(&self.stage)
    }

    /// Move the flow to `next`; staying put is allowed, going back is not
    pub fn advance(&self, next: FlowStage) -> ShopResult<()> {
        if next > FlowStage::Authenticated && !self.auth_state().is_authenticated() {
            return Err(ShopError::invalid_state(format!(
                "{next} requires an authenticated session"
            )));
        }
        let mut stage = locked(&self.stage);
        if next < *stage {
            return Err(ShopError::invalid_state(format!(
                "cannot move from {} back to {next}",
                *stage
            )));
        }
        *stage = next;
        Ok(())
    }

    /// Reset the flow to `Authenticated` (cart cleared)
    pub fn reset_to_authenticated(&self) -> ShopResult<()> {
        if !self.auth_state().is_authenticated() {
            return Err(ShopError::invalid_state(
                "cart reset requires an authenticated session",
            ));
        }
        *locked(&self.stage) = FlowStage::Authenticated;
        Ok(())
    }

    /// Close the browser
    pub async fn close(&self) -> ShopResult<()> {
        self.driver.close().await
    }
}

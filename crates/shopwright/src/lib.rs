//! Shopwright: browser-driven end-to-end suite for the Automation Exercise
//! storefront.
//!
//! Page objects map selector-level browser state onto a stable contract the
//! scenarios call step by step; a shared login layer brings every session to
//! an authenticated state first.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     SHOPWRIGHT Architecture                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐             │
//! │   │ Scenario   │    │ Login      │    │ Page       │             │
//! │   │ (Session)  │───►│ Helper     │───►│ Objects    │             │
//! │   └────────────┘    └────────────┘    └─────┬──────┘             │
//! │                                             │ Locator            │
//! │                     ┌────────────┐    ┌─────▼──────┐             │
//! │                     │ verifyLogin│    │ Browser    │ CDP / Mock  │
//! │                     │ API        │    │ Driver     │             │
//! │                     └────────────┘    └────────────┘             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Login verification API client
pub mod api;
#[allow(clippy::missing_errors_doc)]
mod browser;
#[allow(clippy::missing_errors_doc)]
mod config;
mod driver;
/// Expect-style verifications
pub mod expect;
mod fixtures;
mod locator;
/// Shared login helpers
#[allow(clippy::missing_errors_doc)]
pub mod login;
/// In-memory driver for unit and flow tests
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod mock;
/// Page Object Model
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod pages;
mod result;
/// End-to-end scenarios
pub mod scenarios;
mod session;
mod storage;
/// Wait mechanisms
pub mod wait;

pub use api::{HttpLoginVerifier, LoginVerifier, VerifyLoginResponse, RESPONSE_CODE_OK, VERIFY_TIMEOUT};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use config::{
    load_env_file, require_env, Credentials, CredentialsOverride, Environment, SuiteConfig,
    Timeouts, DEFAULT_ENV_FILES, DEFAULT_VERIFY_LOGIN_URL,
};
pub use driver::{BrowserDriver, Download};
pub use expect::{Expect, ExpectUrl};
pub use fixtures::{AddressFixture, CheckoutTexts, FixtureSet, PaymentFixture, PaymentTexts};
pub use locator::{AriaRole, Locator, Pick, Refinement, Selector};
pub use pages::PageObject;
pub use result::{ShopError, ShopResult};
pub use session::{AuthState, FlowStage, Session};
pub use storage::{Cookie, OriginState, SameSite, StorageEntry, StorageState};
pub use wait::{LoadState, WaitOptions};

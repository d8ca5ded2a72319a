//! Shared login helpers.
//!
//! Every scenario reaches an authenticated state through one of these. All
//! of them take a [`CredentialsOverride`] whose set fields win over the
//! environment.
//!
//! ```ignore
//! let session = Session::launch(config, Environment::from_env()?).await?;
//! login_with_api_verification(&session, &CredentialsOverride::none()).await?;
//! ```

use crate::config::{Credentials, CredentialsOverride};
use crate::pages::LoginPage;
use crate::result::ShopResult;
use crate::session::Session;
use crate::storage::StorageState;
use std::path::Path;
use tracing::info;

/// Credentials from `USERNAME`, `PASSWORD` and `USER_DISPLAY_NAME`
pub fn get_credentials() -> ShopResult<Credentials> {
    Credentials::from_env()
}

async fn submit_and_verify(session: &Session, credentials: &Credentials) -> ShopResult<()> {
    let page = LoginPage::new(session);
    page.login(&credentials.username, &credentials.password)
        .await?;
    page.verify_logged_in_as(&credentials.display_name).await
}

/// Log in through `/login` and wait for the `Logged in as` marker
pub async fn login_via_ui(session: &Session, overrides: &CredentialsOverride) -> ShopResult<()> {
    let credentials = overrides.resolve()?;
    session.goto("/login").await?;
    submit_and_verify(session, &credentials).await
}

/// Check the credentials against the verification API, then log in through
/// the UI. The API call does not establish a browser session.
pub async fn login_with_api_verification(
    session: &Session,
    overrides: &CredentialsOverride,
) -> ShopResult<()> {
    let credentials = overrides.resolve()?;
    let response = session
        .verifier()
        .verify(&credentials.username, &credentials.password)
        .await?;
    info!(message = %response.message, "Credentials verified");
    session.goto("/login").await?;
    submit_and_verify(session, &credentials).await
}

/// Log in from the home page through the header link
pub async fn quick_login(session: &Session, overrides: &CredentialsOverride) -> ShopResult<()> {
    let credentials = overrides.resolve()?;
    let page = LoginPage::new(session);
    page.navigate().await?;
    page.go_to_login_page().await?;
    submit_and_verify(session, &credentials).await
}

/// Write the session's cookies and local storage to `path`
pub async fn save_storage_state(session: &Session, path: &Path) -> ShopResult<StorageState> {
    let state = session.driver().storage_state().await?;
    state.save(path)?;
    info!(path = %path.display(), cookies = state.cookies.len(), "Saved storage state");
    Ok(state)
}

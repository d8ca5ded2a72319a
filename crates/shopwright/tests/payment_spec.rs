//! Card payment, order confirmation and invoice download.
//!
//! Runs against `BASE_URL` in Chromium. Skipped when the environment or
//! the browser is not available.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use shopwright::scenarios;

#[tokio::test]
async fn test_payment() {
    let Some((session, credentials)) = common::live_session().await else {
        return;
    };
    let outcome = scenarios::payment(&session, &credentials).await;
    session.close().await.unwrap();
    outcome.unwrap();
}

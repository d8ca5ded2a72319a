//! Login verification API client.
//!
//! `POST /api/verifyLogin` with a form body `{email, password}`. The site
//! answers HTTP 200 for everything and puts the verdict in the JSON body's
//! `responseCode`; the content type is not reliably JSON, so the body is
//! read as text and parsed explicitly.

use crate::result::{ShopError, ShopResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// `responseCode` meaning the account exists
pub const RESPONSE_CODE_OK: u16 = 200;

/// Request timeout for the verification endpoint (30 seconds)
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// Body returned by the verification endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyLoginResponse {
    /// Application-level status
    #[serde(rename = "responseCode")]
    pub response_code: u16,
    /// Human-readable verdict (`User exists!`)
    #[serde(default)]
    pub message: String,
}

impl VerifyLoginResponse {
    /// Fail with [`ShopError::ApiVerification`] unless `responseCode == 200`
    pub fn ensure_success(self) -> ShopResult<Self> {
        if self.response_code == RESPONSE_CODE_OK {
            Ok(self)
        } else {
            Err(ShopError::ApiVerification {
                code: self.response_code,
                message: self.message,
            })
        }
    }
}

/// Checks credentials out of band, without touching the browser.
#[async_trait]
pub trait LoginVerifier: Send + Sync + std::fmt::Debug {
    /// Verify `email`/`password`; `Ok` only for `responseCode == 200`
    async fn verify(&self, email: &str, password: &str) -> ShopResult<VerifyLoginResponse>;
}

/// Verifier backed by the site's HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpLoginVerifier {
    endpoint: String,
    client: Result<reqwest::Client, String>,
}

impl HttpLoginVerifier {
    /// Create a verifier for `endpoint` with [`VERIFY_TIMEOUT`]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, VERIFY_TIMEOUT)
    }

    /// Create a verifier whose requests give up after `timeout`.
    ///
    /// A client that cannot be built is logged here, and every `verify`
    /// call fails with the build error.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                warn!(error = %e, "verifyLogin HTTP client could not be built");
                e.to_string()
            });
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// Create a verifier with a custom reqwest client
    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Ok(client),
        }
    }

    /// Returns the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LoginVerifier for HttpLoginVerifier {
    async fn verify(&self, email: &str, password: &str) -> ShopResult<VerifyLoginResponse> {
        debug!(endpoint = %self.endpoint, email, "verifyLogin");
        let client = self.client.as_ref().map_err(|e| ShopError::Config {
            message: format!("verifyLogin HTTP client unavailable: {e}"),
        })?;
        let resp = client
            .post(&self.endpoint)
            .form(&[("email", email), ("password", password)])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        let parsed: VerifyLoginResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(ShopError::ApiVerification {
                    code: status.as_u16(),
                    message: body,
                })
            }
            Err(e) => return Err(e.into()),
        };
        debug!(code = parsed.response_code, message = %parsed.message, "verifyLogin answered");
        parsed.ensure_success()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Form, Router};
    use std::collections::HashMap;

    /// Mirrors the real endpoint: always HTTP 200, verdict in the body,
    /// served as `text/html`.
    async fn verify_login(Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
        let known = form.get("email").map(String::as_str) == Some("qa@example.com")
            && form.get("password").map(String::as_str) == Some("secret");
        let body = if known {
            r#"{"responseCode": 200, "message": "User exists!"}"#
        } else {
            r#"{"responseCode": 404, "message": "User not found!"}"#
        };
        ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], body)
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api/verifyLogin")
    }

    mod response_tests {
        use super::*;

        #[test]
        fn test_ensure_success() {
            let ok = VerifyLoginResponse {
                response_code: 200,
                message: "User exists!".to_string(),
            };
            assert!(ok.ensure_success().is_ok());
        }

        #[test]
        fn test_ensure_success_rejects_other_codes() {
            let resp: VerifyLoginResponse =
                serde_json::from_str(r#"{"responseCode": 400, "message": "Bad request"}"#)
                    .unwrap();
            let err = resp.ensure_success().unwrap_err();
            assert!(matches!(err, ShopError::ApiVerification { code: 400, .. }));
        }

        #[test]
        fn test_message_optional() {
            let resp: VerifyLoginResponse = serde_json::from_str(r#"{"responseCode": 200}"#).unwrap();
            assert!(resp.message.is_empty());
        }
    }

    mod http_tests {
        use super::*;

        #[tokio::test]
        async fn test_known_user_verifies() {
            let url = serve(Router::new().route("/api/verifyLogin", post(verify_login))).await;
            let verifier = HttpLoginVerifier::new(url);
            let resp = verifier.verify("qa@example.com", "secret").await.unwrap();
            assert_eq!(resp.response_code, 200);
            assert_eq!(resp.message, "User exists!");
        }

        #[tokio::test]
        async fn test_unknown_user_is_api_verification_error() {
            let url = serve(Router::new().route("/api/verifyLogin", post(verify_login))).await;
            let verifier = HttpLoginVerifier::new(url);
            let err = verifier.verify("qa@example.com", "wrong").await.unwrap_err();
            match err {
                ShopError::ApiVerification { code, message } => {
                    assert_eq!(code, 404);
                    assert_eq!(message, "User not found!");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_non_json_success_is_json_error() {
            let router = Router::new().route("/api/verifyLogin", post(|| async { "<html>maintenance</html>" }));
            let url = serve(router).await;
            let err = HttpLoginVerifier::new(url).verify("a", "b").await.unwrap_err();
            assert!(matches!(err, ShopError::Json(_)));
        }

        #[tokio::test]
        async fn test_non_json_error_status_reports_status() {
            let router = Router::new().route(
                "/api/verifyLogin",
                post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
            );
            let url = serve(router).await;
            let err = HttpLoginVerifier::new(url).verify("a", "b").await.unwrap_err();
            assert!(matches!(err, ShopError::ApiVerification { code: 502, .. }));
        }

        #[tokio::test]
        async fn test_unreachable_is_http_error() {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            let verifier = HttpLoginVerifier::new(format!("http://{addr}/api/verifyLogin"));
            let err = verifier.verify("a", "b").await.unwrap_err();
            assert!(matches!(err, ShopError::Http(_)));
        }

        #[tokio::test]
        async fn test_slow_endpoint_times_out() {
            let router = Router::new().route(
                "/api/verifyLogin",
                post(|| async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    r#"{"responseCode": 200, "message": "User exists!"}"#
                }),
            );
            let url = serve(router).await;
            let verifier = HttpLoginVerifier::with_timeout(url, Duration::from_millis(200));

            let started = std::time::Instant::now();
            let err = verifier.verify("qa@example.com", "secret").await.unwrap_err();
            assert!(started.elapsed() < Duration::from_secs(5));
            assert!(matches!(err, ShopError::Http(ref e) if e.is_timeout()), "{err}");
        }

        #[test]
        fn test_endpoint_accessor() {
            let verifier = HttpLoginVerifier::new("https://automationexercise.com/api/verifyLogin");
            assert!(verifier.endpoint().ends_with("/api/verifyLogin"));
        }
    }
}

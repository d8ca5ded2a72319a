//! Browser storage state.
//!
//! Cookies plus per-origin local storage captured after login, persisted as
//! JSON (default `.auth/user.json`) so later runs can reuse the session.

use crate::result::ShopResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location for the persisted storage state
pub const DEFAULT_STORAGE_STATE_PATH: &str = ".auth/user.json";

/// Same-site cookie policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SameSite {
    /// Strict
    Strict,
    /// Lax
    #[default]
    Lax,
    /// None
    None,
}

/// A browser cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain
    pub domain: String,
    /// Path
    pub path: String,
    /// Expiration (seconds since epoch, -1 for session cookies)
    pub expires: f64,
    /// HTTP only flag
    pub http_only: bool,
    /// Secure flag
    pub secure: bool,
    /// Same site setting
    pub same_site: SameSite,
}

impl Cookie {
    /// Create a session cookie on `/`
    #[must_use]
    pub fn new(name: &str, value: &str, domain: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: domain.to_string(),
            path: "/".to_string(),
            expires: -1.0,
            http_only: false,
            secure: false,
            same_site: SameSite::Lax,
        }
    }

    /// Whether the cookie lives only for the browser session
    #[must_use]
    pub fn is_session(&self) -> bool {
        self.expires < 0.0
    }
}

/// A local storage entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    /// Key
    pub name: String,
    /// Value
    pub value: String,
}

/// Local storage captured for one origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginState {
    /// Origin, e.g. `https://automationexercise.com`
    pub origin: String,
    /// Local storage entries
    pub local_storage: Vec<StorageEntry>,
}

/// Storage state for a browser context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageState {
    /// Cookies
    pub cookies: Vec<Cookie>,
    /// Local storage per origin
    pub origins: Vec<OriginState>,
}

impl StorageState {
    /// Create empty storage state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie
    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Add a local storage item
    #[must_use]
    pub fn with_local_storage(mut self, origin: &str, name: &str, value: &str) -> Self {
        let entry = StorageEntry {
            name: name.to_string(),
            value: value.to_string(),
        };
        match self.origins.iter_mut().find(|o| o.origin == origin) {
            Some(existing) => existing.local_storage.push(entry),
            None => self.origins.push(OriginState {
                origin: origin.to_string(),
                local_storage: vec![entry],
            }),
        }
        self
    }

    /// Look up a cookie by name
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    /// Check if storage is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.origins.is_empty()
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> ShopResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a previously saved state
    pub fn load(path: &Path) -> ShopResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_defaults_to_session() {
        let cookie = Cookie::new("sessionid", "abc", "automationexercise.com");
        assert!(cookie.is_session());
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.same_site, SameSite::Lax);
    }

    #[test]
    fn test_local_storage_groups_by_origin() {
        let state = StorageState::new()
            .with_local_storage("https://a.test", "k1", "v1")
            .with_local_storage("https://a.test", "k2", "v2")
            .with_local_storage("https://b.test", "k", "v");
        assert_eq!(state.origins.len(), 2);
        assert_eq!(state.origins[0].local_storage.len(), 2);
    }

    #[test]
    fn test_json_uses_camel_case() {
        let state = StorageState::new()
            .with_cookie(Cookie::new("csrftoken", "t", "automationexercise.com"))
            .with_local_storage("https://automationexercise.com", "k", "v");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"httpOnly\":false"));
        assert!(json.contains("\"sameSite\":\"Lax\""));
        assert!(json.contains("\"localStorage\""));
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".auth").join("user.json");
        let state = StorageState::new().with_cookie(Cookie::new("sessionid", "s", "x"));

        state.save(&path).unwrap();

        let loaded = StorageState::load(&path).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.cookie("sessionid").unwrap().value, "s");
    }

    #[test]
    fn test_empty_state() {
        assert!(StorageState::new().is_empty());
        assert!(StorageState::new().cookie("missing").is_none());
    }
}

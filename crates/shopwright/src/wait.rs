//! Wait mechanisms.
//!
//! Settling signals and the polling loop every locator operation and
//! verification runs on. Waits are state based (document ready state,
//! element state, download events); there are no fixed sleeps beyond the
//! poll interval.

use crate::locator::Locator;
use crate::result::{ShopError, ShopResult};
use std::future::Future;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for navigation and load-state waits (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// The `load` event has fired
    #[default]
    Load,
    /// `DOMContentLoaded` has fired
    DomContentLoaded,
}

impl LoadState {
    /// Event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
        }
    }

    /// Script that evaluates to `true` once the document reached this state
    #[must_use]
    pub const fn ready_script(&self) -> &'static str {
        match self {
            Self::Load => "document.readyState === 'complete'",
            Self::DomContentLoaded => "document.readyState !== 'loading'",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Apply a locator's own timeout, if it overrides the default
    #[must_use]
    pub fn for_locator(self, locator: &Locator) -> Self {
        match locator.timeout() {
            Some(t) => self.with_timeout(u64::try_from(t.as_millis()).unwrap_or(u64::MAX)),
            None => self,
        }
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// DEADLINE
// =============================================================================

/// A polling window.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    options: WaitOptions,
}

impl Deadline {
    /// Start a window now
    #[must_use]
    pub fn start(options: WaitOptions) -> Self {
        Self {
            start: Instant::now(),
            options,
        }
    }

    /// Time spent so far
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Whether the window has closed
    #[must_use]
    pub fn expired(&self) -> bool {
        self.elapsed() >= self.options.timeout()
    }

    /// Timeout in milliseconds
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.options.timeout_ms
    }

    /// Sleep one poll interval
    pub async fn tick(&self) {
        tokio::time::sleep(self.options.poll_interval()).await;
    }
}

/// Poll `check` until it yields `Some`, or fail with [`ShopError::Timeout`].
///
/// Errors from `check` are treated as "not yet" (a script evaluated mid-navigation
/// fails transiently) and reported with the timeout.
pub async fn poll_until<T, F, Fut>(
    options: WaitOptions,
    waited_for: &str,
    mut check: F,
) -> ShopResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ShopResult<Option<T>>>,
{
    let deadline = Deadline::start(options);
    let mut last_error: Option<String> = None;
    loop {
        match check().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => last_error = Some(e.to_string()),
        }
        if deadline.expired() {
            let waited_for = match last_error {
                Some(e) => format!("{waited_for} (last error: {e})"),
                None => waited_for.to_string(),
            };
            return Err(ShopError::Timeout {
                ms: deadline.timeout_ms(),
                waited_for,
            });
        }
        deadline.tick().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod load_state_tests {
        use super::*;

        #[test]
        fn test_default_is_load() {
            assert_eq!(LoadState::default(), LoadState::Load);
        }

        #[test]
        fn test_event_names() {
            assert_eq!(LoadState::DomContentLoaded.to_string(), "DOMContentLoaded");
            assert_eq!(LoadState::Load.to_string(), "load");
        }

        #[test]
        fn test_every_state_settles_on_ready_state() {
            for state in [LoadState::Load, LoadState::DomContentLoaded] {
                let script = state.ready_script();
                assert!(script.starts_with("document.readyState"), "{state}: {script}");
                assert!(!script.contains("performance"), "{state}: {script}");
            }
        }

        #[test]
        fn test_dom_content_loaded_script_accepts_interactive() {
            assert!(LoadState::DomContentLoaded
                .ready_script()
                .contains("!== 'loading'"));
        }
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = WaitOptions::default();
            assert_eq!(options.timeout(), Duration::from_secs(30));
            assert_eq!(options.poll_interval(), Duration::from_millis(50));
        }

        #[test]
        fn test_for_locator_override() {
            let options = WaitOptions::new().with_timeout(5000);
            let slow = Locator::css("h2.title").with_timeout(Duration::from_secs(10));
            assert_eq!(options.for_locator(&slow).timeout_ms, 10_000);
            assert_eq!(options.for_locator(&Locator::css("h2")).timeout_ms, 5000);
        }

        #[test]
        fn test_builder() {
            let options = WaitOptions::new().with_timeout(100).with_poll_interval(5);
            assert_eq!(options.timeout_ms, 100);
            assert_eq!(options.poll_interval_ms, 5);
        }
    }

    mod poll_tests {
        use super::*;
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[tokio::test]
        async fn test_poll_returns_first_some() {
            let calls = AtomicUsize::new(0);
            let options = WaitOptions::new().with_timeout(1000).with_poll_interval(1);
            let value = poll_until(options, "third call", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok((n >= 2).then_some(n)) }
            })
            .await
            .unwrap();
            assert_eq!(value, 2);
        }

        #[tokio::test]
        async fn test_poll_times_out_with_last_error() {
            let options = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            let err = poll_until::<(), _, _>(options, "never", || async {
                Err(ShopError::driver("context destroyed"))
            })
            .await
            .unwrap_err();
            match err {
                ShopError::Timeout { ms, waited_for } => {
                    assert_eq!(ms, 20);
                    assert!(waited_for.starts_with("never"));
                    assert!(waited_for.contains("context destroyed"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_deadline_expires() {
            let deadline = Deadline::start(WaitOptions::new().with_timeout(0));
            assert!(deadline.expired());
        }
    }
}

//! Scenario runner

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use serde::{Deserialize, Serialize};
use shopwright::scenarios::{self, Scenario};
use shopwright::{Credentials, Session, ShopResult};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::warn;

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Wall time, browser launch included
    pub duration: Duration,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub fn pass(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
            duration,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error.into()),
            duration,
        }
    }
}

/// Aggregated results of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResults {
    /// Per-scenario results, in run order
    pub results: Vec<ScenarioResult>,
    /// Total duration
    pub duration: Duration,
}

impl RunResults {
    /// Number of passed scenarios
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Number of scenarios run
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// `Ok` when everything passed, else [`CliError::ScenarioFailed`]
    pub fn into_outcome(self) -> CliResult<Self> {
        match self.failed() {
            0 => Ok(self),
            failed => Err(CliError::ScenarioFailed {
                failed,
                total: self.total(),
            }),
        }
    }
}

/// Resolve scenario names; none selects every scenario
pub fn select(names: &[String]) -> CliResult<Vec<Scenario>> {
    if names.is_empty() {
        return Ok(scenarios::all());
    }
    names
        .iter()
        .map(|name| {
            scenarios::find(name).ok_or_else(|| {
                let known: Vec<&str> = scenarios::all().iter().map(|s| s.name).collect();
                CliError::invalid_argument(format!(
                    "unknown scenario {name:?} (known: {})",
                    known.join(", ")
                ))
            })
        })
        .collect()
}

/// Close `session` and hand back `outcome`; a failed close is only logged
pub async fn close_session<T>(session: &Session, outcome: ShopResult<T>) -> ShopResult<T> {
    if let Err(e) = session.close().await {
        warn!(error = %e, "Closing session failed");
    }
    outcome
}

/// Runs scenarios one after another, each in a fresh session
#[derive(Debug)]
pub struct ScenarioRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl ScenarioRunner {
    /// Create a new runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// Run `selected`, opening a session per scenario with `open`.
    ///
    /// A session that cannot be opened aborts the run; scenario failures are
    /// collected in the results.
    pub async fn run<F, Fut>(
        &mut self,
        selected: &[Scenario],
        credentials: &Credentials,
        mut open: F,
    ) -> CliResult<RunResults>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ShopResult<Session>>,
    {
        let start = Instant::now();
        let mut results = RunResults::default();

        self.reporter.header("Running scenarios");
        self.reporter.start_progress(selected.len() as u64);

        for scenario in selected {
            self.reporter.set_message(scenario.name);
            let scenario_start = Instant::now();

            let session = match open().await {
                Ok(session) => session,
                Err(e) => {
                    self.reporter.finish();
                    return Err(e.into());
                }
            };
            let outcome = (scenario.run)(&session, credentials).await;
            let outcome = close_session(&session, outcome).await;

            let result = match outcome {
                Ok(()) => {
                    self.reporter.success(scenario.name);
                    ScenarioResult::pass(scenario.name, scenario_start.elapsed())
                }
                Err(e) => {
                    self.reporter.failure(&format!("{}: {e}", scenario.name));
                    ScenarioResult::fail(scenario.name, e.to_string(), scenario_start.elapsed())
                }
            };
            let stop = !result.passed && self.config.fail_fast;
            results.results.push(result);
            self.reporter.increment();
            if stop {
                break;
            }
        }

        self.reporter.finish();
        results.duration = start.elapsed();
        self.reporter
            .summary(results.passed(), results.failed(), results.duration);
        Ok(results)
    }
}

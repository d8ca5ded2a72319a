//! Shopwright CLI Library
//!
//! Command-line interface for running the storefront scenarios.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, FormatArg, ListArgs, LoginArgs, RunArgs, SuiteArgs,
    VerifyLoginArgs,
};
pub use config::{load_environment, load_suite_config, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, ProgressReporter};
pub use runner::{close_session, select, RunResults, ScenarioResult, ScenarioRunner};

//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shopwright: end-to-end scenarios for the Automation Exercise storefront
#[derive(Parser, Debug)]
#[command(name = "shopwright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the live site in Chromium
    Run(RunArgs),

    /// List scenarios
    List(ListArgs),

    /// Check credentials against the verification API only
    VerifyLogin(VerifyLoginArgs),

    /// Log in once and save the browser storage state
    Login(LoginArgs),

    /// Print the effective suite configuration as YAML
    Config(ConfigArgs),
}

/// Env file and suite config shared by the commands that touch the site
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SuiteArgs {
    /// Env file (default: first of .env.qa, .env)
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Suite config YAML
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenarios to run (default: all)
    pub scenarios: Vec<String>,

    /// Env file and suite config
    #[command(flatten)]
    pub suite: SuiteArgs,

    /// Stop at the first failed scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Verification timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Where invoices are saved
    #[arg(long, value_name = "DIR")]
    pub downloads: Option<PathBuf>,

    /// Result format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the verify-login command
#[derive(Parser, Debug)]
pub struct VerifyLoginArgs {
    /// Env file and suite config
    #[command(flatten)]
    pub suite: SuiteArgs,
}

/// Arguments for the login command
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Env file and suite config
    #[command(flatten)]
    pub suite: SuiteArgs,

    /// Storage state file (default: from the suite config)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Suite config YAML to validate and print
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

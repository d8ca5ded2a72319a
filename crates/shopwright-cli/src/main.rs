//! Shopwright CLI: run the storefront scenarios
//!
//! ## Usage
//!
//! ```bash
//! shopwright list                       # Scenario names
//! shopwright run                        # Every scenario, headless
//! shopwright run login payment --headed # Selected scenarios
//! shopwright verify-login               # API credential check only
//! shopwright config                     # Effective suite config
//! ```

use clap::Parser;
use shopwright::{scenarios, Credentials, HttpLoginVerifier, LoginVerifier};
use shopwright_cli::{
    load_suite_config, Cli, CliConfig, CliResult, ColorChoice, Commands, ConfigArgs, ListArgs,
    OutputFormat, ProgressReporter, RunArgs, Verbosity, VerifyLoginArgs,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match run(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: CliConfig) -> CliResult<()> {
    match command {
        Commands::Run(args) => run_scenarios(config, &args),
        Commands::List(args) => run_list(&args),
        Commands::VerifyLogin(args) => run_verify_login(&config, &args),
        Commands::Login(args) => run_login(&config, &args),
        Commands::Config(args) => run_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
}

/// `RUST_LOG` wins; otherwise the level follows `-v`/`-q`
fn init_tracing(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn reporter(config: &CliConfig) -> ProgressReporter {
    ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet())
}

// =============================================================================
// Scenario Commands
// =============================================================================

fn run_list(args: &ListArgs) -> CliResult<()> {
    let all = scenarios::all();
    match OutputFormat::from(args.format) {
        OutputFormat::Text => {
            for scenario in &all {
                println!("{:<22} {}", scenario.name, scenario.description);
            }
        }
        OutputFormat::Json => {
            let listing: Vec<_> = all
                .iter()
                .map(|s| serde_json::json!({ "name": s.name, "description": s.description }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
    }
    Ok(())
}

#[cfg(feature = "browser")]
fn run_scenarios(config: CliConfig, args: &RunArgs) -> CliResult<()> {
    use shopwright::Session;
    use shopwright_cli::{load_environment, select, ScenarioRunner};

    let selected = select(&args.scenarios)?;
    let mut suite = load_suite_config(args.suite.config.as_deref())?;
    if args.headed {
        suite = suite.with_headless(false);
    }
    if let Some(ms) = args.timeout {
        suite = suite.with_expect_timeout(ms);
    }
    if let Some(ref dir) = args.downloads {
        suite = suite.with_downloads_dir(dir);
    }
    suite.validate()?;
    let (env, credentials) = load_environment(args.suite.env_file.as_deref())?;
    tracing::info!(base_url = %env.base_url, scenarios = selected.len(), "Starting run");

    let mut runner = ScenarioRunner::new(config.with_fail_fast(args.fail_fast));
    let results = runtime()?.block_on(runner.run(&selected, &credentials, || {
        Session::launch(suite.clone(), env.clone())
    }))?;

    if OutputFormat::from(args.format) == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    results.into_outcome().map(|_| ())
}

#[cfg(not(feature = "browser"))]
fn run_scenarios(_config: CliConfig, _args: &RunArgs) -> CliResult<()> {
    Err(shopwright_cli::CliError::BrowserDisabled("run"))
}

// =============================================================================
// Login Commands
// =============================================================================

fn run_verify_login(config: &CliConfig, args: &VerifyLoginArgs) -> CliResult<()> {
    let suite = load_suite_config(args.suite.config.as_deref())?;
    shopwright::load_env_file(args.suite.env_file.as_deref())?;
    let credentials = Credentials::from_env()?;

    let verifier = HttpLoginVerifier::new(suite.verify_login_url);
    let response = runtime()?.block_on(verifier.verify(&credentials.username, &credentials.password))?;

    reporter(config).success(&format!(
        "{} ({}): {}",
        credentials.username, response.response_code, response.message
    ));
    Ok(())
}

#[cfg(feature = "browser")]
fn run_login(config: &CliConfig, args: &shopwright_cli::LoginArgs) -> CliResult<()> {
    use shopwright::login::{login_via_ui, save_storage_state};
    use shopwright::{CredentialsOverride, Session};
    use shopwright_cli::{close_session, load_environment};

    let mut suite = load_suite_config(args.suite.config.as_deref())?;
    if args.headed {
        suite = suite.with_headless(false);
    }
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| suite.storage_state_path.clone());
    let (env, credentials) = load_environment(args.suite.env_file.as_deref())?;

    let state = runtime()?.block_on(async {
        let session = Session::launch(suite, env).await?;
        let saved = async {
            login_via_ui(&session, &CredentialsOverride::from(credentials)).await?;
            save_storage_state(&session, &path).await
        }
        .await;
        close_session(&session, saved).await
    })?;

    reporter(config).success(&format!(
        "Saved {} cookies to {}",
        state.cookies.len(),
        path.display()
    ));
    Ok(())
}

#[cfg(not(feature = "browser"))]
fn run_login(_config: &CliConfig, _args: &shopwright_cli::LoginArgs) -> CliResult<()> {
    Err(shopwright_cli::CliError::BrowserDisabled("login"))
}

// =============================================================================
// Configuration
// =============================================================================

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let suite = load_suite_config(args.config.as_deref())?;
    print!("{}", suite.to_yaml()?);
    Ok(())
}

//! Vitrina CLI: run the product-card suite from the command line
//!
//! ## Usage
//!
//! ```bash
//! vitrina run                                # Real browser, default fixture
//! vitrina run --mock                         # In-memory page, no browser
//! vitrina run --filter cart --fail-fast      # Subset of scenarios
//! vitrina run --fixture fixtures/product-card.json --json
//! vitrina list                               # Show scenario names
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use vitrina::{
    MockDriver, PageDriver, ProductFixture, RunConfig, Scenario, SelectorMap, SuiteReport,
    SuiteRunner, VitrinaError, WaitOptions, DEFAULT_WAIT_TIMEOUT_MS,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Vitrina(#[from] VitrinaError),

    #[error("{0}")]
    Usage(String),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "vitrina", version, about = "End-to-end checks for the product-card widget")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scenario suite
    Run(RunArgs),
    /// List scenario names without running anything
    List,
}

#[derive(Args)]
struct RunArgs {
    /// Product fixture JSON (defaults to the built-in widget fixture)
    #[arg(long, value_name = "FILE")]
    fixture: Option<PathBuf>,

    /// Selector map JSON (defaults to the built-in data-testid map)
    #[arg(long, value_name = "FILE")]
    selectors: Option<PathBuf>,

    /// Only run scenarios whose name contains this substring
    #[arg(long, value_name = "SUBSTRING")]
    filter: Option<String>,

    /// Stop at the first failing scenario
    #[arg(long)]
    fail_fast: bool,

    /// Per-assertion wait budget in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_WAIT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Drive the in-memory mock page instead of a browser
    #[arg(long)]
    mock: bool,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,

    /// Chromium executable to launch
    #[arg(long, value_name = "PATH", env = "CHROMIUM_PATH")]
    chromium: Option<PathBuf>,

    /// Disable the Chromium sandbox (containers, CI)
    #[arg(long)]
    no_sandbox: bool,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => match run_suite(args).await {
            Ok(report) if report.all_passed() => ExitCode::SUCCESS,
            Ok(_) => ExitCode::FAILURE,
            Err(e) => {
                eprintln!("{} {e}", style("error:").red().bold());
                ExitCode::FAILURE
            }
        },
        Commands::List => {
            for scenario in vitrina::scenarios::suite() {
                println!("{}", scenario.name());
            }
            ExitCode::SUCCESS
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vitrina={default},vitrina_cli={default}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run_suite(args: RunArgs) -> CliResult<SuiteReport> {
    let fixture = match &args.fixture {
        Some(path) => ProductFixture::from_path(path)?,
        None => ProductFixture::widget(),
    };
    fixture.validate()?;

    let selectors = match &args.selectors {
        Some(path) => SelectorMap::from_path(path)?,
        None => SelectorMap::default(),
    };
    selectors.validate()?;

    let mut config = RunConfig::new("product card", fixture.clone())
        .with_selectors(selectors)
        .with_wait(WaitOptions::new().with_timeout(args.timeout_ms))
        .with_fail_fast(args.fail_fast);
    if let Some(filter) = &args.filter {
        config = config.with_filter(filter.clone());
    }
    let runner = SuiteRunner::new(config);
    let scenarios = vitrina::scenarios::suite();
    tracing::info!(
        scenarios = scenarios.len(),
        mock = args.mock,
        "starting suite run"
    );

    let report = if args.mock {
        runner
            .run(&scenarios, |scenario| mock_driver(fixture.clone(), *scenario))
            .await
    } else {
        run_in_browser(&runner, &scenarios, &args).await?
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report)
                .map_err(|e| CliError::Usage(format!("report serialization failed: {e}")))?
        );
    } else {
        print_report(&report);
    }
    Ok(report)
}

/// Mock pages carry the page state a backend would provide, so the
/// out-of-stock scenario gets an out-of-stock page.
async fn mock_driver(
    fixture: ProductFixture,
    scenario: Scenario,
) -> vitrina::VitrinaResult<Box<dyn PageDriver>> {
    let driver = if scenario.name().contains("out-of-stock") {
        MockDriver::out_of_stock(&fixture)
    } else {
        MockDriver::new(&fixture)
    };
    Ok(Box::new(driver))
}

#[cfg(feature = "browser")]
async fn run_in_browser(
    runner: &SuiteRunner,
    scenarios: &[Scenario],
    args: &RunArgs,
) -> CliResult<SuiteReport> {
    let mut browser_config = vitrina::BrowserConfig::default().with_headless(!args.headed);
    if let Some(path) = &args.chromium {
        browser_config = browser_config.with_chromium_path(path.to_string_lossy());
    }
    if args.no_sandbox {
        browser_config = browser_config.with_no_sandbox();
    }

    let report = runner
        .run(scenarios, |_| {
            let browser_config = browser_config.clone();
            async move {
                let driver = vitrina::CdpDriver::launch(browser_config).await?;
                Ok(Box::new(driver) as Box<dyn PageDriver>)
            }
        })
        .await;
    Ok(report)
}

#[cfg(not(feature = "browser"))]
async fn run_in_browser(
    _runner: &SuiteRunner,
    _scenarios: &[Scenario],
    _args: &RunArgs,
) -> CliResult<SuiteReport> {
    Err(CliError::Usage(
        "browser support not compiled in; rebuild with --features browser or use --mock"
            .to_string(),
    ))
}

fn print_report(report: &SuiteReport) {
    println!();
    println!("  {}", style(&report.suite).bold());
    for scenario in &report.scenarios {
        let marker = match scenario.status {
            vitrina::ScenarioStatus::Passed => style("✓").green(),
            vitrina::ScenarioStatus::Failed => style("✗").red(),
            vitrina::ScenarioStatus::Skipped => style("-").dim(),
        };
        println!("  {marker} {} ({}ms)", scenario.name, scenario.duration_ms);
        if let Some(error) = &scenario.error {
            println!("      {}", style(error).red());
        }
    }
    println!();
    let totals = format!(
        "{} passed, {} failed, {} skipped in {}ms",
        report.passed_count(),
        report.failed_count(),
        report.skipped_count(),
        report.duration_ms
    );
    if report.all_passed() {
        println!("  {}", style(totals).green());
    } else {
        println!("  {}", style(totals).red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "vitrina",
            "run",
            "--mock",
            "--filter",
            "cart",
            "--timeout-ms",
            "500",
            "--fail-fast",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert!(args.mock);
                assert!(args.fail_fast);
                assert_eq!(args.filter.as_deref(), Some("cart"));
                assert_eq!(args.timeout_ms, 500);
            }
            Commands::List => panic!("expected run"),
        }
    }

    #[test]
    fn test_cli_parses_list() {
        let cli = Cli::try_parse_from(["vitrina", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List));
    }

    #[tokio::test]
    async fn test_mock_run_passes_whole_suite() {
        let args = Cli::try_parse_from(["vitrina", "run", "--mock", "--timeout-ms", "500"]);
        let Commands::Run(run_args) = args.unwrap().command else {
            panic!("expected run");
        };
        let report = run_suite(run_args).await.unwrap();
        assert!(report.all_passed(), "{}", report.render_text());
    }
}

//! E2E test harness entry point
//!
//! This file is the test binary that runs the bloglist scenarios against a
//! running front-end and backend.
//! Run with: cargo test --package bloglist-e2e --test e2e -- [OPTIONS]

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use bloglist_e2e::playwright::Browser;
use bloglist_e2e::runner::load_scenarios;
use bloglist_e2e::{E2eResult, HarnessConfig, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "bloglist-e2e")]
#[command(about = "E2E acceptance tests for the bloglist app")]
struct Args {
    /// Harness configuration file (TOML)
    #[arg(short, long, default_value = "e2e.toml")]
    config: PathBuf,

    /// Front-end URL
    #[arg(long)]
    frontend_url: Option<String>,

    /// Backend URL serving /api/testing/reset and /api/users
    #[arg(long)]
    backend_url: Option<String>,

    /// Run only the scenario with this name
    #[arg(short = 'n', long = "scenario")]
    scenario: Option<String>,

    /// Run only scenarios carrying this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Directory with extra YAML scenarios
    #[arg(short, long)]
    specs: Option<PathBuf>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long)]
    browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Default timeout for assertions and waits, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List scenario names and exit
    #[arg(long)]
    list: bool,

    /// Arguments cargo passes to every test binary
    #[arg(long, hide = true)]
    nocapture: bool,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn load_config(args: &Args) -> E2eResult<HarnessConfig> {
    let mut config = HarnessConfig::load(&args.config)?;

    if let Some(url) = &args.frontend_url {
        config.frontend_url = url.clone();
    }
    if let Some(url) = &args.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(dir) = &args.specs {
        config.specs_dir = Some(dir.clone());
    }
    if let Some(browser) = args.browser {
        config.browser.browser = browser;
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(ms) = args.timeout_ms {
        config.timeouts.assertion_ms = ms;
    }
    if let Some(dir) = &args.output {
        config.output_dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let config = load_config(&args)?;

    if args.list {
        for scenario in load_scenarios(&config)? {
            println!("{} [{}]", scenario.name, scenario.tags.join(", "));
        }
        return Ok(true);
    }

    let mut runner = TestRunner::new(config)?;

    runner.start_servers().await?;

    let results = if let Some(name) = &args.scenario {
        runner.run_named(name).await?
    } else if let Some(tag) = &args.tag {
        runner.run_tagged(tag).await?
    } else {
        runner.run_all().await?
    };

    runner.write_results(&results)?;

    Ok(results.success())
}

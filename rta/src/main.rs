//! Repository Testing Agent - standalone entry point.
//!
//! Clones a repository, runs its test suite with coverage inside a Docker
//! sandbox, prints a human-readable summary, and exits non-zero when the
//! suite failed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rta::workflow::TestingAgent;
use rta_common::{AgentConfig, LogConfig, init_logging};
use tracing::warn;

/// Demonstration repository used when no URL is given.
const DEMO_REPO_URL: &str = "https://github.com/rta-project/demo-python-project";

const REPORT_SNIPPET_CHARS: usize = 1000;

#[derive(Parser)]
#[command(name = "rta")]
#[command(author, version, about = "Repository Testing Agent - sandboxed test runs with coverage")]
struct Cli {
    /// Repository URL to clone and test
    #[arg(default_value = DEMO_REPO_URL)]
    repo_url: String,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base directory for working copies
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Sandbox image used for test runs
    #[arg(long)]
    image: Option<String>,

    /// Wall-clock execution timeout (e.g. "300s", "10m")
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Print the result as JSON instead of the human-readable summary
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env("info").with_stderr();
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    init_logging(&log_config)?;

    let mut config = AgentConfig::load(cli.config.as_deref())?;
    if let Some(base_dir) = cli.base_dir {
        config.base_dir = base_dir;
    }
    if let Some(image) = cli.image {
        config.image = image;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout.as_secs().max(1);
    }
    for warning in config.validate() {
        warn!("{warning}");
    }

    let agent = TestingAgent::new(config);
    let result = agent.build_and_run_tests(&cli.repo_url).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!("================= FINAL TEST RESULT =================");
        println!("{}", if result.passed { "Passed!" } else { "Failed!" });
        match result.coverage {
            Some(pct) => println!("Coverage: {pct}%"),
            None => println!("Coverage: N/A"),
        }
        println!("Repo Path: {}", result.repo_path);
        println!("====================================================");
        println!(
            "Report snippet (max {REPORT_SNIPPET_CHARS} chars):\n{}",
            result.report_snippet(REPORT_SNIPPET_CHARS)
        );
    }

    Ok(if result.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

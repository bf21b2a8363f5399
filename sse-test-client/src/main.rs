use anyhow::Result;
use clap::Parser;
use colored::*;
use std::time::Duration;

mod output;
mod scenarios;
mod sse_client;

use output::print_test_summary;

#[derive(Parser)]
#[command(name = "sse-test-client")]
#[command(about = "SSE clock stream testing tool")]
struct Cli {
    /// Base URL of the server (e.g., http://localhost:8080)
    #[arg(long, default_value = "http://localhost:8080")]
    base_url: String,

    /// Test scenario to run
    #[arg(long, value_enum, default_value = "all")]
    scenario: ScenarioChoice,

    /// Tick interval the server was started with, in seconds
    #[arg(long, default_value_t = 2)]
    interval_secs: u64,

    /// Number of events to sample for the cadence test
    #[arg(long, default_value_t = 4)]
    samples: usize,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone)]
enum ScenarioChoice {
    /// Connect and wait for one well-formed event
    ConnectionTest,
    /// Check the spacing between consecutive events
    CadenceTest,
    /// Two clients at once; closing one must not disturb the other
    ConcurrentTest,
    /// Run every scenario
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    let interval = Duration::from_secs(cli.interval_secs);
    let samples = cli.samples.max(2);

    println!("{}", "=== TEST PHASE ===".bright_white().bold());
    println!("{} Target: {}/sse", "→".blue(), cli.base_url);

    let mut results = Vec::new();

    match cli.scenario {
        ScenarioChoice::ConnectionTest => {
            results.push(scenarios::test_connection(&cli.base_url, interval).await?);
        }
        ScenarioChoice::CadenceTest => {
            results.push(scenarios::test_cadence(&cli.base_url, interval, samples).await?);
        }
        ScenarioChoice::ConcurrentTest => {
            results.push(scenarios::test_concurrent(&cli.base_url, interval).await?);
        }
        ScenarioChoice::All => {
            results.push(scenarios::test_connection(&cli.base_url, interval).await?);
            results.push(scenarios::test_cadence(&cli.base_url, interval, samples).await?);
            results.push(scenarios::test_concurrent(&cli.base_url, interval).await?);
        }
    }

    println!("\n{}", "=== RESULTS ===".bright_white().bold());
    print_test_summary(&results);

    let all_passed = results.iter().all(|r| r.passed);

    if all_passed {
        println!("\n{}", "All tests passed! ✓".bright_green().bold());
    } else {
        println!("\n{}", "Some tests failed! ✗".bright_red().bold());
    }

    std::process::exit(if all_passed { 0 } else { 1 });
}

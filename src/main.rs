use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use riskseer::config;
use riskseer::engine::score_protocol;
use riskseer::model::{ProtocolInput, Severity};
use riskseer::monitoring::ReportLogger;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a protocol description and print the risk report as JSON
    Score {
        /// Path to a protocol description JSON file ("-" reads stdin)
        input: PathBuf,
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
        /// Exit non-zero when overall severity reaches this tier
        #[arg(long)]
        fail_on: Option<Severity>,
    },
    /// Write an example protocol description to stdout
    Init,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Score {
            input,
            pretty,
            fail_on,
        }) => run_score(input, pretty, fail_on).await,
        Some(Commands::Init) => {
            println!("{}", example_input()?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            info!("No command specified. Use --help for available commands.");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_score(
    input_path: PathBuf,
    pretty: bool,
    fail_on: Option<Severity>,
) -> Result<ExitCode> {
    let config = config::load_config()?;
    let pretty = pretty || config.pretty_output;
    let fail_on = fail_on.or(config.fail_on_severity);

    let raw = if input_path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("reading protocol input from stdin")?
    } else {
        std::fs::read_to_string(&input_path)
            .with_context(|| format!("reading protocol input from {}", input_path.display()))?
    };

    let input: ProtocolInput =
        serde_json::from_str(&raw).context("parsing protocol input JSON")?;

    let report = score_protocol(&input)?;

    let logger = ReportLogger::new(&config.log_dir)?;
    if let Err(e) = logger.log_report(&report).await {
        // The report itself still goes to stdout; a broken log is not fatal.
        tracing::warn!("Failed to append report log: {e}");
    }

    let rendered = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{rendered}");

    if let Some(threshold) = fail_on {
        if report.overall_severity >= threshold {
            info!(
                severity = %report.overall_severity,
                "overall severity at or above fail threshold"
            );
            return Ok(ExitCode::from(2));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn example_input() -> Result<String> {
    let example = serde_json::json!({
        "address": "0x1234567890abcdef1234567890abcdef12345678",
        "name": "Example Yield Protocol",
        "tvl": 25_000_000.0,
        "tokenomics": {
            "totalSupply": 100_000_000.0,
            "circulatingSupply": 40_000_000.0,
            "emissionRate": 500.0,
            "concentration": 0.65
        },
        "governance": {
            "quorum": 0.04,
            "votingPeriod": 259_200,
            "timelockDelay": 172_800,
            "proposalThreshold": 0.01,
            "topHolderVotingPower": 0.22
        },
        "pools": [
            {
                "address": "0xpool1",
                "token0": "EXM",
                "token1": "WETH",
                "liquidity": 3_000_000.0,
                "volume24h": 900_000.0,
                "fees": 0.003
            }
        ]
    });
    Ok(serde_json::to_string_pretty(&example)?)
}

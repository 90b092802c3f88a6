//! fork-check: inspect and vet fork schedules from the command line.
//!
//! Logs go to stderr; command output goes to stdout.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use primitive_types::H256;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chain_forks::{
    check_compatible_bounded, derive_rules, load_schedule, rewind_round_limit,
    validate_fork_order, ActivationPoint, ForkConfig, ForkSchedule, Network, NetworkTable,
};

/// fork-check: fork schedule tool
#[derive(Parser, Debug)]
#[command(name = "fork-check")]
#[command(about = "Validate fork schedules and check upgrade compatibility")]
#[command(version)]
struct Cli {
    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that a schedule's activation heights follow protocol order
    Validate(ScheduleSource),

    /// Check whether a candidate schedule can replace a stored one at a height
    Compat {
        /// Schedule the node is currently running with
        #[arg(long)]
        stored: PathBuf,

        /// Schedule the node would switch to
        #[arg(long)]
        candidate: PathBuf,

        /// Current head height
        #[arg(long)]
        height: u64,

        /// Cap on rewind rounds (never above the schedule-derived limit)
        #[arg(long)]
        max_rounds: Option<usize>,
    },

    /// Print the rule snapshot at a height as JSON
    Rules {
        #[command(flatten)]
        source: ScheduleSource,

        /// Block height
        #[arg(long)]
        height: u64,
    },

    /// Print the trusted light-client checkpoint of a network
    Checkpoint {
        /// Built-in network name
        #[arg(long, conflicts_with = "genesis")]
        network: Option<Network>,

        /// Genesis hash of the chain
        #[arg(long, value_parser = parse_hash)]
        genesis: Option<H256>,
    },

    /// Print a schedule summary
    Show {
        #[command(flatten)]
        source: ScheduleSource,

        /// Print the full JSON document instead of the summary line
        #[arg(long)]
        json: bool,

        /// Print every upgrade with its activation height as JSON
        #[arg(long, conflicts_with = "json")]
        points: bool,
    },
}

/// Where to take a schedule from. Falls back to FORK_* environment variables.
#[derive(Args, Debug)]
#[group(multiple = false)]
struct ScheduleSource {
    /// JSON schedule file
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Built-in network name
    #[arg(long)]
    network: Option<Network>,

    /// Genesis hash of a built-in network
    #[arg(long, value_parser = parse_hash)]
    genesis: Option<H256>,
}

impl ScheduleSource {
    fn load(&self) -> Result<ForkSchedule> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Explicit flags win; FORK_* variables are read only when none is given.
    fn load_with(&self, vars: impl Fn(&str) -> Option<String>) -> Result<ForkSchedule> {
        let config = match (&self.schedule, self.network, self.genesis) {
            (Some(path), _, _) => ForkConfig {
                schedule_override: Some(load(path)?),
                ..ForkConfig::default()
            },
            (None, Some(network), _) => ForkConfig {
                network: Some(network),
                ..ForkConfig::default()
            },
            (None, None, Some(_)) => ForkConfig::default(),
            (None, None, None) => ForkConfig::from_vars(vars)
                .context("Failed to read FORK_* environment variables")?,
        };
        let genesis = self.genesis.unwrap_or_default();
        config
            .resolve_schedule(&NetworkTable::builtin(), &genesis)
            .context("No schedule source: pass --schedule, --network or --genesis, or set FORK_NETWORK / FORK_SCHEDULE_FILE")
    }
}

fn load(path: &Path) -> Result<ForkSchedule> {
    load_schedule(path).with_context(|| format!("Failed to load schedule {}", path.display()))
}

fn parse_hash(s: &str) -> Result<H256, String> {
    let digits = s.trim().trim_start_matches("0x");
    let bytes = hex::decode(digits).map_err(|e| e.to_string())?;
    if bytes.len() != 32 {
        return Err(format!("expected 32 bytes, got {}", bytes.len()));
    }
    Ok(H256::from_slice(&bytes))
}

fn activation_report(schedule: &ForkSchedule) -> serde_json::Value {
    let points: Vec<ActivationPoint> = schedule.points().collect();
    serde_json::json!({
        "chainId": schedule.chain_id(),
        "eip150Hash": schedule.eip150_hash(),
        "points": points,
    })
}

fn init_tracing(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log level")?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    installed.context("Failed to install tracing subscriber")
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Validate(source) => {
            let schedule = source.load()?;
            match validate_fork_order(&schedule) {
                Ok(()) => {
                    println!("valid: {}", schedule);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    println!("invalid: {}", err);
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Compat {
            stored,
            candidate,
            height,
            max_rounds,
        } => {
            let stored = load(&stored)?;
            let candidate = load(&candidate)?;
            let natural = rewind_round_limit(&stored, &candidate);
            let rounds = max_rounds.map_or(natural, |cap| cap.min(natural));
            debug!(height, rounds, "Checking compatibility");

            match check_compatible_bounded(&stored, &candidate, height, rounds) {
                Ok(()) => {
                    println!("compatible");
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    println!("{}", err);
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Rules { source, height } => {
            let rules = derive_rules(&source.load()?, height);
            println!("{}", serde_json::to_string_pretty(&rules)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Checkpoint { network, genesis } => {
            let table = NetworkTable::builtin();
            let network = match (network, genesis) {
                (Some(network), _) => network,
                (None, Some(genesis)) => table
                    .network(&genesis)
                    .with_context(|| format!("Unknown genesis {:#x}", genesis))?,
                (None, None) => ForkConfig::from_env()?
                    .network
                    .context("Pass --network or --genesis, or set FORK_NETWORK")?,
            };

            let Some(checkpoint) = network.checkpoint() else {
                info!(%network, "Network has no trusted checkpoint");
                println!("{}: no checkpoint", network);
                return Ok(ExitCode::SUCCESS);
            };

            let report = serde_json::json!({
                "network": network,
                "sectionIndex": checkpoint.section_index,
                "hash": format!("{:#x}", checkpoint.hash()),
                "empty": checkpoint.is_empty(),
                "oracle": network.oracle(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Show {
            source,
            json,
            points,
        } => {
            let schedule = source.load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&schedule)?);
            } else if points {
                println!("{}", serde_json::to_string_pretty(&activation_report(&schedule))?);
            } else {
                println!("{}", schedule);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs)?;
    run(cli.command)
}

//! `slotctl` — run the interview slot engine over JSON files.
//!
//! ## Usage
//!
//! ```sh
//! # Rank proposals for a request (stdin → stdout)
//! slotctl match < request.json
//!
//! # From file to file, pretty-printed
//! slotctl match -i request.json -o proposals.json --pretty
//!
//! # Re-check a chosen proposal against freshly fetched busy data
//! slotctl revalidate --proposal proposal.json --request fresh.json
//!
//! # Timezone conversions
//! slotctl local --instant 2026-03-16T14:00:00Z --zone America/New_York
//! slotctl instant --local 2026-03-16T10:00:00 --zone America/New_York
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` or `--log-level` to see them.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use serde_json::Value;
use slot_engine::{Proposal, SchedulingRequest};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slotctl",
    version,
    about = "Match and revalidate interview slots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "slot_engine=trace")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute ranked proposals for a scheduling request
    Match {
        /// Request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Check a proposal against a request carrying fresh busy data
    Revalidate {
        /// Proposal file (one element of `slotctl match` output)
        #[arg(long)]
        proposal: String,
        /// Request file with the fresh participant data
        #[arg(long)]
        request: String,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Convert an RFC 3339 instant to wall-clock time in a zone
    Local {
        #[arg(long)]
        instant: String,
        #[arg(long)]
        zone: String,
    },
    /// Convert wall-clock time in a zone to a UTC instant
    Instant {
        /// Local time as YYYY-MM-DDTHH:MM:SS
        #[arg(long)]
        local: String,
        #[arg(long)]
        zone: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Match {
            input,
            output,
            pretty,
        } => {
            let raw = read_input(input.as_deref())?;
            let request: SchedulingRequest =
                serde_json::from_str(&raw).context("Failed to parse scheduling request")?;
            let proposals =
                slot_engine::schedule(&request).context("Failed to schedule interview")?;
            debug!(count = proposals.len(), "writing proposals");
            write_output(output.as_deref(), &to_json(&proposals, pretty)?)?;
        }
        Commands::Revalidate {
            proposal,
            request,
            output,
            pretty,
        } => {
            let proposal = parse_proposal(&read_input(Some(&proposal))?)?;
            let fresh: SchedulingRequest = serde_json::from_str(&read_input(Some(&request))?)
                .context("Failed to parse fresh request")?;
            let result = slot_engine::revalidate_request(&proposal, &fresh)
                .context("Failed to normalize fresh availability")?;
            write_output(output.as_deref(), &to_json(&result, pretty)?)?;
        }
        Commands::Local { instant, zone } => {
            let instant = DateTime::parse_from_rfc3339(&instant)
                .with_context(|| format!("Invalid RFC 3339 instant: {}", instant))?
                .with_timezone(&Utc);
            let local = slot_engine::to_local(instant, &zone)?;
            println!("{}", local.format("%Y-%m-%dT%H:%M:%S"));
        }
        Commands::Instant { local, zone } => {
            let naive: NaiveDateTime = local
                .parse()
                .with_context(|| format!("Invalid local time: {}", local))?;
            let instant = slot_engine::to_instant(naive, &zone)?;
            println!("{}", instant.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--log-level`.
fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level/filter '{}'", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to install log subscriber: {}", err))
}

/// Accept either a single proposal or the full `match` output (first entry).
fn parse_proposal(raw: &str) -> Result<Proposal> {
    let value: Value = serde_json::from_str(raw).context("Failed to parse proposal JSON")?;
    let value = match value {
        Value::Array(mut items) => {
            if items.is_empty() {
                anyhow::bail!("Proposal file contains an empty list");
            }
            items.swap_remove(0)
        }
        other => other,
    };
    serde_json::from_value(value).context("Failed to parse proposal")
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let mut json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    json.push('\n');
    Ok(json)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

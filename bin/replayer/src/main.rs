//! Exit tree replayer
//!
//! Reads a JSON-lines bridge event log, rebuilds the exit tree from scratch and prints
//! the deposit root. With `--proof <deposit_count>` it also prints the inclusion proof
//! of that deposit.
//!
//! Run: `replayer events.jsonl --proof 3` (or set `EVENT_LOG_PATH`)

use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use xlayer_bridge::{EventLog, exit_tree::format_hash_hex};

/// Command line options
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines bridge event log
    #[arg(env = "EVENT_LOG_PATH")]
    event_log: PathBuf,

    /// Also print and check the inclusion proof of this deposit count
    #[arg(long)]
    proof: Option<u64>,
}

/// Replay summary printed to stdout
#[derive(Debug, Serialize)]
struct Output {
    deposit_count: u64,
    deposit_root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    proof: Option<ProofOutput>,
}

#[derive(Debug, Serialize)]
struct ProofOutput {
    index: u64,
    leaf: String,
    siblings: Vec<String>,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let file = File::open(&args.event_log)
        .with_context(|| format!("failed to open event log {}", args.event_log.display()))?;
    let log = EventLog::read_json_lines(BufReader::new(file)).context("failed to read event log")?;
    info!(path = %args.event_log.display(), events = log.len(), "Loaded bridge events");

    let tree = log.replay().context("failed to replay bridge events")?;
    let deposit_root = tree.root();
    info!(
        deposit_count = tree.deposit_count(),
        deposit_root = %format_hash_hex(&deposit_root),
        "Rebuilt exit tree"
    );

    let proof = match args.proof {
        Some(index) => {
            let proof = log.proof(index).context("failed to build proof")?;
            if !proof.verify(&deposit_root)? {
                bail!("generated proof for deposit {index} does not match the replayed root");
            }
            Some(ProofOutput {
                index,
                leaf: format_hash_hex(&proof.leaf),
                siblings: proof.siblings.iter().map(format_hash_hex).collect(),
            })
        }
        None => None,
    };

    let output = Output {
        deposit_count: tree.deposit_count(),
        deposit_root: format_hash_hex(&deposit_root),
        proof,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

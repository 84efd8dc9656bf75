//! Demo runner with a configurable duration and a statistics report.
//!
//! Run with:
//! ```bash
//! cargo run --bin periodici-demo --features demo -- --run-for 20 --stats --pretty
//! ```

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use periodici::config::Seeds;
use periodici::{Config, System};
use tracing::info;

/// Demo application for periodici - jittered tasks over a shared counter.
///
/// Runs the producer and display tasks for a while, then cancels them and
/// optionally prints what happened as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file (missing fields take their default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after N seconds (runs forever when omitted)
    #[arg(short, long)]
    run_for: Option<u64>,

    /// Base seed for every generator
    #[arg(long)]
    seed: Option<u64>,

    /// Print a JSON statistics snapshot to stderr on exit
    #[arg(long)]
    stats: bool,

    /// Pretty print the JSON statistics
    #[arg(long)]
    pretty: bool,
}

fn main() -> periodici::Result<()> {
    periodici::init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seeds(Seeds::from_base(seed));
    }

    let handle = System::new(config)?.spawn(std::io::stdout())?;

    let Some(secs) = args.run_for else {
        return handle.join();
    };

    thread::sleep(Duration::from_secs(secs));
    let snapshot = handle.snapshot().with_timestamp();
    handle.shutdown()?;
    info!(
        sent = snapshot.records_sent,
        dropped = snapshot.records_dropped,
        "demo finished"
    );

    if args.stats {
        eprintln!("{}", snapshot.to_json(args.pretty)?);
    }
    Ok(())
}

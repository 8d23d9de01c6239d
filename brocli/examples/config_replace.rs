//! Configuration replace example
//!
//! Loads connection settings from a TOML file, checkpoints the running
//! configuration, stages a candidate through the relay host and shows the
//! device-side diff. The candidate is committed only with `--commit`;
//! otherwise it is discarded.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example config_replace -- --config sw0.toml --candidate new.cfg
//! cargo run --example config_replace -- --config sw0.toml --candidate new.cfg --commit
//! ```
//!
//! The config file needs a `[relay]` table, see `brocli::config`.

use std::env;
use std::path::PathBuf;

use brocli::{DriverBuilder, DriverConfig, LoadMode};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let (Some(config_path), Some(candidate)) = (args.config, args.candidate) else {
        Args::print_help();
        std::process::exit(1);
    };

    let config = DriverConfig::from_file(&config_path)?;
    println!("=== brocli Config Replace Example ===\n");
    println!("Connecting to {}:{}...", config.host, config.port);

    let mut driver = DriverBuilder::from_config(config).build()?;
    driver.open().await?;

    driver.checkpoint_running().await?;
    println!("Running configuration checkpointed.");

    let mode = if args.merge { LoadMode::Merge } else { LoadMode::Replace };
    driver.load_candidate(&candidate, mode).await?;
    println!("Candidate {} staged ({:?}).\n", candidate.display(), mode);

    let diff = driver.compare().await?;
    println!("--- Diff (running vs candidate) ---");
    if diff.trim().is_empty() {
        println!("(no changes)");
    } else {
        println!("{diff}");
    }
    println!();

    if args.commit {
        let outcome = driver.commit().await?;
        println!("Committed.");
        if !outcome.candidate_discarded {
            println!("Warning: the candidate file could not be removed from the switch.");
        }
    } else {
        driver.discard().await?;
        println!("Candidate discarded (pass --commit to apply).");
    }

    println!("State: {:?}", driver.config_state());
    driver.close().await?;
    Ok(())
}

struct Args {
    config: Option<PathBuf>,
    candidate: Option<PathBuf>,
    merge: bool,
    commit: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut config = None;
        let mut candidate = None;
        let mut merge = false;
        let mut commit = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    i += 1;
                    if i < args.len() {
                        config = Some(PathBuf::from(&args[i]));
                    }
                }
                "--candidate" | "-f" => {
                    i += 1;
                    if i < args.len() {
                        candidate = Some(PathBuf::from(&args[i]));
                    }
                }
                "--merge" => merge = true,
                "--commit" => commit = true,
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {}
            }
            i += 1;
        }

        Self {
            config,
            candidate,
            merge,
            commit,
        }
    }

    fn print_help() {
        println!("brocli config replace example");
        println!();
        println!("USAGE:");
        println!("    cargo run --example config_replace -- --config <FILE> --candidate <FILE> [OPTIONS]");
        println!();
        println!("OPTIONS:");
        println!("    -c, --config <FILE>       Driver TOML configuration");
        println!("    -f, --candidate <FILE>    Candidate configuration to stage");
        println!("        --merge               Stage as a merge instead of a replace");
        println!("        --commit              Apply the candidate after showing the diff");
        println!("        --help                Print help");
    }
}

//! # CLI - CrestKV Interactive Shell
//!
//! A REPL-style frontend for the CrestKV storage engine. Reads commands
//! from stdin, executes them against the store, and prints results to
//! stdout. Works interactively and scripted (pipe commands via stdin).
//!
//! ## Commands
//!
//! ```text
//! SET key value   Insert or update a key
//! GET key         Look up a key (prints the value or "Key not found")
//! DEL key         Delete a key (prints the prior value)
//! FLUSH           Force-flush the memtable to a new segment
//! COMPACT         Merge segments down to the merge threshold
//! STATS           Print store debug info
//! STOP            Shut down gracefully (also EXIT / QUIT)
//! ```
//!
//! A `GET` or `DEL` of a key that is absent or deleted prints
//! `Key not found`; real failures print an `ERR` line.
//!
//! ## Configuration
//!
//! Every engine tunable is a flag; defaults match the deployed constants:
//!
//! ```text
//! --wal-path         WAL file path               (default "mydb.wal")
//! --segment-dir      segment directory           (default "SSTFiles")
//! --flush-threshold  flush above this many entries (default 1000)
//! --load-count       newest segments kept in memory (default 1000)
//! --merge-threshold  compact above this many segments (default 10)
//! --no-wal-sync      skip fsync after WAL appends
//! ```
//!
//! Log verbosity follows `RUST_LOG` (defaults to `info`).

use anyhow::Result;
use clap::Parser;
use engine::{Config, Store};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// CrestKV interactive shell
#[derive(Parser, Debug)]
#[command(name = "crestkv")]
#[command(about = "Persistent ordered key-value store")]
#[command(version)]
struct Args {
    /// WAL file path
    #[arg(long, default_value = "mydb.wal")]
    wal_path: PathBuf,

    /// Segment directory
    #[arg(long, default_value = "SSTFiles")]
    segment_dir: PathBuf,

    /// Flush the memtable once it holds more than this many entries
    #[arg(long, default_value_t = 1000)]
    flush_threshold: usize,

    /// How many of the newest segments stay loaded in memory
    #[arg(long, default_value_t = 1000)]
    load_count: u64,

    /// Compact while the segment count exceeds this
    #[arg(long, default_value_t = 10)]
    merge_threshold: u64,

    /// Skip the fsync after every WAL append
    #[arg(long)]
    no_wal_sync: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = Config {
        wal_path: args.wal_path,
        segment_dir: args.segment_dir,
        flush_threshold: args.flush_threshold,
        load_count: args.load_count,
        merge_threshold: args.merge_threshold,
        wal_sync: !args.no_wal_sync,
        ..Config::default()
    };

    let mut store = Store::start(config)?;

    println!(
        "CrestKV started (wal={}, segments={}, flush>{} entries)",
        store.config().wal_path.display(),
        store.segment_count(),
        store.config().flush_threshold
    );
    println!("Commands: SET key value | GET key | DEL key | FLUSH | COMPACT | STATS | STOP");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "SET" => {
                    if let Some(key) = parts.next() {
                        let value: String = parts.collect::<Vec<&str>>().join(" ");
                        if value.is_empty() {
                            println!("ERR usage: SET key value");
                        } else {
                            match store.set(key, &value) {
                                Ok(()) => println!("OK"),
                                Err(e) => println!("ERR set failed: {}", e),
                            }
                        }
                    } else {
                        println!("ERR usage: SET key value");
                    }
                }
                "GET" => {
                    if let Some(key) = parts.next() {
                        match store.get(key) {
                            Ok(value) => println!("{}", value),
                            Err(e) if e.is_logical() => println!("Key not found"),
                            Err(e) => println!("ERR read failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: GET key");
                    }
                }
                "DEL" => {
                    if let Some(key) = parts.next() {
                        match store.delete(key) {
                            Ok(prior) => println!("{}", prior),
                            Err(e) if e.is_logical() => println!("Key not found"),
                            Err(e) => println!("ERR delete failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: DEL key");
                    }
                }
                "FLUSH" => match store.force_flush() {
                    Ok(()) => println!("OK (segments={})", store.segment_count()),
                    Err(e) => println!("ERR flush failed: {}", e),
                },
                "COMPACT" => match store.compact() {
                    Ok(()) => println!("OK (segments={})", store.segment_count()),
                    Err(e) => println!("ERR compact failed: {}", e),
                },
                "STATS" => {
                    println!("{:?}", store);
                }
                "STOP" | "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    store.stop()?;
    Ok(())
}

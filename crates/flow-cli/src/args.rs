//! Command-line argument definitions for the `flowchart` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Validate, format, and inspect flowchart XML documents
#[derive(Parser, Debug)]
#[command(name = "flowchart", author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML) overriding editor thresholds
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Import a document and report what it contains
    Check {
        input: PathBuf,
    },
    /// Import, normalize, and re-export a document in canonical form
    Fmt {
        input: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print document statistics
    Stats {
        input: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the imported document model as JSON
    Dump {
        input: PathBuf,
    },
    /// Write the built-in sample document
    Sample {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

//! Command-line interface for signscribe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Fingerspelling to text
#[derive(Parser, Debug)]
#[command(name = "signscribe", version, about = "Fingerspelling to text")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress diagnostics (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: session summary, -vv: hold progress per frame)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a duration string.
///
/// Bare numbers are milliseconds; anything else goes through `humantime`
/// (`1s`, `1500ms`, `1s500ms`).
fn parse_millis_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // Bare number → milliseconds
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(Duration::from_millis(ms));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a recorded score stream through the resolver and segmenter
    Replay {
        /// JSON Lines recording, or `-` for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Pace frames by their recorded timestamps instead of running flat out
        #[arg(long)]
        realtime: bool,

        /// Emit one JSON object per display change instead of text
        #[arg(long)]
        json: bool,

        /// Hold needed to confirm a letter (e.g. 1s, 800ms)
        #[arg(long, value_name = "DURATION", value_parser = parse_millis_duration)]
        confirm_hold: Option<Duration>,

        /// Blank hold needed to flush a word (e.g. 2s)
        #[arg(long, value_name = "DURATION", value_parser = parse_millis_duration)]
        flush_blank: Option<Duration>,
    },

    /// Print the label set and the disambiguation table
    Labels,

    /// View and initialise configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

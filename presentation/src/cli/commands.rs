//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for a finished round
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable transcript
    Text,
    /// Session and turns as JSON
    Json,
}

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Advisory roundtable - a panel of personas discusses your idea")]
#[command(long_about = r#"
Roundtable runs a panel of AI personas (Product Manager, CTO, Investor,
Marketer, CEO) that discuss a kickoff topic one turn at a time. Each
participant answers the previous participant's output.

The round ends when every participant has spoken, when a completion call
fails (no retries), or when you press Ctrl-C.

Configuration files are loaded from (in priority order):
1. ROUNDTABLE_* environment variables
2. --config <path>     Explicit config file
3. ./roundtable.toml   Project-level config
4. ~/.config/roundtable/config.toml   Global config

The API key is read from $ROUNDTABLE_API_KEY unless [provider].api_key_env
names another variable.

Example:
  roundtable "We want to build a scheduling app for dentists"
  roundtable --recipient CTO "Should we rewrite the backend in Rust?"
  roundtable --output json "Launch in Europe first?"
"#)]
pub struct Cli {
    /// The kickoff topic (not required with --show-config or --list-personas)
    pub topic: Option<String>,

    /// Participant who answers the kickoff first
    #[arg(short, long, value_name = "ID")]
    pub recipient: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Per-call timeout in seconds (overrides config)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Word limit per answer (overrides config)
    #[arg(long, value_name = "N")]
    pub max_words: Option<usize>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// List the configured participants and exit
    #[arg(long)]
    pub list_personas: bool,
}

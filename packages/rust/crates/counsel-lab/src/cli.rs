use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "counsel-lab")]
#[command(about = "Financial-advice chat experiment: label LLM candidate replies, collect turn logs.")]
pub(crate) struct Cli {
    /// Override config directory (holds `counsel-lab/settings.yaml`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Completion model id (default: gpt-5.1).
    #[arg(long, global = true)]
    pub(crate) model: Option<String>,

    /// Prompt template file (default: prompt.txt).
    #[arg(long, global = true)]
    pub(crate) prompt_file: Option<PathBuf>,

    /// JSONL turn log path (default: logs/turns.jsonl).
    #[arg(long, global = true)]
    pub(crate) log_path: Option<PathBuf>,

    /// Debug-level logs for counsel_lab (RUST_LOG still wins).
    #[arg(long, global = true, default_value_t = false)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the participant HTTP gateway. Default bind: 0.0.0.0:8080
    Gateway {
        /// Listen address (e.g. 0.0.0.0:8080)
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,

        /// Per-turn timeout in seconds (default: 300)
        #[arg(long)]
        turn_timeout: Option<u64>,
    },
    /// Run one participant session on stdin/stdout.
    Console {
        /// Participant name; skips the `/start` step.
        #[arg(long)]
        name: Option<String>,
    },
    /// Export the JSONL turn log to CSV and exit.
    Export {
        /// Output CSV path (default: logs/turns.csv).
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

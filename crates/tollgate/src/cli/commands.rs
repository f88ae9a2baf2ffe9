//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tollgate - quota-enforcing, retrying, cost-tracking LLM gateway
#[derive(Parser, Debug)]
#[command(name = "tollgate")]
#[command(about = "Quota-enforcing, retrying, cost-tracking LLM gateway", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file layered over the bundled defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a chat completion
    Complete {
        /// User prompt
        prompt: String,

        /// Optional system prompt
        #[arg(long)]
        system: Option<String>,

        /// Named request profile (model and temperature)
        #[arg(long, conflicts_with_all = ["model", "temperature"])]
        profile: Option<String>,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f32>,

        /// Completion token limit
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Embed one or more texts
    Embed {
        /// Texts to embed; more than one is sent as a single batch
        #[arg(required = true)]
        texts: Vec<String>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Classify the sentiment of a text
    Sentiment {
        /// Text to classify
        text: String,
    },

    /// Print the effective configuration
    Config,
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

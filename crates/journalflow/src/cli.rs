//! Command-line interface for JournalFlow.

use clap::{Parser, Subcommand};

/// Configurable audio-message processing pipeline.
#[derive(Debug, Parser)]
#[command(name = "journalflow", version, about)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the pipeline: one poll cycle, or a watch loop
    Run {
        /// Entity type to process
        #[arg(long, default_value = "audio_message")]
        entity_type: String,

        /// Keep polling instead of exiting after one cycle
        #[arg(long)]
        watch: bool,

        /// Seconds between poll cycles in watch mode
        #[arg(long, default_value_t = 30)]
        interval: u64,

        /// Transcription engine key
        #[arg(long, default_value = "openai")]
        transcriber: String,

        /// Log per-entity progress
        #[arg(short, long)]
        verbose: bool,
    },

    /// Apply pending database migrations
    Migrate,
}

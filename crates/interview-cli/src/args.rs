use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "interview")]
#[command(about = "Run synthetic interview simulations against the decision engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv). Overridden by RUST_LOG if set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scripted respondent against a methodology/concept for up to
    /// `max_turns` turns, printing a JSON transcript to stdout.
    Simulate {
        /// Path to a methodology YAML file.
        #[arg(long)]
        methodology: PathBuf,

        /// Path to a concept YAML file.
        #[arg(long)]
        concept: PathBuf,

        /// Respondent persona: engaged, terse, or skeptical.
        #[arg(long, default_value = "engaged")]
        persona: String,

        /// Upper bound on the number of turns to run.
        #[arg(long, default_value_t = 10)]
        max_turns: u32,
    },
}

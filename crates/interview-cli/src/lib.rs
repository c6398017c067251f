//! CLI entry point for running synthetic interview simulations against
//! the turn pipeline — a thin wrapper over `interview-testing`'s
//! `InterviewWorld` harness.

mod args;
mod commands;

pub use args::{Cli, Commands};
pub use commands::run;

pub fn init_tracing(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let default_directive = match verbosity {
        0 => "interview=info",
        1 => "interview=debug",
        _ => "interview=trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

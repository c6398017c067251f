use clap::Parser;
use interview_cli::{init_tracing, run, Cli};

#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[tokio::main]
async fn main() {
    #[cfg(unix)]
    reset_sigpipe();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = run(cli.command).await;
    std::process::exit(code);
}

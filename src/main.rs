//! Voice Memos CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voice_memos::cli::{init_logging, run_command, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    run_command(cli.command).await
}

//! git-cli - AI-assisted git commits
//!
//! Run `git-cli commit` (or `git cli commit`) inside a repository to stage
//! everything and commit with an AI-generated Conventional Commit message.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use git_cli::cli::commands::{Cli, Commands};
use git_cli::cli::commit;
use git_cli::error::Result;

#[tokio::main]
async fn main() {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Usage errors exit 1; --help and --version exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(cli).await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        // No subcommand - show help
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
        Some(Commands::Commit) => commit::handle_commit().await,
    }
}

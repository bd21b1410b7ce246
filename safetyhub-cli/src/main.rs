//! SafetyHub CLI - Command-line interface
//!
//! This binary provides a command-line interface to the SafetyHub library.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use safetyhub::logging;
use safetyhub::report::UserId;

mod commands;
mod error;

use commands::demo::{self, DemoOptions};
use error::CliError;

#[derive(Parser)]
#[command(name = "safetyhub")]
#[command(about = "Drive a live SafetyHub service from the command line", long_about = None)]
#[command(version = safetyhub::VERSION)]
struct Cli {
    /// Directory for log files
    #[arg(long, default_value_t = logging::default_log_dir().to_string())]
    log_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a scripted demo: configure sources, refresh, dismiss, report
    Demo(DemoArgs),
}

#[derive(Args)]
struct DemoArgs {
    /// User scope to run the demo under
    #[arg(long, default_value = "0")]
    user: u32,

    /// Number of demo sources to configure
    #[arg(long, default_value = "3")]
    sources: usize,

    /// Per-source solicitation window in milliseconds
    #[arg(long, default_value = "500")]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _guard = match logging::init_logging(&cli.log_dir, logging::default_log_file()) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e.to_string()).exit(),
    };

    let result = match cli.command {
        Command::Demo(args) => {
            demo::run(DemoOptions {
                user: UserId(args.user),
                sources: args.sources,
                source_timeout: Duration::from_millis(args.timeout_ms),
            })
            .await
        }
    };

    if let Err(e) = result {
        e.exit();
    }
}

//! reviewbot CLI - AI code review for pull request diffs
//!
//! `reviewbot <DIFF_FILE>` reviews a saved diff and prints Markdown;
//! `reviewbot ci` runs inside a pull request pipeline.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use reviewbot_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CiArgs, ConfigArgs, ReviewArgs};

/// reviewbot: AI code review for unified diffs
#[derive(Parser, Debug)]
#[command(name = "reviewbot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model to use (overrides config and env)
    #[arg(long, global = true, env = "REVIEWBOT_MODEL")]
    model: Option<String>,

    /// Chat-completions endpoint URL (overrides config and env)
    #[arg(long, global = true, env = "REVIEWBOT_ENDPOINT")]
    endpoint: Option<String>,

    /// Diff file to review (same as `reviewbot review <DIFF_FILE>`)
    diff_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Review a saved diff file and print the result
    #[command(visible_alias = "r")]
    Review(ReviewArgs),

    /// Review the pull request diff inside a CI pipeline
    Ci(CiArgs),

    /// Show current configuration
    Config(ConfigArgs),

    /// Show version information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // stdout carries the review, so logs go to stderr
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Commands that work without a valid configuration
    let config = match &cli.command {
        Some(Commands::Version) => {
            println!("reviewbot {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(Commands::Config(args)) if args.init_secrets => return args.create_secrets_template(),
        _ => Config::load_with_overrides(cli.model.clone(), cli.endpoint.clone())?,
    };

    if cli.verbose {
        tracing::info!(
            endpoint = %config.inference.endpoint,
            model = %config.inference.model,
            timeout = ?config.inference.timeout,
            "Configuration loaded"
        );
    }

    match (cli.command, cli.diff_file) {
        (Some(Commands::Review(args)), _) => args.execute(&config).await,
        (Some(Commands::Ci(args)), _) => args.execute(&config).await,
        (Some(Commands::Config(args)), _) => args.execute(&config),
        (Some(Commands::Version), _) => Ok(()),
        (None, Some(diff_file)) => ReviewArgs { diff_file }.execute(&config).await,
        (None, None) => {
            anyhow::bail!("No diff file given. Usage: reviewbot <DIFF_FILE> (see --help)")
        }
    }
}

/// Print the diagnostic and exit with the matching code
fn report(err: &anyhow::Error) -> ExitCode {
    let code = exit_code(err);
    if code == 2 {
        eprintln!("AI review failed: {:#}", err);
    } else {
        eprintln!("Error: {:#}", err);
    }
    ExitCode::from(code)
}

/// 2 for review failures, 1 for everything else (usage, files, config, git)
fn exit_code(err: &anyhow::Error) -> u8 {
    let review_failure = err
        .chain()
        .filter_map(|e| e.downcast_ref::<reviewbot_core::Error>())
        .any(|e| e.is_review_failure());

    if review_failure {
        2
    } else {
        1
    }
}

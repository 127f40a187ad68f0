//! imgpipe - apply, undo, export and replay image operation pipelines

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "imgpipe")]
#[command(author, version, about = "Image operation pipelines with undo/redo and replay")]
#[command(long_about = "
Applies image operations one step at a time, keeps an undoable history,
and exports the applied steps as a JSON pipeline that can be replayed
on another image.

Examples:
  imgpipe ops                                        # List operations
  imgpipe run in.png -o out.png -s \"Gaussian Blur:ksize=5\" -s Invert
  imgpipe run in.png -o out.png -s Threshold -s Erode --undo 1 --export p.json
  imgpipe replay other.png p.json -o other_out.png
  imgpipe replay other.png p.json -o out.png --restart
  imgpipe validate p.json
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace; RUST_LOG overrides)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Session config (YAML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// List operations and their parameters
    #[command(visible_alias = "o")]
    Ops(OpsArgs),

    /// Apply operations to an image
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Replay a pipeline document on an image
    Replay(ReplayArgs),

    /// Check a pipeline document
    #[command(visible_alias = "v")]
    Validate(ValidateArgs),
}

#[derive(Args)]
struct OpsArgs {
    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RunArgs {
    /// Input image (PNG)
    input: PathBuf,

    /// Output image (PNG)
    #[arg(short, long)]
    output: PathBuf,

    /// Operation step, applied in order: "Name" or "Name:key=value,key=value"
    #[arg(short = 's', long = "step", value_name = "STEP")]
    steps: Vec<String>,

    /// Undo this many steps after applying
    #[arg(long, default_value = "0")]
    undo: usize,

    /// Export the pipeline document here
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,
}

#[derive(Args)]
struct ReplayArgs {
    /// Input image (PNG)
    input: PathBuf,

    /// Pipeline document (JSON)
    pipeline: PathBuf,

    /// Output image (PNG)
    #[arg(short, long)]
    output: PathBuf,

    /// Collapse history to the input image before replaying
    #[arg(long)]
    restart: bool,

    /// Export the resulting pipeline document here
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,
}

#[derive(Args)]
struct ValidateArgs {
    /// Pipeline document (JSON)
    pipeline: PathBuf,
}

fn init_logging(verbose: u8, log: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log path: {}", path.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log.as_deref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ops(args) => commands::ops::run(args),
        Commands::Run(args) => commands::run::run(args, config, cli.verbose),
        Commands::Replay(args) => commands::replay::run(args, config, cli.verbose),
        Commands::Validate(args) => commands::validate::run(args, cli.verbose),
    }
}

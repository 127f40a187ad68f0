//! Replay command
//!
//! Runs a pipeline document against a new input image. The replay is all
//! or nothing: on failure no output is written.

use crate::ReplayArgs;
use anyhow::{Context, Result};
use imgpipe_history::{ReplayMode, Session, SessionConfig};
use imgpipe_ops::OperationRegistry;
use std::sync::Arc;
#[allow(unused_imports)]
use tracing::{debug, info, trace};

pub fn run(args: ReplayArgs, config: SessionConfig, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), pipeline = %args.pipeline.display(), restart = args.restart, "replay::run");

    let bytes = std::fs::read(&args.pipeline)
        .with_context(|| format!("Failed to read pipeline: {}", args.pipeline.display()))?;
    let mode = if args.restart {
        ReplayMode::RestartFromOrigin
    } else {
        ReplayMode::Append
    };

    let mut session = Session::new(Arc::new(OperationRegistry::builtin()), config);
    session.load_source(super::load_image(&args.input)?);

    let report = session
        .import(&bytes, mode)
        .with_context(|| format!("Failed to replay {}", args.pipeline.display()))?;
    info!(applied = report.applied, ?mode, "Replayed pipeline");

    if verbose > 0 {
        for record in session.timeline().ledger().visible_records() {
            println!("[{}] {}", record.step, record.operation);
        }
    }

    let image = session
        .current_image()
        .context("Session has no current image")?;
    super::save_image(&args.output, image)?;

    if let Some(path) = &args.export {
        std::fs::write(path, session.export_json()?)
            .with_context(|| format!("Failed to write pipeline: {}", path.display()))?;
    }

    println!("Replayed {} step(s) -> {}", report.applied, args.output.display());
    Ok(())
}

//! Run command
//!
//! Loads an image, applies `--step`s in order, optionally undoes some of
//! them, then writes the current image and the pipeline document.

use crate::RunArgs;
use anyhow::{Context, Result};
use imgpipe_history::{Session, SessionConfig};
use imgpipe_ops::OperationRegistry;
use std::sync::Arc;
#[allow(unused_imports)]
use tracing::{debug, info, trace};

pub fn run(args: RunArgs, config: SessionConfig, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), steps = args.steps.len(), undo = args.undo, "run::run");

    let registry = Arc::new(OperationRegistry::builtin());
    let steps = args
        .steps
        .iter()
        .map(|s| super::parse_step(&registry, s))
        .collect::<Result<Vec<_>>>()?;

    let mut session = Session::new(registry, config);
    session.load_source(super::load_image(&args.input)?);

    for (name, params) in steps {
        let preview = session
            .preview(&name, params)
            .with_context(|| format!("Step '{}' failed", name))?;
        let elapsed = preview.elapsed;
        let record = session.accept(preview)?;
        info!(step = record.step, operation = %record.operation, "Applied");
        if verbose > 0 {
            println!("[{}] {} ({:.1} ms)", record.step, record.operation, elapsed.as_secs_f64() * 1000.0);
        }
    }

    let mut undone = 0;
    while undone < args.undo && session.undo().is_some() {
        undone += 1;
    }
    if undone < args.undo {
        println!("Only {} step(s) could be undone", undone);
    }

    let image = session
        .current_image()
        .context("Session has no current image")?;
    super::save_image(&args.output, image)?;

    if let Some(path) = &args.export {
        let json = session.export_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write pipeline: {}", path.display()))?;
        if verbose > 0 {
            println!("Pipeline written to {}", path.display());
        }
    }

    let ledger = session.timeline().ledger();
    println!(
        "{} -> {} ({} step(s) active)",
        args.input.display(),
        args.output.display(),
        ledger.visible_records().len()
    );
    Ok(())
}

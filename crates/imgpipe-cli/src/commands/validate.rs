//! Validate command
//!
//! Parses a pipeline document and checks every operation name against the
//! registry.

use crate::ValidateArgs;
use anyhow::{Context, Result, bail};
use imgpipe_history::document;
use imgpipe_ops::OperationRegistry;
#[allow(unused_imports)]
use tracing::{debug, trace};

pub fn run(args: ValidateArgs, verbose: u8) -> Result<()> {
    trace!(pipeline = %args.pipeline.display(), "validate::run");

    let bytes = std::fs::read(&args.pipeline)
        .with_context(|| format!("Failed to read pipeline: {}", args.pipeline.display()))?;
    let doc = document::parse(&bytes)
        .with_context(|| format!("Invalid pipeline: {}", args.pipeline.display()))?;

    let registry = OperationRegistry::global();
    let mut unknown = Vec::new();

    println!("{}", args.pipeline.display());
    if doc.was_cleared() {
        println!("  (ledger cleared)");
    } else if doc.is_empty_history() {
        println!("  (no operations applied)");
    }
    println!("  total_steps:  {}", doc.total_steps);
    println!("  current_step: {}", doc.current_step);
    println!("  exported:     {}", doc.exported_at.to_rfc3339());
    for record in &doc.operations {
        let known = registry.contains(&record.operation);
        if !known {
            unknown.push(record.operation.clone());
        }
        let marker = if known { " " } else { "?" };
        println!("  {}[{}] {}", marker, record.step, record.operation);
        if verbose > 0 {
            for (key, value) in &record.parameters {
                println!("        {} = {}", key, value);
            }
        }
    }

    if doc.total_steps != doc.operations.len() {
        println!(
            "  note: total_steps is {} but {} operation(s) are listed",
            doc.total_steps,
            doc.operations.len()
        );
    }

    if !unknown.is_empty() {
        bail!("Unknown operation(s): {}", unknown.join(", "));
    }
    println!("OK");
    Ok(())
}

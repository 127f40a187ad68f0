//! Ops command
//!
//! Lists registered operations with their parameter schemas.

use crate::OpsArgs;
use anyhow::Result;
use imgpipe_ops::OperationRegistry;
use serde_json::json;
#[allow(unused_imports)]
use tracing::{debug, trace};

pub fn run(args: OpsArgs) -> Result<()> {
    trace!(json = args.json, "ops::run");
    let registry = OperationRegistry::global();

    if args.json {
        let ops: Vec<_> = registry
            .iter()
            .map(|op| {
                let params: Vec<_> = op
                    .schema()
                    .iter()
                    .map(|(name, spec)| json!({ "name": name, "spec": spec.describe() }))
                    .collect();
                json!({
                    "name": op.name(),
                    "description": op.description(),
                    "parameters": params,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&ops)?);
        return Ok(());
    }

    for op in registry.iter() {
        if op.description().is_empty() {
            println!("{}", op.name());
        } else {
            println!("{} - {}", op.name(), op.description());
        }
        for (name, spec) in op.schema().iter() {
            println!("    {:<14} {}", name, spec.describe());
        }
    }
    Ok(())
}

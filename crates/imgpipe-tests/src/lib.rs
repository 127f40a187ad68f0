//! Integration tests for imgpipe crates.
//!
//! These drive sessions end to end: operations through the registry,
//! commits into history and ledger, export to JSON, and transactional
//! replay back into fresh sessions.

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod properties;
#[cfg(test)]
mod scenarios;

//! CLI command implementations.

/// One-shot chat invocation.
pub mod ask;
/// Local config inspection.
pub mod config;
/// Scripted preset walkthrough.
pub mod demo;

//! Ollama chat client building blocks.
//!
//! The module contains the role-tagged message types, the tool declaration
//! helpers, and the blocking `/api/chat` client used by CLI commands.

/// Blocking Ollama chat client and error types.
pub mod client;
/// Role-tagged chat message types and assembly helpers.
pub mod message;
/// Tool schema and tool-call payload helpers.
pub mod tools;

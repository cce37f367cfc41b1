//! Command-line chat client for a local Ollama server.
//!
//! `ollie` forwards user text to `POST {host}/api/chat` and prints the model
//! reply. Five named assistant presets (greeting, weather, customer-service,
//! refund, purchase) pair a fixed system prompt with an optional static
//! tool-schema list; the tools are advertised to the model, never executed.

/// Chat message, tool, and client types.
pub mod chat;
/// CLI command implementations.
pub mod commands;
/// TOML profile configuration.
pub mod config;
/// Named assistant presets.
pub mod presets;

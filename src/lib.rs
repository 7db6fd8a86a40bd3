//! Agent-persona conversation demos over interchangeable LLM providers.
//!
//! The interesting part is [`llm::provider::resolve`]: it turns a provider
//! name plus environment state into a ready-to-use backend configuration, or
//! fails immediately when required configuration is missing. Everything else
//! is demo glue around it: a chat-completions client, a handful of persona
//! scenarios, fixture writers for their demo data, and a small web shell.

/// CLI subcommand implementations.
pub mod commands;
/// Profile config file loading.
pub mod config;
/// Demo dataset writers.
pub mod fixtures;
/// Provider resolution and chat client.
pub mod llm;
/// Persona scenarios and the conversation driver.
pub mod scenario;
/// Minimal HTTP wrapper (`parley serve`).
pub mod web;

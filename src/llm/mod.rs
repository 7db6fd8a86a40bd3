//! LLM provider plumbing.
//!
//! `provider` resolves a provider name plus environment state into a
//! [`provider::ProviderConfig`]; `chat` turns a resolved config into a
//! chat-completions client. The conversation logic itself lives in
//! [`crate::scenario`].

/// Chat-completions client and message types.
pub mod chat;
/// Provider configuration resolution.
pub mod provider;
pub(crate) mod runtime;

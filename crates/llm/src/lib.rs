//! LLM provider adapters.
//!
//! Builds the outline prompt, calls the chosen provider over HTTP and parses
//! the reply into a [`slidegen_core::Outline`].

pub mod client;
pub mod config;
pub mod parse;
pub mod prompt;
pub mod provider;

pub use client::{LlmClient, OutlineRequest, OutlineSource};
pub use config::{api_key_from_env, LlmConfig, DEFAULT_TIMEOUT};
pub use parse::parse_outline;
pub use prompt::build_prompt;
pub use provider::{Provider, ProviderSettings};

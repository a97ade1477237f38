//! Shared types, error model, and configuration for docsprompt.
//!
//! This crate is the foundation depended on by all other docsprompt crates.
//! It provides:
//! - [`DocsPromptError`], the unified error type
//! - Domain types ([`PageRecord`], [`Heading`], [`MatchResult`])
//! - Configuration ([`AppConfig`], [`FetchConfig`], [`ContextOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ContextOptions, DefaultsConfig, FetchConfig, FetchPolicyConfig, LlmConfig,
    StoreConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    resolve_api_key, validate_api_key,
};
pub use error::{DocsPromptError, Result};
pub use types::{Heading, MatchResult, NO_MAIN_CONTENT, NO_TITLE, PageRecord};

//! Application configuration for docsprompt.
//!
//! User config lives at `~/.docsprompt/docsprompt.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocsPromptError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docsprompt.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docsprompt";

// ---------------------------------------------------------------------------
// Config structs (matching docsprompt.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Retrieval defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Content store location.
    #[serde(default)]
    pub store: StoreConfig,

    /// Page fetching.
    #[serde(default)]
    pub fetch: FetchPolicyConfig,

    /// Language-model endpoint.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Snippet window in characters.
    #[serde(default = "default_snippet_length")]
    pub snippet_length: usize,

    /// Matches included in an enhanced prompt.
    #[serde(default = "default_max_context_items")]
    pub max_context_items: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            snippet_length: default_snippet_length(),
            max_context_items: default_max_context_items(),
        }
    }
}

fn default_snippet_length() -> usize {
    200
}
fn default_max_context_items() -> usize {
    3
}

/// `[store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding the content store.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "scraped_content.json".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchPolicyConfig {
    /// Pause between requests in a batch, in milliseconds.
    #[serde(default = "default_politeness_delay")]
    pub politeness_delay_ms: u64,

    /// User-Agent header sent with page requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchPolicyConfig {
    fn default() -> Self {
        Self {
            politeness_delay_ms: default_politeness_delay(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_politeness_delay() -> u64 {
    1000
}
fn default_user_agent() -> String {
    concat!("docsprompt/", env!("CARGO_PKG_VERSION")).into()
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Chat model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Completion token cap.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_max_tokens() -> u32 {
    100
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime fetch configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Pause between requests in a batch, in milliseconds.
    pub politeness_delay_ms: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            politeness_delay_ms: config.fetch.politeness_delay_ms,
            user_agent: config.fetch.user_agent.clone(),
        }
    }
}

/// Runtime retrieval options for scoring and prompt assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextOptions {
    /// Snippet window in characters.
    pub snippet_length: usize,
    /// Matches included in an enhanced prompt.
    pub max_context_items: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ContextOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            snippet_length: config.defaults.snippet_length,
            max_context_items: config.defaults.max_context_items,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docsprompt/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocsPromptError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docsprompt/docsprompt.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocsPromptError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        DocsPromptError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocsPromptError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocsPromptError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocsPromptError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the LLM API key from the configured env var.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.llm.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(DocsPromptError::config(format!(
            "LLM API key not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Check that the LLM API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    resolve_api_key(config).map(|_| ())
}

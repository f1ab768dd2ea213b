//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. Environment variables
//! 2. stockbot.toml configuration file
//! 3. Defaults
//!
//! Inside the config file, `${VAR_NAME}` expands to the value of the
//! environment variable of that name.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL (optional, for custom endpoints and test doubles)
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

/// Quote service configuration for the stock-price tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Base URL of the chart/quote endpoint
    #[serde(default = "default_quote_base_url")]
    pub base_url: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_quote_base_url(),
        }
    }
}

fn default_quote_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

/// Retry policy for transient model-provider failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum retry attempts after the initial call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay in milliseconds; doubles per attempt
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

/// Conversation loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model calls per run before giving up
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
        }
    }
}

fn default_max_turns() -> usize {
    10
}

/// Main configuration for stockbot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM provider configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Quote service configuration
    #[serde(default)]
    pub quotes: QuoteConfig,

    /// Retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Conversation loop limits
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Config {
    /// Expand `${VAR_NAME}` references to environment variable values.
    ///
    /// Unset variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(chars.next().unwrap());
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file.
    ///
    /// `${VAR_NAME}` references in the file are expanded before parsing,
    /// and environment variables take precedence over file values.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let toml_content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded = Self::expand_env_vars(&toml_content);

        let mut config: Config = toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from the default locations.
    ///
    /// Tries `./stockbot.toml` first, then falls back to environment
    /// variables only.
    pub fn load() -> crate::Result<Self> {
        if Path::new("stockbot.toml").exists() {
            return Self::from_toml_file("stockbot.toml");
        }

        Self::from_env()
    }

    /// Override file values with environment variables where set.
    fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var("LLM_API_KEY") {
            if !api_key.is_empty() {
                self.llm.api_key = api_key;
            }
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            if !model.is_empty() {
                self.llm.model = model;
            }
        }
        if let Ok(base_url) = std::env::var("LLM_BASE_URL") {
            if !base_url.is_empty() {
                self.llm.base_url = Some(base_url);
            }
        }
        if let Ok(base_url) = std::env::var("QUOTE_BASE_URL") {
            if !base_url.is_empty() {
                self.quotes.base_url = base_url;
            }
        }
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> crate::Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| Error::Config("LLM_API_KEY not set".to_string()))?;

        let model = std::env::var("LLM_MODEL")
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(default_model);

        Ok(Config {
            llm: LlmConfig {
                api_key,
                model,
                base_url: std::env::var("LLM_BASE_URL").ok().filter(|u| !u.is_empty()),
            },
            quotes: QuoteConfig {
                base_url: std::env::var("QUOTE_BASE_URL")
                    .ok()
                    .filter(|u| !u.is_empty())
                    .unwrap_or_else(default_quote_base_url),
            },
            retry: RetryConfig::default(),
            agent: AgentConfig::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_default() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "claude-sonnet-4-20250514");
        assert!(config.api_key.is_empty());
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_quote_config_default() {
        let config = QuoteConfig::default();
        assert_eq!(config.base_url, "https://query1.finance.yahoo.com");
    }

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay_ms, 500);
    }

    #[test]
    fn test_agent_config_default() {
        let config = AgentConfig::default();
        assert_eq!(config.max_turns, 10);
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("STOCKBOT_TEST_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${STOCKBOT_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        let result = Config::expand_env_vars("prefix_${NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("STOCKBOT_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        let result = Config::expand_env_vars("no_vars_here");
        assert_eq!(result, "no_vars_here");
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[llm]
model = "claude-haiku-3-5-20241022"
api_key = "test_key"
base_url = "https://api.example.com"

[quotes]
base_url = "http://localhost:9000"

[retry]
max_retries = 5
base_delay_ms = 250

[agent]
max_turns = 4
"#;

        let config: Config = toml::from_str(toml_content).unwrap();

        assert_eq!(config.llm.model, "claude-haiku-3-5-20241022");
        assert_eq!(config.llm.api_key, "test_key");
        assert_eq!(
            config.llm.base_url,
            Some("https://api.example.com".to_string())
        );
        assert_eq!(config.quotes.base_url, "http://localhost:9000");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.agent.max_turns, 4);
    }

    #[test]
    fn test_toml_config_partial() {
        let config: Config = toml::from_str("[llm]\napi_key = \"k\"\n").unwrap();
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.agent.max_turns, 10);
    }
}

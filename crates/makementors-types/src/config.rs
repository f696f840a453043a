//! Application configuration for MakeMentors.
//!
//! Deserialized from `{data_dir}/config.toml` at startup and passed into
//! state construction as one explicit object. Secrets (API keys) are NOT
//! part of this file; they are resolved separately from the environment.

use serde::{Deserialize, Serialize};

/// Top-level configuration, one section per concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Upstream LLM provider settings for the chat relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible chat completions API.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Payment provider settings (non-secret parts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Price id used for subscription checkout sessions.
    #[serde(default)]
    pub price_id: Option<String>,
    /// Where the customer portal sends users back to.
    #[serde(default = "default_portal_return_url")]
    pub portal_return_url: String,
    /// Redirect target after a successful checkout.
    #[serde(default = "default_checkout_success_url")]
    pub checkout_success_url: String,
    /// Redirect target after an abandoned checkout.
    #[serde(default = "default_checkout_cancel_url")]
    pub checkout_cancel_url: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            price_id: None,
            portal_return_url: default_portal_return_url(),
            checkout_success_url: default_checkout_success_url(),
            checkout_cancel_url: default_checkout_cancel_url(),
        }
    }
}

/// HTTP server defaults (overridable on the CLI).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the built SPA, served when present.
    #[serde(default = "default_web_dir")]
    pub web_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            web_dir: default_web_dir(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.7
}

fn default_portal_return_url() -> String {
    "http://localhost:3000/profile".to_string()
}

fn default_checkout_success_url() -> String {
    "http://localhost:3000/profile?checkout=success".to_string()
}

fn default_checkout_cancel_url() -> String {
    "http://localhost:3000/pricing".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_web_dir() -> String {
    "apps/web/dist".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.server.port, 8080);
        assert!(config.billing.price_id.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[llm]
model = "gpt-4o"

[server]
port = 9090
"#,
        )
        .unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.llm.model, AppConfig::default().llm.model);
    }
}

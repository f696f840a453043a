//! Configuration and secret loading for MakeMentors.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`AppConfig`], falling back to defaults when the file is missing or
//! malformed. Secrets come from the environment, resolved once here and
//! carried in [`Secrets`] -- call sites never touch `std::env`.

use std::path::{Path, PathBuf};

use makementors_types::config::AppConfig;
use secrecy::SecretString;

/// Resolve the data directory: `MAKEMENTORS_DATA_DIR`, else `~/.makementors`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MAKEMENTORS_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".makementors");
    }

    // Last resort: current directory
    PathBuf::from(".makementors")
}

/// Load application configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Secrets resolved from the environment at startup.
pub struct Secrets {
    pub llm_api_key: Option<SecretString>,
    pub stripe_secret_key: Option<SecretString>,
    pub stripe_webhook_secret: Option<SecretString>,
}

impl Secrets {
    /// Read `OPENAI_API_KEY`, `STRIPE_SECRET_KEY`, and
    /// `STRIPE_WEBHOOK_SECRET` from the environment.
    pub fn from_env() -> Self {
        Self {
            llm_api_key: env_secret("OPENAI_API_KEY"),
            stripe_secret_key: env_secret("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: env_secret("STRIPE_WEBHOOK_SECRET"),
        }
    }
}

fn env_secret(name: &str) -> Option<SecretString> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.server.port, 8080);
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(
            &config_path,
            r#"
[llm]
model = "gpt-4o"
max_tokens = 2048

[billing]
price_id = "price_123"
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.billing.price_id.as_deref(), Some("price_123"));
        // Unspecified sections keep their defaults.
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(&config_path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.llm.model, AppConfig::default().llm.model);
    }
}

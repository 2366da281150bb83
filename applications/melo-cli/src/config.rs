/// CLI configuration
use crate::error::{CliError, Result};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};
use melo_client::ClientConfig;
use melo_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "melo.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_url")]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub id_token: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Values given on the command line (or their `MELO_*` env aliases)
///
/// They take precedence over the file and the nested environment keys.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl CliConfig {
    /// Load configuration from file, environment and overrides
    ///
    /// An explicit `path` must exist; the default `melo.toml` is optional.
    /// Nested keys can be set from the environment with a double underscore,
    /// e.g. `MELO_PLAYBACK__VOLUME=40`.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path.to_path_buf()).required(true),
            None => config::File::from(PathBuf::from(DEFAULT_CONFIG_FILE)).required(false),
        };

        Self::from_builder(config::Config::builder().add_source(file), overrides)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>, overrides: &Overrides) -> Result<Self> {
        let settings = builder
            .add_source(
                Environment::with_prefix("MELO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.url", overrides.url.clone())?
            .set_override_option("auth.id_token", overrides.id_token.clone())?
            .set_override_option("auth.refresh_token", overrides.refresh_token.clone())?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.server.url.trim();
        if url.is_empty() {
            return Err(CliError::Config(
                "server URL is required (set MELO_SERVER_URL)".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CliError::Config(format!(
                "server URL must use http or https: {url}"
            )));
        }

        if self.playback.volume > 100 {
            return Err(CliError::Config(format!(
                "playback volume must be 0-100, got {}",
                self.playback.volume
            )));
        }

        Ok(())
    }

    /// Client settings derived from this configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::with_tokens(
            self.server.url.clone(),
            self.auth.id_token.clone().filter(|t| !t.is_empty()),
            self.auth.refresh_token.clone().filter(|t| !t.is_empty()),
        )
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings { url: default_url() }
}

fn default_url() -> String {
    "http://localhost:3000".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str, overrides: &Overrides) -> Result<CliConfig> {
        let builder =
            config::Config::builder().add_source(config::File::from_str(toml, FileFormat::Toml));
        CliConfig::from_builder(builder, overrides)
    }

    #[test]
    fn defaults_apply_to_empty_file() {
        let config = from_toml("", &Overrides::default()).unwrap();
        assert_eq!(config.server.url, "http://localhost:3000");
        assert!(config.auth.id_token.is_none());
        assert_eq!(config.playback.volume, 100);
        assert_eq!(config.playback.retry.max_attempts, 3);
        config.validate().unwrap();
    }

    #[test]
    fn file_values_are_read() {
        let config = from_toml(
            r#"
            [server]
            url = "https://melo.example.com"

            [auth]
            refresh_token = "r-token"

            [playback]
            volume = 40

            [playback.retry]
            max_attempts = 5
            delay_ms = 100
            "#,
            &Overrides::default(),
        )
        .unwrap();

        assert_eq!(config.server.url, "https://melo.example.com");
        assert_eq!(config.auth.refresh_token.as_deref(), Some("r-token"));
        assert_eq!(config.playback.volume, 40);
        assert_eq!(config.playback.retry.max_attempts, 5);
        assert_eq!(config.playback.retry.delay_ms, 100);
    }

    #[test]
    fn overrides_win_over_file() {
        let overrides = Overrides {
            url: Some("http://127.0.0.1:9000".to_string()),
            id_token: Some("id".to_string()),
            refresh_token: None,
        };
        let config = from_toml(
            "[server]\nurl = \"https://melo.example.com\"\n[auth]\nrefresh_token = \"kept\"\n",
            &overrides,
        )
        .unwrap();

        assert_eq!(config.server.url, "http://127.0.0.1:9000");
        assert_eq!(config.auth.id_token.as_deref(), Some("id"));
        assert_eq!(config.auth.refresh_token.as_deref(), Some("kept"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = from_toml("", &Overrides::default()).unwrap();

        config.server.url = "ftp://melo.example.com".to_string();
        assert!(matches!(config.validate(), Err(CliError::Config(_))));

        config.server.url = "  ".to_string();
        assert!(matches!(config.validate(), Err(CliError::Config(_))));

        config.server.url = "https://melo.example.com".to_string();
        config.playback.volume = 150;
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn empty_tokens_are_dropped() {
        let mut config = from_toml("", &Overrides::default()).unwrap();
        config.auth.id_token = Some(String::new());
        config.auth.refresh_token = Some("r".to_string());

        let client = config.client_config();
        assert!(client.tokens.id_token().is_none());
        assert_eq!(client.tokens.refresh_token(), Some("r"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = CliConfig::load(
            Some(Path::new("/nonexistent/melo-test.toml")),
            &Overrides::default(),
        );
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}

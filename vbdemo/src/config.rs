//! Application configuration management.
//!
//! Configuration is layered: defaults, then the config file named by the
//! CLI, then `APP_*` environment variables.

use crate::Cli;
use serde::{Deserialize, Serialize};

/// Configuration for the speech-capture backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoiceConfig {
    /// OpenAI API key; when set, uploaded audio is transcribed server-side
    pub whisper_api_key: Option<String>,

    /// Whisper model name
    #[serde(default = "default_model")]
    pub whisper_model: String,

    /// Bound on each transcription call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "whisper-1".to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            whisper_api_key: None,
            whisper_model: default_model(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

/// The main application configuration that composes all component configs
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Web server configuration (bind address, pagination limits)
    #[serde(default)]
    pub server: vbid_axum::config::AxumConfig,

    /// Database configuration
    #[serde(default)]
    pub database: vbid_sqlite::config::SqliteConfig,

    /// Speech capture configuration
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest priority)
    /// 2. Config file given by the CLI
    /// 3. Default values (lowest priority)
    ///
    /// Environment variables are mapped using the pattern:
    /// `APP_<SECTION>__<KEY>` maps to `<section>.<key>`
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Set the database path via environment variable
    /// export APP_DATABASE__DATABASE_PATH="/data/voicebid.db"
    ///
    /// # Set server bind address
    /// export APP_SERVER__BIND_ADDRESS="0.0.0.0:3000"
    ///
    /// # Enable server-side transcription
    /// export APP_VOICE__WHISPER_API_KEY="sk-..."
    /// ```
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Start with default values
        config = config.add_source(config::Config::try_from(&Self::default())?);

        // Layer on config file if it is specified and exists
        if let Some(path) = &cli.config {
            if path.exists() {
                config = config.add_source(config::File::from(path.as_path()))
            } else {
                return Err(anyhow::anyhow!(
                    "Config file {} does not exist",
                    path.display()
                ));
            }
        }

        // Override with environment variables
        // This maps APP_SERVER__BIND_ADDRESS to server.bind_address
        config = config.add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let built_config = config.build()?;
        built_config.try_deserialize().map_err(Into::into)
    }
}

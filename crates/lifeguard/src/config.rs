use config::{Config, Environment};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::capabilities::DEFAULT_TOOL_TIMEOUT;
use crate::clients::geocoding::GOOGLE_GEOCODE_URL;
use crate::clients::pool_api::DEFAULT_BASE_URL;
use crate::providers::configs::{OpenAiProviderConfig, OPENAI_HOST, OPENAI_MODEL, OPENAI_TIMEOUT};

const ENV_PREFIX: &str = "LIFEGUARD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration, set the {env_var} environment variable")]
    MissingEnvVar { env_var: String },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// The environment variable that sets a dotted configuration key
pub fn to_env_var(key: &str) -> String {
    format!("{}_{}", ENV_PREFIX, key.replace('.', "__").to_uppercase())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub api_key: String,
    #[serde(default = "default_openai_host")]
    pub host: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl ProviderSettings {
    pub fn into_config(self) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            host: self.host,
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingSettings {
    pub api_key: String,
    #[serde(default = "default_geocode_url")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_tool_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
    #[serde(default)]
    pub api: ApiSettings,
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub tools: ToolSettings,
    #[serde(default)]
    pub system_prompt_path: Option<PathBuf>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("provider.host", default_openai_host())?
            .set_default("provider.model", default_model())?;

        // The conventional variables are honoured but never win over LIFEGUARD_*
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            builder = builder.set_default("provider.api_key", key)?;
        }
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            builder = builder.set_default("geocoding.api_key", key)?;
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        match config.try_deserialize::<Self>() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);
                Err(Self::explain(err))
            }
        }
    }

    // Map missing fields to the environment variable that would supply them
    fn explain(err: config::ConfigError) -> ConfigError {
        if let config::ConfigError::NotFound(key) = &err {
            return ConfigError::MissingEnvVar {
                env_var: to_env_var(key),
            };
        }

        let message = err.to_string();
        let Some(rest) = message.strip_prefix("missing field `") else {
            return ConfigError::Other(err);
        };
        let field = rest.split('`').next().unwrap_or_default();
        let key = match rest.split("for key `").nth(1) {
            Some(parent) => format!("{}.{}", parent.trim_end_matches('`'), field),
            None => field.to_string(),
        };
        ConfigError::MissingEnvVar {
            env_var: to_env_var(&key),
        }
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tools.timeout_secs)
    }
}

fn default_openai_host() -> String {
    OPENAI_HOST.to_string()
}

fn default_model() -> String {
    OPENAI_MODEL.to_string()
}

fn default_provider_timeout() -> u64 {
    OPENAI_TIMEOUT.as_secs()
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_geocode_url() -> String {
    GOOGLE_GEOCODE_URL.to_string()
}

fn default_tool_timeout() -> u64 {
    DEFAULT_TOOL_TIMEOUT.as_secs()
}

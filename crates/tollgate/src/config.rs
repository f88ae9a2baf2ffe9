//! Gateway configuration.
//!
//! Configuration is layered with later sources overriding earlier ones:
//!
//! 1. Bundled defaults (`tollgate.toml` compiled into the crate)
//! 2. `~/.config/tollgate/tollgate.toml`
//! 3. `./tollgate.toml`
//! 4. `TOLLGATE__`-prefixed environment variables, e.g.
//!    `TOLLGATE__QUOTA__RPM=120`
//!
//! API keys are not part of this file; see
//! [`Credentials`](tollgate_models::Credentials).

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tollgate_error::{ConfigError, TollgateResult};
use tollgate_ledger::{LedgerSettings, PricingTable};
use tollgate_models::ProviderSettings;
use tollgate_rate_limit::{QuotaConfig, RetryConfig};
use tracing::debug;

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../tollgate.toml");

/// Model and temperature overrides for one kind of request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestProfile {
    /// Model override
    #[serde(default)]
    pub model: Option<String>,
    /// Temperature override
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Defaults applied to requests that do not specify them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefaults {
    /// Completion model used when a call names none
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature used when a call gives none
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Completion token limit used when a call gives none
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Model used for every embedding call
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Named per-request-type overrides
    #[serde(default)]
    pub profiles: BTreeMap<String, RequestProfile>,
}

fn default_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

impl Default for ModelDefaults {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            embedding_model: default_embedding_model(),
            profiles: BTreeMap::new(),
        }
    }
}

impl ModelDefaults {
    /// Model and temperature for `profile`, falling back to the defaults for
    /// unknown profiles or unset fields.
    pub fn resolve_profile(&self, profile: &str) -> (&str, f32) {
        let overrides = self.profiles.get(profile);
        let model = overrides
            .and_then(|p| p.model.as_deref())
            .unwrap_or(&self.default_model);
        let temperature = overrides
            .and_then(|p| p.temperature)
            .unwrap_or(self.default_temperature);
        (model, temperature)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_model.trim().is_empty() {
            return Err(ConfigError::new("models.default_model must not be empty"));
        }
        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::new("models.embedding_model must not be empty"));
        }
        if self.default_max_tokens == 0 {
            return Err(ConfigError::new(
                "models.default_max_tokens must be greater than zero",
            ));
        }

        let temperatures = std::iter::once(("default", Some(self.default_temperature))).chain(
            self.profiles
                .iter()
                .map(|(name, p)| (name.as_str(), p.temperature)),
        );
        for (name, temperature) in temperatures {
            if let Some(t) = temperature.filter(|t| !(0.0..=2.0).contains(t)) {
                return Err(ConfigError::new(format!(
                    "temperature for '{name}' must be in [0.0, 2.0], got {t}"
                )));
            }
        }

        Ok(())
    }
}

/// Complete gateway configuration.
///
/// # Example
///
/// ```
/// use tollgate::GatewayConfig;
///
/// let config = GatewayConfig::default();
/// assert_eq!(config.quota.rpm, 60);
/// assert_eq!(config.retry.max_attempts, 3);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Model defaults and profiles
    #[serde(default)]
    pub models: ModelDefaults,

    /// RPM/TPM limits
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Retry budget
    #[serde(default)]
    pub retry: RetryConfig,

    /// Provider selection and endpoints
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Token prices
    #[serde(default)]
    pub pricing: PricingTable,

    /// Usage accounting switch
    #[serde(default)]
    pub ledger: LedgerSettings,
}

impl GatewayConfig {
    /// Load configuration with precedence: env > current dir > home dir >
    /// bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when a source fails to parse or the merged
    /// configuration fails [`validate`](Self::validate).
    pub fn load() -> TollgateResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/tollgate/tollgate.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("tollgate").required(false))
            .add_source(
                Environment::with_prefix("TOLLGATE")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::build(builder)
    }

    /// Load bundled defaults overridden by one explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is missing or invalid, or the merged
    /// configuration fails [`validate`](Self::validate).
    pub fn from_file(path: impl AsRef<Path>) -> TollgateResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path).required(true));

        Self::build(builder)
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> TollgateResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.models.validate()?;
        self.quota.validate()?;
        self.retry.validate()?;
        self.provider.validate()?;
        self.pricing.validate()?;
        Ok(())
    }
}

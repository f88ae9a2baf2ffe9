//! Provider selection and credentials.

use serde::{Deserialize, Serialize};
use tollgate_error::ConfigError;

/// Which upstream serves every call made through a gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// The primary vendor API (OpenAI dialect)
    #[default]
    #[serde(alias = "openai")]
    Primary,
    /// The alternate routing gateway (OpenRouter dialect)
    #[serde(alias = "openrouter")]
    Alternate,
}

impl ProviderKind {
    /// Label used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Primary => "openai",
            ProviderKind::Alternate => "openrouter",
        }
    }
}

/// Endpoint settings for the `[provider]` configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider used for every call
    #[serde(default)]
    pub kind: ProviderKind,

    /// Base URL of the primary API
    #[serde(default = "default_primary_base_url")]
    pub primary_base_url: String,

    /// Base URL of the alternate gateway
    #[serde(default = "default_alternate_base_url")]
    pub alternate_base_url: String,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Application title sent to the alternate gateway, if any
    #[serde(default)]
    pub app_title: Option<String>,
}

fn default_primary_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_alternate_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            primary_base_url: default_primary_base_url(),
            alternate_base_url: default_alternate_base_url(),
            timeout_secs: default_timeout_secs(),
            app_title: None,
        }
    }
}

impl ProviderSettings {
    /// Settings for `kind` with default endpoints.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Point the selected provider at a different base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        match self.kind {
            ProviderKind::Primary => self.primary_base_url = base_url.into(),
            ProviderKind::Alternate => self.alternate_base_url = base_url.into(),
        }
        self
    }

    /// Base URL of the selected provider, without a trailing slash.
    pub fn base_url(&self) -> &str {
        let url = match self.kind {
            ProviderKind::Primary => &self.primary_base_url,
            ProviderKind::Alternate => &self.alternate_base_url,
        };
        url.trim_end_matches('/')
    }

    /// Rejects empty base URLs and a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url().is_empty() {
            return Err(ConfigError::new(format!(
                "provider base URL for '{}' is empty",
                self.kind.name()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::new("provider.timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}

/// API keys for both providers.
///
/// Only the key of the selected provider is required.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Primary API key
    pub openai_api_key: Option<String>,
    /// Primary organization identifier
    pub openai_organization: Option<String>,
    /// Alternate gateway API key
    pub openrouter_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_organization", &self.openai_organization)
            .field("openrouter_api_key", &redact(&self.openrouter_api_key))
            .finish()
    }
}

impl Credentials {
    /// Load credentials from the environment, reading `.env` first if present.
    ///
    /// Reads:
    /// - `OPENAI_API_KEY`
    /// - `OPENAI_ORGANIZATION_ID` (optional)
    /// - `OPENROUTER_API_KEY`
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        Self {
            openai_api_key: var("OPENAI_API_KEY"),
            openai_organization: var("OPENAI_ORGANIZATION_ID"),
            openrouter_api_key: var("OPENROUTER_API_KEY"),
        }
    }

    /// Set the primary API key.
    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Set the primary organization identifier.
    pub fn with_openai_organization(mut self, organization: impl Into<String>) -> Self {
        self.openai_organization = Some(organization.into());
        self
    }

    /// Set the alternate gateway API key.
    pub fn with_openrouter_key(mut self, key: impl Into<String>) -> Self {
        self.openrouter_api_key = Some(key.into());
        self
    }

    /// The key for `kind`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the missing environment variable.
    pub fn api_key_for(&self, kind: ProviderKind) -> Result<&str, ConfigError> {
        let (key, var) = match kind {
            ProviderKind::Primary => (&self.openai_api_key, "OPENAI_API_KEY"),
            ProviderKind::Alternate => (&self.openrouter_api_key, "OPENROUTER_API_KEY"),
        };
        key.as_deref()
            .ok_or_else(|| ConfigError::new(format!("{var} not set")))
    }
}

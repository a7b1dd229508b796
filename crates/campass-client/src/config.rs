//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/campass/config.toml` by default.
//!
//! Credential values (`username`, `password`) support secret references:
//! - `pass::path/in/store` — resolved via `pass show`
//! - `env::VAR_NAME` — resolved from the environment
//! - plain text — used as-is

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use campass_portal::config::{AcademicConfig, CasConfig, PaymentConfig};

/// Configuration for the campass client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Portal endpoint settings.
    #[serde(default)]
    pub portal: PortalSettings,

    /// Stored login identity.
    #[serde(default)]
    pub credentials: CredentialSettings,
}

/// Portal endpoint overrides.
///
/// Every field is optional; the portal crate's defaults apply when a field
/// is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    /// Identity-provider base URL.
    pub cas_url: Option<String>,

    /// Academic-system base URL.
    pub academic_url: Option<String>,

    /// Payment-platform base URL.
    pub payment_url: Option<String>,

    /// HTTP timeout in seconds.
    pub timeout: Option<u64>,
}

/// Login identity settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    /// Portal username (supports `pass::` and `env::` prefixes).
    pub username: Option<String>,

    /// Portal password (supports `pass::` and `env::` prefixes).
    pub password: Option<String>,

    /// Credential file override.
    pub store_path: Option<PathBuf>,
}

impl PortalSettings {
    /// Identity-provider configuration with overrides applied.
    pub fn cas(&self) -> CasConfig {
        let mut config = CasConfig::default();
        if let Some(ref url) = self.cas_url {
            config = config.with_base_url(url);
        }
        if let Some(seconds) = self.timeout {
            config = config.with_timeout(Duration::from_secs(seconds));
        }
        config
    }

    /// Academic-system configuration with overrides applied.
    pub fn academic(&self) -> AcademicConfig {
        let mut config = AcademicConfig::default();
        if let Some(ref url) = self.academic_url {
            config = config.with_base_url(url);
        }
        config
    }

    /// Payment-platform configuration with overrides applied.
    pub fn payment(&self) -> PaymentConfig {
        let mut config = PaymentConfig::default();
        if let Some(ref url) = self.payment_url {
            config = config.with_base_url(url);
        }
        config
    }
}

impl CredentialSettings {
    /// Path of the stored credential file.
    pub fn store_file(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| ClientConfig::default_config_dir().join("credentials.json"))
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("failed to read config: {}", e))?;
            toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("campass")
    }
}

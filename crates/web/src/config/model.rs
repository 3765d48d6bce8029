//! Data model for the control panel configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::i18n::Catalog;

/// Control panel host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct AdWizardConfig {
    /// Socket address the HTTP host binds to.
    pub bind_address: String,
    /// Base URL control panel links and redirects are built from.
    pub cp_base_url: String,
    /// Directory holding the layout store files. Defaults to the config directory.
    pub data_dir: Option<PathBuf>,
    /// Bearer token that signs a caller into their session. Without it nobody can sign in.
    pub auth_token: Option<String>,
    /// Idle lifetime of a session, in seconds.
    pub session_max_age_secs: u64,
    /// Message catalog keyed by category, then source message.
    pub translations: Catalog,
}

impl Default for AdWizardConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:62890".to_string(),
            cp_base_url: "http://127.0.0.1:62890/".to_string(),
            data_dir: None,
            auth_token: None,
            session_max_age_secs: 24 * 60 * 60,
            translations: Catalog::new(),
        }
    }
}

impl AdWizardConfig {
    pub fn bind_socket_address(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address.trim().parse().map_err(|error: std::net::AddrParseError| ConfigError::InvalidBindAddress {
            value: self.bind_address.clone(),
            reason: error.to_string(),
        })
    }

    pub fn cp_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.cp_base_url.trim()).map_err(|error| ConfigError::InvalidBaseUrl {
            value: self.cp_base_url.clone(),
            reason: error.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme { scheme: other.to_string() }),
        }
    }

    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| config_dir().unwrap_or_else(|| PathBuf::from(".")).join("adwizard"))
    }

    pub fn session_max_age(&self) -> Duration {
        Duration::from_secs(self.session_max_age_secs)
    }

    /// Configured token, ignoring surrounding whitespace.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref().map(str::trim)
    }
}

/// Errors found while validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address '{value}': {reason}")]
    InvalidBindAddress { value: String, reason: String },

    #[error("invalid control panel base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("control panel base URL must use http or https, not '{scheme}'")]
    UnsupportedScheme { scheme: String },

    #[error("authToken cannot be blank")]
    BlankAuthToken,

    #[error("sessionMaxAgeSecs must be greater than zero")]
    ZeroSessionMaxAge,
}

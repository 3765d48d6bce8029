//! Validation rules for the control panel configuration.

use crate::config::{AdWizardConfig, ConfigError};

/// Check that every configured value is usable before the host starts.
pub fn validate_config(config: &AdWizardConfig) -> Result<(), ConfigError> {
    config.bind_socket_address()?;
    config.cp_base_url()?;
    if config.auth_token().is_some_and(str::is_empty) {
        return Err(ConfigError::BlankAuthToken);
    }
    if config.session_max_age_secs == 0 {
        return Err(ConfigError::ZeroSessionMaxAge);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&AdWizardConfig::default()).is_ok());
    }

    #[test]
    fn rejects_unusable_values() {
        let config = AdWizardConfig {
            bind_address: "localhost".into(),
            ..AdWizardConfig::default()
        };
        assert!(matches!(validate_config(&config), Err(ConfigError::InvalidBindAddress { .. })));

        let config = AdWizardConfig {
            cp_base_url: "ftp://cms.example.com/".into(),
            ..AdWizardConfig::default()
        };
        assert!(matches!(validate_config(&config), Err(ConfigError::UnsupportedScheme { .. })));

        let config = AdWizardConfig {
            auth_token: Some("  ".into()),
            ..AdWizardConfig::default()
        };
        assert!(matches!(validate_config(&config), Err(ConfigError::BlankAuthToken)));
    }
}

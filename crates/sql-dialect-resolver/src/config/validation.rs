//! Configuration validation.

use super::Config;
use crate::core::ProbeQuery;
use crate::error::{DialectError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    match config.resolver.force_dialect {
        Some(ref tag) => {
            if tag.trim().is_empty() {
                return Err(DialectError::Config(
                    "resolver.force_dialect must not be empty".into(),
                ));
            }
            if tag.chars().any(|c| c.is_uppercase()) || tag != tag.trim() {
                return Err(DialectError::Config(format!(
                    "resolver.force_dialect must be a lowercase dialect tag, got '{}'",
                    tag
                )));
            }
        }
        None => {
            if config.connection.product_name.trim().is_empty() {
                return Err(DialectError::Config(
                    "connection.product_name is required unless resolver.force_dialect is set"
                        .into(),
                ));
            }
        }
    }

    for key in config.probe.responses.keys() {
        key.parse::<ProbeQuery>().map_err(|_| {
            DialectError::Config(format!(
                "probe.responses key '{}' must be 'version_banner' or 'variable:<name>'",
                key
            ))
        })?;
    }

    if config.connection.variables.keys().any(|k| k.trim().is_empty()) {
        return Err(DialectError::Config(
            "connection.variables names must not be empty".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionConfig, ProbeConfig, ResolverConfig};

    fn valid_config() -> Config {
        Config {
            connection: ConnectionConfig {
                product_name: "PostgreSQL".to_string(),
                product_version: "16.2".to_string(),
                ..Default::default()
            },
            probe: ProbeConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_product_name() {
        let mut config = valid_config();
        config.connection.product_name = "  ".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("product_name"));
    }

    #[test]
    fn test_forced_dialect_without_product() {
        let mut config = valid_config();
        config.connection.product_name.clear();
        config.resolver.force_dialect = Some("oracle".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_forced_dialect_must_be_lowercase() {
        let mut config = valid_config();
        config.resolver.force_dialect = Some("Oracle".to_string());
        assert!(validate(&config).is_err());

        config.resolver.force_dialect = Some(String::new());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_probe_key() {
        let mut config = valid_config();
        config
            .probe
            .responses
            .insert("uptime".to_string(), "42".to_string());
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("uptime"));
    }

    #[test]
    fn test_empty_variable_name() {
        let mut config = valid_config();
        config
            .connection
            .variables
            .insert(" ".to_string(), "x".to_string());
        assert!(validate(&config).is_err());
    }
}

// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

use std::env;

/// Errors raised while reading the environment configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Configuration for the console bulk logger.
#[derive(Debug, Clone)]
pub struct Config {
    /// Command count at which a static bulk is flushed
    pub bulk_size: usize,
    /// Number of worker tasks consuming the bulk queue
    pub workers: usize,
}

impl Config {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bulk_size = match env::var("BULK_SIZE") {
            Ok(val) => val.parse::<usize>().map_err(|_| {
                ConfigError::InvalidConfig(format!("BULK_SIZE must be a positive integer, got '{val}'"))
            })?,
            Err(_) => {
                return Err(ConfigError::InvalidConfig(
                    "BULK_SIZE is required".to_string(),
                ))
            }
        };
        let workers = match env::var("BULK_WORKERS") {
            Ok(val) => val.parse::<usize>().map_err(|_| {
                ConfigError::InvalidConfig(format!(
                    "BULK_WORKERS must be a positive integer, got '{val}'"
                ))
            })?,
            Err(_) => 1,
        };

        let config = Self { bulk_size, workers };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bulk_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "BULK_SIZE can not be zero".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(ConfigError::InvalidConfig(
                "BULK_WORKERS can not be zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero_bulk_size() {
        let config = Config {
            bulk_size: 0,
            workers: 1,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = Config {
            bulk_size: 3,
            workers: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_positive_values() {
        let config = Config {
            bulk_size: 3,
            workers: 2,
        };
        assert_eq!(config.validate(), Ok(()));
    }
}

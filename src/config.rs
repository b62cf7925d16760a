use std::env::var;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::keygen::MIN_KEY_BITS;

pub const KEY_BITS_VAR: &str = "TALLY_KEY_BITS";
pub const TOTAL_TRUSTEES_VAR: &str = "TALLY_TOTAL_TRUSTEES";
pub const THRESHOLD_VAR: &str = "TALLY_PAILLIER_THRESHOLD";
pub const SHARE_PRIME_BITS_VAR: &str = "TALLY_SHARE_PRIME_BITS";
pub const KEYGEN_TIMEOUT_VAR: &str = "TALLY_KEYGEN_TIMEOUT_MS";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Parameters for setting up one election's keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoConfig {
    /// Bit length of the Paillier modulus `n`.
    pub key_bits: usize,
    pub total_trustees: usize,
    /// Number of trustees needed to decrypt the tally.
    pub threshold: usize,
    /// Bit length of the field prime the private exponent is shared over.
    /// Must be at least `key_bits` so `lambda` always fits.
    pub share_prime_bits: usize,
    pub keygen_timeout: Option<Duration>,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        CryptoConfig {
            key_bits: 512,
            total_trustees: 5,
            threshold: 3,
            share_prime_bits: 576,
            keygen_timeout: None,
        }
    }
}

impl CryptoConfig {
    /// Reads the `TALLY_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a caller-supplied variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CryptoConfig::default();
        let keygen_timeout = match parsed::<u64, _>(&lookup, KEYGEN_TIMEOUT_VAR)? {
            Some(ms) => Some(Duration::from_millis(ms)),
            None => defaults.keygen_timeout,
        };
        let config = CryptoConfig {
            key_bits: parsed(&lookup, KEY_BITS_VAR)?.unwrap_or(defaults.key_bits),
            total_trustees: parsed(&lookup, TOTAL_TRUSTEES_VAR)?
                .unwrap_or(defaults.total_trustees),
            threshold: parsed(&lookup, THRESHOLD_VAR)?.unwrap_or(defaults.threshold),
            share_prime_bits: parsed(&lookup, SHARE_PRIME_BITS_VAR)?
                .unwrap_or(defaults.share_prime_bits),
            keygen_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_bits < MIN_KEY_BITS {
            return Err(ConfigError::Invalid(format!(
                "key_bits {} is below the minimum of {}",
                self.key_bits, MIN_KEY_BITS
            )));
        }
        if self.threshold < 1 || self.threshold > self.total_trustees {
            return Err(ConfigError::Invalid(format!(
                "threshold {} must be between 1 and total_trustees {}",
                self.threshold, self.total_trustees
            )));
        }
        if self.share_prime_bits < self.key_bits {
            return Err(ConfigError::Invalid(format!(
                "share_prime_bits {} must be at least key_bits {}",
                self.share_prime_bits, self.key_bits
            )));
        }
        Ok(())
    }
}

fn parsed<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(None),
    }
}

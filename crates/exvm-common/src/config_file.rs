//! Configuration file structures for exvm hosts.
//!
//! This module defines structures for TOML configuration files:
//! - [`ConfigFile`]: Top-level configuration file structure
//! - [`AccountEntry`]: Pre-loaded account state for an in-memory host
//! - [`StorageEntry`]: A single storage slot of an account

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::RuntimeConfig;
use crate::types::{Address, Bytes32};

/// Top-level configuration file structure.
///
/// # Example
///
/// ```toml
/// [runtime.engine]
/// name = "examplevm"
/// revision = "byzantium"
///
/// [runtime.engine.options]
/// example-option = "42"
///
/// [runtime.execution]
/// address = "0x0000000000000000000000000000000000000001"
/// gas = 1_000_000
/// code = "600160005401600055"
///
/// [[accounts]]
/// address = "0x0000000000000000000000000000000000000001"
///
/// [[accounts.storage]]
/// key = "0x0000000000000000000000000000000000000000000000000000000000000000"
/// value = "0x00000000000000000000000000000000000000000000000000000000000000ff"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Runtime configuration (engine + execution settings).
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Accounts to load into the host before the first call.
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
}

impl ConfigFile {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigFileError::Io {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed as TOML.
    pub fn from_toml(content: &str) -> Result<Self, ConfigFileError> {
        toml::from_str(content).map_err(|e| ConfigFileError::Parse {
            message: e.to_string(),
        })
    }
}

/// An account to pre-load into the host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountEntry {
    /// Account address.
    pub address: Address,

    /// Account balance.
    #[serde(default)]
    pub balance: Bytes32,

    /// Account code, as raw text.
    #[serde(default)]
    pub code: String,

    /// Initial storage slots.
    #[serde(default)]
    pub storage: Vec<StorageEntry>,
}

/// A single storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageEntry {
    /// Slot key.
    pub key: Bytes32,
    /// Slot value.
    pub value: Bytes32,
}

/// Configuration file errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("Failed to parse config file: {message}")]
    Parse { message: String },
}

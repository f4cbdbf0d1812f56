//! Configuration structures for exvm hosts.
//!
//! This module defines configuration options for the pieces a host wires
//! together:
//! - [`RuntimeConfig`]: Top-level configuration containing all settings
//! - [`EngineConfig`]: Which engine to bind, its revision, and its options
//! - [`ExecutionConfig`]: The call to run (destination, sender, gas, input, code)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValueParseError;
use crate::types::{Address, Bytes32, CallKind, CallMessage, Revision};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RuntimeConfig {
    /// Engine selection and options.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Per-call execution settings.
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Engine selection and pre-execution options.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Registered engine name to bind.
    #[serde(default = "defaults::engine_name")]
    pub name: String,

    /// Revision every call runs under.
    #[serde(default = "defaults::revision")]
    pub revision: Revision,

    /// Options applied with `set_option` before the first call.
    ///
    /// Both names and values are passed to the engine verbatim.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: defaults::engine_name(),
            revision: defaults::revision(),
            options: BTreeMap::new(),
        }
    }
}

/// Settings for the call a host runs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionConfig {
    /// Destination account.
    #[serde(default = "defaults::address")]
    pub address: Address,

    /// Caller account.
    #[serde(default)]
    pub sender: Address,

    /// Value transferred with the call.
    #[serde(default)]
    pub value: Bytes32,

    /// Kind of call.
    #[serde(default)]
    pub kind: CallKind,

    /// Gas made available to each call.
    #[serde(default = "defaults::gas")]
    pub gas: i64,

    /// Call input as hex (with or without `0x`).
    #[serde(default)]
    pub input: String,

    /// Code handed to the engine, as raw text.
    #[serde(default)]
    pub code: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            address: defaults::address(),
            sender: Address::ZERO,
            value: Bytes32::ZERO,
            kind: CallKind::Call,
            gas: defaults::gas(),
            input: String::new(),
            code: String::new(),
        }
    }
}

impl ExecutionConfig {
    /// Build the call message described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is not valid hex.
    pub fn call_message(&self) -> Result<CallMessage, ValueParseError> {
        let digits = self
            .input
            .strip_prefix("0x")
            .or_else(|| self.input.strip_prefix("0X"))
            .unwrap_or(&self.input);
        let input = hex::decode(digits)?;

        Ok(CallMessage::new(self.address)
            .with_sender(self.sender)
            .with_value(self.value)
            .with_kind(self.kind)
            .with_gas(self.gas)
            .with_input(input))
    }

    /// The code bytes handed to the engine.
    pub fn code_bytes(&self) -> &[u8] {
        self.code.as_bytes()
    }
}

/// Default value functions for serde.
mod defaults {
    use crate::types::{Address, Revision};

    pub fn engine_name() -> String {
        "examplevm".to_string()
    }

    pub const fn revision() -> Revision {
        Revision::Byzantium
    }

    pub fn address() -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = 0x01;
        Address(bytes)
    }

    pub const fn gas() -> i64 {
        1_000_000
    }
}

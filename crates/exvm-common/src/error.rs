//! Error types for exvm.
//!
//! Execution outcomes are never errors; they are reported as
//! [`StatusCode`](crate::StatusCode) values. The errors here cover the
//! surrounding plumbing:
//! - [`OptionError`]: rejected `set_option` calls
//! - [`ValueParseError`]: malformed addresses, words, or revision names
//! - [`RegistryError`]: engine discovery and binding failures

use thiserror::Error;

/// Why an engine rejected an option.
///
/// A rejected option never changes the engine's configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// The engine does not declare an option with this name.
    #[error("Unknown option: {name}")]
    UnknownOption {
        /// The option name that was not recognized.
        name: String,
    },

    /// The value is not a well-formed integer.
    #[error("Invalid value for option '{name}': {value:?}")]
    InvalidValue {
        /// The option name.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// The value parsed but does not fit the option's type.
    #[error("Value out of range for option '{name}': {value}")]
    OutOfRange {
        /// The option name.
        name: String,
        /// The rejected value.
        value: String,
    },
}

impl OptionError {
    /// Create a new `UnknownOption` error.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownOption { name: name.into() }
    }

    /// Create a new `InvalidValue` error.
    pub fn invalid_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a new `OutOfRange` error.
    pub fn out_of_range(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::OutOfRange {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Errors parsing fixed-size values and revision names from text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueParseError {
    /// The input is not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The decoded input has the wrong number of bytes.
    #[error("Invalid length: expected {expected} bytes, found {found}")]
    InvalidLength {
        /// Required length in bytes.
        expected: usize,
        /// Actual length in bytes.
        found: usize,
    },

    /// The revision name is not recognized.
    #[error("Unknown revision: {name}")]
    UnknownRevision {
        /// The name that was not recognized.
        name: String,
    },
}

/// Errors from engine discovery and binding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No engine is registered under this name.
    #[error("Engine not found: {name}")]
    EngineNotFound {
        /// The requested engine name.
        name: String,
    },

    /// The factory was built against a different interface version.
    #[error("ABI version mismatch for engine '{name}': expected {expected}, found {found}")]
    AbiMismatch {
        /// The engine name.
        name: String,
        /// The version this host speaks.
        expected: u32,
        /// The version the factory declares.
        found: u32,
    },

    /// An engine with this name is already registered.
    #[error("Engine already registered: {name}")]
    DuplicateEngine {
        /// The conflicting engine name.
        name: String,
    },
}

impl RegistryError {
    /// Create a new `EngineNotFound` error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::EngineNotFound { name: name.into() }
    }

    /// Returns `true` if this error indicates the engine was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EngineNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_error_display() {
        let err = OptionError::unknown("unknown-option");
        assert_eq!(err.to_string(), "Unknown option: unknown-option");

        let err = OptionError::out_of_range("example-option", "2147483648");
        assert_eq!(
            err.to_string(),
            "Value out of range for option 'example-option': 2147483648"
        );

        let err = OptionError::invalid_value("example-option", "x");
        assert_eq!(
            err.to_string(),
            "Invalid value for option 'example-option': \"x\""
        );
    }

    #[test]
    fn test_value_parse_error_from_hex() {
        let hex_err = hex::decode("0").unwrap_err();
        let err: ValueParseError = hex_err.into();
        assert!(matches!(err, ValueParseError::InvalidHex(_)));
    }

    #[test]
    fn test_registry_error() {
        assert!(RegistryError::not_found("evmjit").is_not_found());

        let err = RegistryError::AbiMismatch {
            name: "examplevm".into(),
            expected: 0,
            found: 1,
        };
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "ABI version mismatch for engine 'examplevm': expected 0, found 1"
        );
    }
}

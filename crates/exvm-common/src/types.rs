//! Value types shared by engines and hosts.
//!
//! This module defines the fixed-size values that cross the engine/host
//! boundary:
//! - [`Address`]: 20-byte account identifier
//! - [`Bytes32`]: 32-byte storage key, storage value, balance, or hash
//! - [`Revision`]: execution rule-set tag
//! - [`CallMessage`]: per-call input handed to an engine
//! - [`StatusCode`]: outcome of one execution call

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueParseError;

/// Generates a fixed-size byte identifier with hex `Display`/`FromStr`
/// and string-based serde.
macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Length in bytes.
            pub const LEN: usize = $len;

            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Borrow the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Build from a slice, which must be exactly `LEN` bytes.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, ValueParseError> {
                let array: [u8; $len] =
                    bytes
                        .try_into()
                        .map_err(|_| ValueParseError::InvalidLength {
                            expected: $len,
                            found: bytes.len(),
                        })?;
                Ok(Self(array))
            }

            /// Returns `true` if every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ZERO
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = ValueParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s
                    .strip_prefix("0x")
                    .or_else(|| s.strip_prefix("0X"))
                    .unwrap_or(s);
                let bytes = hex::decode(digits)?;
                Self::from_slice(&bytes)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.to_string()
            }
        }
    };
}

fixed_bytes!(
    /// A 20-byte account address.
    Address,
    20
);

fixed_bytes!(
    /// A 32-byte big-endian word: storage keys and values, balances, hashes.
    Bytes32,
    32
);

impl Bytes32 {
    /// Build a word whose low-order (last) byte is `value`.
    pub const fn from_low_byte(value: u8) -> Self {
        let mut bytes = [0u8; 32];
        bytes[31] = value;
        Self(bytes)
    }

    /// The low-order (last) byte of the word.
    pub const fn low_byte(&self) -> u8 {
        self.0[31]
    }
}

/// Execution rule-set version.
///
/// Revisions are ordered: a later revision compares greater than an
/// earlier one. [`Revision::Frontier`] is the baseline.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Revision {
    /// The baseline rule set.
    #[default]
    Frontier,
    Homestead,
    TangerineWhistle,
    SpuriousDragon,
    Byzantium,
    Constantinople,
}

impl Revision {
    /// All revisions in activation order.
    pub const ALL: [Revision; 6] = [
        Revision::Frontier,
        Revision::Homestead,
        Revision::TangerineWhistle,
        Revision::SpuriousDragon,
        Revision::Byzantium,
        Revision::Constantinople,
    ];

    /// The most recent revision.
    pub const LATEST: Revision = Revision::Constantinople;

    /// Lowercase, kebab-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Revision::Frontier => "frontier",
            Revision::Homestead => "homestead",
            Revision::TangerineWhistle => "tangerine-whistle",
            Revision::SpuriousDragon => "spurious-dragon",
            Revision::Byzantium => "byzantium",
            Revision::Constantinople => "constantinople",
        }
    }

    /// Single-character tag.
    pub const fn tag(self) -> char {
        match self {
            Revision::Frontier => 'F',
            Revision::Homestead => 'H',
            Revision::TangerineWhistle => 'T',
            Revision::SpuriousDragon => 'S',
            Revision::Byzantium => 'B',
            Revision::Constantinople => 'C',
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Revision {
    type Err = ValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Revision::ALL
            .into_iter()
            .find(|rev| rev.name() == normalized)
            .ok_or_else(|| ValueParseError::UnknownRevision { name: s.to_string() })
    }
}

/// The kind of call a message describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallKind {
    #[default]
    Call,
    DelegateCall,
    CallCode,
    Create,
}

/// Per-call input handed to an engine.
///
/// The engine borrows a message for the duration of one `execute` call and
/// must not keep any reference to it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallMessage {
    /// Destination account whose code is executing.
    pub address: Address,
    /// Caller account.
    pub sender: Address,
    /// Value transferred with the call.
    pub value: Bytes32,
    /// Call input data.
    pub input: Vec<u8>,
    /// Hash of the code being executed.
    pub code_hash: Bytes32,
    /// Gas made available to the call.
    pub gas: i64,
    /// Call depth; zero for a top-level call.
    pub depth: i32,
    /// Kind of call.
    pub kind: CallKind,
    /// Bit flags, see [`CallMessage::STATIC`].
    pub flags: u32,
}

impl CallMessage {
    /// Flag bit marking a static (read-only) call.
    pub const STATIC: u32 = 1;

    /// Create a top-level `Call` message to `address` with everything else zeroed.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    /// Set the caller address.
    #[must_use]
    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = sender;
        self
    }

    /// Set the transferred value.
    #[must_use]
    pub fn with_value(mut self, value: Bytes32) -> Self {
        self.value = value;
        self
    }

    /// Set the input data.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = input.into();
        self
    }

    /// Set the gas budget.
    #[must_use]
    pub fn with_gas(mut self, gas: i64) -> Self {
        self.gas = gas;
        self
    }

    /// Set the call kind.
    #[must_use]
    pub fn with_kind(mut self, kind: CallKind) -> Self {
        self.kind = kind;
        self
    }

    /// Mark the call as static.
    #[must_use]
    pub fn into_static(mut self) -> Self {
        self.flags |= Self::STATIC;
        self
    }

    /// Returns `true` if the call is static.
    pub fn is_static(&self) -> bool {
        self.flags & Self::STATIC != 0
    }
}

/// Outcome of one execution call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusCode {
    /// Execution completed; output may be present.
    Success,
    /// Execution completed but the call did not achieve its effect.
    Failure,
    /// The engine itself could not complete (for example, out of memory).
    InternalError,
}

impl StatusCode {
    /// Returns `true` for [`StatusCode::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, StatusCode::Success)
    }

    /// Returns `true` for [`StatusCode::InternalError`].
    pub fn is_internal_error(self) -> bool {
        matches!(self, StatusCode::InternalError)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Success => write!(f, "SUCCESS"),
            StatusCode::Failure => write!(f, "FAILURE"),
            StatusCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_and_display() {
        let addr: Address = "0x00000000000000000000000000000000deadbeef".parse().unwrap();
        assert_eq!(addr.0[16..], [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(addr.to_string(), "0x00000000000000000000000000000000deadbeef");

        let bare: Address = "00000000000000000000000000000000deadbeef".parse().unwrap();
        assert_eq!(addr, bare);
    }

    #[test]
    fn test_address_wrong_length() {
        let err = "0xdeadbeef".parse::<Address>().unwrap_err();
        assert!(matches!(
            err,
            ValueParseError::InvalidLength {
                expected: 20,
                found: 4
            }
        ));
    }

    #[test]
    fn test_bytes32_invalid_hex() {
        let err = "0xzz".parse::<Bytes32>().unwrap_err();
        assert!(matches!(err, ValueParseError::InvalidHex(_)));
    }

    #[test]
    fn test_bytes32_low_byte() {
        let word = Bytes32::from_low_byte(7);
        assert_eq!(word.low_byte(), 7);
        assert!(word.0[..31].iter().all(|b| *b == 0));
        assert!(Bytes32::ZERO.is_zero());
        assert!(!word.is_zero());
    }

    #[test]
    fn test_revision_names_round_trip() {
        for rev in Revision::ALL {
            assert_eq!(rev.name().parse::<Revision>().unwrap(), rev);
        }
        assert_eq!(
            "Spurious_Dragon".parse::<Revision>().unwrap(),
            Revision::SpuriousDragon
        );
        assert!("istanbul".parse::<Revision>().is_err());
    }

    #[test]
    fn test_revision_ordering() {
        assert!(Revision::Frontier < Revision::Byzantium);
        assert!(Revision::Byzantium < Revision::LATEST);
        assert_eq!(Revision::default(), Revision::Frontier);
        assert_eq!(Revision::Byzantium.tag(), 'B');
    }

    #[test]
    fn test_call_message_builder() {
        let addr = Address::from([1u8; 20]);
        let msg = CallMessage::new(addr)
            .with_sender(Address::from([2u8; 20]))
            .with_gas(1000)
            .with_input(vec![1, 2, 3])
            .into_static();

        assert_eq!(msg.address, addr);
        assert_eq!(msg.gas, 1000);
        assert_eq!(msg.input, vec![1, 2, 3]);
        assert_eq!(msg.kind, CallKind::Call);
        assert!(msg.is_static());
    }

    #[test]
    fn test_status_code_display() {
        assert_eq!(StatusCode::Success.to_string(), "SUCCESS");
        assert_eq!(StatusCode::Failure.to_string(), "FAILURE");
        assert_eq!(StatusCode::InternalError.to_string(), "INTERNAL_ERROR");
        assert!(StatusCode::InternalError.is_internal_error());
        assert!(!StatusCode::Failure.is_success());
    }

    #[test]
    fn test_serde_string_forms() {
        let addr = Address::from([0xab; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(20)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);

        let rev: Revision = serde_json::from_str("\"tangerine-whistle\"").unwrap();
        assert_eq!(rev, Revision::TangerineWhistle);
    }
}

//! Common types, errors, and configuration for exvm.
//!
//! This crate provides shared functionality used across the exvm workspace:
//! - Fixed-size value types crossing the engine/host boundary
//! - Error types using `thiserror` for type-safe error handling
//! - Configuration structures for hosts and their engines

pub mod config;
pub mod config_file;
pub mod error;
pub mod types;

pub use config::{EngineConfig, ExecutionConfig, RuntimeConfig};
pub use config_file::{AccountEntry, ConfigFile, ConfigFileError, StorageEntry};
pub use error::{OptionError, RegistryError, ValueParseError};
pub use types::{Address, Bytes32, CallKind, CallMessage, Revision, StatusCode};

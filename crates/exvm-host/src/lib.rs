//! Host side of the exvm engine interface.
//!
//! This crate provides a ready-made host for running engines:
//!
//! - [`memory`]: world state kept in memory, with a journal of every callback
//! - [`session`]: one engine instance driven through its whole lifecycle
//!
//! # Threading
//!
//! [`MemoryHost`] is `Sync`, so independent sessions on separate threads may
//! share it by reference. A single [`HostSession`] is used from one thread
//! at a time.

pub mod memory;
pub mod session;

pub use memory::{Account, MemoryHost, StorageAccess};
pub use session::{CallOutcome, HostSession};

//! The engine interface and factory descriptor.
//!
//! A host obtains an engine through an [`EngineFactory`] and hands its
//! callback interface to every `execute` call. The instance never holds a
//! reference to a host, so one instance may run against different hosts on
//! successive calls.
//!
//! # Lifecycle
//!
//! ```text
//! create() ──► set_option(..)* ──► execute(host, ..)* ──► destroy()
//! ```
//!
//! Options are set before the first `execute`. Every method takes
//! `&mut self`, so one instance never has two calls in flight; independent
//! instances may run on separate threads.

use std::fmt;

use exvm_common::{CallMessage, OptionError, Revision};
use tracing::warn;

use crate::host::Host;
use crate::options::OptionSpec;
use crate::result::ExecutionResult;

/// Version of the engine/host interface implemented by this crate.
///
/// Hosts refuse factories that declare a different version.
pub const ABI_VERSION: u32 = 0;

/// A loaded execution engine.
pub trait Engine: fmt::Debug {
    /// Options this engine recognizes.
    fn options(&self) -> &'static [OptionSpec] {
        &[]
    }

    /// Set an option, reporting why it was rejected.
    ///
    /// A rejected option leaves the configuration unchanged.
    fn try_set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        let _ = value;
        Err(OptionError::unknown(name))
    }

    /// Set an option. Returns `true` if it was accepted.
    fn set_option(&mut self, name: &str, value: &str) -> bool {
        match self.try_set_option(name, value) {
            Ok(()) => true,
            Err(err) => {
                warn!(option = name, error = %err, "Option rejected");
                false
            }
        }
    }

    /// Current value of an option, if it is recognized.
    fn get_option(&self, name: &str) -> Option<String> {
        let _ = name;
        None
    }

    /// Execute `code` for `message` under `revision`.
    ///
    /// Storage access goes through `host`. Neither `host`, `message` nor
    /// `code` is retained past the call.
    fn execute(
        &mut self,
        host: &dyn Host,
        revision: Revision,
        message: &CallMessage,
        code: &[u8],
    ) -> ExecutionResult;

    /// Destroy the instance, releasing everything it owns.
    fn destroy(self: Box<Self>) {}
}

/// Entry point that creates a fresh engine instance.
pub type CreateFn = fn() -> Box<dyn Engine>;

/// Fixed-shape descriptor a host uses to discover and bind an engine.
#[derive(Clone, Copy)]
pub struct EngineFactory {
    /// Interface version the engine was built against.
    pub abi_version: u32,
    /// Engine name.
    pub name: &'static str,
    /// Creation entry point.
    pub create: CreateFn,
}

impl EngineFactory {
    /// Create a new engine instance.
    pub fn create(&self) -> Box<dyn Engine> {
        (self.create)()
    }

    /// Returns `true` if the factory speaks this crate's interface version.
    pub fn is_compatible(&self) -> bool {
        self.abi_version == ABI_VERSION
    }
}

impl fmt::Debug for EngineFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineFactory")
            .field("abi_version", &self.abi_version)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

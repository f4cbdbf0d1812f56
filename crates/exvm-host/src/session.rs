//! Driving one engine instance.
//!
//! A [`HostSession`] pairs a single engine instance with the host it runs
//! against for its whole life: it applies options before the first call,
//! lends the host to each call, copies each result's output out and
//! releases it, and destroys the instance when dropped.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument, warn};

use exvm_common::{CallMessage, OptionError, RegistryError, Revision, StatusCode};
use exvm_core::{Engine, EngineRegistry, ExecutionResult, Host};

/// What a call produced, detached from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    /// Outcome category.
    pub status: StatusCode,
    /// Gas remaining after the call.
    pub gas_left: i64,
    /// Copy of the output. Always empty for `InternalError`.
    pub output: Vec<u8>,
}

impl CallOutcome {
    /// Returns `true` if the call succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl From<ExecutionResult> for CallOutcome {
    fn from(result: ExecutionResult) -> Self {
        let status = result.status;
        let gas_left = result.gas_left;
        Self {
            status,
            gas_left,
            output: result.into_output(),
        }
    }
}

/// An engine instance bound to a host, plus the revision it runs under.
pub struct HostSession<'h> {
    host: &'h dyn Host,
    engine: Option<Box<dyn Engine>>,
    revision: Revision,
    calls: u64,
}

impl<'h> HostSession<'h> {
    /// Bind an already created engine to `host`.
    pub fn new(engine: Box<dyn Engine>, host: &'h dyn Host, revision: Revision) -> Self {
        Self {
            host,
            engine: Some(engine),
            revision,
            calls: 0,
        }
    }

    /// Create the engine `name` from `registry`, bound to `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if no engine with that name is registered.
    pub fn open(
        registry: &EngineRegistry,
        name: &str,
        host: &'h dyn Host,
        revision: Revision,
    ) -> Result<Self, RegistryError> {
        let engine = registry.create(name)?;
        info!(engine = name, %revision, "Session opened");
        Ok(Self::new(engine, host, revision))
    }

    /// Revision every call runs under.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Number of calls executed so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Apply `options` in name order.
    ///
    /// Rejected options are skipped and returned; the rest still apply.
    pub fn apply_options(&mut self, options: &BTreeMap<String, String>) -> Vec<OptionError> {
        if self.calls > 0 {
            warn!(calls = self.calls, "Applying options after the first call");
        }

        let Some(engine) = self.engine.as_mut() else {
            return Vec::new();
        };

        // Apply each option independently; a rejection never stops the rest.
        options
            .iter()
            .filter_map(|(name, value)| match engine.try_set_option(name, value) {
                Ok(()) => None,
                Err(err) => {
                    warn!(option = %name, error = %err, "Option rejected");
                    Some(err)
                }
            })
            .collect()
    }

    /// Current value of an engine option.
    pub fn option(&self, name: &str) -> Option<String> {
        self.engine.as_ref().and_then(|engine| engine.get_option(name))
    }

    /// Execute `code` for `message`.
    ///
    /// The result's output is copied into the returned outcome and the
    /// engine-owned buffer is released before this returns.
    #[instrument(skip_all, fields(revision = %self.revision, address = %message.address))]
    pub fn execute(&mut self, message: &CallMessage, code: &[u8]) -> CallOutcome {
        let Some(engine) = self.engine.as_mut() else {
            return ExecutionResult::internal_error().into();
        };

        self.calls += 1;
        let result = engine.execute(self.host, self.revision, message, code);

        // Copy the output out, then release the engine's buffer.
        let outcome = CallOutcome::from(result);
        debug!(
            status = %outcome.status,
            gas_left = outcome.gas_left,
            output_len = outcome.output.len(),
            "Call finished"
        );
        outcome
    }

    /// Destroy the engine instance now.
    pub fn close(mut self) {
        self.destroy_engine();
    }

    fn destroy_engine(&mut self) {
        if let Some(engine) = self.engine.take() {
            debug!(calls = self.calls, "Destroying engine instance");
            engine.destroy();
        }
    }
}

impl Drop for HostSession<'_> {
    fn drop(&mut self) {
        self.destroy_engine();
    }
}

impl std::fmt::Debug for HostSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostSession")
            .field("engine", &self.engine)
            .field("revision", &self.revision)
            .field("calls", &self.calls)
            .finish()
    }
}

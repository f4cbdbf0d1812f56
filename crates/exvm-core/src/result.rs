//! Execution results and output buffer ownership.
//!
//! Every `execute` call yields exactly one [`ExecutionResult`]. Its output
//! is an [`Output`], which is in one of three ownership modes:
//!
//! - [`Output::None`]: no buffer, nothing to release
//! - [`Output::Owned`]: an engine-allocated buffer that is handed back to the
//!   engine's release function exactly once
//! - [`Output::Static`]: constant data the receiver must never free
//!
//! The receiver consumes a result with [`ExecutionResult::release`] (or
//! [`ExecutionResult::into_output`], which copies the bytes out first).
//! Because both take the result by value, a result cannot be released twice.
//! An owned buffer dropped without an explicit release is still handed to its
//! release function from `Drop`, so the release runs exactly once on every path.

use std::collections::TryReserveError;
use std::fmt;

use exvm_common::StatusCode;

/// Release function supplied by the engine that allocated an owned buffer.
///
/// Receives ownership of the buffer, including any spare capacity; it runs
/// exactly once per buffer and is never called by the engine itself.
pub type ReleaseFn = fn(Vec<u8>);

/// An engine-allocated output buffer paired with its release function.
///
/// The allocation is handed back as it was made; it is never shrunk or
/// otherwise reallocated on the way to the release function.
pub struct OwnedBuffer {
    data: Option<Vec<u8>>,
    release: ReleaseFn,
}

impl OwnedBuffer {
    /// Wrap an already allocated buffer.
    pub fn new(data: Vec<u8>, release: ReleaseFn) -> Self {
        Self {
            data: Some(data),
            release,
        }
    }

    /// Allocate a buffer holding a copy of `bytes`.
    ///
    /// Allocation failure is reported instead of aborting the process, and
    /// nothing is left allocated when it fails.
    pub fn try_copy_from(bytes: &[u8], release: ReleaseFn) -> Result<Self, TryReserveError> {
        let mut data = try_alloc(bytes.len())?;
        // Capacity is already reserved; this cannot allocate.
        data.extend_from_slice(bytes);
        Ok(Self::new(data, release))
    }

    /// The buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        self.data.as_deref().unwrap_or_default()
    }
}

impl Drop for OwnedBuffer {
    fn drop(&mut self) {
        if let Some(data) = self.data.take() {
            (self.release)(data);
        }
    }
}

impl fmt::Debug for OwnedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedBuffer")
            .field("len", &self.as_slice().len())
            .finish_non_exhaustive()
    }
}

/// Reserve an empty vector with exactly `len` bytes of capacity.
pub(crate) fn try_alloc(len: usize) -> Result<Vec<u8>, TryReserveError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)?;
    Ok(data)
}

/// Output of one execution call, tagged with its ownership mode.
#[derive(Debug, Default)]
pub enum Output {
    /// No output buffer.
    #[default]
    None,
    /// Engine-owned buffer; released exactly once by the receiver.
    Owned(OwnedBuffer),
    /// Constant data; never released.
    Static(&'static [u8]),
}

impl Output {
    /// The output bytes; empty for [`Output::None`].
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Output::None => &[],
            Output::Owned(buffer) => buffer.as_slice(),
            Output::Static(bytes) => *bytes,
        }
    }

    /// Returns `true` if the receiver owes a release call.
    pub fn requires_release(&self) -> bool {
        matches!(self, Output::Owned(_))
    }

    /// Returns `true` if there is no buffer at all.
    pub fn is_none(&self) -> bool {
        matches!(self, Output::None)
    }

    /// Consume the output, running the release function if one is owed.
    ///
    /// Returns `true` if a release function ran.
    pub fn release(self) -> bool {
        match self {
            Output::Owned(buffer) => {
                drop(buffer);
                true
            }
            Output::None | Output::Static(_) => false,
        }
    }
}

/// The result of one execution call.
///
/// The status is always set; constructors exist for each outcome.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Outcome of the call.
    pub status: StatusCode,
    /// Remaining resource budget reported by the engine.
    pub gas_left: i64,
    /// Output data and its ownership mode.
    pub output: Output,
}

impl ExecutionResult {
    /// A successful result.
    pub fn success(gas_left: i64, output: Output) -> Self {
        Self {
            status: StatusCode::Success,
            gas_left,
            output,
        }
    }

    /// A failed result with no output.
    pub fn failure(gas_left: i64) -> Self {
        Self {
            status: StatusCode::Failure,
            gas_left,
            output: Output::None,
        }
    }

    /// A failed result carrying constant output.
    pub fn failure_with_message(gas_left: i64, message: &'static str) -> Self {
        Self {
            status: StatusCode::Failure,
            gas_left,
            output: Output::Static(message.as_bytes()),
        }
    }

    /// An internal error. Carries no output and no resource budget.
    pub fn internal_error() -> Self {
        Self {
            status: StatusCode::InternalError,
            gas_left: 0,
            output: Output::None,
        }
    }

    /// A successful result whose output is a freshly allocated copy of `bytes`.
    ///
    /// If the allocation fails the result is an internal error with no output.
    pub fn success_with_copy(gas_left: i64, bytes: &[u8], release: ReleaseFn) -> Self {
        Self::from_allocation(gas_left, OwnedBuffer::try_copy_from(bytes, release))
    }

    /// Map an output allocation attempt to a result.
    pub fn from_allocation(gas_left: i64, buffer: Result<OwnedBuffer, TryReserveError>) -> Self {
        match buffer {
            Ok(buffer) => Self::success(gas_left, Output::Owned(buffer)),
            Err(err) => {
                tracing::warn!(error = %err, "Output allocation failed");
                Self::internal_error()
            }
        }
    }

    /// The output bytes.
    ///
    /// Output of an internal error is always ignored and reads as empty.
    pub fn output(&self) -> &[u8] {
        if self.status.is_internal_error() {
            return &[];
        }
        self.output.as_slice()
    }

    /// Returns `true` if the receiver owes a release call.
    pub fn requires_release(&self) -> bool {
        self.output.requires_release()
    }

    /// Consume the result, releasing its output if required.
    ///
    /// Returns `true` if a release function ran.
    pub fn release(self) -> bool {
        self.output.release()
    }

    /// Copy the output out, then release the result.
    pub fn into_output(self) -> Vec<u8> {
        let bytes = self.output().to_vec();
        self.release();
        bytes
    }
}

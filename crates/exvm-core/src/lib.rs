//! Engine/host contract and reference engine for exvm.
//!
//! This crate defines how a host drives a pluggable execution engine:
//! - [`Host`]: callbacks the engine invokes against host-owned storage
//! - [`Engine`]: create, configure, execute, destroy
//! - [`ExecutionResult`] and [`Output`]: results and output buffer ownership
//! - [`EngineFactory`] and [`EngineRegistry`]: discovery and binding
//! - [`ExampleVm`]: the reference engine
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         Host                            │
//! │  (Owns storage; lent to the engine for each call)       │
//! └─────────────────────────────────────────────────────────┘
//!        │ execute(&host, ..)               ▲ get/set_storage
//!        ▼                                  │
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Box<dyn Engine>                      │
//! │  - created by an EngineFactory                          │
//! │  - set_option before the first call                     │
//! │  - execute(&host, revision, &message, &code)            │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                    ExecutionResult                      │
//! │  - status, gas_left                                     │
//! │  - Output::{None, Owned, Static}, released exactly once │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod engine;
pub mod example;
pub mod host;
pub mod options;
pub mod registry;
pub mod result;

pub use engine::{ABI_VERSION, CreateFn, Engine, EngineFactory};
pub use example::{
    COUNTER_CODE, EXAMPLE_OPTION, EXAMPLE_VM_NAME, ExampleVm, RETURN_ADDRESS_CODE,
    empty_code_message, example_vm_factory,
};
pub use host::Host;
pub use options::OptionSpec;
pub use registry::EngineRegistry;
pub use result::{ExecutionResult, Output, OwnedBuffer, ReleaseFn};

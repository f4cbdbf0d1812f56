//! The reference engine.
//!
//! [`ExampleVm`] does not interpret bytecode. It recognizes a few fixed code
//! patterns, given as the hex text of the bytecode, and reacts to each one in
//! a way that exercises every part of the engine/host contract:
//!
//! | Code | Outcome |
//! |---|---|
//! | empty | `Failure` with a constant, revision-dependent message |
//! | [`RETURN_ADDRESS_CODE`] | `Success` with an owned copy of the destination address |
//! | [`COUNTER_CODE`] | `Success`, storage slot 0 of the destination incremented |
//! | anything else | `Failure`, no output, `gas_left = 0` |

use exvm_common::{Address, Bytes32, CallMessage, OptionError, Revision};
use tracing::{debug, trace};

use crate::engine::{ABI_VERSION, Engine, EngineFactory};
use crate::host::Host;
use crate::options::{OptionSpec, parse_i32_option};
use crate::result::{ExecutionResult, Output};

/// Name under which the reference engine registers.
pub const EXAMPLE_VM_NAME: &str = "examplevm";

/// The one option the reference engine declares.
pub const EXAMPLE_OPTION: &str = "example-option";

/// Assembly: `{ mstore(0, address()) return(0, msize()) }`.
pub const RETURN_ADDRESS_CODE: &[u8] = b"30600052596000f3";

/// Assembly: `{ sstore(0, add(sload(0), 1)) }`.
pub const COUNTER_CODE: &[u8] = b"600160005401600055";

const BYZANTIUM_GREETING: &str = "Welcome to Byzantium!";
const DEFAULT_GREETING: &str = "Hello Ethereum!";

const DECLARED_OPTIONS: &[OptionSpec] = &[OptionSpec {
    name: EXAMPLE_OPTION,
    description: "32-bit signed integer (decimal, 0x hex, or 0 octal)",
}];

/// The constant message returned for empty code under `revision`.
pub fn empty_code_message(revision: Revision) -> &'static str {
    if revision == Revision::Byzantium {
        BYZANTIUM_GREETING
    } else {
        DEFAULT_GREETING
    }
}

/// Factory descriptor for the reference engine.
pub fn example_vm_factory() -> EngineFactory {
    EngineFactory {
        abi_version: ABI_VERSION,
        name: EXAMPLE_VM_NAME,
        create: create_example_vm,
    }
}

fn create_example_vm() -> Box<dyn Engine> {
    Box::new(ExampleVm::new())
}

fn free_output(data: Vec<u8>) {
    trace!(len = data.len(), "Releasing output buffer");
    drop(data);
}

/// The reference engine.
///
/// Its only state is the configured option value.
#[derive(Debug, Default)]
pub struct ExampleVm {
    example_option: i32,
}

impl ExampleVm {
    /// Create an instance with every option at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `example-option`.
    pub fn example_option(&self) -> i32 {
        self.example_option
    }

    fn return_address(message: &CallMessage) -> ExecutionResult {
        ExecutionResult::success_with_copy(0, message.address.as_bytes(), free_output)
    }

    fn increment_counter(host: &dyn Host, address: &Address) -> ExecutionResult {
        let key = Bytes32::ZERO;
        let mut value = host.get_storage(address, &key);
        // Only the low-order byte is incremented; it wraps at 256.
        value.0[31] = value.0[31].wrapping_add(1);
        host.set_storage(address, &key, &value);

        debug!(%address, counter = value.low_byte(), "Counter incremented");
        ExecutionResult::success(0, Output::None)
    }
}

impl Engine for ExampleVm {
    fn options(&self) -> &'static [OptionSpec] {
        DECLARED_OPTIONS
    }

    fn try_set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        if name != EXAMPLE_OPTION {
            return Err(OptionError::unknown(name));
        }
        self.example_option = parse_i32_option(name, value)?;
        debug!(option = name, value = self.example_option, "Option set");
        Ok(())
    }

    fn get_option(&self, name: &str) -> Option<String> {
        (name == EXAMPLE_OPTION).then(|| self.example_option.to_string())
    }

    fn execute(
        &mut self,
        host: &dyn Host,
        revision: Revision,
        message: &CallMessage,
        code: &[u8],
    ) -> ExecutionResult {
        debug!(
            %revision,
            address = %message.address,
            code_len = code.len(),
            example_option = self.example_option,
            "Executing"
        );

        if code.is_empty() {
            return ExecutionResult::failure_with_message(0, empty_code_message(revision));
        }

        if code == RETURN_ADDRESS_CODE {
            Self::return_address(message)
        } else if code == COUNTER_CODE {
            Self::increment_counter(host, &message.address)
        } else {
            debug!("Unrecognized code");
            ExecutionResult::failure(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exvm_common::StatusCode;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingHost {
        slots: RefCell<HashMap<(Address, Bytes32), Bytes32>>,
        reads: Cell<usize>,
        writes: Cell<usize>,
    }

    impl Host for RecordingHost {
        fn get_storage(&self, address: &Address, key: &Bytes32) -> Bytes32 {
            self.reads.set(self.reads.get() + 1);
            self.slots
                .borrow()
                .get(&(*address, *key))
                .copied()
                .unwrap_or_default()
        }

        fn set_storage(&self, address: &Address, key: &Bytes32, value: &Bytes32) {
            self.writes.set(self.writes.get() + 1);
            self.slots.borrow_mut().insert((*address, *key), *value);
        }
    }

    fn address() -> Address {
        Address::from([0x11; 20])
    }

    #[test]
    fn test_empty_code_sentinel() {
        let host = RecordingHost::default();
        let mut vm = ExampleVm::new();
        let msg = CallMessage::new(address());

        let result = vm.execute(&host, Revision::Byzantium, &msg, &[]);
        assert_eq!(result.status, StatusCode::Failure);
        assert_eq!(result.output(), b"Welcome to Byzantium!");
        assert!(matches!(result.output, Output::Static(_)));
        assert!(!result.requires_release());

        let result = vm.execute(&host, Revision::Frontier, &msg, &[]);
        assert_eq!(result.output(), b"Hello Ethereum!");

        assert_eq!(host.reads.get() + host.writes.get(), 0);
    }

    #[test]
    fn test_empty_code_message_per_revision() {
        for rev in Revision::ALL {
            let expected = if rev == Revision::Byzantium {
                BYZANTIUM_GREETING
            } else {
                DEFAULT_GREETING
            };
            assert_eq!(empty_code_message(rev), expected);
        }
    }

    #[test]
    fn test_return_address() {
        let host = RecordingHost::default();
        let mut vm = ExampleVm::new();

        let result = vm.execute(&host, Revision::Byzantium, &CallMessage::new(address()), RETURN_ADDRESS_CODE);
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(result.output(), address().as_bytes());
        assert!(result.requires_release());
        assert!(result.release());
    }

    #[test]
    fn test_counter_touches_slot_zero_once_each() {
        let host = RecordingHost::default();
        let mut vm = ExampleVm::new();

        let result = vm.execute(&host, Revision::Homestead, &CallMessage::new(address()), COUNTER_CODE);
        assert_eq!(result.status, StatusCode::Success);
        assert!(result.output.is_none());
        assert_eq!(host.reads.get(), 1);
        assert_eq!(host.writes.get(), 1);

        let slot = host.slots.borrow()[&(address(), Bytes32::ZERO)];
        assert_eq!(slot, Bytes32::from_low_byte(1));
    }

    #[test]
    fn test_same_length_different_bytes_fails() {
        let host = RecordingHost::default();
        let mut vm = ExampleVm::new();

        // Same length as the pattern, last byte differs.
        let mut code = RETURN_ADDRESS_CODE.to_vec();
        *code.last_mut().unwrap() = b'4';

        let result = vm.execute(&host, Revision::Byzantium, &CallMessage::new(address()), &code);
        assert_eq!(result.status, StatusCode::Failure);
        assert_eq!(result.gas_left, 0);
        assert!(result.output.is_none());
    }

    #[test]
    fn test_option_set_and_read() {
        let host = RecordingHost::default();
        let mut vm = ExampleVm::new();

        assert_eq!(vm.example_option(), 0);
        assert!(vm.set_option(EXAMPLE_OPTION, "42"));
        assert_eq!(vm.example_option(), 42);
        assert_eq!(vm.get_option(EXAMPLE_OPTION), Some("42".to_string()));

        // The configured value survives a call.
        let result = vm.execute(&host, Revision::Byzantium, &CallMessage::new(address()), COUNTER_CODE);
        assert!(result.status.is_success());
        assert_eq!(vm.example_option(), 42);

        assert!(!vm.set_option(EXAMPLE_OPTION, "2147483648"));
        let result = vm.execute(&host, Revision::Byzantium, &CallMessage::new(address()), &[]);
        assert_eq!(result.status, StatusCode::Failure);
        assert_eq!(vm.example_option(), 42);
        assert_eq!(vm.get_option(EXAMPLE_OPTION), Some("42".to_string()));

        assert!(!vm.set_option("unknown-option", "x"));
        assert_eq!(vm.get_option("unknown-option"), None);
        assert_eq!(vm.options().len(), 1);
    }

    #[test]
    fn test_host_supplied_per_call() {
        let first = RecordingHost::default();
        let second = RecordingHost::default();
        let mut vm = ExampleVm::new();
        let msg = CallMessage::new(address());

        vm.execute(&first, Revision::Byzantium, &msg, COUNTER_CODE);
        vm.execute(&second, Revision::Byzantium, &msg, COUNTER_CODE);
        vm.execute(&second, Revision::Byzantium, &msg, COUNTER_CODE);

        assert_eq!(first.slots.borrow()[&(address(), Bytes32::ZERO)], Bytes32::from_low_byte(1));
        assert_eq!(second.slots.borrow()[&(address(), Bytes32::ZERO)], Bytes32::from_low_byte(2));
        assert_eq!((first.reads.get(), first.writes.get()), (1, 1));
        assert_eq!((second.reads.get(), second.writes.get()), (2, 2));
    }

    #[test]
    fn test_factory() {
        let factory = example_vm_factory();
        assert_eq!(factory.name, EXAMPLE_VM_NAME);
        assert!(factory.is_compatible());

        let mut engine = factory.create();
        assert!(engine.set_option(EXAMPLE_OPTION, "-0x10"));
        assert_eq!(engine.get_option(EXAMPLE_OPTION), Some("-16".to_string()));
        engine.destroy();
    }
}

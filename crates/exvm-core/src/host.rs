//! The host callback interface.
//!
//! An engine calls back into host-owned state through [`Host`]. Storage is
//! owned entirely by the host: the engine reads and writes slots through
//! these callbacks and never caches values across `execute` calls.

use exvm_common::{Address, Bytes32};

/// Capabilities an engine may invoke against host-owned state.
///
/// Callbacks may be invoked synchronously during `execute`, any number of
/// times and in any order. The host applies each call independently and
/// immediately; there is no atomicity across calls.
///
/// The interface is total for well-formed inputs. Fixed-size keys and
/// addresses are enforced by the types, so callbacks cannot fail.
///
/// Methods take `&self`; the host is lent to the engine as `&dyn Host` for
/// one `execute` call at a time. Hosts that mutate state use interior
/// mutability.
pub trait Host {
    /// Read the storage slot `key` of account `address`.
    ///
    /// Slots that were never written read as zero.
    fn get_storage(&self, address: &Address, key: &Bytes32) -> Bytes32;

    /// Write `value` to the storage slot `key` of account `address`.
    fn set_storage(&self, address: &Address, key: &Bytes32, value: &Bytes32);

    /// Returns `true` if the account exists.
    fn account_exists(&self, address: &Address) -> bool {
        let _ = address;
        false
    }

    /// Balance of the account; zero for unknown accounts.
    fn get_balance(&self, address: &Address) -> Bytes32 {
        let _ = address;
        Bytes32::ZERO
    }

    /// Code of the account; empty for unknown accounts.
    fn get_code(&self, address: &Address) -> Vec<u8> {
        let _ = address;
        Vec::new()
    }
}

impl<H: Host + ?Sized> Host for &H {
    fn get_storage(&self, address: &Address, key: &Bytes32) -> Bytes32 {
        (**self).get_storage(address, key)
    }

    fn set_storage(&self, address: &Address, key: &Bytes32, value: &Bytes32) {
        (**self).set_storage(address, key, value);
    }

    fn account_exists(&self, address: &Address) -> bool {
        (**self).account_exists(address)
    }

    fn get_balance(&self, address: &Address) -> Bytes32 {
        (**self).get_balance(address)
    }

    fn get_code(&self, address: &Address) -> Vec<u8> {
        (**self).get_code(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Storage-only host relying on the provided defaults.
    #[derive(Default)]
    struct StorageOnly {
        slots: RefCell<HashMap<(Address, Bytes32), Bytes32>>,
    }

    impl Host for StorageOnly {
        fn get_storage(&self, address: &Address, key: &Bytes32) -> Bytes32 {
            self.slots
                .borrow()
                .get(&(*address, *key))
                .copied()
                .unwrap_or_default()
        }

        fn set_storage(&self, address: &Address, key: &Bytes32, value: &Bytes32) {
            self.slots.borrow_mut().insert((*address, *key), *value);
        }
    }

    #[test]
    fn test_provided_defaults() {
        let host = StorageOnly::default();
        let addr = Address::from([7u8; 20]);

        assert!(!host.account_exists(&addr));
        assert!(host.get_balance(&addr).is_zero());
        assert!(host.get_code(&addr).is_empty());
    }

    fn bump<H: Host>(host: H, address: &Address, key: &Bytes32) {
        let mut value = host.get_storage(address, key);
        value.0[31] = value.0[31].wrapping_add(1);
        host.set_storage(address, key, &value);
    }

    #[test]
    fn test_storage_through_reference() {
        let host = StorageOnly::default();
        let addr = Address::from([7u8; 20]);
        let key = Bytes32::ZERO;

        let by_ref: &dyn Host = &host;
        assert!(by_ref.get_storage(&addr, &key).is_zero());

        bump(&host, &addr, &key);
        bump(by_ref, &addr, &key);
        assert_eq!(by_ref.get_storage(&addr, &key).low_byte(), 2);
    }
}

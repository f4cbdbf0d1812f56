//! In-memory host.
//!
//! [`MemoryHost`] keeps every account in a map behind a lock, so it can be
//! shared by reference with any number of engine instances. Each callback
//! is recorded in an access journal and emitted via `tracing`.

use std::collections::BTreeMap;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use exvm_common::{AccountEntry, Address, Bytes32};
use exvm_core::Host;

/// State of one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    /// Account balance.
    pub balance: Bytes32,
    /// Account code.
    pub code: Vec<u8>,
    /// Storage slots. Missing slots read as zero.
    pub storage: BTreeMap<Bytes32, Bytes32>,
}

/// A host callback observed by [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageAccess {
    /// `get_storage` returned `value`.
    Read {
        address: Address,
        key: Bytes32,
        value: Bytes32,
    },
    /// `set_storage` stored `value`.
    Write {
        address: Address,
        key: Bytes32,
        value: Bytes32,
    },
}

impl StorageAccess {
    /// Returns `true` for a write.
    pub fn is_write(&self) -> bool {
        matches!(self, StorageAccess::Write { .. })
    }
}

/// Host keeping all world state in memory.
#[derive(Debug, Default)]
pub struct MemoryHost {
    accounts: RwLock<BTreeMap<Address, Account>>,
    journal: Mutex<Vec<StorageAccess>>,
}

impl MemoryHost {
    /// Create a host with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host pre-loaded with `entries`.
    ///
    /// Later entries for the same address overwrite earlier ones.
    pub fn from_accounts(entries: &[AccountEntry]) -> Self {
        let accounts = entries
            .iter()
            .map(|entry| {
                let account = Account {
                    balance: entry.balance,
                    code: entry.code.as_bytes().to_vec(),
                    storage: entry
                        .storage
                        .iter()
                        .map(|slot| (slot.key, slot.value))
                        .collect(),
                };
                (entry.address, account)
            })
            .collect();

        Self {
            accounts: RwLock::new(accounts),
            journal: Mutex::new(Vec::new()),
        }
    }

    /// Insert or replace an account.
    pub fn insert_account(&self, address: Address, account: Account) {
        self.accounts.write().insert(address, account);
    }

    /// Set the balance of `address`, creating the account if needed.
    pub fn set_balance(&self, address: Address, balance: Bytes32) {
        self.accounts.write().entry(address).or_default().balance = balance;
    }

    /// Set the code of `address`, creating the account if needed.
    pub fn insert_code(&self, address: Address, code: impl Into<Vec<u8>>) {
        self.accounts.write().entry(address).or_default().code = code.into();
    }

    /// Read a slot without recording an access.
    pub fn storage(&self, address: &Address, key: &Bytes32) -> Bytes32 {
        self.accounts
            .read()
            .get(address)
            .and_then(|account| account.storage.get(key).copied())
            .unwrap_or_default()
    }

    /// Write a slot without recording an access.
    pub fn set_storage_direct(&self, address: Address, key: Bytes32, value: Bytes32) {
        self.accounts
            .write()
            .entry(address)
            .or_default()
            .storage
            .insert(key, value);
    }

    /// Snapshot of an account.
    pub fn account(&self, address: &Address) -> Option<Account> {
        self.accounts.read().get(address).cloned()
    }

    /// Number of known accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    /// Snapshot of every recorded callback, oldest first.
    pub fn journal(&self) -> Vec<StorageAccess> {
        self.journal.lock().clone()
    }

    /// Take the recorded callbacks, leaving the journal empty.
    pub fn take_journal(&self) -> Vec<StorageAccess> {
        std::mem::take(&mut *self.journal.lock())
    }

    /// Number of recorded reads and writes.
    pub fn access_counts(&self) -> (usize, usize) {
        let journal = self.journal.lock();
        let writes = journal.iter().filter(|access| access.is_write()).count();
        (journal.len() - writes, writes)
    }
}

impl Host for MemoryHost {
    fn get_storage(&self, address: &Address, key: &Bytes32) -> Bytes32 {
        let value = self.storage(address, key);
        trace!(%address, %key, %value, "get_storage");
        self.journal.lock().push(StorageAccess::Read {
            address: *address,
            key: *key,
            value,
        });
        value
    }

    fn set_storage(&self, address: &Address, key: &Bytes32, value: &Bytes32) {
        debug!(%address, %key, %value, "set_storage");
        self.set_storage_direct(*address, *key, *value);
        self.journal.lock().push(StorageAccess::Write {
            address: *address,
            key: *key,
            value: *value,
        });
    }

    fn account_exists(&self, address: &Address) -> bool {
        self.accounts.read().contains_key(address)
    }

    fn get_balance(&self, address: &Address) -> Bytes32 {
        self.accounts
            .read()
            .get(address)
            .map(|account| account.balance)
            .unwrap_or_default()
    }

    fn get_code(&self, address: &Address) -> Vec<u8> {
        self.accounts
            .read()
            .get(address)
            .map(|account| account.code.clone())
            .unwrap_or_default()
    }
}

//! In-process account storage.

use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{Account, Backend};
use crate::error::{Error, Operation, Result};

/// Process-local account storage. Lost on restart.
///
/// Mutations take the write lock for the whole check-then-act sequence;
/// lookups share the read lock.
#[derive(Default)]
pub struct VolatileBackend {
    accounts: RwLock<HashMap<String, Account>>,
}

impl VolatileBackend {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl Backend for VolatileBackend {
    async fn create(&self, name: &str, amount: i64) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        match accounts.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(Error::already_exists(Operation::Create, name)),
            Entry::Vacant(slot) => {
                slot.insert(Account::new(name, amount));
                Ok(())
            }
        }
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(Operation::Delete, name))
    }

    async fn rename(&self, name: &str, new_name: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if !accounts.contains_key(name) {
            return Err(Error::not_found(Operation::Rename, name));
        }
        if name == new_name {
            return Ok(());
        }
        if accounts.contains_key(new_name) {
            return Err(Error::already_exists(Operation::Rename, new_name));
        }
        // Presence checked above under the same write guard.
        if let Some(mut account) = accounts.remove(name) {
            account.name = new_name.to_owned();
            accounts.insert(new_name.to_owned(), account);
        }
        Ok(())
    }

    async fn set_amount(&self, name: &str, amount: i64) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(name)
            .ok_or_else(|| Error::not_found(Operation::SetAmount, name))?;
        account.amount = amount;
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Account> {
        let accounts = self.accounts.read().await;
        accounts
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(Operation::Get, name))
    }

    async fn list(&self) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        let mut snapshot: Vec<_> = accounts.values().cloned().collect();
        snapshot.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(snapshot)
    }
}

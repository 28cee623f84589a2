//! Storage layer for the account registry. Provides two interchangeable
//! backends behind the [`Backend`] trait:
//! - In-process map guarded by a reader/writer lock ([`VolatileBackend`])
//! - SQLite relation with a unique name column ([`DurableBackend`])
//!
//! Both hand out copies of account values only; nothing outside a backend
//! ever holds a live reference into its state.

mod durable;
mod volatile;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use durable::DurableBackend;
pub use volatile::VolatileBackend;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub amount: i64,
}

impl Account {
    pub fn new(name: impl Into<String>, amount: i64) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// Authoritative owner of account state.
///
/// Every method is atomic with respect to every other call on the same
/// backend: the existence check and the mutation of a single call are never
/// interleaved with another call touching the same name. No method validates
/// its input; that is the service's job.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fails with `AlreadyExists` if `name` is taken.
    async fn create(&self, name: &str, amount: i64) -> Result<()>;

    /// Fails with `NotFound` if `name` is absent.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Moves the account to `new_name`, keeping its amount. Fails with
    /// `NotFound` if `name` is absent and `AlreadyExists` if `new_name` is a
    /// different existing account.
    async fn rename(&self, name: &str, new_name: &str) -> Result<()>;

    /// Fails with `NotFound` if `name` is absent.
    async fn set_amount(&self, name: &str, amount: i64) -> Result<()>;

    /// Fails with `NotFound` if `name` is absent.
    async fn get(&self, name: &str) -> Result<Account>;

    /// All accounts, ordered by name.
    async fn list(&self) -> Result<Vec<Account>>;
}

//! The registry's operation surface.
//!
//! [`RegistryService`] validates caller input once, for every backend, then
//! delegates to the configured [`Backend`] under a bounded wait. Backend
//! errors pass through unchanged.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Operation, Result};
use crate::stores::{Account, Backend};

pub const ACCOUNT_CREATED: &str = "account created";
pub const ACCOUNT_DELETED: &str = "account deleted";
pub const ACCOUNT_NAME_CHANGED: &str = "account name changed";
pub const ACCOUNT_AMOUNT_CHANGED: &str = "account amount changed";

#[derive(Clone)]
pub struct RegistryService {
    backend: Arc<dyn Backend>,
    call_timeout: Duration,
}

impl RegistryService {
    pub fn new(backend: Arc<dyn Backend>, call_timeout: Duration) -> Self {
        Self {
            backend,
            call_timeout,
        }
    }

    pub async fn create(&self, name: &str, amount: i64) -> Result<&'static str> {
        require_name(name)?;
        self.bounded(Operation::Create, name, self.backend.create(name, amount))
            .await?;
        debug!(account = name, amount, "account created");
        Ok(ACCOUNT_CREATED)
    }

    pub async fn delete(&self, name: &str) -> Result<&'static str> {
        require_name(name)?;
        self.bounded(Operation::Delete, name, self.backend.delete(name))
            .await?;
        debug!(account = name, "account deleted");
        Ok(ACCOUNT_DELETED)
    }

    pub async fn rename(&self, name: &str, new_name: &str) -> Result<&'static str> {
        require_name(name)?;
        if new_name.is_empty() {
            return Err(Error::InvalidArgument("new name is empty"));
        }
        self.bounded(Operation::Rename, name, self.backend.rename(name, new_name))
            .await?;
        debug!(account = name, new_name, "account renamed");
        Ok(ACCOUNT_NAME_CHANGED)
    }

    pub async fn set_amount(&self, name: &str, amount: i64) -> Result<&'static str> {
        require_name(name)?;
        self.bounded(
            Operation::SetAmount,
            name,
            self.backend.set_amount(name, amount),
        )
        .await?;
        debug!(account = name, amount, "account amount changed");
        Ok(ACCOUNT_AMOUNT_CHANGED)
    }

    pub async fn get(&self, name: &str) -> Result<Account> {
        require_name(name)?;
        self.bounded(Operation::Get, name, self.backend.get(name))
            .await
    }

    /// Snapshot of every account, ordered by name.
    pub async fn list(&self) -> Result<Vec<Account>> {
        self.bounded(Operation::List, "*", self.backend.list()).await
    }

    /// Waits at most `call_timeout` for a backend call. An elapsed wait is
    /// reported as `BackendUnavailable`: the call may still have applied.
    async fn bounded<T>(
        &self,
        op: Operation,
        name: &str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(%op, account = name, timeout = ?self.call_timeout, "backend call timed out");
                Err(Error::unavailable(op, name, "timed out"))
            }
        }
    }
}

fn require_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidArgument("name is empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::stores::{DurableBackend, VolatileBackend};
    use async_trait::async_trait;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn volatile() -> RegistryService {
        RegistryService::new(Arc::new(VolatileBackend::new()), TIMEOUT)
    }

    fn durable() -> RegistryService {
        RegistryService::new(Arc::new(DurableBackend::open_in_memory().unwrap()), TIMEOUT)
    }

    async fn check_contract(service: RegistryService) {
        assert_eq!(service.create("alice", 100).await, Ok(ACCOUNT_CREATED));
        assert_eq!(service.get("alice").await, Ok(Account::new("alice", 100)));

        assert_eq!(
            service.create("alice", 1).await.unwrap_err().kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(service.get("alice").await.unwrap().amount, 100);

        assert_eq!(service.set_amount("alice", -30).await, Ok(ACCOUNT_AMOUNT_CHANGED));
        assert_eq!(service.rename("alice", "alicia").await, Ok(ACCOUNT_NAME_CHANGED));
        assert_eq!(service.get("alice").await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(service.get("alicia").await, Ok(Account::new("alicia", -30)));

        service.create("bert", 9).await.unwrap();
        assert_eq!(
            service.rename("alicia", "bert").await.unwrap_err().kind(),
            ErrorKind::AlreadyExists
        );

        assert_eq!(service.delete("alicia").await, Ok(ACCOUNT_DELETED));
        assert_eq!(service.delete("alicia").await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(service.list().await, Ok(vec![Account::new("bert", 9)]));
    }

    #[tokio::test]
    async fn test_volatile_contract() {
        check_contract(volatile()).await;
    }

    #[tokio::test]
    async fn test_durable_contract() {
        check_contract(durable()).await;
    }

    async fn check_empty_names(service: RegistryService) {
        service.create("kept", 1).await.unwrap();
        let empty = Error::InvalidArgument("name is empty");

        assert_eq!(service.create("", 1).await, Err(empty.clone()));
        assert_eq!(service.delete("").await, Err(empty.clone()));
        assert_eq!(service.rename("", "x").await, Err(empty.clone()));
        assert_eq!(service.set_amount("", 1).await, Err(empty.clone()));
        assert_eq!(service.get("").await, Err(empty));
        assert_eq!(
            service.rename("kept", "").await,
            Err(Error::InvalidArgument("new name is empty"))
        );

        assert_eq!(service.list().await, Ok(vec![Account::new("kept", 1)]));
    }

    #[tokio::test]
    async fn test_empty_names_rejected_without_state_change() {
        check_empty_names(volatile()).await;
        check_empty_names(durable()).await;
    }

    struct StalledBackend;

    #[async_trait]
    impl Backend for StalledBackend {
        async fn create(&self, _: &str, _: i64) -> Result<()> {
            std::future::pending().await
        }
        async fn delete(&self, _: &str) -> Result<()> {
            std::future::pending().await
        }
        async fn rename(&self, _: &str, _: &str) -> Result<()> {
            std::future::pending().await
        }
        async fn set_amount(&self, _: &str, _: i64) -> Result<()> {
            std::future::pending().await
        }
        async fn get(&self, _: &str) -> Result<Account> {
            std::future::pending().await
        }
        async fn list(&self) -> Result<Vec<Account>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_timeout_is_backend_unavailable() {
        let service = RegistryService::new(Arc::new(StalledBackend), Duration::from_millis(20));
        assert_eq!(
            service.get("slow").await,
            Err(Error::unavailable(Operation::Get, "slow", "timed out"))
        );
        assert_eq!(
            service.create("slow", 1).await.unwrap_err().kind(),
            ErrorKind::BackendUnavailable
        );
    }
}

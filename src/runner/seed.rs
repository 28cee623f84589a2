//! Bulk account import at startup and export at shutdown, both as
//! `name,amount` CSV.

use csv_async::{AsyncReaderBuilder, Trim};
use std::fs::File as StdFile;
use std::io::BufWriter;
use std::path::Path;
use tokio::fs::File;
use tokio_stream::StreamExt;
use tracing::{info, warn};

use crate::csv_utils::write_csv;
use crate::error::BootstrapError;
use crate::service::RegistryService;
use crate::stores::Account;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped: usize,
}

/// Streams accounts from a CSV file and creates each one through the service.
///
/// Rows the service rejects (duplicates, empty names) are logged and skipped.
/// CSV parsing errors are critical and abort the seed.
pub async fn seed_from_csv(
    service: &RegistryService,
    path: impl AsRef<Path>,
) -> Result<SeedSummary, BootstrapError> {
    let path = path.as_ref();
    let file = File::open(path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .create_deserializer(file);

    let mut summary = SeedSummary::default();
    let mut records = csv_reader.deserialize::<Account>();
    while let Some(record) = records.next().await {
        let account = record?;
        match service.create(&account.name, account.amount).await {
            Ok(_) => summary.created += 1,
            Err(err) => {
                warn!(%err, "skipping seed row");
                summary.skipped += 1;
            }
        }
    }

    info!(
        path = %path.display(),
        created = summary.created,
        skipped = summary.skipped,
        "seed complete"
    );
    Ok(summary)
}

/// Writes every account, ordered by name, to a CSV file. Returns the number
/// of accounts written.
pub async fn write_snapshot(
    service: &RegistryService,
    path: impl AsRef<Path>,
) -> Result<usize, BootstrapError> {
    let path = path.as_ref();
    let accounts = service.list().await?;
    let count = accounts.len();

    let file = StdFile::create(path)?;
    write_csv(BufWriter::new(file), accounts.into_iter())?;

    info!(path = %path.display(), count, "snapshot written");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::VolatileBackend;
    use std::sync::Arc;
    use std::time::Duration;

    fn service() -> RegistryService {
        RegistryService::new(Arc::new(VolatileBackend::new()), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_seed_example_accounts() -> Result<(), BootstrapError> {
        let service = service();
        let summary = seed_from_csv(&service, "data/seed_accounts.csv").await?;

        assert_eq!(
            summary,
            SeedSummary {
                created: 3,
                skipped: 0,
            }
        );
        assert_eq!(service.get("alice").await?, Account::new("alice", 100));
        assert_eq!(service.get("carol").await?, Account::new("carol", -25));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_skips_rejected_rows() -> Result<(), BootstrapError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("seed.csv");
        std::fs::write(&path, "name,amount\ndan,1\ndan,2\n ,3\nerin,4\n")?;

        let service = service();
        let summary = seed_from_csv(&service, &path).await?;

        assert_eq!(
            summary,
            SeedSummary {
                created: 2,
                skipped: 2,
            }
        );
        assert_eq!(service.get("dan").await?.amount, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_malformed_amount_is_critical() -> Result<(), BootstrapError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("seed.csv");
        std::fs::write(&path, "name,amount\nfay,lots\n")?;

        let result = seed_from_csv(&service(), &path).await;
        assert!(matches!(result, Err(BootstrapError::Seed(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_is_sorted_csv() -> Result<(), BootstrapError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("snapshot.csv");

        let service = service();
        service.create("zed", 9).await?;
        service.create("abe", -1).await?;

        assert_eq!(write_snapshot(&service, &path).await?, 2);
        assert_eq!(
            std::fs::read_to_string(&path)?,
            "name,amount\nabe,-1\nzed,9\n"
        );
        Ok(())
    }
}

//! The runner is responsible for bringing the registry up: opening the
//! configured backend, seeding it, serving requests over TCP until shutdown,
//! and writing the final snapshot.
//!
mod seed;
mod server;

pub use seed::{seed_from_csv, write_snapshot, SeedSummary};
pub use server::{handle_request, serve};

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{BackendKind, Config};
use crate::error::BootstrapError;
use crate::service::RegistryService;
use crate::stores::{Backend, DurableBackend, VolatileBackend};

/// Runs the registry server described by `config` until `shutdown` resolves.
///
/// # Errors
/// Returns an error if:
/// * The durable store cannot be opened or its schema created
/// * The seed CSV cannot be read or is malformed
/// * The listener cannot be bound
/// * The shutdown snapshot cannot be written
pub async fn run<F>(config: Config, shutdown: F) -> Result<(), BootstrapError>
where
    F: Future<Output = ()>,
{
    let backend = open_backend(&config)?;
    let service = RegistryService::new(backend, config.call_timeout);

    if let Some(path) = &config.seed_csv {
        seed_from_csv(&service, path).await?;
    }

    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        backend = ?config.backend,
        "registry listening"
    );
    serve(listener, service.clone(), shutdown).await?;

    if let Some(path) = &config.snapshot_csv {
        write_snapshot(&service, path).await?;
    }
    Ok(())
}

pub fn open_backend(config: &Config) -> Result<Arc<dyn Backend>, BootstrapError> {
    let backend: Arc<dyn Backend> = match config.backend {
        BackendKind::Volatile => Arc::new(VolatileBackend::new()),
        BackendKind::Durable => Arc::new(DurableBackend::open(&config.db_path)?),
    };
    Ok(backend)
}

mod client;
mod config;
mod csv_utils;
mod dto;
mod error;
mod framing;
pub mod logging;
mod runner;
mod service;
mod stores;

pub use client::{Client, ClientError};
pub use config::{BackendKind, Config};
pub use dto::{Request, Response};
pub use error::{BootstrapError, Error, ErrorKind, Operation};
pub use framing::MAX_LINE_LENGTH;
pub use runner::{
    handle_request, open_backend, run, seed_from_csv, serve, write_snapshot, SeedSummary,
};
pub use service::RegistryService;
pub use stores::{Account, Backend, DurableBackend, VolatileBackend};

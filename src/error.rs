//! Error taxonomy for the account registry.
//!
//! [`Error`] is what every registry operation can fail with, regardless of
//! which backend served it:
//! - [`Error::InvalidArgument`] - caller input violated a precondition
//! - [`Error::NotFound`] / [`Error::AlreadyExists`] - definitive answers from the backend
//! - [`Error::BackendUnavailable`] - the store could not give a definitive answer
//!
//! [`BootstrapError`] covers process startup and shutdown work (configuration,
//! opening the store, seeding, snapshots) and never reaches the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The registry operation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Delete,
    Rename,
    SetAmount,
    Get,
    List,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Delete => "delete",
            Operation::Rename => "rename",
            Operation::SetAmount => "set_amount",
            Operation::Get => "get",
            Operation::List => "list",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidArgument(&'static str),

    #[error("account not found ({op} '{name}')")]
    NotFound { op: Operation, name: String },

    #[error("account already exists ({op} '{name}')")]
    AlreadyExists { op: Operation, name: String },

    /// The store was unreachable, timed out or failed unexpectedly. The
    /// effect of the call on the store is unknown.
    #[error("backend unavailable ({op} '{name}'): {reason}")]
    BackendUnavailable {
        op: Operation,
        name: String,
        reason: String,
    },
}

impl Error {
    pub fn not_found(op: Operation, name: impl Into<String>) -> Self {
        Error::NotFound {
            op,
            name: name.into(),
        }
    }

    pub fn already_exists(op: Operation, name: impl Into<String>) -> Self {
        Error::AlreadyExists {
            op,
            name: name.into(),
        }
    }

    pub fn unavailable(op: Operation, name: impl Into<String>, reason: impl fmt::Display) -> Self {
        Error::BackendUnavailable {
            op,
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Error::BackendUnavailable { .. } => ErrorKind::BackendUnavailable,
        }
    }
}

/// Wire-level failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    BackendUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::NotFound => "not found",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::BackendUnavailable => "backend unavailable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid configuration: {key}={value:?}: {reason}")]
    Config {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("store failure: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("seed failure: {0}")]
    Seed(#[from] csv_async::Error),

    #[error("snapshot failure: {0}")]
    Snapshot(#[from] csv::Error),

    #[error(transparent)]
    Registry(#[from] Error),
}

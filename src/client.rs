//! Async client for the registry's line protocol.

use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::dto::{Request, Response};
use crate::error::ErrorKind;
use crate::framing::{Frame, LineReader};
use crate::stores::Account;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),

    #[error("malformed message: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    Malformed(String),

    /// The request may or may not have been applied. Query the account
    /// before retrying.
    #[error("no response within {0:?}; the request may have been applied")]
    TimedOut(Duration),

    /// The connection is gone, either closed by the server or dropped after
    /// a failed exchange. Reconnect to continue.
    #[error("connection closed")]
    Closed,

    #[error("{kind}: {message}")]
    Registry { kind: ErrorKind, message: String },

    #[error("unexpected response: {0:?}")]
    Unexpected(Response),
}

struct Connection {
    lines: LineReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    async fn exchange(&mut self, encoded: &[u8]) -> Result<Response, ClientError> {
        self.writer.write_all(encoded).await?;
        match self.lines.next_frame().await? {
            Some(Frame::Line(line)) => Ok(serde_json::from_str(&line)?),
            Some(Frame::Malformed(reason)) => Err(ClientError::Malformed(reason)),
            None => Err(ClientError::Closed),
        }
    }
}

pub struct Client {
    /// `None` once an exchange has failed: a late reply to the abandoned
    /// request could otherwise be read as the answer to the next one.
    conn: Option<Connection>,
    timeout: Duration,
}

impl Client {
    /// Connects to a registry server. `timeout` bounds the connect and every
    /// subsequent call.
    pub async fn connect(addr: impl ToSocketAddrs, timeout: Duration) -> Result<Self, ClientError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ClientError::TimedOut(timeout))??;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            conn: Some(Connection {
                lines: LineReader::new(reader),
                writer,
            }),
            timeout,
        })
    }

    /// Sends one request and waits for its response. Registry failures come
    /// back as `Ok(Response::Error { .. })`.
    ///
    /// Any other failure, timeouts included, drops the connection; every later
    /// call returns [`ClientError::Closed`].
    pub async fn call(&mut self, request: &Request) -> Result<Response, ClientError> {
        let mut encoded = serde_json::to_vec(request)?;
        encoded.push(b'\n');

        let timeout = self.timeout;
        let conn = self.conn.as_mut().ok_or(ClientError::Closed)?;
        let result = match tokio::time::timeout(timeout, conn.exchange(&encoded)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::TimedOut(timeout)),
        };
        if result.is_err() {
            self.conn = None;
        }
        result
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub async fn create(&mut self, name: &str, amount: i64) -> Result<String, ClientError> {
        let request = Request::CreateAccount {
            name: name.to_owned(),
            amount,
        };
        self.confirm(&request).await
    }

    pub async fn delete(&mut self, name: &str) -> Result<String, ClientError> {
        let request = Request::DeleteAccount {
            name: name.to_owned(),
        };
        self.confirm(&request).await
    }

    pub async fn rename(&mut self, name: &str, new_name: &str) -> Result<String, ClientError> {
        let request = Request::ChangeAccountName {
            name: name.to_owned(),
            new_name: new_name.to_owned(),
        };
        self.confirm(&request).await
    }

    pub async fn set_amount(&mut self, name: &str, new_amount: i64) -> Result<String, ClientError> {
        let request = Request::ChangeAccountAmount {
            name: name.to_owned(),
            new_amount,
        };
        self.confirm(&request).await
    }

    pub async fn get(&mut self, name: &str) -> Result<Account, ClientError> {
        let request = Request::GetAccount {
            name: name.to_owned(),
        };
        match self.call(&request).await? {
            Response::Account { name, amount } => Ok(Account { name, amount }),
            other => Err(unexpected(other)),
        }
    }

    async fn confirm(&mut self, request: &Request) -> Result<String, ClientError> {
        match self.call(request).await? {
            Response::Ok { result } => Ok(result),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(response: Response) -> ClientError {
    match response {
        Response::Error { kind, message } => ClientError::Registry { kind, message },
        other => ClientError::Unexpected(other),
    }
}

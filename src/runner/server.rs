//! TCP transport: one task per connection, one JSON response line per
//! request line.

use std::future::Future;
use std::io;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::dto::{Request, Response};
use crate::error::ErrorKind;
use crate::framing::{Frame, LineReader};
use crate::service::RegistryService;

/// Accepts connections on `listener` until `shutdown` resolves.
/// Spawns one task per connection:
/// * Reads newline-delimited JSON requests
/// * Dispatches each one to the service
/// * Writes one JSON response line per request, in request order
///
/// Connections already accepted keep running after shutdown until their
/// peer disconnects or the runtime stops.
pub async fn serve<F>(listener: TcpListener, service: RegistryService, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested, no longer accepting connections");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        warn!(%err, "failed to accept connection");
                        continue;
                    }
                };
                debug!(%peer, "connection accepted");
                let service = service.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, service).await {
                        warn!(%peer, %err, "connection closed with error");
                    }
                });
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, service: RegistryService) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = LineReader::new(reader);

    while let Some(frame) = lines.next_frame().await? {
        // A bad line is answered, not fatal for the connection
        let response = match frame {
            Frame::Line(line) if line.trim().is_empty() => continue,
            Frame::Line(line) => match serde_json::from_str::<Request>(&line) {
                Ok(request) => handle_request(&service, request).await,
                Err(err) => malformed(err),
            },
            Frame::Malformed(reason) => malformed(reason),
        };
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
    }
    Ok(())
}

fn malformed(reason: impl std::fmt::Display) -> Response {
    Response::Error {
        kind: ErrorKind::InvalidArgument,
        message: format!("malformed request: {reason}"),
    }
}

/// Dispatches a decoded request to the service and encodes the outcome.
pub async fn handle_request(service: &RegistryService, request: Request) -> Response {
    let result = match request {
        Request::CreateAccount { name, amount } => {
            service.create(&name, amount).await.map(Response::done)
        }
        Request::DeleteAccount { name } => service.delete(&name).await.map(Response::done),
        Request::ChangeAccountName { name, new_name } => service
            .rename(&name, &new_name)
            .await
            .map(Response::done),
        Request::ChangeAccountAmount { name, new_amount } => service
            .set_amount(&name, new_amount)
            .await
            .map(Response::done),
        Request::GetAccount { name } => service.get(&name).await.map(Response::from),
    };
    result.unwrap_or_else(|err| {
        debug!(%err, "request failed");
        Response::from(err)
    })
}

//! Common test utilities for sockrpc-client integration tests
//!
//! This module provides a reusable mock service and response helpers for
//! testing client behavior without a real service behind the socket.

#![allow(dead_code)]

use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What the mock service does with one request
pub enum Reply {
    /// Write these bytes back verbatim (a newline is appended)
    Send(String),
    /// Keep the connection open and answer nothing
    Silent,
    /// Close the connection without answering
    Hangup,
}

/// Mock JSON-RPC service listening on a stream socket
///
/// Every request line received is parsed, recorded for later inspection, and
/// handed to the handler, whose `Reply` decides what goes back.
pub struct MockServer {
    address: String,
    connections: Arc<AtomicUsize>,
    message_rx: mpsc::UnboundedReceiver<Value>,
    task: JoinHandle<()>,
    _dir: Option<TempDir>,
}

impl MockServer {
    /// Start a Unix-socket service that answers every request with an empty
    /// array result
    pub async fn new() -> Self {
        Self::with_handler(|request| Reply::Send(mock_response(request_id(&request), Value::Array(vec![])))).await
    }

    /// Start a Unix-socket service with a custom handler
    pub async fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(Value) -> Reply + Send + Sync + 'static,
    {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("service.sock");
        let listener = UnixListener::bind(&path).unwrap();

        let handler = Arc::new(handler);
        let connections = Arc::new(AtomicUsize::new(0));
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        let counter = connections.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let (read, write) = stream.into_split();
                tokio::spawn(serve(read, write, handler.clone(), message_tx.clone()));
            }
        });

        Self {
            address: path.to_string_lossy().into_owned(),
            connections,
            message_rx,
            task,
            _dir: Some(dir),
        }
    }

    /// Start a TCP service on a loopback port with a custom handler
    pub async fn tcp_with_handler<F>(handler: F) -> Self
    where
        F: Fn(Value) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let handler = Arc::new(handler);
        let connections = Arc::new(AtomicUsize::new(0));
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        let counter = connections.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let (read, write) = stream.into_split();
                tokio::spawn(serve(read, write, handler.clone(), message_tx.clone()));
            }
        });

        Self {
            address,
            connections,
            message_rx,
            task,
            _dir: None,
        }
    }

    /// Address to dial (a socket path, or `host:port` for TCP)
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Number of connections accepted so far
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Wait for the next recorded request
    ///
    /// Returns None if nothing arrives within 5 seconds.
    pub async fn wait_for_message(&mut self) -> Option<Value> {
        tokio::time::timeout(tokio::time::Duration::from_secs(5), self.message_rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// A recorded request if one is already queued
    pub fn try_message(&mut self) -> Option<Value> {
        self.message_rx.try_recv().ok()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve<R, W, F>(read: R, mut write: W, handler: Arc<F>, message_tx: mpsc::UnboundedSender<Value>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Fn(Value) -> Reply,
{
    let mut lines = BufReader::new(read).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let request: Value = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(_) => break,
        };
        let _ = message_tx.send(request.clone());

        match (handler.as_ref())(request) {
            Reply::Send(mut text) => {
                text.push('\n');
                if write.write_all(text.as_bytes()).await.is_err() {
                    break;
                }
            }
            Reply::Silent => {}
            Reply::Hangup => break,
        }
    }
}

/// The id of a recorded request, or 0 if it has none
pub fn request_id(request: &Value) -> u64 {
    request["id"].as_u64().unwrap_or(0)
}

/// Helper to create a mock JSON-RPC response
pub fn mock_response(id: u64, result: Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
    .to_string()
}

/// Helper to create a mock JSON-RPC error response
pub fn mock_error_response(id: u64, code: i64, message: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "error": {
            "code": code,
            "message": message
        },
        "id": id
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_creation() {
        let server = MockServer::new().await;
        assert!(server.address().ends_with("service.sock"));
        assert_eq!(server.connection_count(), 0);
    }

    #[test]
    fn test_mock_response_format() {
        let response = mock_response(1, serde_json::json!([]));
        assert_eq!(response, r#"{"jsonrpc":"2.0","id":1,"result":[]}"#);
    }

    #[test]
    fn test_mock_error_response_format() {
        let response = mock_error_response(1, -32601, "Method not found");
        assert!(response.contains("\"error\""));
        assert!(response.contains("-32601"));
        assert!(response.contains("Method not found"));
    }
}

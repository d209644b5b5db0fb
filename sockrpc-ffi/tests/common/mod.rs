//! Common test utilities for sockrpc-ffi integration tests
//!
//! The adapter drives its own runtime and blocks the calling thread, so the
//! mock service here runs on plain threads instead of tokio tasks.

#![allow(dead_code)]

use serde_json::Value;
use sockrpc_ffi::{AdapterError, Diagnostics, Status};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixListener;
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Mock JSON-RPC service on a Unix socket, served by a background thread
///
/// The handler gets each parsed request and returns the raw reply text, or
/// `None` to hang up without replying.
pub struct MockService {
    dir: TempDir,
    path: String,
    message_rx: mpsc::Receiver<Value>,
}

impl MockService {
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(Value) -> Option<String> + Send + 'static,
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let (message_tx, message_rx) = mpsc::channel();

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let Ok(reader) = stream.try_clone() else { break };

                for line in BufReader::new(reader).lines() {
                    let Ok(line) = line else { break };
                    let Ok(request) = serde_json::from_str::<Value>(&line) else { break };
                    let _ = message_tx.send(request.clone());

                    match handler(request) {
                        Some(reply) => {
                            if writeln!(stream, "{}", reply).is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        });

        Self {
            path: path.to_string_lossy().into_owned(),
            dir,
            message_rx,
        }
    }

    /// Socket path to pass as the address
    pub fn address(&self) -> &str {
        &self.path
    }

    /// Next recorded request, waiting up to 5 seconds
    pub fn wait_for_message(&self) -> Option<Value> {
        self.message_rx.recv_timeout(Duration::from_secs(5)).ok()
    }

    /// A path inside the service's directory where nothing listens
    pub fn missing_address(&self) -> String {
        self.dir.path().join("missing.sock").to_string_lossy().into_owned()
    }
}

/// Diagnostics collaborator that keeps every report
#[derive(Default)]
pub struct RecordingDiagnostics {
    reports: Mutex<Vec<(Status, String)>>,
}

impl RecordingDiagnostics {
    pub fn reports(&self) -> Vec<(Status, String)> {
        self.reports.lock().unwrap().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, error: &AdapterError) {
        self.reports.lock().unwrap().push((error.status(), error.to_string()));
    }
}

/// The id of a recorded request, or 0 if it has none
pub fn request_id(request: &Value) -> u64 {
    request["id"].as_u64().unwrap_or(0)
}

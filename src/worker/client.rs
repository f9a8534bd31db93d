//! Blocking client for the warehouse driver process.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Mutex, PoisonError};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{WorkerError, WorkerResult};
use super::protocol::{
    methods, CloseConnectionParams, CloseConnectionResponse, ExecuteQueryParams,
    ExecuteQueryResponse, OpenConnectionParams, OpenConnectionResponse, RequestEnvelope,
    ResponseEnvelope,
};

/// File name of the driver binary looked up when no path is configured.
pub const DRIVER_BINARY: &str = "strata-snowflake-driver";

struct Pipes {
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

/// Client for the warehouse driver.
///
/// The driver runs as a child process and speaks NDJSON over
/// stdin/stdout. Requests are strictly sequential: each call writes one
/// line and reads until the response with the same id arrives.
///
/// # Example
///
/// ```ignore
/// use strata::worker::WorkerClient;
///
/// let client = WorkerClient::spawn("./strata-snowflake-driver")?;
/// let session = client.open_connection(params)?;
/// let result = client.execute_query(&session, "SELECT CURRENT_VERSION()", vec![])?;
/// client.close_connection(&session)?;
/// ```
pub struct WorkerClient {
    pipes: Mutex<Pipes>,
    child: Child,
}

impl WorkerClient {
    /// Spawn the driver process at `path`.
    pub fn spawn<P: AsRef<Path>>(path: P) -> WorkerResult<Self> {
        Self::spawn_with_args(path, &[])
    }

    /// Spawn the driver process with command-line arguments.
    pub fn spawn_with_args<P: AsRef<Path>>(path: P, args: &[&str]) -> WorkerResult<Self> {
        let mut child = Command::new(path.as_ref())
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(WorkerError::SpawnFailed)?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(WorkerError::SpawnFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "driver stdio not captured",
            )));
        };

        debug!(path = %path.as_ref().display(), pid = child.id(), "driver process started");

        Ok(Self {
            pipes: Mutex::new(Pipes {
                stdin: BufWriter::new(stdin),
                stdout: BufReader::new(stdout),
            }),
            child,
        })
    }

    /// Locate the driver binary.
    ///
    /// A configured path wins when it exists. Otherwise the well-known
    /// locations next to the working directory are tried, then `PATH`.
    pub fn resolve_driver_path(configured: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = configured {
            return path.exists().then(|| path.to_path_buf());
        }

        let candidates = [
            format!("./{DRIVER_BINARY}"),
            format!("./driver/{DRIVER_BINARY}"),
        ];
        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }

        let output = Command::new("which").arg(DRIVER_BINARY).output().ok()?;
        if !output.status.success() {
            return None;
        }
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!path.is_empty()).then(|| PathBuf::from(path))
    }

    /// Send a request and block until its response arrives.
    ///
    /// Lines that are not valid envelopes, or that answer a different id,
    /// are skipped.
    pub fn request<P, R>(&self, method: &str, params: P) -> WorkerResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();

        let request = RequestEnvelope {
            id: id.clone(),
            method: method.to_string(),
            params: serde_json::to_value(params).map_err(WorkerError::SerializeFailed)?,
        };
        let line = serde_json::to_string(&request).map_err(WorkerError::SerializeFailed)? + "\n";

        let mut pipes = self.pipes.lock().unwrap_or_else(PoisonError::into_inner);
        pipes
            .stdin
            .write_all(line.as_bytes())
            .map_err(WorkerError::WriteFailed)?;
        pipes.stdin.flush().map_err(WorkerError::WriteFailed)?;

        let response = loop {
            let mut buf = String::new();
            let read = pipes
                .stdout
                .read_line(&mut buf)
                .map_err(WorkerError::ReadFailed)?;
            if read == 0 {
                return Err(WorkerError::WorkerExited);
            }
            match serde_json::from_str::<ResponseEnvelope>(&buf) {
                Ok(resp) if resp.id == id => break resp,
                Ok(resp) => debug!(expected = %id, got = %resp.id, "skipping stale driver response"),
                Err(e) => warn!(error = %e, "failed to parse driver response"),
            }
        };
        drop(pipes);

        if response.success {
            let result = response.result.unwrap_or(Value::Null);
            serde_json::from_value(result).map_err(WorkerError::DeserializeFailed)
        } else if let Some(error) = response.error {
            Err(Self::classify_error(&error.code, &error.message))
        } else {
            Err(WorkerError::remote(
                "UNKNOWN",
                "driver returned failure without error details",
            ))
        }
    }

    pub(crate) fn classify_error(code: &str, message: &str) -> WorkerError {
        match code {
            "DRIVER_NOT_FOUND" => WorkerError::DriverNotFound(message.to_string()),
            "CONNECTION_FAILED" => WorkerError::ConnectionFailed(message.to_string()),
            "INVALID_REQUEST" => WorkerError::InvalidRequest(message.to_string()),
            "METHOD_NOT_FOUND" => WorkerError::MethodNotFound(message.to_string()),
            "QUERY_FAILED" => WorkerError::QueryFailed(message.to_string()),
            _ => WorkerError::remote(code, message),
        }
    }

    /// Open a warehouse connection and return its session id.
    pub fn open_connection(&self, params: OpenConnectionParams) -> WorkerResult<String> {
        let response: OpenConnectionResponse = self.request(methods::CONNECTION_OPEN, params)?;
        Ok(response.session_id)
    }

    /// Execute SQL on an open session.
    pub fn execute_query(
        &self,
        session_id: &str,
        sql: &str,
        args: Vec<Value>,
    ) -> WorkerResult<ExecuteQueryResponse> {
        self.request(
            methods::QUERY_EXECUTE,
            ExecuteQueryParams {
                session_id: session_id.to_string(),
                sql: sql.to_string(),
                args,
            },
        )
    }

    pub fn close_connection(&self, session_id: &str) -> WorkerResult<()> {
        let _: CloseConnectionResponse = self.request(
            methods::CONNECTION_CLOSE,
            CloseConnectionParams {
                session_id: session_id.to_string(),
            },
        )?;
        Ok(())
    }
}

impl Drop for WorkerClient {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

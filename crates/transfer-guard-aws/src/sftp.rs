// crates/transfer-guard-aws/src/sftp.rs
// ============================================================================
// Module: SFTP Connector
// Description: ssh2-backed implementation of the transfer capability.
// Purpose: Log in as a principal with its private key and move probe files.
// Dependencies: ssh2, tokio, transfer-guard-core
// ============================================================================

//! ## Overview
//! libssh2 is blocking, so every network step runs on tokio's blocking pool.
//! Relative remote names resolve against the principal's home directory;
//! absolute names use the server's logical `/<bucket>/<key>` layout.
//!
//! SFTP status codes map onto [`TransferError`] so callers can record why a
//! read failed: `NO_SUCH_FILE` is `NotFound`, `PERMISSION_DENIED` is
//! `Authorization`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::net::ToSocketAddrs;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ssh2::ErrorCode;
use ssh2::Session;
use ssh2::Sftp;
use transfer_guard_core::Credential;
use transfer_guard_core::TransferConnector;
use transfer_guard_core::TransferEndpoint;
use transfer_guard_core::TransferError;
use transfer_guard_core::TransferSession;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default connect and handshake timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum bytes read from a single remote file.
const MAX_DOWNLOAD_BYTES: u64 = 16 * 1024 * 1024;
/// SFTP status: no such file.
const SFTP_NO_SUCH_FILE: i32 = 2;
/// SFTP status: permission denied.
const SFTP_PERMISSION_DENIED: i32 = 3;
/// libssh2 error: authentication failed.
const SESSION_AUTHENTICATION_FAILED: i32 = -18;
/// libssh2 error: public key not verified.
const SESSION_PUBLICKEY_UNVERIFIED: i32 = -19;
/// libssh2 error: operation timed out.
const SESSION_TIMEOUT: i32 = -9;

// ============================================================================
// SECTION: Connector
// ============================================================================

/// Opens SFTP sessions with private-key authentication.
#[derive(Debug, Clone)]
pub struct SftpConnector {
    /// Connect and per-operation timeout.
    timeout: Duration,
}

impl Default for SftpConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl SftpConnector {
    /// Creates a connector with the given timeout.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
        }
    }
}

#[async_trait]
impl TransferConnector for SftpConnector {
    async fn connect(
        &self,
        endpoint: &TransferEndpoint,
        principal: &str,
        credential: &Credential,
    ) -> Result<Box<dyn TransferSession>, TransferError> {
        let endpoint = endpoint.clone();
        let principal = principal.to_string();
        let credential = credential.clone();
        let timeout = self.timeout;
        let session = run_blocking(move || open_session(&endpoint, &principal, &credential, timeout))
            .await?;
        Ok(Box::new(session))
    }
}

/// Connects, authenticates, and opens the SFTP subsystem.
fn open_session(
    endpoint: &TransferEndpoint,
    principal: &str,
    credential: &Credential,
    timeout: Duration,
) -> Result<SftpSession, TransferError> {
    let addrs: Vec<SocketAddr> = (endpoint.host.as_str(), endpoint.port)
        .to_socket_addrs()
        .map_err(|err| TransferError::Io(format!("resolve {}: {err}", endpoint.host)))?
        .collect();
    let mut last_error = TransferError::Io(format!("{} resolved to no addresses", endpoint.host));
    let mut stream = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(connected) => {
                stream = Some(connected);
                break;
            }
            Err(err) => last_error = TransferError::Io(format!("connect {addr}: {err}")),
        }
    }
    let stream = stream.ok_or(last_error)?;

    let mut session = Session::new().map_err(|err| map_ssh_error(&err))?;
    session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
    session.set_tcp_stream(stream);
    session.handshake().map_err(|err| map_ssh_error(&err))?;
    session
        .userauth_pubkey_memory(principal, None, credential.expose(), None)
        .map_err(|err| TransferError::Authentication(format!("{principal}: {}", err.message())))?;
    if !session.authenticated() {
        return Err(TransferError::Authentication(format!("{principal}: not authenticated")));
    }
    let sftp = session.sftp().map_err(|err| map_ssh_error(&err))?;
    Ok(SftpSession {
        sftp: Arc::new(Mutex::new(sftp)),
        _session: session,
    })
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Authenticated SFTP session.
struct SftpSession {
    /// SFTP channel; libssh2 channels are not safe for concurrent use.
    sftp: Arc<Mutex<Sftp>>,
    /// Owning SSH session, kept alive for the channel's lifetime.
    _session: Session,
}

#[async_trait]
impl TransferSession for SftpSession {
    async fn put(&self, bytes: Vec<u8>, remote_name: &str) -> Result<(), TransferError> {
        let sftp = Arc::clone(&self.sftp);
        let remote = remote_name.to_string();
        run_blocking(move || {
            let sftp = lock(&sftp)?;
            let mut file = sftp.create(Path::new(&remote)).map_err(|err| map_ssh_error(&err))?;
            file.write_all(&bytes).map_err(|err| map_io_error(&remote, &err))?;
            file.flush().map_err(|err| map_io_error(&remote, &err))
        })
        .await
    }

    async fn get(&self, remote_name: &str) -> Result<Vec<u8>, TransferError> {
        let sftp = Arc::clone(&self.sftp);
        let remote = remote_name.to_string();
        run_blocking(move || {
            let sftp = lock(&sftp)?;
            let file = sftp.open(Path::new(&remote)).map_err(|err| map_ssh_error(&err))?;
            let mut buffer = Vec::new();
            file.take(MAX_DOWNLOAD_BYTES + 1)
                .read_to_end(&mut buffer)
                .map_err(|err| map_io_error(&remote, &err))?;
            if buffer.len() as u64 > MAX_DOWNLOAD_BYTES {
                return Err(TransferError::Protocol(format!(
                    "{remote} exceeds {MAX_DOWNLOAD_BYTES} bytes"
                )));
            }
            Ok(buffer)
        })
        .await
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs a blocking libssh2 step on the blocking pool.
async fn run_blocking<T, F>(step: F) -> Result<T, TransferError>
where
    F: FnOnce() -> Result<T, TransferError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(step)
        .await
        .map_err(|err| TransferError::Protocol(format!("transfer task failed: {err}")))?
}

/// Locks the SFTP channel.
fn lock(sftp: &Mutex<Sftp>) -> Result<std::sync::MutexGuard<'_, Sftp>, TransferError> {
    sftp.lock().map_err(|_| TransferError::Protocol("sftp channel poisoned".to_string()))
}

/// Maps a libssh2 error onto the transfer taxonomy.
pub(crate) fn map_ssh_error(err: &ssh2::Error) -> TransferError {
    classify(err.code(), err.message())
}

/// Classifies a libssh2 error code.
pub(crate) fn classify(code: ErrorCode, message: &str) -> TransferError {
    match code {
        ErrorCode::SFTP(SFTP_NO_SUCH_FILE) => TransferError::NotFound(message.to_string()),
        ErrorCode::SFTP(SFTP_PERMISSION_DENIED) => {
            TransferError::Authorization(message.to_string())
        }
        ErrorCode::Session(SESSION_AUTHENTICATION_FAILED | SESSION_PUBLICKEY_UNVERIFIED) => {
            TransferError::Authentication(message.to_string())
        }
        ErrorCode::Session(SESSION_TIMEOUT) => TransferError::Io(message.to_string()),
        ErrorCode::SFTP(code) => TransferError::Protocol(format!("sftp status {code}: {message}")),
        ErrorCode::Session(code) => TransferError::Protocol(format!("ssh error {code}: {message}")),
    }
}

/// Maps a stream error on an open remote file.
fn map_io_error(remote: &str, err: &std::io::Error) -> TransferError {
    match err.kind() {
        std::io::ErrorKind::NotFound => TransferError::NotFound(remote.to_string()),
        std::io::ErrorKind::PermissionDenied => TransferError::Authorization(remote.to_string()),
        _ => TransferError::Io(format!("{remote}: {err}")),
    }
}

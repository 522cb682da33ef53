//! Error types for the transfer engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::download::DownloadError;

/// Errors raised while moving a paper into the output directory.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Local-mode HTTP download failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Local filesystem error.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// TCP connection to the proxy host failed.
    #[error(
        "cannot connect to proxy {host}:{port}: {source}\n  Suggestion: Check --proxy-host and --remote-port, and that the host is reachable"
    )]
    Connect {
        /// Proxy host name.
        host: String,
        /// Proxy SSH port.
        port: u16,
        /// The underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// An SSH or SFTP operation failed.
    #[error("SSH error on {host} while {action}: {source}")]
    Ssh {
        /// Proxy host name.
        host: String,
        /// What the session was doing when it failed.
        action: &'static str,
        /// The underlying libssh2 error.
        #[source]
        source: ssh2::Error,
    },

    /// Neither the key file nor the agent authenticated the user.
    #[error(
        "SSH authentication failed for {user}@{host}\n  Suggestion: Pass --key-file or load a key into ssh-agent"
    )]
    Auth {
        /// Remote user.
        user: String,
        /// Proxy host name.
        host: String,
    },

    /// The proxy did not present a host key.
    #[error("proxy {host} presented no host key")]
    HostKeyUnavailable {
        /// Proxy host name.
        host: String,
    },

    /// The proxy presented a host key that differs from the recorded one.
    #[error(
        "host key for {host} does not match {known_hosts}\n  Suggestion: Verify the proxy's identity before removing the stale entry"
    )]
    HostKeyMismatch {
        /// Proxy host entry as written in known_hosts.
        host: String,
        /// The known_hosts file consulted.
        known_hosts: PathBuf,
    },

    /// libssh2 could not compare the presented key with known_hosts.
    #[error("cannot check host key for {host} against {known_hosts}")]
    HostKeyCheck {
        /// Proxy host entry as written in known_hosts.
        host: String,
        /// The known_hosts file consulted.
        known_hosts: PathBuf,
    },

    /// Reading the remote command's output failed.
    #[error("lost remote output from {host}: {source}")]
    RemoteOutput {
        /// Proxy host name.
        host: String,
        /// The underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// The remote download command exited with a non-zero status.
    #[error("remote download on {host} exited with status {status}: {output}")]
    RemoteCommand {
        /// Proxy host name.
        host: String,
        /// Remote exit status.
        status: i32,
        /// Last lines of the remote output.
        output: String,
    },

    /// The blocking SSH task panicked or was cancelled.
    #[error("proxy transfer task failed: {source}")]
    Join {
        /// The underlying join error.
        #[source]
        source: tokio::task::JoinError,
    },
}

impl TransferError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an SSH error for `host`.
    pub fn ssh(host: impl Into<String>, action: &'static str, source: ssh2::Error) -> Self {
        Self::Ssh {
            host: host.into(),
            action,
            source,
        }
    }
}

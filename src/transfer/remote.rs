//! Download through an SSH proxy host.
//!
//! The proxy runs `wget` against the publisher (so its network identity is
//! the one the publisher sees), then the file is pulled back over SFTP.
//! libssh2 is blocking, so the whole exchange runs on the blocking pool.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ssh2::{CheckResult, ExtendedData, HostKeyType, KnownHostFileKind, Session};
use tracing::{debug, info, instrument, warn};

use super::{DownloadPlan, Transfer, TransferError};

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Default SSH session timeout (5 minutes).
pub const DEFAULT_SSH_TIMEOUT_SECS: u64 = 300;

/// Remote output lines kept for error reports.
const OUTPUT_TAIL_LINES: usize = 20;

/// Connection settings for the proxy host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub host: String,
    pub user: String,
    pub port: u16,
    /// Private key; ssh-agent is used when `None`.
    pub key_file: Option<PathBuf>,
    pub timeout: Duration,
    /// Trust-on-first-use host key store.
    pub known_hosts: PathBuf,
}

impl ProxySettings {
    /// Settings for `user@host` with the default port, timeout and
    /// `~/.ssh/known_hosts`.
    #[must_use]
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            port: DEFAULT_SSH_PORT,
            key_file: None,
            timeout: Duration::from_secs(DEFAULT_SSH_TIMEOUT_SECS),
            known_hosts: default_known_hosts_path(),
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_key_file(mut self, key_file: Option<PathBuf>) -> Self {
        self.key_file = key_file;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_known_hosts(mut self, known_hosts: PathBuf) -> Self {
        self.known_hosts = known_hosts;
        self
    }

    /// Host name as OpenSSH writes it in known_hosts.
    #[must_use]
    pub fn known_hosts_entry(&self) -> String {
        if self.port == DEFAULT_SSH_PORT {
            self.host.clone()
        } else {
            format!("[{}]:{}", self.host, self.port)
        }
    }
}

fn default_known_hosts_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".ssh")
        .join("known_hosts")
}

/// Quotes `value` for a POSIX shell.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Command run on the proxy to fetch `url` into `remote_file`.
#[must_use]
pub fn remote_download_command(url: &str, remote_file: &str) -> String {
    format!("wget {} -O {}", shell_quote(url), shell_quote(remote_file))
}

/// Runs `wget` on the proxy host and copies the result back over SFTP.
#[derive(Debug, Clone)]
pub struct RemoteProxyTransfer {
    settings: Arc<ProxySettings>,
}

impl RemoteProxyTransfer {
    #[must_use]
    pub fn new(settings: ProxySettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ProxySettings {
        &self.settings
    }
}

#[async_trait]
impl Transfer for RemoteProxyTransfer {
    fn name(&self) -> &'static str {
        "remote-proxy"
    }

    #[instrument(skip(self, plan), fields(host = %self.settings.host, url = %plan.download_url()))]
    async fn fetch(&self, plan: &DownloadPlan) -> Result<u64, TransferError> {
        let settings = Arc::clone(&self.settings);
        let plan = plan.clone();
        tokio::task::spawn_blocking(move || fetch_via_proxy(&settings, &plan))
            .await
            .map_err(|source| TransferError::Join { source })?
    }
}

fn fetch_via_proxy(settings: &ProxySettings, plan: &DownloadPlan) -> Result<u64, TransferError> {
    let session = open_session(settings)?;
    run_remote_download(&session, settings, plan)?;
    pull_file(
        &session,
        settings,
        plan.remote_file_name(),
        plan.local_file_name(),
    )
}

fn open_session(settings: &ProxySettings) -> Result<Session, TransferError> {
    let connect_err = |source| TransferError::Connect {
        host: settings.host.clone(),
        port: settings.port,
        source,
    };
    let addrs = (settings.host.as_str(), settings.port)
        .to_socket_addrs()
        .map_err(connect_err)?;
    let tcp = connect_any(addrs, settings.timeout).map_err(connect_err)?;

    let host = settings.host.as_str();
    let mut session =
        Session::new().map_err(|e| TransferError::ssh(host, "creating session", e))?;
    session.set_timeout(u32::try_from(settings.timeout.as_millis()).unwrap_or(u32::MAX));
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| TransferError::ssh(host, "handshaking", e))?;
    debug!(host, "SSH handshake complete");

    verify_host_key(&session, settings)?;
    authenticate(&session, settings)?;
    Ok(session)
}

/// Connects to the first reachable address, returning the last error if none is.
fn connect_any(
    addrs: impl IntoIterator<Item = SocketAddr>,
    timeout: Duration,
) -> io::Result<TcpStream> {
    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!(%addr, error = %e, "proxy address unreachable");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "host name resolved to no address")
    }))
}

fn verify_host_key(session: &Session, settings: &ProxySettings) -> Result<(), TransferError> {
    let (key, key_type) = session
        .host_key()
        .ok_or_else(|| TransferError::HostKeyUnavailable {
            host: settings.host.clone(),
        })?;
    trust_host_key(settings, key, key_type)
}

/// Checks `key` against known_hosts and records it when the host is unknown.
fn trust_host_key(
    settings: &ProxySettings,
    key: &[u8],
    key_type: HostKeyType,
) -> Result<(), TransferError> {
    let host = settings.host.as_str();
    let session = Session::new().map_err(|e| TransferError::ssh(host, "creating session", e))?;
    let mut known_hosts = session
        .known_hosts()
        .map_err(|e| TransferError::ssh(host, "loading known_hosts", e))?;
    if settings.known_hosts.exists() {
        known_hosts
            .read_file(&settings.known_hosts, KnownHostFileKind::OpenSSH)
            .map_err(|e| TransferError::ssh(host, "reading known_hosts", e))?;
    }

    match known_hosts.check_port(host, settings.port, key) {
        CheckResult::Match => Ok(()),
        CheckResult::Mismatch => Err(TransferError::HostKeyMismatch {
            host: settings.known_hosts_entry(),
            known_hosts: settings.known_hosts.clone(),
        }),
        CheckResult::Failure => Err(TransferError::HostKeyCheck {
            host: settings.known_hosts_entry(),
            known_hosts: settings.known_hosts.clone(),
        }),
        CheckResult::NotFound => {
            warn!(
                host = %settings.known_hosts_entry(),
                file = %settings.known_hosts.display(),
                "unknown host key; recording it"
            );
            append_known_host(&session, settings, key, key_type)
        }
    }
}

/// Appends one entry for the proxy; existing lines are left untouched.
fn append_known_host(
    session: &Session,
    settings: &ProxySettings,
    key: &[u8],
    key_type: HostKeyType,
) -> Result<(), TransferError> {
    let host = settings.host.as_str();
    let entry = settings.known_hosts_entry();
    let mut single = session
        .known_hosts()
        .map_err(|e| TransferError::ssh(host, "loading known_hosts", e))?;
    single
        .add(&entry, key, "added by paperfetch", key_type.into())
        .map_err(|e| TransferError::ssh(host, "recording host key", e))?;
    let recorded = single
        .hosts()
        .map_err(|e| TransferError::ssh(host, "recording host key", e))?
        .into_iter()
        .next()
        .ok_or_else(|| TransferError::HostKeyCheck {
            host: entry,
            known_hosts: settings.known_hosts.clone(),
        })?;
    let line = single
        .write_string(&recorded, KnownHostFileKind::OpenSSH)
        .map_err(|e| TransferError::ssh(host, "serializing host key", e))?;

    let path = settings.known_hosts.as_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| TransferError::io(parent, e))?;
    }
    let missing_newline = std::fs::read(path)
        .map(|contents| contents.last().is_some_and(|last| *last != b'\n'))
        .unwrap_or(false);
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| TransferError::io(path, e))?;
    if missing_newline {
        writeln!(file).map_err(|e| TransferError::io(path, e))?;
    }
    writeln!(file, "{}", line.trim_end()).map_err(|e| TransferError::io(path, e))
}

fn authenticate(session: &Session, settings: &ProxySettings) -> Result<(), TransferError> {
    let host = settings.host.as_str();
    let user = settings.user.as_str();
    let attempt = match &settings.key_file {
        Some(key) => session.userauth_pubkey_file(user, None, key, None),
        None => session.userauth_agent(user),
    };
    if let Err(e) = attempt {
        debug!(host, user, error = %e, "SSH authentication attempt failed");
    }

    if session.authenticated() {
        debug!(host, user, "SSH authenticated");
        Ok(())
    } else {
        Err(TransferError::Auth {
            user: user.to_string(),
            host: host.to_string(),
        })
    }
}

fn run_remote_download(
    session: &Session,
    settings: &ProxySettings,
    plan: &DownloadPlan,
) -> Result<(), TransferError> {
    let host = settings.host.as_str();
    let command = remote_download_command(plan.download_url(), plan.remote_file_name());
    info!(host, command = %command, "running remote download");

    let mut channel = session
        .channel_session()
        .map_err(|e| TransferError::ssh(host, "opening channel", e))?;
    // wget reports on stderr; merging keeps a single stream to drain.
    channel
        .handle_extended_data(ExtendedData::Merge)
        .map_err(|e| TransferError::ssh(host, "configuring channel", e))?;
    channel
        .exec(&command)
        .map_err(|e| TransferError::ssh(host, "starting remote command", e))?;

    let mut tail = VecDeque::with_capacity(OUTPUT_TAIL_LINES);
    for line in BufReader::new(&mut channel).lines() {
        let line = line.map_err(|source| TransferError::RemoteOutput {
            host: host.to_string(),
            source,
        })?;
        info!(host, "{line}");
        if tail.len() == OUTPUT_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    channel
        .wait_close()
        .map_err(|e| TransferError::ssh(host, "closing channel", e))?;
    let status = channel
        .exit_status()
        .map_err(|e| TransferError::ssh(host, "reading exit status", e))?;
    if status != 0 {
        return Err(TransferError::RemoteCommand {
            host: host.to_string(),
            status,
            output: Vec::from(tail).join("\n"),
        });
    }
    Ok(())
}

fn pull_file(
    session: &Session,
    settings: &ProxySettings,
    remote_file: &str,
    local_file: &Path,
) -> Result<u64, TransferError> {
    let host = settings.host.as_str();
    let sftp = session
        .sftp()
        .map_err(|e| TransferError::ssh(host, "starting SFTP", e))?;
    let mut remote = sftp
        .open(Path::new(remote_file))
        .map_err(|e| TransferError::ssh(host, "opening remote file", e))?;
    let mut local = File::create(local_file).map_err(|e| TransferError::io(local_file, e))?;

    match std::io::copy(&mut remote, &mut local) {
        Ok(bytes) => {
            info!(host, bytes, path = %local_file.display(), "copied paper from proxy");
            Ok(bytes)
        }
        Err(e) => {
            drop(local);
            if let Err(cleanup) = std::fs::remove_file(local_file) {
                warn!(error = %cleanup, "failed to remove partial copy");
            }
            Err(TransferError::io(local_file, e))
        }
    }
}

//! Getting a planned paper into the output directory.
//!
//! [`TransferEngine`] skips papers whose normalized file name already exists
//! and otherwise delegates to a [`Transfer`] strategy:
//!
//! - [`LocalTransfer`]: HTTP download from this machine
//! - [`RemoteProxyTransfer`]: `wget` on an SSH proxy, then SFTP back

mod engine;
mod error;
mod index;
mod local;
mod plan;
mod remote;

pub use engine::{TransferEngine, TransferMode, TransferOutcome};
pub use error::TransferError;
pub use index::{LocalDirectoryIndex, normalize_name};
pub use local::LocalTransfer;
pub use plan::{DownloadPlan, REMOTE_FILE_PREFIX};
pub use remote::{
    DEFAULT_SSH_PORT, DEFAULT_SSH_TIMEOUT_SECS, ProxySettings, RemoteProxyTransfer,
    remote_download_command, shell_quote,
};

use async_trait::async_trait;

/// A way of fetching the paper described by a [`DownloadPlan`].
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Writes the paper to the plan's local file, returning its size in bytes.
    async fn fetch(&self, plan: &DownloadPlan) -> Result<u64, TransferError>;
}

//! Existence check plus strategy dispatch.

use std::path::{Path, PathBuf};

use tokio::sync::OnceCell;
use tracing::{info, instrument};

use super::{
    DownloadPlan, LocalDirectoryIndex, LocalTransfer, ProxySettings, RemoteProxyTransfer,
    Transfer, TransferError,
};
use crate::download::HttpClient;

/// How papers reach the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferMode {
    /// Download directly from this machine.
    Local,
    /// Download on a proxy host over SSH and copy the file back.
    RemoteProxy(ProxySettings),
}

impl TransferMode {
    /// Whether `proxy_host` designates this machine.
    #[must_use]
    pub fn is_local_host(proxy_host: &str) -> bool {
        proxy_host.trim().eq_ignore_ascii_case("localhost")
    }
}

/// Result of handing a plan to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The paper was written to `path`.
    Downloaded {
        path: PathBuf,
        bytes: u64,
    },
    /// A file with an equivalent name already existed.
    Skipped {
        path: PathBuf,
    },
}

/// Skips papers already on disk and hands the rest to a [`Transfer`].
///
/// The directory index is built on the first call to [`download`] and
/// reused for the rest of the engine's life; files written during the run
/// are not added to it.
///
/// [`download`]: TransferEngine::download
pub struct TransferEngine {
    strategy: Box<dyn Transfer>,
    local_dir: PathBuf,
    index: OnceCell<LocalDirectoryIndex>,
}

impl std::fmt::Debug for TransferEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferEngine")
            .field("strategy", &self.strategy.name())
            .field("local_dir", &self.local_dir)
            .field("index", &self.index.get().map(LocalDirectoryIndex::len))
            .finish()
    }
}

impl TransferEngine {
    /// Builds the engine for `mode`; `client` serves local downloads.
    #[must_use]
    pub fn new(mode: TransferMode, client: HttpClient, local_dir: impl Into<PathBuf>) -> Self {
        let strategy: Box<dyn Transfer> = match mode {
            TransferMode::Local => Box::new(LocalTransfer::new(client)),
            TransferMode::RemoteProxy(settings) => Box::new(RemoteProxyTransfer::new(settings)),
        };
        Self::with_strategy(strategy, local_dir)
    }

    #[must_use]
    pub fn with_strategy(strategy: Box<dyn Transfer>, local_dir: impl Into<PathBuf>) -> Self {
        Self {
            strategy,
            local_dir: local_dir.into(),
            index: OnceCell::new(),
        }
    }

    /// Uses `index` instead of scanning the output directory.
    #[must_use]
    pub fn with_index(self, index: LocalDirectoryIndex) -> Self {
        Self {
            index: OnceCell::new_with(Some(index)),
            ..self
        }
    }

    #[must_use]
    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    /// Whether a file equivalent to the plan's local file already exists.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Io`] if the output directory cannot be listed.
    pub async fn is_already_downloaded(&self, plan: &DownloadPlan) -> Result<bool, TransferError> {
        let index = self
            .index
            .get_or_try_init(|| LocalDirectoryIndex::scan(&self.local_dir))
            .await?;
        Ok(index.contains(plan.local_file_name()))
    }

    /// Downloads the paper unless an equivalent file already exists.
    ///
    /// # Errors
    ///
    /// Returns the strategy's [`TransferError`], or an IO error from
    /// listing the output directory.
    #[instrument(skip(self, plan), fields(strategy = self.strategy.name(), path = %plan.local_file_name().display()))]
    pub async fn download(&self, plan: &DownloadPlan) -> Result<TransferOutcome, TransferError> {
        let path = plan.local_file_name().to_path_buf();
        if self.is_already_downloaded(plan).await? {
            info!(path = %path.display(), "already downloaded; skipping");
            return Ok(TransferOutcome::Skipped { path });
        }

        let bytes = self.strategy.fetch(plan).await?;
        Ok(TransferOutcome::Downloaded { path, bytes })
    }
}

//! Normalized listing of the output directory.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use super::TransferError;

/// Set of normalized file names already present in the output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalDirectoryIndex {
    names: HashSet<String>,
}

impl LocalDirectoryIndex {
    /// Lists the immediate entries of `dir`.
    ///
    /// A missing directory yields an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Io`] if the directory exists but cannot be read.
    pub async fn scan(dir: &Path) -> Result<Self, TransferError> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "output directory missing; empty index");
                return Ok(Self::default());
            }
            Err(e) => return Err(TransferError::io(dir, e)),
        };

        let mut names = HashSet::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| TransferError::io(dir, e))?
        {
            names.insert(normalize_name(&entry.file_name().to_string_lossy()));
        }

        debug!(dir = %dir.display(), entries = names.len(), "indexed output directory");
        Ok(Self { names })
    }

    /// Builds an index from raw file names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| normalize_name(name.as_ref()))
                .collect(),
        }
    }

    /// Whether the file name of `path` matches an indexed entry after
    /// normalization.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.names.contains(&normalize_name(&name.to_string_lossy())))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Drops spaces, hyphens, underscores, colons, dots and slashes, then
/// lowercases ASCII letters.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_' | ':' | '.' | '/'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

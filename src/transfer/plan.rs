//! Download plans: where a paper comes from and where it lands.

use std::path::{Path, PathBuf};

use crate::parser::{Endpoints, PaperReference};
use crate::title::SanitizedTitle;

/// Prefix of every file written on the proxy host.
pub const REMOTE_FILE_PREFIX: &str = "paper_";

/// Source URL and destination names for one paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    download_url: String,
    remote_file_name: String,
    local_file_name: PathBuf,
}

impl DownloadPlan {
    /// Derives the plan for `reference`.
    ///
    /// The local file is `<local_dir>/<title>.pdf`; the remote file is
    /// `<remote_dir>/paper_<hyphenated id>.pdf`.
    #[must_use]
    pub fn new(
        reference: &PaperReference,
        title: &SanitizedTitle,
        local_dir: &Path,
        remote_dir: &str,
        endpoints: &Endpoints,
    ) -> Self {
        let remote_name = format!("{REMOTE_FILE_PREFIX}{}.pdf", reference.hyphenated_id());
        let remote_file_name = if remote_dir.is_empty() {
            remote_name
        } else {
            format!("{}/{remote_name}", remote_dir.trim_end_matches('/'))
        };

        Self {
            download_url: reference.download_url(endpoints),
            remote_file_name,
            local_file_name: local_dir.join(format!("{title}.pdf")),
        }
    }

    #[must_use]
    pub fn download_url(&self) -> &str {
        &self.download_url
    }

    /// Path of the temporary copy on the proxy host.
    #[must_use]
    pub fn remote_file_name(&self) -> &str {
        &self.remote_file_name
    }

    #[must_use]
    pub fn local_file_name(&self) -> &Path {
        &self.local_file_name
    }
}

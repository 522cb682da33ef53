//! Direct HTTP download from this machine.

use async_trait::async_trait;
use tracing::instrument;

use super::{DownloadPlan, Transfer, TransferError};
use crate::download::HttpClient;

/// Streams the PDF straight into the output directory.
#[derive(Debug, Clone)]
pub struct LocalTransfer {
    client: HttpClient,
}

impl LocalTransfer {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transfer for LocalTransfer {
    fn name(&self) -> &'static str {
        "local"
    }

    #[instrument(skip(self, plan), fields(url = %plan.download_url()))]
    async fn fetch(&self, plan: &DownloadPlan) -> Result<u64, TransferError> {
        Ok(self
            .client
            .download_to_path(plan.download_url(), plan.local_file_name())
            .await?)
    }
}

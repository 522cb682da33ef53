//! Sequential batch driver over a newline-separated URL list.
//!
//! Each line goes through the whole pipeline before the next one starts:
//! reference → landing page → title → plan → transfer.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, instrument};

use crate::fetch::{FetchError, LandingPageSource};
use crate::parser::{Endpoints, PaperReference, ParseError};
use crate::title::{TitleError, extract_title};
use crate::transfer::{DownloadPlan, TransferEngine, TransferError, TransferOutcome};

/// Default remote working directory on the proxy host.
pub const DEFAULT_REMOTE_DIR: &str = ".";

/// Splits `text` into trimmed, non-empty lines, preserving order.
#[must_use]
pub fn split_url_list(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// What to do when an item fails before its transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the batch on the first classification, resolution, landing-page
    /// or title failure.
    #[default]
    StopOnError,
    /// Record every failure and continue with the next item.
    KeepGoing,
}

/// Pipeline stage an item failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailureKind {
    Classification,
    IdentifierResolution,
    LandingPage,
    TitleExtraction,
    Transfer,
}

impl FailureKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::IdentifierResolution => "identifier resolution",
            Self::LandingPage => "landing page",
            Self::TitleExtraction => "title extraction",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure of a single item.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Title(#[from] TitleError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl ItemError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Parse(ParseError::Unclassified { .. }) => FailureKind::Classification,
            Self::Parse(ParseError::Unresolvable { .. }) => FailureKind::IdentifierResolution,
            Self::Fetch(_) => FailureKind::LandingPage,
            Self::Title(_) => FailureKind::TitleExtraction,
            Self::Transfer(_) => FailureKind::Transfer,
        }
    }
}

/// A failed item kept in the summary.
#[derive(Debug)]
pub struct ItemFailure {
    pub input: String,
    pub error: ItemError,
}

/// Error that aborts the whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("{} failed for '{input}'; aborting batch", .source.kind())]
    Item {
        input: String,
        #[source]
        source: ItemError,
    },
}

/// Result of processing one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The engine downloaded the paper or found it already present.
    Transferred(TransferOutcome),
    /// Dry run: the plan and whether an equivalent file already exists.
    Planned {
        plan: DownloadPlan,
        already_downloaded: bool,
    },
}

/// Totals for a finished batch.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub planned: Vec<DownloadPlan>,
    pub failures: Vec<ItemFailure>,
}

impl BatchSummary {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of items that reached an outcome, failed ones included.
    #[must_use]
    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.planned.len() + self.failures.len()
    }
}

/// Runs the pipeline for every line of a URL list.
pub struct BatchDriver {
    pages: Arc<dyn LandingPageSource>,
    engine: TransferEngine,
    endpoints: Endpoints,
    remote_dir: String,
    policy: FailurePolicy,
    dry_run: bool,
}

impl fmt::Debug for BatchDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchDriver")
            .field("engine", &self.engine)
            .field("endpoints", &self.endpoints)
            .field("remote_dir", &self.remote_dir)
            .field("policy", &self.policy)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl BatchDriver {
    /// Creates a driver with publisher endpoints, `.` as remote directory and
    /// [`FailurePolicy::StopOnError`].
    #[must_use]
    pub fn new(pages: Arc<dyn LandingPageSource>, engine: TransferEngine) -> Self {
        Self {
            pages,
            engine,
            endpoints: Endpoints::default(),
            remote_dir: DEFAULT_REMOTE_DIR.to_string(),
            policy: FailurePolicy::default(),
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    #[must_use]
    pub fn with_remote_dir(mut self, remote_dir: impl Into<String>) -> Self {
        self.remote_dir = remote_dir.into();
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Processes every non-blank line of `text` in order.
    ///
    /// Transfer failures are recorded and never abort the batch; other
    /// failures abort it unless the policy is [`FailurePolicy::KeepGoing`].
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Item`] for the first non-transfer failure under
    /// [`FailurePolicy::StopOnError`].
    #[instrument(skip(self, text), fields(policy = ?self.policy, dry_run = self.dry_run))]
    pub async fn run(&self, text: &str) -> Result<BatchSummary, BatchError> {
        let inputs = split_url_list(text);
        info!(items = inputs.len(), "starting batch");

        let mut summary = BatchSummary::default();
        for input in inputs {
            match self.process(input).await {
                Ok(ItemOutcome::Transferred(TransferOutcome::Downloaded { .. })) => {
                    summary.downloaded += 1;
                }
                Ok(ItemOutcome::Transferred(TransferOutcome::Skipped { .. })) => {
                    summary.skipped += 1;
                }
                Ok(ItemOutcome::Planned { plan, .. }) => summary.planned.push(plan),
                Err(error) => {
                    let kind = error.kind();
                    if kind != FailureKind::Transfer && self.policy == FailurePolicy::StopOnError {
                        return Err(BatchError::Item {
                            input: input.to_string(),
                            source: error,
                        });
                    }
                    error!(input, kind = %kind, error = %error, "item failed");
                    summary.failures.push(ItemFailure {
                        input: input.to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            planned = summary.planned.len(),
            failed = summary.failures.len(),
            "batch complete"
        );
        Ok(summary)
    }

    /// Runs the pipeline for a single input line.
    ///
    /// # Errors
    ///
    /// Returns the [`ItemError`] of the first stage that failed.
    #[instrument(skip(self))]
    pub async fn process(&self, input: &str) -> Result<ItemOutcome, ItemError> {
        let reference = PaperReference::parse(input)?;
        info!(reference = %reference, "resolved reference");

        let landing_url = reference.landing_url(&self.endpoints);
        let html = self.pages.fetch_page(&landing_url).await?;
        let title = extract_title(&html, reference.publisher().title_selector())?;

        let plan = DownloadPlan::new(
            &reference,
            &title,
            self.engine.local_dir(),
            &self.remote_dir,
            &self.endpoints,
        );

        if self.dry_run {
            let already_downloaded = self.engine.is_already_downloaded(&plan).await?;
            info!(
                url = %plan.download_url(),
                path = %plan.local_file_name().display(),
                remote = %plan.remote_file_name(),
                already_downloaded,
                "planned download"
            );
            return Ok(ItemOutcome::Planned {
                plan,
                already_downloaded,
            });
        }

        let outcome = self.engine.download(&plan).await?;
        if matches!(outcome, TransferOutcome::Downloaded { .. }) {
            info!(path = %plan.local_file_name().display(), "downloaded");
        }
        Ok(ItemOutcome::Transferred(outcome))
    }
}

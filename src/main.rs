//! CLI entry point for paperfetch.

use std::process::ExitCode;

use anyhow::Result;

mod app;
mod app_config;
mod cli;

/// Process outcome mapped to the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    /// At least one item failed without aborting the batch.
    Failure,
}

impl ProcessExit {
    fn exit_code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::Failure => ExitCode::from(1),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let outcome = app::runtime::run_paperfetch().await?;
    Ok(outcome.exit_code())
}

use std::fs;
use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};
use paperfetch_core::{
    BatchDriver, BatchSummary, HttpClient, HttpLandingPages, TransferEngine, TransferMode,
};
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::{config_runtime, input};
use crate::app_config;

pub(crate) async fn run_paperfetch() -> Result<ProcessExit> {
    let (cli, cli_sources) = config_runtime::parse_cli_with_sources();

    let loaded = app_config::load_default_file_config()?;
    let settings = config_runtime::apply_config_defaults(cli, &cli_sources, loaded.config.as_ref());

    let default_level = config_runtime::resolve_default_log_level(&settings);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    init_tracing(default_level, force_cli_log_level);

    if let Some(path) = loaded.path.as_deref() {
        debug!(path = %path.display(), "Loaded config file");
    }
    debug!(?settings, "Settings resolved");

    let Some(input_text) = input::collect_input(&settings)? else {
        info!("No input provided. Pass URLs as arguments, use --input, or pipe them via stdin.");
        info!("Example: echo 'https://ieeexplore.ieee.org/document/4764139' | paperfetch");
        return Ok(ProcessExit::Success);
    };

    let mode = config_runtime::resolve_transfer_mode(&settings, std::env::var("USER").ok())?;
    match &mode {
        TransferMode::Local => info!("Downloading directly"),
        TransferMode::RemoteProxy(proxy) => {
            info!(host = %proxy.host, user = %proxy.user, port = proxy.port, "Downloading through proxy host");
        }
    }

    if !settings.dry_run && !settings.output_dir.exists() {
        fs::create_dir_all(&settings.output_dir).with_context(|| {
            format!(
                "Failed to create output directory '{}'",
                settings.output_dir.display()
            )
        })?;
        info!(dir = %settings.output_dir.display(), "Created output directory");
    }

    let timeouts = settings.http_timeouts;
    let pages = HttpLandingPages::with_timeouts(
        timeouts.landing_connect_secs,
        timeouts.landing_read_secs,
    )?;
    let client =
        HttpClient::new_with_timeouts(timeouts.download_connect_secs, timeouts.download_read_secs)?;
    let engine = TransferEngine::new(mode, client, settings.output_dir.clone());

    let driver = BatchDriver::new(Arc::new(pages), engine)
        .with_remote_dir(settings.remote_dir.clone())
        .with_policy(settings.failure_policy())
        .with_dry_run(settings.dry_run);

    let summary = driver.run(&input_text).await?;

    if settings.dry_run {
        print_dry_run_preview(&summary);
    }

    for failure in &summary.failures {
        warn!(input = %failure.input, kind = %failure.error.kind(), error = %failure.error, "Item failed");
    }

    Ok(determine_exit_outcome(&summary))
}

fn init_tracing(default_level: &str, force_cli_level: bool) {
    let filter = if force_cli_level {
        tracing_subscriber::EnvFilter::new(default_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_env_filter(filter)
        .try_init();
}

fn print_dry_run_preview(summary: &BatchSummary) {
    println!(
        "Dry run preview: {} planned download(s), {} failed.",
        summary.planned.len(),
        summary.failures.len()
    );
    for plan in &summary.planned {
        println!(
            "- {} -> {} (remote {})",
            plan.download_url(),
            plan.local_file_name().display(),
            plan.remote_file_name()
        );
    }
    println!("Dry run - no files downloaded");
}

/// Any recorded failure, transfer or otherwise, yields a failing exit.
fn determine_exit_outcome(summary: &BatchSummary) -> ProcessExit {
    if summary.has_failures() {
        ProcessExit::Failure
    } else {
        ProcessExit::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperfetch_core::{ItemFailure, ParseError};

    #[test]
    fn test_exit_outcome_success_when_no_failures() {
        let summary = BatchSummary {
            downloaded: 2,
            skipped: 1,
            ..BatchSummary::default()
        };
        assert_eq!(determine_exit_outcome(&summary), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_success_for_empty_batch() {
        assert_eq!(
            determine_exit_outcome(&BatchSummary::default()),
            ProcessExit::Success
        );
    }

    #[test]
    fn test_exit_outcome_failure_when_any_item_failed() {
        let summary = BatchSummary {
            downloaded: 3,
            failures: vec![ItemFailure {
                input: "not a paper".to_string(),
                error: ParseError::unclassified("not a paper").into(),
            }],
            ..BatchSummary::default()
        };
        assert_eq!(determine_exit_outcome(&summary), ProcessExit::Failure);
    }
}

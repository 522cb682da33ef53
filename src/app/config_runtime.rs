use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use paperfetch_core::batch::DEFAULT_REMOTE_DIR;
use paperfetch_core::transfer::{DEFAULT_SSH_PORT, DEFAULT_SSH_TIMEOUT_SECS};
use paperfetch_core::{FailurePolicy, ProxySettings, TransferMode, download, fetch};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::Args;

pub(crate) const DEFAULT_OUTPUT_DIR: &str = "local_dir";

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HttpTimeoutSettings {
    pub(crate) download_connect_secs: u64,
    pub(crate) download_read_secs: u64,
    pub(crate) landing_connect_secs: u64,
    pub(crate) landing_read_secs: u64,
}

impl Default for HttpTimeoutSettings {
    fn default() -> Self {
        Self {
            download_connect_secs: download::CONNECT_TIMEOUT_SECS,
            download_read_secs: download::READ_TIMEOUT_SECS,
            landing_connect_secs: fetch::CONNECT_TIMEOUT_SECS,
            landing_read_secs: fetch::READ_TIMEOUT_SECS,
        }
    }
}

/// Effective settings after merging the config file under the command line.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub(crate) urls: Vec<String>,
    pub(crate) input: Option<PathBuf>,
    pub(crate) urls_file: Option<PathBuf>,
    pub(crate) output_dir: PathBuf,
    pub(crate) proxy_host: Option<String>,
    pub(crate) remote_user: Option<String>,
    pub(crate) remote_port: u16,
    pub(crate) key_file: Option<PathBuf>,
    pub(crate) remote_dir: String,
    pub(crate) keep_going: bool,
    pub(crate) dry_run: bool,
    pub(crate) verbose: u8,
    pub(crate) quiet: bool,
    pub(crate) debug: bool,
    pub(crate) http_timeouts: HttpTimeoutSettings,
    pub(crate) ssh_timeout_secs: u64,
}

impl RunSettings {
    pub(crate) fn failure_policy(&self) -> FailurePolicy {
        if self.keep_going {
            FailurePolicy::KeepGoing
        } else {
            FailurePolicy::StopOnError
        }
    }
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let command = Args::command();
    let matches = command.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    (args, sources_from_matches(&matches))
}

fn sources_from_matches(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        verbose: is_commandline_value(matches, "verbose"),
        quiet: is_commandline_value(matches, "quiet"),
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

pub(crate) fn apply_config_defaults(
    args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> RunSettings {
    let file = file_config.cloned().unwrap_or_default();

    let mut settings = RunSettings {
        urls: args.urls,
        input: args.input,
        urls_file: file.urls_file,
        output_dir: args
            .output_dir
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        proxy_host: args.proxy_host.or(file.proxy_host),
        remote_user: args.remote_user.or(file.remote_user),
        remote_port: args
            .remote_port
            .or(file.remote_port)
            .unwrap_or(DEFAULT_SSH_PORT),
        key_file: args.key_file.or(file.key_file),
        remote_dir: args
            .remote_dir
            .or(file.remote_dir)
            .unwrap_or_else(|| DEFAULT_REMOTE_DIR.to_string()),
        keep_going: args.keep_going || file.keep_going.unwrap_or(false),
        dry_run: args.dry_run,
        verbose: args.verbose,
        quiet: args.quiet,
        debug: false,
        http_timeouts: resolve_http_timeouts(file_config),
        ssh_timeout_secs: file.ssh_timeout_secs.unwrap_or(DEFAULT_SSH_TIMEOUT_SECS),
    };

    if !cli_sources.verbose
        && !cli_sources.quiet
        && let Some(verbosity) = file.verbosity
    {
        apply_config_verbosity(&mut settings, verbosity);
    }

    settings
}

fn apply_config_verbosity(settings: &mut RunSettings, verbosity: VerbositySetting) {
    let (verbose, quiet, debug) = match verbosity {
        VerbositySetting::Default => (0, false, false),
        VerbositySetting::Verbose => (1, false, false),
        VerbositySetting::Quiet => (0, true, false),
        VerbositySetting::Debug => (0, false, true),
    };
    settings.verbose = verbose;
    settings.quiet = quiet;
    settings.debug = debug;
}

pub(crate) fn resolve_http_timeouts(file_config: Option<&FileConfig>) -> HttpTimeoutSettings {
    let mut settings = HttpTimeoutSettings::default();
    let Some(file_config) = file_config else {
        return settings;
    };

    if let Some(value) = file_config.http_connect_timeout_secs {
        settings.download_connect_secs = value;
        settings.landing_connect_secs = value;
    }
    if let Some(value) = file_config.http_read_timeout_secs {
        settings.download_read_secs = value;
        settings.landing_read_secs = value;
    }
    settings
}

pub(crate) fn resolve_default_log_level(settings: &RunSettings) -> &'static str {
    if settings.quiet {
        "error"
    } else if settings.debug {
        "trace"
    } else {
        match settings.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}

/// Picks local or proxy mode; `fallback_user` is used when no remote user is
/// configured.
pub(crate) fn resolve_transfer_mode(
    settings: &RunSettings,
    fallback_user: Option<String>,
) -> Result<TransferMode> {
    let Some(host) = settings
        .proxy_host
        .as_deref()
        .filter(|host| !TransferMode::is_local_host(host))
    else {
        return Ok(TransferMode::Local);
    };

    let Some(user) = settings
        .remote_user
        .clone()
        .or(fallback_user)
        .filter(|user| !user.is_empty())
    else {
        bail!(
            "No SSH user for proxy host '{host}'.\n  Suggestion: Pass --remote-user or set `remote_user` in the config file"
        );
    };

    Ok(TransferMode::RemoteProxy(
        ProxySettings::new(host.trim(), user)
            .with_port(settings.remote_port)
            .with_key_file(settings.key_file.clone())
            .with_timeout(Duration::from_secs(settings.ssh_timeout_secs)),
    ))
}

//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download IEEE Xplore and ACM Digital Library papers by title.
///
/// Accepts paper URLs, IEEE article numbers and ACM DOIs, one per line, and
/// saves each paper as `<output dir>/<title>.pdf`, either directly or through
/// a proxy host reachable over SSH.
#[derive(Parser, Debug, Clone)]
#[command(name = "paperfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Paper URLs, IEEE article numbers or ACM DOIs
    pub urls: Vec<String>,

    /// Read the newline-separated URL list from a file
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Local output directory [default: local_dir]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Proxy host to download through; "localhost" downloads directly
    #[arg(long, value_name = "HOST")]
    pub proxy_host: Option<String>,

    /// SSH user on the proxy host [default: $USER]
    #[arg(long, value_name = "USER")]
    pub remote_user: Option<String>,

    /// SSH port on the proxy host [default: 22]
    #[arg(long, value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub remote_port: Option<u16>,

    /// SSH private key; ssh-agent is used when absent
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<PathBuf>,

    /// Working directory on the proxy host [default: .]
    #[arg(long, value_name = "DIR")]
    pub remote_dir: Option<String>,

    /// Record failures per item and continue instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Resolve titles and plan downloads without transferring anything
    #[arg(long)]
    pub dry_run: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

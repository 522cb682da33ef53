//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// TOML-backed file configuration for paperfetch defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default output directory for downloaded papers.
    pub output_dir: Option<PathBuf>,
    /// Proxy host; `"localhost"` selects local mode.
    pub proxy_host: Option<String>,
    /// SSH user on the proxy host.
    pub remote_user: Option<String>,
    /// SSH port on the proxy host.
    pub remote_port: Option<u16>,
    /// SSH private key file.
    pub key_file: Option<PathBuf>,
    /// Working directory on the proxy host.
    pub remote_dir: Option<String>,
    /// URL list used when no input is given on the command line or stdin.
    pub urls_file: Option<PathBuf>,
    /// Isolate failures per item instead of aborting the batch.
    pub keep_going: Option<bool>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
    /// HTTP connect timeout in seconds, for landing pages and downloads.
    pub http_connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds, for landing pages and downloads.
    pub http_read_timeout_secs: Option<u64>,
    /// SSH session timeout in seconds.
    pub ssh_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(port) = self.remote_port
            && port == 0
        {
            bail!("Invalid config value for `remote_port`: {port}. Expected range: 1..=65535");
        }
        if let Some(host) = &self.proxy_host
            && host.trim().is_empty()
        {
            bail!("Invalid config value for `proxy_host`: expected a host name");
        }
        validate_timeout_secs("http_connect_timeout_secs", self.http_connect_timeout_secs)?;
        validate_timeout_secs("http_read_timeout_secs", self.http_read_timeout_secs)?;
        validate_timeout_secs("ssh_timeout_secs", self.ssh_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/paperfetch/config.toml`
/// 2. `$HOME/.config/paperfetch/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("paperfetch")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("paperfetch")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "proxy_host" => {
                cfg.proxy_host = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "remote_user" => {
                cfg.remote_user = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "remote_port" => {
                let parsed = parse_integer_u64(value).with_context(invalid)?;
                let port = u16::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("remote_port out of range for u16"))
                    .with_context(invalid)?;
                cfg.remote_port = Some(port);
            }
            "key_file" => {
                cfg.key_file = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "remote_dir" => {
                cfg.remote_dir = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "urls_file" => {
                cfg.urls_file = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "keep_going" => {
                cfg.keep_going = Some(parse_boolean(value).with_context(invalid)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            "http_connect_timeout_secs" => {
                cfg.http_connect_timeout_secs =
                    Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "http_read_timeout_secs" => {
                cfg.http_read_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "ssh_timeout_secs" => {
                cfg.ssh_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
# proxy through the lab machine
output_dir = "papers"
proxy_host = "lab.example.edu"
remote_user = "alice"
remote_port = 2222
key_file = "/home/alice/.ssh/id_ed25519"
remote_dir = "/tmp"
urls_file = "urls.txt"
keep_going = true
verbosity = "verbose"
http_connect_timeout_secs = 15
http_read_timeout_secs = 120
ssh_timeout_secs = 60
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.output_dir, Some(PathBuf::from("papers")));
        assert_eq!(cfg.proxy_host.as_deref(), Some("lab.example.edu"));
        assert_eq!(cfg.remote_user.as_deref(), Some("alice"));
        assert_eq!(cfg.remote_port, Some(2222));
        assert_eq!(cfg.key_file, Some(PathBuf::from("/home/alice/.ssh/id_ed25519")));
        assert_eq!(cfg.remote_dir.as_deref(), Some("/tmp"));
        assert_eq!(cfg.urls_file, Some(PathBuf::from("urls.txt")));
        assert_eq!(cfg.keep_going, Some(true));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert_eq!(cfg.http_connect_timeout_secs, Some(15));
        assert_eq!(cfg.http_read_timeout_secs, Some(120));
        assert_eq!(cfg.ssh_timeout_secs, Some(60));
    }

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(r#"proxy_host = "localhost""#).expect("partial config should parse");
        assert_eq!(cfg.proxy_host.as_deref(), Some("localhost"));
        assert!(cfg.output_dir.is_none());
        assert!(cfg.keep_going.is_none());
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
remote_dir = "/scratch/#papers" # hash inside quotes is kept
verbosity = "quiet" # preferred noise level
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.remote_dir.as_deref(), Some("/scratch/#papers"));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Quiet));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("concurrency = 4").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("keep_going").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err = parse_config_str("ssh_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("ssh_timeout_secs"));
        let err = parse_config_str("http_read_timeout_secs = 3601")
            .expect_err("invalid timeout expected");
        assert!(err.to_string().contains("http_read_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_out_of_range_port() {
        let err = parse_config_str("remote_port = 70000").expect_err("port out of range");
        assert!(err.to_string().contains("remote_port"));
        let err = parse_config_str("remote_port = 0").expect_err("port zero");
        assert!(err.to_string().contains("remote_port"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("proxy_host = lab").expect_err("unquoted string");
        assert!(err.to_string().contains("proxy_host"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_boolean() {
        let err = parse_config_str("keep_going = yes").expect_err("invalid boolean expected");
        assert!(err.to_string().contains("keep_going"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_verbosity() {
        let err = parse_config_str(r#"verbosity = "loud""#).expect_err("invalid verbosity");
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_load_file_config_reports_path() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "bogus = 1\n").expect("write config");
        let err = load_file_config(&path).expect_err("bad config");
        assert!(err.to_string().contains("config.toml"));
    }
}

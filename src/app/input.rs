//! Assembly of the URL list from arguments, files and stdin.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

use anyhow::{Context, Result};

use crate::app::config_runtime::RunSettings;

/// Returns the URL list text, or `None` when no source supplied anything.
///
/// Priority: positional URLs, `--input`, piped stdin, then `urls_file` from
/// the config file.
pub(crate) fn collect_input(settings: &RunSettings) -> Result<Option<String>> {
    let stdin = io::stdin();
    let piped = if settings.urls.is_empty() && settings.input.is_none() && !stdin.is_terminal() {
        let mut buffer = String::new();
        stdin
            .lock()
            .read_to_string(&mut buffer)
            .context("Failed to read URL list from stdin")?;
        Some(buffer)
    } else {
        None
    };
    select_input(settings, piped)
}

fn select_input(settings: &RunSettings, piped: Option<String>) -> Result<Option<String>> {
    if !settings.urls.is_empty() {
        return Ok(Some(settings.urls.join("\n")));
    }
    if let Some(path) = &settings.input {
        return read_list_file(path).map(Some);
    }
    if let Some(text) = piped.filter(|text| !text.trim().is_empty()) {
        return Ok(Some(text));
    }
    settings.urls_file.as_deref().map(read_list_file).transpose()
}

fn read_list_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL list '{}'", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::app::config_runtime::{CliValueSources, apply_config_defaults};
    use crate::cli::Args;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn settings(argv: &[&str], urls_file: Option<PathBuf>) -> RunSettings {
        let mut settings = apply_config_defaults(
            Args::try_parse_from(argv).unwrap(),
            &CliValueSources::default(),
            None,
        );
        settings.urls_file = urls_file;
        settings
    }

    #[test]
    fn test_positional_urls_win() {
        let s = settings(&["paperfetch", "1", "2", "--input", "ignored.txt"], None);
        let text = select_input(&s, Some("3".to_string())).unwrap();
        assert_eq!(text.as_deref(), Some("1\n2"));
    }

    #[test]
    fn test_input_file_before_stdin() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("urls.txt");
        fs::write(&list, "4764139\n").unwrap();
        let s = settings(&["paperfetch", "--input", list.to_str().unwrap()], None);
        let text = select_input(&s, Some("piped".to_string())).unwrap();
        assert_eq!(text.as_deref(), Some("4764139\n"));
    }

    #[test]
    fn test_blank_stdin_falls_back_to_config_urls_file() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("urls.txt");
        fs::write(&list, "10.1145/368453.368641").unwrap();
        let s = settings(&["paperfetch"], Some(list));
        let text = select_input(&s, Some(" \n".to_string())).unwrap();
        assert_eq!(text.as_deref(), Some("10.1145/368453.368641"));
    }

    #[test]
    fn test_no_source_yields_none() {
        let s = settings(&["paperfetch"], None);
        assert!(select_input(&s, None).unwrap().is_none());
    }

    #[test]
    fn test_missing_input_file_is_error() {
        let s = settings(&["paperfetch", "--input", "/nonexistent/urls.txt"], None);
        let err = select_input(&s, None).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/urls.txt"));
    }
}

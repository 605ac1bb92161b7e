//! # Scan Command
//!
//! Submits code to the scanning service and renders the result.
//!
//! ## Usage
//!
//! ```bash
//! # Scan a snippet
//! vibeguard scan --code "eval(input())"
//!
//! # Scan a file's contents as a snippet (stdin with -)
//! vibeguard scan --code-file app.py
//!
//! # Scan directories and files as a repository upload
//! vibeguard scan ./my-project
//!
//! # Scan a picked file list (one relative path per line)
//! git ls-files | vibeguard scan --files-from -
//! ```

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ScanService;
use crate::archive::{ArchiveError, FsEntry};
use crate::errors::{display_archive_error, display_error, display_warning};
use crate::exit_codes::*;
use crate::models::ScanResult;
use crate::output::{OutputFormat, render_json, render_result, score_band};
use crate::session::{Phase, PipelineError, Resolution, ScanRequest, SessionStore};

use super::{open_store, report};

/// Where the code to scan comes from
#[derive(Debug, Clone)]
pub enum ScanSource {
    /// Inline code
    Code(String),
    /// A file whose contents are scanned as a snippet (`-` for stdin)
    CodeFile(PathBuf),
    /// Dropped files and directories
    Paths(Vec<PathBuf>),
    /// A list of relative file paths, one per line (`-` for stdin)
    FilesFrom(PathBuf),
}

/// Arguments for the scan command
#[derive(Debug)]
pub struct ScanArgs {
    pub source: ScanSource,
    pub language: String,
    pub output: OutputFormat,
    /// Fail when the score is below this threshold
    pub fail_under: Option<u8>,
}

/// Execute the scan command
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Scan completed with no issues (or above `--fail-under`)
/// * `Ok(EXIT_FINDINGS_FOUND)` - Issues found, or score below `--fail-under`
/// * `Ok(EXIT_CONFIG_ERROR)` - Configuration error
/// * `Ok(EXIT_INVALID_INPUT)` - Nothing valid to scan
/// * `Ok(EXIT_ARCHIVE_ERROR)` - The inputs could not be archived
/// * `Ok(EXIT_NETWORK_ERROR)` / `Ok(EXIT_SERVER_ERROR)` - The service call failed
pub async fn execute(args: ScanArgs) -> Result<i32> {
    let Some(store) = open_store() else {
        return Ok(EXIT_CONFIG_ERROR);
    };

    let request = match build_request(&args).await {
        Ok(request) => request,
        Err(InputError::Archive(e)) => {
            display_archive_error(&e);
            return Ok(EXIT_ARCHIVE_ERROR);
        }
        Err(InputError::Other(e)) => {
            display_error(&format!("{e:#}"));
            return Ok(EXIT_INVALID_INPUT);
        }
    };

    let outcome = submit_with_progress(&store, request, args.output).await;

    match outcome {
        Ok(Resolution::Applied(result)) => {
            match args.output {
                OutputFormat::Json => render_json(&result)?,
                OutputFormat::Text => render_result(&result),
            }
            if result.id.is_none() {
                display_warning("The service returned no scan id; this result is not in history");
            }
            Ok(exit_code_for(&result, args.fail_under))
        }
        Ok(Resolution::Stale) => {
            display_error("Scan was superseded before it completed");
            Ok(EXIT_ERROR)
        }
        Err(e) => Ok(report(&e)),
    }
}

/// Decide the exit code of a completed scan.
fn exit_code_for(result: &ScanResult, fail_under: Option<u8>) -> i32 {
    match fail_under {
        Some(threshold) if result.score < threshold => {
            eprintln!(
                "{} Score {} ({}) is below the required {}",
                "✗".red().bold(),
                result.score,
                score_band(result.score),
                threshold
            );
            EXIT_FINDINGS_FOUND
        }
        Some(_) => EXIT_SUCCESS,
        None if result.issues.is_empty() => EXIT_SUCCESS,
        None => EXIT_FINDINGS_FOUND,
    }
}

enum InputError {
    Archive(ArchiveError),
    Other(anyhow::Error),
}

impl From<anyhow::Error> for InputError {
    fn from(err: anyhow::Error) -> Self {
        InputError::Other(err)
    }
}

async fn build_request(args: &ScanArgs) -> Result<ScanRequest, InputError> {
    let language = args.language.clone();
    match &args.source {
        ScanSource::Code(code) => Ok(ScanRequest::snippet(code.clone(), language)),
        ScanSource::CodeFile(path) => {
            let code = read_input(path)?;
            Ok(ScanRequest::snippet(code, language))
        }
        ScanSource::Paths(paths) => {
            let mut entries = Vec::with_capacity(paths.len());
            for path in paths {
                let entry = FsEntry::open(path)
                    .await
                    .map_err(|source| read_failure(path, source))?;
                entries.push(entry);
            }
            Ok(ScanRequest::tree(entries, language))
        }
        ScanSource::FilesFrom(list) => {
            let listing = read_input(list)?;
            let mut entries = Vec::new();
            for line in listing.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let entry = FsEntry::picked(line, line)
                    .await
                    .map_err(|source| read_failure(Path::new(line), source))?;
                entries.push(entry);
            }
            Ok(ScanRequest::tree(entries, language))
        }
    }
}

fn read_failure(path: &Path, source: std::io::Error) -> InputError {
    InputError::Archive(ArchiveError::ReadFailure {
        path: path.display().to_string(),
        source,
    })
}

/// Read a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Run a submission while a spinner mirrors the session phase.
async fn submit_with_progress<S: ScanService>(
    store: &SessionStore<S>,
    request: ScanRequest,
    output: OutputFormat,
) -> Result<Resolution<ScanResult>, PipelineError> {
    let pb = match output {
        OutputFormat::Text => ProgressBar::new_spinner(),
        OutputFormat::Json => ProgressBar::hidden(),
    };
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let submission = store.submit_new(request);
    tokio::pin!(submission);
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    let outcome = loop {
        tokio::select! {
            outcome = &mut submission => break outcome,
            _ = ticker.tick() => {
                if let Some(message) = phase_message(&store.phase()) {
                    pb.set_message(message);
                }
            }
        }
    };

    pb.finish_and_clear();
    outcome
}

fn phase_message(phase: &Phase) -> Option<&'static str> {
    match phase {
        Phase::Building => Some("Building archive..."),
        Phase::Submitting => Some("Scanning..."),
        Phase::Idle | Phase::Error(_) => None,
    }
}

//! # Scan Models
//!
//! Domain types shared by the API layer, the session store and the output
//! renderer. Wire formats live in [`crate::api::scans`]; everything here is
//! already normalized.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Identifier of a scan, as assigned by the scanning service.
///
/// The client never generates these; a result without one is un-trackable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ScanId(String);

impl ScanId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can name a stored scan: not blank, and not a `.` or
    /// `..` path segment.
    pub fn is_addressable(&self) -> bool {
        let id = self.0.trim();
        !id.is_empty() && id != "." && id != ".."
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScanId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ScanId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Severity of a reported issue, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl From<&str> for Severity {
    /// Unknown values fall back to `Medium`, matching the service's storage default.
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => Severity::Low,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Medium,
        }
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// What kind of artifact a scan was run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScanKind {
    #[serde(rename = "snippet")]
    Snippet,
    #[serde(rename = "repo")]
    Archive,
}

impl From<&str> for ScanKind {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "repo" | "archive" => ScanKind::Archive,
            _ => ScanKind::Snippet,
        }
    }
}

impl ScanKind {
    /// Short label used in history rows.
    pub fn label(&self) -> &'static str {
        match self {
            ScanKind::Snippet => "Snippet Scan",
            ScanKind::Archive => "Repo Scan",
        }
    }
}

/// A single issue attached to a scan result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub how_to_fix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_code_snippet: Option<String>,
    /// File the issue was found in (archive scans only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// A complete, normalized scan result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// `None` when the service did not return an id
    pub id: Option<ScanId>,
    /// Security score in `0..=100`
    pub score: u8,
    pub summary: String,
    pub issues: Vec<Issue>,
    pub scan_type: ScanKind,
    pub language: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl ScanResult {
    /// Count issues per severity, most severe first.
    pub fn severity_counts(&self) -> [(Severity, usize); 4] {
        let mut counts = [
            (Severity::Critical, 0),
            (Severity::High, 0),
            (Severity::Medium, 0),
            (Severity::Low, 0),
        ];
        for issue in &self.issues {
            if let Some(slot) = counts.iter_mut().find(|(s, _)| *s == issue.severity) {
                slot.1 += 1;
            }
        }
        counts
    }

    /// Issues sorted most severe first, keeping service order within a severity.
    pub fn issues_by_severity(&self) -> Vec<&Issue> {
        let mut issues: Vec<&Issue> = self.issues.iter().collect();
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));
        issues
    }
}

/// History row: the subset of a result needed to list past scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub id: ScanId,
    pub score: u8,
    pub scan_type: ScanKind,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Clamp a raw score into `0..=100`. Missing scores count as 0.
pub fn clamp_score(raw: Option<f64>) -> u8 {
    match raw {
        Some(score) if score.is_finite() => score.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

/// Parse a service timestamp.
///
/// Accepts RFC 3339 (what the service writes) and naive ISO timestamps,
/// which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

//! # Output Rendering
//!
//! Terminal rendering of scan results and history, plus JSON output.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::models::{Issue, ScanId, ScanResult, ScanSummary, Severity};

/// Max width for terminal output (80 chars standard)
const MAX_WIDTH: usize = 80;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Rubric band for a score.
pub fn score_band(score: u8) -> &'static str {
    match score {
        95.. => "Excellent",
        80..=94 => "Good",
        60..=79 => "Needs Work",
        30..=59 => "Vulnerable",
        _ => "Critical",
    }
}

pub fn colorize_score(score: u8, text: &str) -> ColoredString {
    if score >= 80 {
        text.green()
    } else if score >= 50 {
        text.yellow()
    } else {
        text.red()
    }
}

/// Relative time for history rows: "Just now", "5m ago", "3h ago", "2d ago",
/// then a short date such as "Jan 5".
pub fn format_timestamp(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created_at) = created_at else {
        return "-".to_string();
    };
    let elapsed = now.signed_duration_since(created_at);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = elapsed.num_days();
    if days < 7 {
        return format!("{days}d ago");
    }
    created_at.format("%b %-d").to_string()
}

/// One-line severity breakdown, e.g. `1 critical · 2 low`.
pub fn format_severity_breakdown(result: &ScanResult) -> String {
    let parts: Vec<String> = result
        .severity_counts()
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(severity, count)| {
            let count = count.to_string();
            let count = match severity {
                Severity::Critical | Severity::High => count.bright_red(),
                Severity::Medium => count.bright_yellow(),
                Severity::Low => count.bright_blue(),
            };
            format!("{} {}", count, severity.as_str().to_lowercase())
        })
        .collect();

    if parts.is_empty() {
        "no issues".into()
    } else {
        parts.join(&format!(" {} ", "·".dimmed()))
    }
}

/// Wrap text to fit within max_width, continuing on the next line with the given indent.
fn wrap_text(s: &str, first_line_max: usize, continuation_indent: &str) -> Vec<String> {
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.is_empty() {
        return vec![String::new()];
    }

    let cont_max = MAX_WIDTH.saturating_sub(continuation_indent.len()).max(1);
    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_max = first_line_max.max(1);

    for word in words {
        let fits = if current_line.is_empty() {
            word.chars().count() <= current_max
        } else {
            current_line.chars().count() + 1 + word.chars().count() <= current_max
        };

        if !fits && !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
            current_max = cont_max;
        }

        if current_line.is_empty() {
            current_line = word.to_string();
        } else {
            current_line.push(' ');
            current_line.push_str(word);
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }
    lines
}

fn print_wrapped(label: &str, text: &str) {
    let indent = "     ";
    let prefix = format!("   {label} ");
    let first_max = MAX_WIDTH.saturating_sub(prefix.len());
    for (i, line) in wrap_text(text, first_max, indent).iter().enumerate() {
        if i == 0 {
            println!("   {} {}", label.dimmed(), line);
        } else {
            println!("{indent}{line}");
        }
    }
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::High => "🟠",
        Severity::Medium => "🟡",
        Severity::Low => "🔵",
    }
}

fn display_issue(issue: &Issue) {
    let severity = match issue.severity {
        Severity::Critical | Severity::High => issue.severity.as_str().red(),
        Severity::Medium => issue.severity.as_str().yellow(),
        Severity::Low => issue.severity.as_str().blue(),
    };
    println!(
        "{} {} [{}]",
        severity_icon(issue.severity),
        issue.title.bold(),
        severity
    );
    if let Some(file) = &issue.file {
        println!("   File: {}", file.cyan());
    }
    if !issue.description.is_empty() {
        print_wrapped("Why:", &issue.description);
    }
    if !issue.how_to_fix.is_empty() {
        print_wrapped("Fix:", &issue.how_to_fix);
    }
    if let Some(snippet) = &issue.fixed_code_snippet {
        println!();
        println!("   {}", "Suggested code:".green().bold());
        for line in snippet.lines() {
            println!("   {}", line.green());
        }
    }
    println!();
}

/// Print a full scan result.
pub fn render_result(result: &ScanResult) {
    let score = format!("{}/100", result.score);
    println!(
        "{} {} {} {}",
        "→".cyan().bold(),
        result.scan_type.label().bright_white(),
        colorize_score(result.score, &score).bold(),
        format!("({})", score_band(result.score)).dimmed()
    );
    let id = result
        .id
        .as_ref()
        .map(ScanId::as_str)
        .unwrap_or("(not saved)");
    println!("  {}: {}", "Scan".dimmed(), id);
    println!("  {}: {}", "Language".dimmed(), result.language.cyan());
    println!("  {}: {}", "Issues".dimmed(), format_severity_breakdown(result));
    println!();
    for line in wrap_text(&result.summary, MAX_WIDTH - 2, "  ") {
        println!("  {line}");
    }
    println!();

    for issue in result.issues_by_severity() {
        display_issue(issue);
    }
}

/// Print history rows, marking the active scan.
pub fn render_history(rows: &[ScanSummary], active: Option<&ScanId>, now: DateTime<Utc>) {
    if rows.is_empty() {
        println!("{}", "No scans yet.".dimmed());
        return;
    }

    for row in rows {
        let marker = if active == Some(&row.id) { "▸" } else { " " };
        let score = format!("{:>3}", row.score);
        println!(
            "{} {} {:<12} {:<10} {:>9}  {}",
            marker.cyan(),
            colorize_score(row.score, &score).bold(),
            row.scan_type.label(),
            row.language,
            format_timestamp(row.created_at, now).dimmed(),
            row.id.as_str().dimmed()
        );
    }
}

/// Print any serializable value as pretty JSON.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

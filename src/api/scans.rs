//! # Scans API
//!
//! Endpoints and wire types of the scanning service, and the [`ScanService`]
//! trait the session layer talks to.
//!
//! | Endpoint              | Purpose                              |
//! |-----------------------|--------------------------------------|
//! | `POST /scan`          | Scan a code snippet                  |
//! | `POST /scan-repo`     | Scan a zipped repository (multipart) |
//! | `GET /scans`          | List recent scans                    |
//! | `GET /scans/{id}`     | Fetch a full scan                    |
//! | `DELETE /scans/{id}`  | Delete a scan                        |

use reqwest::Response;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::client::{ApiClient, ApiError};
use crate::models::{
    Issue, ScanId, ScanKind, ScanResult, ScanSummary, Severity, clamp_score, parse_timestamp,
};

// =============================================================================
// Request Types
// =============================================================================

/// Body of `POST /scan`.
#[derive(Debug, Clone, Serialize)]
pub struct SnippetScanRequest<'a> {
    pub code: &'a str,
    pub language: &'a str,
}

/// Multipart payload of `POST /scan-repo`.
#[derive(Debug, Clone)]
pub struct ArchiveUpload {
    /// Upload file name (must end in `.zip`)
    pub file_name: String,
    /// Zip container bytes
    pub bytes: Vec<u8>,
    pub language: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// Issue as returned by the service. Every field may be missing or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub how_to_fix: Option<String>,
    #[serde(default)]
    pub fixed_code_snippet: Option<String>,
}

/// Scan result in any of the service's shapes.
///
/// Snippet and repo scans return `scan_id` next to the report; stored scans
/// (`GET /scans/{id}`) return `id`, `scan_type`, `language` and `created_at`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanResponse {
    #[serde(default)]
    pub scan_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub issues: Option<Vec<IssueResponse>>,
    #[serde(default)]
    pub scan_type: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ScanResponse {
    /// Normalize into a [`ScanResult`].
    ///
    /// `default_kind` and `default_language` fill in what the snippet and
    /// repo shapes leave out. A response without any id stays un-trackable.
    pub fn into_result(self, default_kind: ScanKind, default_language: &str) -> ScanResult {
        let id = self
            .scan_id
            .or(self.id)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .map(ScanId::from);

        ScanResult {
            id,
            score: clamp_score(self.score),
            summary: self
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Scan complete.".to_string()),
            issues: self
                .issues
                .unwrap_or_default()
                .into_iter()
                .map(Issue::from)
                .collect(),
            scan_type: self
                .scan_type
                .as_deref()
                .map(ScanKind::from)
                .unwrap_or(default_kind),
            language: self
                .language
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| default_language.to_string()),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

impl From<IssueResponse> for Issue {
    fn from(raw: IssueResponse) -> Self {
        Issue {
            severity: raw
                .severity
                .as_deref()
                .map(Severity::from)
                .unwrap_or(Severity::Medium),
            title: raw
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Vulnerability found".to_string()),
            description: raw.description.unwrap_or_default(),
            how_to_fix: raw.how_to_fix.unwrap_or_default(),
            fixed_code_snippet: raw.fixed_code_snippet.filter(|s| !s.trim().is_empty()),
            file: raw.file.filter(|f| !f.trim().is_empty()),
        }
    }
}

/// Row of `GET /scans`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanSummaryResponse {
    pub id: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub scan_type: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<ScanSummaryResponse> for ScanSummary {
    fn from(raw: ScanSummaryResponse) -> Self {
        ScanSummary {
            id: ScanId::from(raw.id),
            score: clamp_score(raw.score),
            scan_type: raw
                .scan_type
                .as_deref()
                .map(ScanKind::from)
                .unwrap_or(ScanKind::Snippet),
            language: raw.language.unwrap_or_else(|| "unknown".to_string()),
            summary: raw.summary,
            created_at: raw.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

// =============================================================================
// Service Trait
// =============================================================================

/// The remote scanning service, as seen by the session layer.
///
/// [`ApiClient`] is the HTTP implementation; tests substitute in-memory fakes.
#[allow(async_fn_in_trait)]
pub trait ScanService {
    /// `POST /scan`
    async fn scan_snippet(&self, request: &SnippetScanRequest<'_>)
    -> Result<ScanResponse, ApiError>;

    /// `POST /scan-repo`
    async fn scan_archive(&self, upload: ArchiveUpload) -> Result<ScanResponse, ApiError>;

    /// `GET /scans`, most recent first
    async fn list_scans(&self, limit: usize) -> Result<Vec<ScanSummaryResponse>, ApiError>;

    /// `GET /scans/{id}`
    async fn get_scan(&self, id: &ScanId) -> Result<ScanResponse, ApiError>;

    /// `DELETE /scans/{id}`; deleting an already-deleted scan succeeds
    async fn delete_scan(&self, id: &ScanId) -> Result<(), ApiError>;
}

// =============================================================================
// API Client Methods
// =============================================================================

/// Convert a reqwest error to an ApiError.
fn to_network_error(err: reqwest::Error) -> ApiError {
    ApiError::Network {
        message: err.to_string(),
    }
}

/// Convert an HTTP response with error status to an ApiError.
fn to_http_error(status: reqwest::StatusCode, error_text: &str) -> ApiError {
    let status_code = status.as_u16();
    ApiError::BadStatus {
        status: status_code,
        message: extract_detail(error_text).unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => format!("{reason} ({status_code})"),
            None => format!("Request failed ({status_code})"),
        }),
    }
}

/// Extract a user-friendly message from an error body.
///
/// FastAPI reports errors either as `{"detail": "Scan not found."}` or, for
/// validation errors, as a list:
/// ```json
/// {"detail":[{"type":"missing","loc":["body","code"],"msg":"Field required"}]}
/// ```
fn extract_detail(error_text: &str) -> Option<String> {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(error_text) {
        match json.get("detail") {
            Some(serde_json::Value::String(detail)) if !detail.is_empty() => {
                return Some(detail.clone());
            }
            Some(serde_json::Value::Array(items)) => {
                let messages: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .map(|msg| msg.strip_prefix("Value error, ").unwrap_or(msg).to_string())
                    .collect();
                if !messages.is_empty() {
                    return Some(messages.join("; "));
                }
            }
            _ => {}
        }
    }

    let trimmed = error_text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Fail on non-success statuses, keeping the body for the error message.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response.text().await.unwrap_or_default();
    Err(to_http_error(status, &error_text))
}

async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    response.json().await.map_err(|e| ApiError::Malformed {
        message: format!("Failed to parse {what} response: {e}"),
    })
}

impl ScanService for ApiClient {
    async fn scan_snippet(
        &self,
        request: &SnippetScanRequest<'_>,
    ) -> Result<ScanResponse, ApiError> {
        let url = self.endpoint("/scan");
        log::debug!(
            "POST {} ({} bytes of {})",
            url,
            request.code.len(),
            request.language
        );

        let response = self
            .authorized(self.client.post(&url))
            .json(request)
            .send()
            .await
            .map_err(to_network_error)?;

        parse_json(response, "scan").await
    }

    async fn scan_archive(&self, upload: ArchiveUpload) -> Result<ScanResponse, ApiError> {
        let url = self.endpoint("/scan-repo");
        log::debug!(
            "POST {} ({}, {} bytes)",
            url,
            upload.file_name,
            upload.bytes.len()
        );

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str("application/zip")
            .map_err(to_network_error)?;
        let form = Form::new()
            .part("file", part)
            .text("language", upload.language);

        let response = self
            .authorized(self.client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(to_network_error)?;

        parse_json(response, "repository scan").await
    }

    async fn list_scans(&self, limit: usize) -> Result<Vec<ScanSummaryResponse>, ApiError> {
        let url = self.endpoint("/scans");
        log::debug!("GET {} (limit {})", url, limit);

        let response = self
            .authorized(self.client.get(&url))
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(to_network_error)?;

        parse_json(response, "scan history").await
    }

    async fn get_scan(&self, id: &ScanId) -> Result<ScanResponse, ApiError> {
        let url = self.scan_url(id)?;
        log::debug!("GET {}", url);

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(to_network_error)?;

        parse_json(response, "scan").await
    }

    async fn delete_scan(&self, id: &ScanId) -> Result<(), ApiError> {
        let url = self.scan_url(id)?;
        log::debug!("DELETE {}", url);

        let response = self
            .authorized(self.client.delete(url))
            .send()
            .await
            .map_err(to_network_error)?;

        match check_status(response).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                log::debug!("Scan {} was already deleted", id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl ApiClient {
    /// Probe the service root (`GET /`).
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - API is healthy
    /// * `Ok(false)` - API returned non-success status
    /// * `Err(ApiError)` - Request failed (network error)
    pub async fn health_check(&self) -> Result<bool, ApiError> {
        let url = self.endpoint("/");

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(to_network_error)?;

        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_snippet_request_serialization() {
        let request = SnippetScanRequest {
            code: "print(1)",
            language: "python",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "print(1)", "language": "python"})
        );
    }

    #[test]
    fn test_snippet_response_normalization() {
        let json = r#"{
            "score": 40,
            "summary": "SQL injection found",
            "issues": [{
                "title": "SQL Injection",
                "severity": "critical",
                "description": "String concatenation in query",
                "how_to_fix": "Use parameters",
                "fixed_code_snippet": "db.execute(q, (user_id,))"
            }],
            "scan_id": "s1"
        }"#;
        let response: ScanResponse = serde_json::from_str(json).unwrap();
        let result = response.into_result(ScanKind::Snippet, "python");

        assert_eq!(result.id, Some(ScanId::from("s1")));
        assert_eq!(result.score, 40);
        assert_eq!(result.scan_type, ScanKind::Snippet);
        assert_eq!(result.language, "python");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, Severity::Critical);
        assert_eq!(
            result.issues[0].fixed_code_snippet.as_deref(),
            Some("db.execute(q, (user_id,))")
        );
        assert!(result.created_at.is_none());
    }

    #[test]
    fn test_stored_scan_normalization() {
        let json = r#"{
            "id": "abc",
            "scan_type": "repo",
            "language": "javascript",
            "score": 85,
            "summary": "Mostly fine",
            "created_at": "2025-02-03T10:00:00+00:00",
            "issues": [{"title": "Weak hash", "severity": "LOW", "file": "src/auth.js",
                        "description": null, "how_to_fix": null, "fixed_code_snippet": null}]
        }"#;
        let response: ScanResponse = serde_json::from_str(json).unwrap();
        let result = response.into_result(ScanKind::Snippet, "python");

        assert_eq!(result.id, Some(ScanId::from("abc")));
        assert_eq!(result.scan_type, ScanKind::Archive);
        assert_eq!(result.language, "javascript");
        assert_eq!(result.created_at.unwrap().month(), 2);
        assert_eq!(result.issues[0].file.as_deref(), Some("src/auth.js"));
        assert_eq!(result.issues[0].description, "");
        assert!(result.issues[0].fixed_code_snippet.is_none());
    }

    #[test]
    fn test_response_without_id_is_untrackable() {
        let response: ScanResponse = serde_json::from_str(r#"{"score": 100}"#).unwrap();
        let result = response.into_result(ScanKind::Archive, "python");
        assert!(result.id.is_none());
        assert_eq!(result.scan_type, ScanKind::Archive);
        assert_eq!(result.summary, "Scan complete.");
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_null_issues_and_untitled_issue() {
        let response: ScanResponse =
            serde_json::from_str(r#"{"scan_id": "x", "issues": null}"#).unwrap();
        assert!(
            response
                .into_result(ScanKind::Snippet, "go")
                .issues
                .is_empty()
        );

        let response: ScanResponse =
            serde_json::from_str(r#"{"scan_id": "x", "issues": [{}]}"#).unwrap();
        let result = response.into_result(ScanKind::Snippet, "go");
        assert_eq!(result.issues[0].title, "Vulnerability found");
        assert_eq!(result.issues[0].severity, Severity::Medium);
    }

    #[test]
    fn test_out_of_range_score_is_clamped() {
        let response: ScanResponse =
            serde_json::from_str(r#"{"scan_id": "x", "score": 250}"#).unwrap();
        assert_eq!(response.into_result(ScanKind::Snippet, "go").score, 100);
    }

    #[test]
    fn test_summary_row_conversion() {
        let json = r#"[{
            "id": "s2",
            "scan_type": "snippet",
            "language": "python",
            "score": 72,
            "summary": "Needs work",
            "created_at": "2025-01-01T00:00:00+00:00"
        }]"#;
        let rows: Vec<ScanSummaryResponse> = serde_json::from_str(json).unwrap();
        let summary = ScanSummary::from(rows.into_iter().next().unwrap());

        assert_eq!(summary.id, ScanId::from("s2"));
        assert_eq!(summary.score, 72);
        assert_eq!(summary.scan_type, ScanKind::Snippet);
        assert_eq!(summary.summary.as_deref(), Some("Needs work"));
        assert!(summary.created_at.is_some());
    }

    #[test]
    fn test_extract_detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail": "Scan not found."}"#).as_deref(),
            Some("Scan not found.")
        );
    }

    #[test]
    fn test_extract_detail_validation_list() {
        let error_text = r#"{"detail":[{"msg":"Value error, Invalid field A"},{"msg":"Field required"}]}"#;
        assert_eq!(
            extract_detail(error_text).as_deref(),
            Some("Invalid field A; Field required")
        );
    }

    #[test]
    fn test_extract_detail_fallbacks() {
        assert_eq!(
            extract_detail("Internal Server Error").as_deref(),
            Some("Internal Server Error")
        );
        assert_eq!(extract_detail("   "), None);
    }

    #[test]
    fn test_to_http_error_uses_reason_when_body_empty() {
        let err = to_http_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "");
        match err {
            ApiError::BadStatus { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error (500)");
            }
            other => panic!("expected BadStatus, got {other:?}"),
        }
    }
}

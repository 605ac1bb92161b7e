//! In-memory [`ScanService`] for tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use tokio::sync::oneshot;

use crate::api::{
    ApiError, ArchiveUpload, IssueResponse, ScanResponse, ScanService, ScanSummaryResponse,
    SnippetScanRequest,
};
use crate::models::ScanId;

type ScanReply = Result<ScanResponse, ApiError>;

enum Reply {
    Ready(ScanReply),
    Gated(oneshot::Receiver<ScanReply>),
}

impl Reply {
    async fn resolve(self) -> ScanReply {
        match self {
            Reply::Ready(reply) => reply,
            Reply::Gated(rx) => rx.await.unwrap_or_else(|_| {
                Err(ApiError::Network {
                    message: "gate dropped".to_string(),
                })
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ScanSnippet { code: String, language: String },
    ScanArchive { file_name: String, language: String },
    ListScans { limit: usize },
    GetScan(ScanId),
    DeleteScan(ScanId),
}

#[derive(Default)]
pub(crate) struct FakeService {
    calls: RefCell<Vec<Call>>,
    scans: RefCell<VecDeque<Reply>>,
    gets: RefCell<VecDeque<Reply>>,
    history: RefCell<Vec<ScanSummaryResponse>>,
    uploads: RefCell<Vec<ArchiveUpload>>,
    history_down: Cell<bool>,
    delete_status: Cell<Option<u16>>,
}

impl FakeService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reply to the next scan (snippet or archive) immediately.
    pub(crate) fn queue_scan(&self, reply: ScanReply) {
        self.scans.borrow_mut().push_back(Reply::Ready(reply));
    }

    /// Hold the next scan reply until the returned sender fires.
    pub(crate) fn gate_scan(&self) -> oneshot::Sender<ScanReply> {
        let (tx, rx) = oneshot::channel();
        self.scans.borrow_mut().push_back(Reply::Gated(rx));
        tx
    }

    pub(crate) fn queue_get(&self, reply: ScanReply) {
        self.gets.borrow_mut().push_back(Reply::Ready(reply));
    }

    pub(crate) fn gate_get(&self) -> oneshot::Sender<ScanReply> {
        let (tx, rx) = oneshot::channel();
        self.gets.borrow_mut().push_back(Reply::Gated(rx));
        tx
    }

    /// Rows returned by `list_scans`, most recent first.
    pub(crate) fn set_history(&self, ids: &[&str]) {
        *self.history.borrow_mut() = ids.iter().map(|id| row(id)).collect();
    }

    pub(crate) fn set_history_down(&self, down: bool) {
        self.history_down.set(down);
    }

    pub(crate) fn fail_deletes_with(&self, status: Option<u16>) {
        self.delete_status.set(status);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn network_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    pub(crate) fn uploads(&self) -> Vec<ArchiveUpload> {
        self.uploads.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn next_reply(queue: &RefCell<VecDeque<Reply>>) -> Reply {
        queue.borrow_mut().pop_front().unwrap_or_else(|| {
            Reply::Ready(Err(ApiError::Network {
                message: "no reply queued".to_string(),
            }))
        })
    }
}

impl ScanService for FakeService {
    async fn scan_snippet(
        &self,
        request: &SnippetScanRequest<'_>,
    ) -> Result<ScanResponse, ApiError> {
        self.record(Call::ScanSnippet {
            code: request.code.to_string(),
            language: request.language.to_string(),
        });
        let reply = Self::next_reply(&self.scans);
        tokio::task::yield_now().await;
        reply.resolve().await
    }

    async fn scan_archive(&self, upload: ArchiveUpload) -> Result<ScanResponse, ApiError> {
        self.record(Call::ScanArchive {
            file_name: upload.file_name.clone(),
            language: upload.language.clone(),
        });
        self.uploads.borrow_mut().push(upload);
        let reply = Self::next_reply(&self.scans);
        tokio::task::yield_now().await;
        reply.resolve().await
    }

    async fn list_scans(&self, limit: usize) -> Result<Vec<ScanSummaryResponse>, ApiError> {
        self.record(Call::ListScans { limit });
        tokio::task::yield_now().await;
        if self.history_down.get() {
            return Err(ApiError::Network {
                message: "connection refused".to_string(),
            });
        }
        Ok(self.history.borrow().iter().take(limit).cloned().collect())
    }

    async fn get_scan(&self, id: &ScanId) -> Result<ScanResponse, ApiError> {
        self.record(Call::GetScan(id.clone()));
        let reply = Self::next_reply(&self.gets);
        tokio::task::yield_now().await;
        reply.resolve().await
    }

    async fn delete_scan(&self, id: &ScanId) -> Result<(), ApiError> {
        self.record(Call::DeleteScan(id.clone()));
        tokio::task::yield_now().await;
        if let Some(status) = self.delete_status.get() {
            return Err(ApiError::BadStatus {
                status,
                message: "delete failed".to_string(),
            });
        }
        self.history.borrow_mut().retain(|r| r.id != id.as_str());
        Ok(())
    }
}

/// A snippet-shaped scan response with one critical issue.
pub(crate) fn response(id: &str, score: u8) -> ScanResponse {
    ScanResponse {
        scan_id: Some(id.to_string()),
        score: Some(f64::from(score)),
        summary: Some("SQL injection in query builder".to_string()),
        issues: Some(vec![IssueResponse {
            title: Some("SQL Injection".to_string()),
            severity: Some("CRITICAL".to_string()),
            description: Some("User input is concatenated into SQL".to_string()),
            how_to_fix: Some("Use parameterized queries".to_string()),
            fixed_code_snippet: Some("db.execute(q, (uid,))".to_string()),
            file: None,
        }]),
        ..ScanResponse::default()
    }
}

/// A stored-scan response, as returned by `GET /scans/{id}`.
pub(crate) fn stored(id: &str, score: u8) -> ScanResponse {
    ScanResponse {
        scan_id: None,
        id: Some(id.to_string()),
        scan_type: Some("repo".to_string()),
        language: Some("python".to_string()),
        created_at: Some("2025-01-01T00:00:00+00:00".to_string()),
        ..response(id, score)
    }
}

pub(crate) fn row(id: &str) -> ScanSummaryResponse {
    ScanSummaryResponse {
        id: id.to_string(),
        score: Some(80.0),
        scan_type: Some("snippet".to_string()),
        language: Some("python".to_string()),
        summary: None,
        created_at: Some("2025-01-01T00:00:00+00:00".to_string()),
    }
}

//! # Session Store
//!
//! Owns the scan history and the active scan, and sequences every remote
//! operation that can change them.
//!
//! Operations run cooperatively on one thread and may interleave at any
//! `.await`. Two token sequences decide which responses still matter:
//!
//! - the **display token** is shared by [`SessionStore::submit_new`] and
//!   [`SessionStore::select_existing`]; only the most recently started of
//!   them may change the active scan
//! - the **history token** orders [`SessionStore::refresh_history`] calls and
//!   is bumped by successful deletes, so a listing taken before a delete is
//!   never applied after it
//!
//! A response whose token is outdated is dropped without touching state.

use std::cell::{Cell, RefCell};

use crate::api::ScanService;
use crate::archive::{ArchiveBuilder, ArchiveError, PendingUpload, SourceEntry};
use crate::models::{ScanId, ScanKind, ScanResult};

use super::error::{PipelineError, ValidationError};
use super::state::{Phase, SessionState};
use super::submission::{ScanInput, ScanRequest, Submission, SubmissionClient};

/// Default number of rows fetched by [`SessionStore::refresh_history`].
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Outcome of an operation whose response may arrive too late to matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The response was applied to session state
    Applied(T),
    /// A newer operation started first; the response was discarded
    Stale,
}

impl<T> Resolution<T> {
    pub fn is_stale(&self) -> bool {
        matches!(self, Resolution::Stale)
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Resolution::Applied(value) => Some(value),
            Resolution::Stale => None,
        }
    }
}

/// Session state plus the service it is reconciled against.
///
/// Not `Sync`: all operations are meant to run on a single task.
pub struct SessionStore<S> {
    service: S,
    builder: ArchiveBuilder,
    state: RefCell<SessionState>,
    display_token: Cell<u64>,
    history_token: Cell<u64>,
    /// Display token and id of the select currently in flight, if any
    pending_select: RefCell<Option<(u64, ScanId)>>,
    history_limit: usize,
}

impl<S: ScanService> SessionStore<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            builder: ArchiveBuilder::new(),
            state: RefCell::new(SessionState::new()),
            display_token: Cell::new(0),
            history_token: Cell::new(0),
            pending_select: RefCell::new(None),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run `f` against the current state.
    ///
    /// The state is borrowed for the duration of `f` only.
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase().clone()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Build (for tree input), validate and submit a new scan.
    ///
    /// On success the result becomes the active scan and history is refreshed.
    /// A failed refresh at that point is logged and does not fail the scan.
    pub async fn submit_new<E: SourceEntry>(
        &self,
        request: ScanRequest<E>,
    ) -> Result<Resolution<ScanResult>, PipelineError> {
        let ScanRequest { input, language } = request;

        if language.trim().is_empty() {
            return Err(self.reject(ValidationError::MissingLanguage.into()));
        }
        let submission = match input {
            ScanInput::Snippet { code } => Submission::Snippet { code },
            ScanInput::Upload(upload) => Submission::Archive(upload),
            ScanInput::Tree(entries) => return self.build_and_send(entries, &language).await,
        };
        SubmissionClient::<S>::validate(&submission, &language)
            .map_err(|e| self.reject(e.into()))?;

        let token = self.next_display_token();
        self.send(token, submission, &language).await
    }

    /// Fetch a stored scan and make it the active scan.
    pub async fn select_existing(
        &self,
        id: &ScanId,
    ) -> Result<Resolution<ScanResult>, PipelineError> {
        check_scan_id(id).map_err(|e| self.reject(e.into()))?;
        let token = self.next_display_token();
        self.state.borrow_mut().begin(Phase::Idle);
        *self.pending_select.borrow_mut() = Some((token, id.clone()));
        log::debug!("Selecting scan {} (#{})", id, token);

        let fetched = self.service.get_scan(id).await;

        let still_pending = {
            let mut pending = self.pending_select.borrow_mut();
            let ours = matches!(pending.as_ref(), Some((t, _)) if *t == token);
            if ours {
                pending.take();
            }
            ours
        };
        if !still_pending || !self.is_current(token) {
            log::warn!("Discarding stale response for scan {} (#{})", id, token);
            return Ok(Resolution::Stale);
        }

        match fetched {
            Ok(response) => {
                let mut result = response.into_result(ScanKind::Snippet, "unknown");
                if result.id.is_none() {
                    result.id = Some(id.clone());
                }
                self.state.borrow_mut().show(result.clone());
                Ok(Resolution::Applied(result))
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Delete a scan remotely, then drop it from history and the display.
    pub async fn delete_scan(&self, id: &ScanId) -> Result<(), PipelineError> {
        check_scan_id(id).map_err(|e| self.reject(e.into()))?;
        self.state.borrow_mut().clear_error();
        log::debug!("Deleting scan {}", id);

        match self.service.delete_scan(id).await {
            Ok(()) => {
                self.bump_history_token();
                {
                    let mut pending = self.pending_select.borrow_mut();
                    if matches!(pending.as_ref(), Some((_, pending_id)) if pending_id == id) {
                        log::debug!("Invalidating in-flight select of deleted scan {}", id);
                        pending.take();
                    }
                }
                self.state.borrow_mut().forget(id);
                log::info!("Deleted scan {}", id);
                Ok(())
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Replace history with the service's most recent scans.
    ///
    /// Never touches the active scan. On failure the old history is kept and
    /// the phase is left alone.
    pub async fn refresh_history(&self) -> Result<Resolution<usize>, PipelineError> {
        let token = self.bump_history_token();
        let rows = self.service.list_scans(self.history_limit).await?;

        if self.history_token.get() != token {
            log::warn!("Discarding stale history listing (#{})", token);
            return Ok(Resolution::Stale);
        }
        let count = rows.len();
        self.state
            .borrow_mut()
            .replace_history(rows.into_iter().map(Into::into).collect());
        Ok(Resolution::Applied(count))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn build_and_send<E: SourceEntry>(
        &self,
        entries: Vec<E>,
        language: &str,
    ) -> Result<Resolution<ScanResult>, PipelineError> {
        if entries.is_empty() {
            return Err(self.reject(ValidationError::EmptyInput.into()));
        }
        if self.builder.is_busy() {
            return Err(ArchiveError::BuilderBusy.into());
        }

        let token = self.next_display_token();
        self.state.borrow_mut().begin(Phase::Building);
        log::debug!("Building archive for submission #{}", token);

        let built = self.builder.build(entries).await;
        if !self.is_current(token) {
            log::warn!("Discarding archive for superseded submission #{}", token);
            return Ok(Resolution::Stale);
        }
        let archive = built.map_err(|e| self.fail(e.into()))?;
        let submission = Submission::Archive(PendingUpload::new(archive));
        SubmissionClient::<S>::validate(&submission, language)
            .map_err(|e| self.fail(e.into()))?;

        self.send(token, submission, language).await
    }

    async fn send(
        &self,
        token: u64,
        submission: Submission,
        language: &str,
    ) -> Result<Resolution<ScanResult>, PipelineError> {
        self.state.borrow_mut().begin(Phase::Submitting);
        log::debug!("Submitting {:?} scan #{}", submission.kind(), token);

        let outcome = SubmissionClient::new(&self.service)
            .submit(submission, language)
            .await;

        if !self.is_current(token) {
            log::warn!("Discarding response for superseded submission #{}", token);
            return Ok(Resolution::Stale);
        }

        let result = outcome.map_err(|e| self.fail(e))?;
        log::info!(
            "Scan {} complete: score {}, {} issues",
            result
                .id
                .as_ref()
                .map(ScanId::as_str)
                .unwrap_or("(untracked)"),
            result.score,
            result.issues.len()
        );
        self.state.borrow_mut().show(result.clone());

        if let Err(e) = self.refresh_history().await {
            log::warn!("History refresh after scan failed: {}", e);
        }
        Ok(Resolution::Applied(result))
    }

    fn next_display_token(&self) -> u64 {
        let token = self.display_token.get() + 1;
        self.display_token.set(token);
        token
    }

    fn bump_history_token(&self) -> u64 {
        let token = self.history_token.get() + 1;
        self.history_token.set(token);
        token
    }

    fn is_current(&self, token: u64) -> bool {
        self.display_token.get() == token
    }

    /// Record a failure of the current operation.
    fn fail(&self, err: PipelineError) -> PipelineError {
        self.state.borrow_mut().fail(err.to_failure());
        err
    }

    /// Record a validation failure, unless another operation is running.
    fn reject(&self, err: PipelineError) -> PipelineError {
        let mut state = self.state.borrow_mut();
        if !state.phase().is_busy() {
            state.fail(err.to_failure());
        }
        err
    }
}

fn check_scan_id(id: &ScanId) -> Result<(), ValidationError> {
    if id.is_addressable() {
        Ok(())
    } else {
        Err(ValidationError::InvalidScanId {
            id: id.as_str().to_string(),
        })
    }
}

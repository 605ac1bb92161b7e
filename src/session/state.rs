//! Session state and its transitions.
//!
//! [`SessionState`] is a plain value. Its transition methods are synchronous
//! and total; [`SessionStore`](super::SessionStore) decides when to call them.

use crate::models::{ScanId, ScanResult, ScanSummary};

use super::error::Failure;

/// What the session is doing right now.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Walking a dropped tree into an archive
    Building,
    /// Waiting on the scanning service
    Submitting,
    /// The last operation failed
    Error(Failure),
}

impl Phase {
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Building | Phase::Submitting)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Phase::Error(failure) => Some(failure),
            _ => None,
        }
    }
}

/// The displayed scan. Only results with an id can be displayed, and the id
/// is taken from the result, so the two cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveScan {
    id: ScanId,
    result: ScanResult,
}

impl ActiveScan {
    /// Wrap a result. Results without an id cannot be tracked and yield `None`.
    pub fn new(result: ScanResult) -> Option<Self> {
        let id = result.id.clone()?;
        Some(Self { id, result })
    }

    pub fn id(&self) -> &ScanId {
        &self.id
    }

    pub fn result(&self) -> &ScanResult {
        &self.result
    }

    pub fn into_result(self) -> ScanResult {
        self.result
    }
}

/// Scan history plus the active scan.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    history: Vec<ScanSummary>,
    active: Option<ActiveScan>,
    phase: Phase,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Past scans, most recent first.
    pub fn history(&self) -> &[ScanSummary] {
        &self.history
    }

    pub fn active(&self) -> Option<&ActiveScan> {
        self.active.as_ref()
    }

    pub fn active_id(&self) -> Option<&ScanId> {
        self.active.as_ref().map(ActiveScan::id)
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Enter a working phase, dropping any previous error.
    pub(crate) fn begin(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn clear_error(&mut self) {
        if matches!(self.phase, Phase::Error(_)) {
            self.phase = Phase::Idle;
        }
    }

    /// Display a result and return to idle.
    ///
    /// A result without an id cannot be tracked, so nothing is active afterwards.
    pub(crate) fn show(&mut self, result: ScanResult) {
        match ActiveScan::new(result) {
            Some(active) => self.active = Some(active),
            None => {
                log::warn!("Scan result has no id; not tracking it");
                self.active = None;
            }
        }
        self.phase = Phase::Idle;
    }

    pub(crate) fn fail(&mut self, failure: Failure) {
        self.phase = Phase::Error(failure);
    }

    pub(crate) fn replace_history(&mut self, history: Vec<ScanSummary>) {
        self.history = history;
    }

    /// Drop a deleted scan from history and, if displayed, from the display.
    pub(crate) fn forget(&mut self, id: &ScanId) {
        self.history.retain(|row| &row.id != id);
        if self.active_id() == Some(id) {
            self.active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScanKind;
    use crate::session::error::ErrorKind;

    fn result(id: Option<&str>) -> ScanResult {
        ScanResult {
            id: id.map(ScanId::from),
            score: 90,
            summary: "ok".to_string(),
            issues: vec![],
            scan_type: ScanKind::Snippet,
            language: "python".to_string(),
            created_at: None,
        }
    }

    fn row(id: &str) -> ScanSummary {
        ScanSummary {
            id: ScanId::from(id),
            score: 90,
            scan_type: ScanKind::Snippet,
            language: "python".to_string(),
            summary: None,
            created_at: None,
        }
    }

    #[test]
    fn test_new_state_is_empty_and_idle() {
        let state = SessionState::new();
        assert!(state.history().is_empty());
        assert!(state.active().is_none());
        assert_eq!(state.phase(), &Phase::Idle);
    }

    #[test]
    fn test_active_scan_requires_id() {
        assert!(ActiveScan::new(result(None)).is_none());
        let active = ActiveScan::new(result(Some("s1"))).unwrap();
        assert_eq!(active.id().as_str(), "s1");
    }

    #[test]
    fn test_show_untracked_result_clears_previous_active() {
        let mut state = SessionState::new();
        state.show(result(Some("s1")));
        state.begin(Phase::Submitting);
        state.show(result(None));

        assert_eq!(state.active_id(), None);
        assert!(state.active().is_none());
        assert_eq!(state.phase(), &Phase::Idle);
    }

    #[test]
    fn test_forget_removes_exactly_one_row() {
        let mut state = SessionState::new();
        state.replace_history(vec![row("a"), row("b"), row("c")]);
        state.show(result(Some("a")));

        state.forget(&ScanId::from("b"));
        let ids: Vec<&str> = state.history().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(state.active_id(), Some(&ScanId::from("a")));

        state.forget(&ScanId::from("a"));
        assert_eq!(state.history().len(), 1);
        assert!(state.active().is_none());
    }

    #[test]
    fn test_clear_error_only_touches_error_phase() {
        let mut state = SessionState::new();
        state.fail(Failure {
            kind: ErrorKind::Network,
            message: "down".to_string(),
        });
        assert!(state.phase().failure().is_some());
        state.clear_error();
        assert_eq!(state.phase(), &Phase::Idle);

        state.begin(Phase::Submitting);
        state.clear_error();
        assert_eq!(state.phase(), &Phase::Submitting);
        assert!(state.phase().is_busy());
    }
}

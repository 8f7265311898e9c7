//! The Case aggregate — one simulated proceeding.
//!
//! A case owns its document chunks, its transcript and its verdict.
//! Lifecycle: created → ingested (ready) → run zero or more times. Each run
//! starts from an empty transcript; the orchestrator commits a run's turns
//! and verdict together, or records the failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::trial::{CaseAnalysis, Turn, Verdict};

/// Short case identifier (first 8 hex digits of a v4 UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseId(pub String);

impl CaseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string()[..8].to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a case is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    /// No document ingested yet.
    Created,
    /// Chunks available, ready to simulate.
    Ready,
    /// A run is in progress.
    Simulating,
    /// The last run finished with a verdict.
    Completed,
    /// The last run aborted.
    Failed,
}

/// Metadata of one uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFile {
    pub filename: String,
    /// Size in bytes.
    pub size: usize,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl CaseFile {
    pub fn new(filename: impl Into<String>, size: usize, mime_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            size,
            mime_type: mime_type.into(),
            uploaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Full extracted document text.
    #[serde(default, skip_serializing)]
    pub raw_text: String,
    /// Ordered document fragments; the index is the `doc:<index>` citation key.
    #[serde(default)]
    pub chunks: Vec<String>,
    /// Uploads received for this case, oldest first.
    #[serde(default)]
    pub files: Vec<CaseFile>,
    /// Structured reading of the current document, if one was requested.
    #[serde(default)]
    pub analysis: Option<CaseAnalysis>,
    #[serde(default)]
    pub transcript: Vec<Turn>,
    #[serde(default)]
    pub verdict: Option<Verdict>,
    pub status: CaseStatus,
    /// Error message of the last failed run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Case {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CaseId::new(),
            title: title.into(),
            description: String::new(),
            raw_text: String::new(),
            chunks: Vec::new(),
            files: Vec::new(),
            analysis: None,
            transcript: Vec::new(),
            verdict: None,
            status: CaseStatus::Created,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace the case document. Any previous transcript, verdict and
    /// analysis refer to the old document, so they are dropped.
    pub fn ingest(&mut self, raw_text: impl Into<String>, chunks: Vec<String>) {
        self.raw_text = raw_text.into();
        self.chunks = chunks;
        self.analysis = None;
        self.transcript.clear();
        self.verdict = None;
        self.last_error = None;
        self.status = if self.chunks.is_empty() {
            CaseStatus::Created
        } else {
            CaseStatus::Ready
        };
        self.touch();
    }

    pub fn has_chunks(&self) -> bool {
        !self.chunks.is_empty()
    }

    pub fn has_document(&self) -> bool {
        !self.raw_text.trim().is_empty()
    }

    pub fn record_file(&mut self, file: CaseFile) {
        self.files.push(file);
        self.touch();
    }

    pub fn set_analysis(&mut self, analysis: CaseAnalysis) -> &CaseAnalysis {
        self.touch();
        self.analysis.insert(analysis)
    }

    /// Clear the previous run's transcript and verdict and mark the case busy.
    pub fn begin_run(&mut self) {
        self.transcript.clear();
        self.verdict = None;
        self.last_error = None;
        self.status = CaseStatus::Simulating;
        self.touch();
    }

    /// Install a finished run.
    pub fn commit_run(&mut self, transcript: Vec<Turn>, verdict: Verdict) {
        self.transcript = transcript;
        self.verdict = Some(verdict);
        self.status = CaseStatus::Completed;
        self.touch();
    }

    /// Record an aborted run. Nothing from the run is kept.
    pub fn fail_run(&mut self, error: impl Into<String>) {
        self.transcript.clear();
        self.verdict = None;
        self.last_error = Some(error.into());
        self.status = CaseStatus::Failed;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::{Phase, TrialRole, VerdictKind};

    fn turn(phase: Phase, role: TrialRole) -> Turn {
        Turn {
            phase,
            role,
            text: "text".into(),
            citations: Default::default(),
        }
    }

    fn verdict() -> Verdict {
        Verdict {
            verdict: VerdictKind::Guilty,
            rationale: "Proven [doc:0].".into(),
        }
    }

    #[test]
    fn case_id_is_eight_chars() {
        let id = CaseId::new();
        assert_eq!(id.0.len(), 8);
        assert_ne!(id, CaseId::new());
    }

    #[test]
    fn ingest_marks_case_ready() {
        let mut case = Case::new("State v. Doe");
        assert_eq!(case.status, CaseStatus::Created);
        case.ingest("text", vec!["text".into()]);
        assert_eq!(case.status, CaseStatus::Ready);
        assert!(case.has_chunks());
    }

    #[test]
    fn begin_run_clears_previous_results() {
        let mut case = Case::new("State v. Doe");
        case.ingest("text", vec!["text".into()]);
        case.commit_run(vec![turn(Phase::Opening, TrialRole::Prosecution)], verdict());
        assert_eq!(case.status, CaseStatus::Completed);

        case.begin_run();
        assert!(case.transcript.is_empty());
        assert!(case.verdict.is_none());
        assert_eq!(case.status, CaseStatus::Simulating);
    }

    #[test]
    fn fail_run_leaves_no_verdict() {
        let mut case = Case::new("State v. Doe");
        case.ingest("text", vec!["text".into()]);
        case.begin_run();
        case.fail_run("provider down");
        assert!(case.verdict.is_none());
        assert_eq!(case.status, CaseStatus::Failed);
        assert_eq!(case.last_error.as_deref(), Some("provider down"));
    }

    #[test]
    fn new_document_drops_stale_analysis() {
        let mut case = Case::new("State v. Doe");
        case.ingest("first text", vec!["first".into()]);
        case.record_file(CaseFile::new("first.txt", 10, "text/plain"));
        case.set_analysis(CaseAnalysis {
            summary: "First reading.".into(),
            key_facts: vec!["fact".into()],
            legal_issues: Vec::new(),
            potential_arguments: Default::default(),
        });
        assert!(case.analysis.is_some());

        case.ingest("second text", vec!["second".into()]);
        assert!(case.analysis.is_none());
        assert_eq!(case.files.len(), 1);
        assert!(case.has_document());
    }

    #[test]
    fn raw_text_not_serialized() {
        let mut case = Case::new("State v. Doe");
        case.ingest("secret full text", vec!["chunk".into()]);
        let json = serde_json::to_string(&case).unwrap();
        assert!(!json.contains("secret full text"));
        assert!(json.contains("\"status\":\"ready\""));
    }
}

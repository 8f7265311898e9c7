//! In-memory case registry.
//!
//! Each case sits behind its own async mutex so a run (which holds the lock
//! across every model call) serializes with uploads and other runs on the
//! same case. Readers use `try_lock` and report the case as busy instead of
//! waiting out a simulation.

use chrono::{DateTime, Utc};
use mocktrial_core::case::{Case, CaseId, CaseStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

pub type CaseHandle = Arc<Mutex<Case>>;

struct Slot {
    title: String,
    created_at: DateTime<Utc>,
    case: CaseHandle,
}

/// Listing entry for one case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSummary {
    pub id: String,
    pub title: String,
    pub status: CaseStatus,
    pub chunks: usize,
    pub turns: usize,
    pub created_at: String,
}

/// Bounded map of case id → case. The oldest case is evicted on overflow.
pub struct CaseStore {
    cases: RwLock<HashMap<String, Slot>>,
    max_cases: usize,
}

impl CaseStore {
    pub fn new(max_cases: usize) -> Self {
        Self {
            cases: RwLock::new(HashMap::new()),
            max_cases: max_cases.max(1),
        }
    }

    /// Store `case`, assigning a fresh id if its id is already taken.
    pub async fn insert(&self, mut case: Case) -> CaseHandle {
        let mut cases = self.cases.write().await;
        while cases.contains_key(&case.id.0) {
            let fresh = CaseId::new();
            debug!(case_id = %case.id, reassigned = %fresh, "Case id collision");
            case.id = fresh;
        }

        if cases.len() >= self.max_cases {
            if let Some(oldest) = cases
                .iter()
                .min_by_key(|(_, s)| s.created_at)
                .map(|(k, _)| k.clone())
            {
                debug!(case_id = %oldest, "Evicting oldest case");
                cases.remove(&oldest);
            }
        }

        let id = case.id.to_string();
        let slot = Slot {
            title: case.title.clone(),
            created_at: case.created_at,
            case: Arc::new(Mutex::new(case)),
        };
        let handle = slot.case.clone();
        cases.insert(id, slot);
        handle
    }

    pub async fn get(&self, id: &str) -> Option<CaseHandle> {
        self.cases.read().await.get(id).map(|s| s.case.clone())
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.cases.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.cases.read().await.len()
    }

    /// Summaries, newest first. Cases locked by a run show as `simulating`.
    pub async fn list(&self) -> Vec<CaseSummary> {
        let cases = self.cases.read().await;
        let mut entries: Vec<(DateTime<Utc>, CaseSummary)> = cases
            .iter()
            .map(|(id, slot)| {
                let summary = match slot.case.try_lock() {
                    Ok(case) => CaseSummary {
                        id: id.clone(),
                        title: case.title.clone(),
                        status: case.status,
                        chunks: case.chunks.len(),
                        turns: case.transcript.len(),
                        created_at: case.created_at.to_rfc3339(),
                    },
                    Err(_) => CaseSummary {
                        id: id.clone(),
                        title: slot.title.clone(),
                        status: CaseStatus::Simulating,
                        chunks: 0,
                        turns: 0,
                        created_at: slot.created_at.to_rfc3339(),
                    },
                };
                (slot.created_at, summary)
            })
            .collect();

        entries.sort_by(|a, b| b.0.cmp(&a.0));
        entries.into_iter().map(|(_, s)| s).collect()
    }
}

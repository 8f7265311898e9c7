//! Domain event system — progress notifications for simulations.
//!
//! Events are published as a proceeding advances. The CLI subscribes to show
//! live progress; nothing in the core depends on anyone listening.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::trial::{Phase, TrialRole, VerdictKind};

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A document was split into chunks for a case
    DocumentIngested {
        case_id: String,
        chars: usize,
        chunks: usize,
        timestamp: DateTime<Utc>,
    },

    /// A phase retrieved its context and is about to call the model
    PhaseStarted {
        case_id: String,
        phase: Phase,
        retrieved_chunks: usize,
        timestamp: DateTime<Utc>,
    },

    /// A transcript turn was produced
    TurnLogged {
        case_id: String,
        phase: Phase,
        role: TrialRole,
        citations: usize,
        timestamp: DateTime<Utc>,
    },

    /// The jury returned a verdict
    VerdictReached {
        case_id: String,
        verdict: VerdictKind,
        timestamp: DateTime<Utc>,
    },

    /// A structured case analysis was stored
    CaseAnalyzed {
        case_id: String,
        key_facts: usize,
        timestamp: DateTime<Utc>,
    },

    /// A run finished and was committed to the case
    RunCompleted {
        case_id: String,
        turns: usize,
        timestamp: DateTime<Utc>,
    },

    /// A run aborted
    RunFailed {
        case_id: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

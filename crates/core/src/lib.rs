//! # Mocktrial Core
//!
//! Domain types, traits, and error definitions for the Mocktrial courtroom
//! simulator. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The language-model backend is a trait here; implementations live in
//! `mocktrial-providers`. Cases, transcripts and verdicts are plain data so the
//! orchestrator, the HTTP gateway and the CLI all speak the same types.

pub mod case;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod trial;

// Re-export key types at crate root for ergonomics
pub use case::{Case, CaseFile, CaseId, CaseStatus};
pub use error::{IngestError, KnowledgeError, ProviderError, TrialError};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use trial::{
    CaseAnalysis, Phase, PotentialArguments, RunConfig, StandardOfProof, TrialRole, Turn, Verdict,
    VerdictKind,
};

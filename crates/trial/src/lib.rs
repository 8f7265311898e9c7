//! The courtroom engine — retrieval, grounding, and the phase orchestrator.
//!
//! A simulation runs a fixed sequence of phases:
//!
//! 1. **Opening**: prosecution, then defense
//! 2. **Evidence**: prosecution, then defense
//! 3. **Cross**: bounded question/answer exchanges
//! 4. **Closing**: prosecution, then defense
//! 5. **Verdict**: the jury returns a structured decision
//! 6. **Opinion**: the judge explains the outcome
//!
//! Every phase retrieves document chunks with a fixed keyword query, appends
//! the legal knowledge base, and sends the result to the model. Each reply is
//! logged with the citation keys it mentions.

pub mod context;
pub mod export;
pub mod ingest;
pub mod knowledge;
pub mod model;
pub mod orchestrator;
pub mod prompts;
pub mod retrieval;
pub mod transcript;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::ContextAssembler;
pub use export::render_text;
pub use ingest::{IngestSummary, split_chunks};
pub use knowledge::{KnowledgeBase, Principle};
pub use model::ModelClient;
pub use orchestrator::TrialOrchestrator;
pub use retrieval::{normalize, top_k};
pub use transcript::{add_log, extract_citations};

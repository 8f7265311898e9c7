//! Phase orchestrator — drives one simulated proceeding end to end.
//!
//! # Flow
//!
//! 1. Validate the run configuration and require ingested chunks
//! 2. Clear the previous run (transcript, verdict)
//! 3. For each phase: retrieve chunks, assemble context, call each role
//! 4. Parse the jury's structured verdict
//! 5. Commit turns and verdict to the case together, or record the failure
//!
//! Turns are buffered locally, so a failed run never leaves a partial
//! transcript on the case.

use chrono::Utc;
use mocktrial_core::case::Case;
use mocktrial_core::error::TrialError;
use mocktrial_core::event::{DomainEvent, EventBus};
use mocktrial_core::trial::{CaseAnalysis, Phase, RunConfig, TrialRole, Turn, Verdict};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::ContextAssembler;
use crate::model::ModelClient;
use crate::prompts;
use crate::transcript::add_log;

/// Number of chunks retrieved per phase.
pub const DEFAULT_RETRIEVAL_K: usize = 6;

/// Who speaks in `phase`, in order.
pub fn speakers(phase: Phase) -> &'static [TrialRole] {
    match phase {
        Phase::Opening | Phase::Evidence | Phase::Cross | Phase::Closing => {
            &[TrialRole::Prosecution, TrialRole::Defense]
        }
        Phase::Verdict => &[TrialRole::Jury],
        Phase::Opinion => &[TrialRole::Judge],
    }
}

/// Runs the fixed phase sequence against a model.
pub struct TrialOrchestrator {
    model: ModelClient,
    assembler: ContextAssembler,
    retrieval_k: usize,
    event_bus: Option<Arc<EventBus>>,
}

impl TrialOrchestrator {
    pub fn new(model: ModelClient, assembler: ContextAssembler) -> Self {
        Self {
            model,
            assembler,
            retrieval_k: DEFAULT_RETRIEVAL_K,
            event_bus: None,
        }
    }

    pub fn with_retrieval_k(mut self, k: usize) -> Self {
        self.retrieval_k = k;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.model = self.model.with_max_tokens(max_tokens);
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn assembler(&self) -> &ContextAssembler {
        &self.assembler
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }

    /// Run every phase against `case`.
    ///
    /// Invalid configs and cases without chunks are rejected before the case
    /// is touched. Otherwise the previous transcript and verdict are cleared,
    /// and on success the new ones are installed together. On failure the case
    /// is left with no transcript, no verdict and status `Failed`.
    pub async fn run_sim<'c>(
        &self,
        case: &'c mut Case,
        config: &RunConfig,
    ) -> Result<&'c Case, TrialError> {
        config.validate()?;
        if !case.has_chunks() {
            return Err(TrialError::NoChunks(case.id.to_string()));
        }

        case.begin_run();
        info!(
            case_id = %case.id,
            model = %config.model,
            chunks = case.chunks.len(),
            seed = config.seed,
            "Starting simulation"
        );

        match self.run_phases(case, config).await {
            Ok((transcript, verdict)) => {
                let turns = transcript.len();
                case.commit_run(transcript, verdict);
                info!(case_id = %case.id, turns, "Simulation completed");
                self.publish(DomainEvent::RunCompleted {
                    case_id: case.id.to_string(),
                    turns,
                    timestamp: Utc::now(),
                });
                Ok(case)
            }
            Err(e) => {
                warn!(case_id = %case.id, error = %e, "Simulation failed");
                case.fail_run(e.to_string());
                self.publish(DomainEvent::RunFailed {
                    case_id: case.id.to_string(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    /// Ask the model for a structured reading of the case document.
    ///
    /// A previous analysis is only replaced once the new one parses and has a
    /// summary.
    pub async fn analyze<'c>(
        &self,
        case: &'c mut Case,
        config: &RunConfig,
    ) -> Result<&'c CaseAnalysis, TrialError> {
        config.validate()?;
        if !case.has_document() {
            return Err(TrialError::NoChunks(case.id.to_string()));
        }

        let user = prompts::analysis_prompt(&case.title, &case.raw_text);
        let analysis: CaseAnalysis = self
            .model
            .seeded(config.seed)
            .generate_structured(
                &config.model,
                prompts::ANALYST_SYSTEM,
                &user,
                config.temperature,
            )
            .await?;
        analysis.validate()?;

        info!(
            case_id = %case.id,
            key_facts = analysis.key_facts.len(),
            legal_issues = analysis.legal_issues.len(),
            "Case analyzed"
        );
        self.publish(DomainEvent::CaseAnalyzed {
            case_id: case.id.to_string(),
            key_facts: analysis.key_facts.len(),
            timestamp: Utc::now(),
        });
        Ok(case.set_analysis(analysis))
    }

    async fn run_phases(
        &self,
        case: &Case,
        config: &RunConfig,
    ) -> Result<(Vec<Turn>, Verdict), TrialError> {
        let model = self.model.seeded(config.seed);
        let case_id = case.id.to_string();
        let mut log: Vec<Turn> = Vec::new();
        let mut verdict: Option<Verdict> = None;

        for phase in Phase::ALL {
            let query = prompts::retrieval_query(phase);
            let (context, retrieved) = self.assembler.assemble(query, &case.chunks, self.retrieval_k);
            let user = prompts::user_prompt(phase, &context, config);

            debug!(case_id = %case_id, phase = %phase, retrieved, "Phase context assembled");
            self.publish(DomainEvent::PhaseStarted {
                case_id: case_id.clone(),
                phase,
                retrieved_chunks: retrieved,
                timestamp: Utc::now(),
            });

            for &role in speakers(phase) {
                let system = prompts::system_prompt(role);

                let text = if phase == Phase::Verdict {
                    let decided: Verdict = model
                        .generate_structured(&config.model, system, &user, config.temperature)
                        .await?;
                    decided.validate()?;

                    info!(case_id = %case_id, verdict = %decided.verdict, "Verdict reached");
                    self.publish(DomainEvent::VerdictReached {
                        case_id: case_id.clone(),
                        verdict: decided.verdict,
                        timestamp: Utc::now(),
                    });

                    let text = serde_json::json!({
                        "verdict": decided.verdict,
                        "rationale": decided.rationale,
                    })
                    .to_string();
                    verdict = Some(decided);
                    text
                } else {
                    model
                        .generate_text(&config.model, system, &user, config.temperature)
                        .await?
                };

                let turn = add_log(&mut log, phase, role, text);
                debug!(
                    case_id = %case_id,
                    phase = %phase,
                    role = %role,
                    citations = turn.citations.len(),
                    "Turn logged"
                );
                self.publish(DomainEvent::TurnLogged {
                    case_id: case_id.clone(),
                    phase,
                    role,
                    citations: turn.citations.len(),
                    timestamp: Utc::now(),
                });
            }
        }

        let verdict = verdict.ok_or_else(|| TrialError::InvalidVerdict("jury did not report".into()))?;
        Ok((log, verdict))
    }
}

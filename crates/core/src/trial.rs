//! Courtroom vocabulary: phases, roles, transcript turns and verdicts.

use crate::error::TrialError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One stage of the simulated proceeding, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Opening,
    Evidence,
    Cross,
    Closing,
    Verdict,
    Opinion,
}

impl Phase {
    /// All phases in the order a run executes them.
    pub const ALL: [Phase; 6] = [
        Phase::Opening,
        Phase::Evidence,
        Phase::Cross,
        Phase::Closing,
        Phase::Verdict,
        Phase::Opinion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Opening => "opening",
            Phase::Evidence => "evidence",
            Phase::Cross => "cross",
            Phase::Closing => "closing",
            Phase::Verdict => "verdict",
            Phase::Opinion => "opinion",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who speaks in a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialRole {
    Prosecution,
    Defense,
    Jury,
    Judge,
}

impl TrialRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialRole::Prosecution => "Prosecution",
            TrialRole::Defense => "Defense",
            TrialRole::Jury => "Jury",
            TrialRole::Judge => "Judge",
        }
    }
}

impl std::fmt::Display for TrialRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged contribution by one role within one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub phase: Phase,
    pub role: TrialRole,
    pub text: String,
    /// Citation keys (`doc:N`, `kb:ID`) found in `text`.
    #[serde(default)]
    pub citations: BTreeSet<String>,
}

impl Turn {
    /// Citations that point at neither an existing chunk nor a known principle.
    ///
    /// Extraction never validates; this is a read-only report for callers
    /// that want to flag hallucinated references.
    pub fn unresolved_citations<F>(&self, chunk_count: usize, is_principle: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        self.citations
            .iter()
            .filter(|key| {
                if let Some(index) = key.strip_prefix("doc:") {
                    !index.parse::<usize>().is_ok_and(|i| i < chunk_count)
                } else if let Some(id) = key.strip_prefix("kb:") {
                    !is_principle(id)
                } else {
                    true
                }
            })
            .cloned()
            .collect()
    }
}

/// The two verdicts a jury may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictKind {
    Guilty,
    #[serde(rename = "Not Guilty", alias = "NotGuilty")]
    NotGuilty,
}

impl VerdictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictKind::Guilty => "Guilty",
            VerdictKind::NotGuilty => "Not Guilty",
        }
    }
}

impl std::fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The jury's structured decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub verdict: VerdictKind,
    pub rationale: String,
}

impl Verdict {
    /// Reject verdicts with an empty rationale.
    pub fn validate(&self) -> Result<(), TrialError> {
        if self.rationale.trim().is_empty() {
            return Err(TrialError::InvalidVerdict("rationale is empty".into()));
        }
        Ok(())
    }
}

/// Arguments each side is likely to raise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PotentialArguments {
    #[serde(default)]
    pub prosecution: Vec<String>,
    #[serde(default)]
    pub defense: Vec<String>,
}

/// Pre-trial reading of the case document.
///
/// Accepts both `key_facts` and `keyFacts` style keys from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseAnalysis {
    pub summary: String,
    #[serde(default, alias = "keyFacts")]
    pub key_facts: Vec<String>,
    #[serde(default, alias = "legalIssues")]
    pub legal_issues: Vec<String>,
    #[serde(default, alias = "potentialArguments")]
    pub potential_arguments: PotentialArguments,
}

impl CaseAnalysis {
    /// Reject analyses without a summary.
    pub fn validate(&self) -> Result<(), TrialError> {
        if self.summary.trim().is_empty() {
            return Err(TrialError::InvalidAnalysis("summary is empty".into()));
        }
        Ok(())
    }
}

/// How strictly the jury is told to apply the burden of proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardOfProof {
    Lenient,
    Standard,
    Strict,
}

/// Per-run simulation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// 0.0–1.0; selects the jury's standard-of-proof instruction.
    #[serde(default = "default_strictness")]
    pub strictness: f32,

    /// Upper bound on cross-examination turns (question + answer count as two).
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Sampling temperature passed to every model call.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Which model to invoke.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling seed forwarded to the provider.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_strictness() -> f32 {
    0.5
}
fn default_max_turns() -> u32 {
    8
}
fn default_temperature() -> f32 {
    0.3
}
fn default_model() -> String {
    "llama3.1:8b".into()
}
fn default_seed() -> u64 {
    7
}

/// Hard ceiling on question/answer pairs in a cross-examination.
pub const MAX_CROSS_PAIRS: u32 = 4;

impl RunConfig {
    pub fn validate(&self) -> Result<(), TrialError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(TrialError::InvalidConfig(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.strictness) {
            return Err(TrialError::InvalidConfig(
                "strictness must be between 0.0 and 1.0".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(TrialError::InvalidConfig("model must not be empty".into()));
        }
        Ok(())
    }

    /// Number of Q&A pairs each side may use in cross-examination.
    pub fn cross_exam_pairs(&self) -> u32 {
        (self.max_turns / 2).clamp(1, MAX_CROSS_PAIRS)
    }

    pub fn standard_of_proof(&self) -> StandardOfProof {
        if self.strictness < 0.34 {
            StandardOfProof::Lenient
        } else if self.strictness < 0.67 {
            StandardOfProof::Standard
        } else {
            StandardOfProof::Strict
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            strictness: default_strictness(),
            max_turns: default_max_turns(),
            temperature: default_temperature(),
            model: default_model(),
            seed: default_seed(),
        }
    }
}

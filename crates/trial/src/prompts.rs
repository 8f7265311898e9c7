//! Role system prompts, per-phase retrieval queries and user prompts.

use mocktrial_core::trial::{Phase, RunConfig, StandardOfProof, TrialRole};

pub const JUDGE_SYSTEM: &str = "You are a fair, concise judge in an educational courtroom. \
Cite sources as [doc:N] or [kb:ID]. Do not invent facts.";

pub const PROSECUTION_SYSTEM: &str = "You are prosecution counsel. Use only the retrieved context. \
Be persuasive but grounded. Cite sources as [doc:N] or [kb:ID].";

pub const DEFENSE_SYSTEM: &str = "You are defense counsel. Raise reasonable doubt using only the \
retrieved context. Cite sources as [doc:N] or [kb:ID].";

pub const JURY_SYSTEM: &str = "You are the jury foreperson. Weigh both sides briefly and return \
a verdict with citations. Respond with a single JSON object and nothing else.";

pub const ANALYST_SYSTEM: &str = "You are a legal expert preparing a case for an educational \
courtroom simulation. Respond with a single JSON object and nothing else.";

/// Characters of case text sent for analysis.
pub const MAX_ANALYSIS_CHARS: usize = 24_000;

pub fn system_prompt(role: TrialRole) -> &'static str {
    match role {
        TrialRole::Prosecution => PROSECUTION_SYSTEM,
        TrialRole::Defense => DEFENSE_SYSTEM,
        TrialRole::Jury => JURY_SYSTEM,
        TrialRole::Judge => JUDGE_SYSTEM,
    }
}

/// Fixed keyword query used to retrieve chunks for `phase`.
pub fn retrieval_query(phase: Phase) -> &'static str {
    match phase {
        Phase::Opening => "facts issues elements burden doubt",
        Phase::Evidence => "evidence cctv witness marketplace phone number hoodie fingerprints",
        Phase::Cross => "credibility reliability inconsistencies doubt",
        Phase::Closing => "summary closing reasonable doubt burden",
        Phase::Verdict => "weigh evidence verdict",
        Phase::Opinion => "opinion reasoning law facts",
    }
}

fn standard_instruction(standard: StandardOfProof) -> &'static str {
    match standard {
        StandardOfProof::Lenient => {
            "Apply the burden of proof as an ordinary juror would, without demanding certainty."
        }
        StandardOfProof::Standard => {
            "Convict only if guilt is proven beyond reasonable doubt on every element."
        }
        StandardOfProof::Strict => {
            "Apply the burden of proof rigorously: any unexplained gap or unreliable item of \
             evidence on an element is reasonable doubt."
        }
    }
}

/// The user message for one phase, with `context` embedded.
pub fn user_prompt(phase: Phase, context: &str, config: &RunConfig) -> String {
    let task = match phase {
        Phase::Opening => "Case brief (retrieved context below). Write an opening statement \
             (120-180 words).\nFocus on elements to prove, likely evidence, and theory of the case."
            .to_string(),
        Phase::Evidence => "Write an evidence-focused statement (120-180 words). Refer to \
             specific items and why they matter."
            .to_string(),
        Phase::Cross => {
            let pairs = config.cross_exam_pairs();
            format!(
                "Write a short cross-examination (question, then expected answer) that \
                 challenges credibility or reliability.\nLimit to {pairs} Q&A pair{}.",
                if pairs == 1 { "" } else { "s" }
            )
        }
        Phase::Closing => "Write a closing argument (140-200 words) that ties the evidence to \
             your theory."
            .to_string(),
        Phase::Verdict => format!(
            "Summarize strengths and weaknesses for both sides and return a JSON object with:\n\
             {{\n  \"verdict\": \"Guilty\" | \"Not Guilty\",\n  \"rationale\": \"2-4 sentences \
             with citations like [doc:N] or [kb:ID]\"\n}}\n{}",
            standard_instruction(config.standard_of_proof())
        ),
        Phase::Opinion => "As the judge, write a concise opinion (180-250 words) explaining the \
             key reasons.\nUse citations [doc:N]/[kb:ID]."
            .to_string(),
    };

    format!("{task}\nContext:\n{context}\n")
}

/// The user message asking for a structured reading of the case document.
pub fn analysis_prompt(title: &str, text: &str) -> String {
    let excerpt = match text.char_indices().nth(MAX_ANALYSIS_CHARS) {
        Some((cut, _)) => &text[..cut],
        None => text,
    };
    format!(
        "Analyze the following case and return a JSON object with:\n\
         {{\n  \"summary\": \"brief overview of the case\",\n  \
         \"key_facts\": [\"important facts\"],\n  \
         \"legal_issues\": [\"legal questions to resolve\"],\n  \
         \"potential_arguments\": {{\"prosecution\": [\"...\"], \"defense\": [\"...\"]}}\n}}\n\
         Case Title: {title}\n\nCase Details:\n{excerpt}\n"
    )
}

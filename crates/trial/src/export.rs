//! Plain-text transcript export.

use mocktrial_core::case::Case;
use std::fmt::Write;

/// Render the case transcript and verdict as downloadable text.
pub fn render_text(case: &Case) -> String {
    let mut out = format!("Case: {}\n\n", case.title);

    for turn in &case.transcript {
        let _ = write!(
            out,
            "[{}] {}:\n{}\n\n",
            turn.phase.as_str().to_uppercase(),
            turn.role,
            turn.text
        );
    }

    if let Some(verdict) = &case.verdict {
        let pretty = serde_json::to_string_pretty(verdict)
            .unwrap_or_else(|_| format!("{} ({})", verdict.verdict, verdict.rationale));
        out.push_str("VERDICT:\n");
        out.push_str(&pretty);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::add_log;
    use mocktrial_core::trial::{Phase, TrialRole, Verdict, VerdictKind};

    #[test]
    fn empty_case_has_title_only() {
        let case = Case::new("State v. Doe");
        assert_eq!(render_text(&case), "Case: State v. Doe\n\n");
    }

    #[test]
    fn renders_turns_and_verdict() {
        let mut case = Case::new("State v. Doe");
        add_log(&mut case.transcript, Phase::Opening, TrialRole::Prosecution, "We will prove [doc:0].");
        add_log(&mut case.transcript, Phase::Opinion, TrialRole::Judge, "So ordered.");
        case.verdict = Some(Verdict {
            verdict: VerdictKind::NotGuilty,
            rationale: "Doubt remains.".into(),
        });

        let text = render_text(&case);
        assert!(text.starts_with("Case: State v. Doe\n\n[OPENING] Prosecution:\nWe will prove [doc:0].\n\n"));
        assert!(text.contains("[OPINION] Judge:\nSo ordered.\n\n"));
        assert!(text.ends_with(
            "VERDICT:\n{\n  \"verdict\": \"Not Guilty\",\n  \"rationale\": \"Doubt remains.\"\n}"
        ));
    }
}

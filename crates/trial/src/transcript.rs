//! Transcript logging with citation extraction.

use mocktrial_core::trial::{Phase, TrialRole, Turn};
use regex_lite::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(doc:\d+|kb:[^\]]+)\]").expect("citation pattern is valid")
});

/// Every distinct `doc:N` / `kb:ID` key appearing in brackets in `text`.
///
/// Keys are not checked against the chunks or the knowledge base.
pub fn extract_citations(text: &str) -> BTreeSet<String> {
    CITATION
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Append a turn for `role` in `phase`, recording the citations in `text`.
pub fn add_log(
    log: &mut Vec<Turn>,
    phase: Phase,
    role: TrialRole,
    text: impl Into<String>,
) -> &Turn {
    let text = text.into();
    let citations = extract_citations(&text);
    log.push(Turn {
        phase,
        role,
        text,
        citations,
    });
    &log[log.len() - 1]
}

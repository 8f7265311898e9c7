//! Term-overlap ranking of chunks against a query.

use std::collections::HashMap;
use tracing::debug;

use super::normalize::{term_counts, tokens};

/// Dot product of the query's term counts with the chunk's, over query
/// terms only.
pub fn score(query: &str, chunk: &str) -> usize {
    score_counts(&term_counts(query), chunk)
}

fn score_counts(query: &HashMap<String, usize>, chunk: &str) -> usize {
    if query.is_empty() {
        return 0;
    }
    let mut chunk_counts: HashMap<String, usize> = HashMap::new();
    for token in tokens(chunk).filter(|t| query.contains_key(t)) {
        *chunk_counts.entry(token).or_insert(0) += 1;
    }
    chunk_counts
        .iter()
        .map(|(term, count)| query[term] * count)
        .sum()
}

/// The `k` best chunks for `query` as `(index, chunk)` pairs.
///
/// Ranked by descending score, ties broken by ascending index. Chunks scoring
/// zero are never returned, so the result may be shorter than `k` or empty.
pub fn top_k<'a, S: AsRef<str>>(query: &str, chunks: &'a [S], k: usize) -> Vec<(usize, &'a str)> {
    let query_counts = term_counts(query);

    let mut ranked: Vec<(usize, &'a str, usize)> = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let chunk = chunk.as_ref();
            (i, chunk, score_counts(&query_counts, chunk))
        })
        .filter(|(_, _, s)| *s > 0)
        .collect();

    // Stable: equal scores keep index order.
    ranked.sort_by(|a, b| b.2.cmp(&a.2));
    ranked.truncate(k);

    debug!(
        query = %query,
        candidates = chunks.len(),
        hits = ranked.len(),
        "Retrieved chunks"
    );

    ranked.into_iter().map(|(i, chunk, _)| (i, chunk)).collect()
}

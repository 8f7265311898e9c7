//! Grounding context: retrieved chunks followed by the full knowledge base.

use std::sync::Arc;

use crate::knowledge::KnowledgeBase;
use crate::retrieval::top_k;

/// Merges retrieval hits with an injected knowledge base.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    kb: Arc<KnowledgeBase>,
}

impl ContextAssembler {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// `[doc:<i>] <chunk>` for each of the top `k` hits, then every principle
    /// as `[kb:<id>] <title>: <text>`, one per line.
    pub fn make_context<S: AsRef<str>>(&self, query: &str, chunks: &[S], k: usize) -> String {
        self.assemble(query, chunks, k).0
    }

    /// Like [`make_context`](Self::make_context), also returning how many
    /// chunks were retrieved.
    pub(crate) fn assemble<S: AsRef<str>>(
        &self,
        query: &str,
        chunks: &[S],
        k: usize,
    ) -> (String, usize) {
        let hits = top_k(query, chunks, k);
        let mut context = String::new();
        for (i, chunk) in &hits {
            context.push_str(&format!("[doc:{i}] {chunk}\n"));
        }
        context.push_str(&self.kb.render());
        (context, hits.len())
    }
}

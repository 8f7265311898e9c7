//! Lexical retrieval over document chunks.
//!
//! No embeddings: a query and each chunk are reduced to term counts by the
//! normalizer, and chunks are ranked by the dot product of those counts.

pub mod normalize;
pub mod retriever;

pub use normalize::{Tokens, normalize, term_counts, tokens};
pub use retriever::{score, top_k};

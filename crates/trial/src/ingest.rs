//! Document ingestion — text extraction and overlapping chunking.

use mocktrial_core::case::Case;
use mocktrial_core::error::IngestError;
use serde::Serialize;
use std::path::Path;
use tracing::info;

pub const DEFAULT_CHUNK_SIZE: usize = 900;
pub const DEFAULT_CHUNK_OVERLAP: usize = 120;

/// Result of ingesting a document into a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Characters in the extracted text.
    pub chars: usize,
    pub chunks: usize,
}

/// Split `text` into windows of `size` characters advancing by
/// `size - overlap` (or `size` when the overlap is not smaller).
///
/// Carriage returns are removed first; each window is trimmed and empty
/// windows are dropped.
pub fn split_chunks(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().filter(|c| *c != '\r').collect();
    let size = size.max(1);
    let step = if size > overlap { size - overlap } else { size };

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        start += step;
    }
    chunks
}

fn is_pdf_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

/// Read a local document as UTF-8 text (invalid sequences replaced).
pub fn load_text(path: &Path) -> Result<String, IngestError> {
    if is_pdf_name(&path.to_string_lossy()) {
        return Err(IngestError::UnsupportedFormat(
            "PDF documents must be converted to text first".into(),
        ));
    }
    let bytes = std::fs::read(path).map_err(|e| IngestError::ReadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    extract_text(&name, &bytes)
}

/// Decode an uploaded document.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, IngestError> {
    if is_pdf_name(filename) || bytes.starts_with(b"%PDF") {
        return Err(IngestError::UnsupportedFormat(format!(
            "{filename}: PDF documents must be converted to text first"
        )));
    }
    let text = String::from_utf8_lossy(bytes).into_owned();
    if text.trim().is_empty() {
        return Err(IngestError::EmptyDocument);
    }
    Ok(text)
}

/// Chunk `text` and install it as the case document.
pub fn ingest_text(
    case: &mut Case,
    text: impl Into<String>,
    size: usize,
    overlap: usize,
) -> Result<IngestSummary, IngestError> {
    let text = text.into();
    if text.trim().is_empty() {
        return Err(IngestError::EmptyDocument);
    }

    let chunks = split_chunks(&text, size, overlap);
    let summary = IngestSummary {
        chars: text.chars().count(),
        chunks: chunks.len(),
    };
    case.ingest(text, chunks);

    info!(
        case_id = %case.id,
        chars = summary.chars,
        chunks = summary.chunks,
        "Document ingested"
    );
    Ok(summary)
}

pub mod pdf;
pub mod splitter;

pub use splitter::{split_text, Chunk, CHUNK_OVERLAP, CHUNK_SIZE};

use anyhow::{anyhow, Result};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Document {
    pub source: String,
    pub text: String,
}

/// Load a document from disk. A file that does not parse as its claimed
/// format is an error for the caller to surface; there is no recovery.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => pdf::extract_text(path)?,
        "txt" | "md" => std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?,
        other => {
            return Err(anyhow!(
                "Unsupported document format '{}' (expected pdf, txt or md)",
                other
            ))
        }
    };

    if text.trim().is_empty() {
        return Err(anyhow!("Document {} produced no text", source));
    }

    Ok(Document { source, text })
}

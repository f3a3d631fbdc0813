use anyhow::{anyhow, Result};
use std::path::Path;

pub fn extract_text(path: &Path) -> Result<String> {
    pdf_extract::extract_text(path)
        .map_err(|e| anyhow!("Failed to extract text from {}: {}", path.display(), e))
}

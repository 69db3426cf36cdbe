use anyhow::Context;
use profile_image_core::CandidateFile;
use std::path::Path;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Media type for `path`: the explicit override if given, else a guess from the extension.
pub fn content_type_for(path: &Path, content_type: Option<&str>) -> String {
    match content_type {
        Some(ct) => ct.to_string(),
        None => mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

/// Read a file from disk into a [`CandidateFile`] named after its final path component.
pub async fn read_candidate(path: &Path, content_type: Option<&str>) -> anyhow::Result<CandidateFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file name: {}", path.display()))?;

    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(CandidateFile::new(
        name,
        content_type_for(path, content_type),
        data,
    ))
}

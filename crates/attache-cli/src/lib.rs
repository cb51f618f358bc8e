use anyhow::Context;
use attache_core::MediaResponse;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::path::Path;

/// Read a local file and base64 encode it for a create or update request.
pub fn encode_file(path: &Path) -> anyhow::Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(STANDARD.encode(bytes))
}

/// Render an envelope as pretty JSON.
pub fn render<T: Serialize>(response: &MediaResponse<T>) -> anyhow::Result<String> {
    serde_json::to_string_pretty(response).context("Serialize response")
}

/// Process exit code for an envelope.
pub fn exit_code<T>(response: &MediaResponse<T>) -> i32 {
    if response.is_success() {
        0
    } else {
        1
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_file_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello world").unwrap();

        assert_eq!(encode_file(&path).unwrap(), "aGVsbG8gd29ybGQ=");
        assert!(encode_file(&dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn exit_code_follows_success() {
        assert_eq!(exit_code(&MediaResponse::ok(1)), 0);
        assert_eq!(exit_code(&MediaResponse::<()>::failure(404, "No media found.")), 1);
    }

    #[test]
    fn render_includes_status() {
        let out = render(&MediaResponse::<()>::failure(404, "No media found.")).unwrap();
        assert!(out.contains("\"status\": 404"));
        assert!(out.contains("No media found."));
    }
}

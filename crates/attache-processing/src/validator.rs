use attache_core::AppError;

/// Validation errors for untrusted uploads
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),

    #[error("Content does not match extension {extension} (detected: {detected})")]
    ContentMismatch { extension: String, detected: String },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidFilename(msg) => AppError::InvalidFilename(msg),
            ValidationError::UnsupportedExtension(ext) => AppError::UnsupportedExtension(ext),
            err @ ValidationError::ContentMismatch { .. } => {
                AppError::ContentMismatch(err.to_string())
            }
        }
    }
}

/// Whitelisted extensions and the MIME types their content may sniff as.
pub const ALLOWED_TYPES: &[(&str, &[&str])] = &[
    (".png", &["image/png"]),
    (".jpg", &["image/jpeg"]),
    (".jpeg", &["image/jpeg"]),
    (".gif", &["image/gif"]),
    (".webp", &["image/webp"]),
    (".bmp", &["image/bmp"]),
    (".svg", &["image/svg+xml"]),
    (".txt", &["text/plain"]),
    (".json", &["application/json"]),
];

/// Textual formats that commonly carry no magic bytes.
const MAGICLESS_EXTENSIONS: &[&str] = &[".txt", ".json"];

fn normalize_extension(extension: &str) -> String {
    format!(
        ".{}",
        extension.trim_start_matches('.').to_ascii_lowercase()
    )
}

/// Allowed MIME types for an extension (with or without the dot, any case).
pub fn allowed_mime_types(extension: &str) -> Option<&'static [&'static str]> {
    let ext = normalize_extension(extension);
    ALLOWED_TYPES
        .iter()
        .find(|(allowed, _)| *allowed == ext)
        .map(|(_, mimes)| *mimes)
}

pub fn is_allowed_extension(extension: &str) -> bool {
    allowed_mime_types(extension).is_some()
}

const SVG_EXTENSION: &str = ".svg";

// Skip one leading `<?...?>`, `<!--...-->` or `<!DOCTYPE ...>` node.
fn skip_prolog_node(text: &str) -> Option<&str> {
    let close = if text.starts_with("<?") {
        "?>"
    } else if text.starts_with("<!--") {
        "-->"
    } else if text.get(..9).is_some_and(|head| head.eq_ignore_ascii_case("<!doctype")) {
        ">"
    } else {
        return None;
    };
    text.find(close).map(|at| &text[at + close.len()..])
}

// The document root must be <svg>; prolog, comments and doctype may precede it.
fn is_svg_document(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(8192)];
    let text = match std::str::from_utf8(window) {
        Ok(t) => t,
        Err(e) => match std::str::from_utf8(&window[..e.valid_up_to()]) {
            Ok(t) => t,
            Err(_) => return false,
        },
    };

    let mut rest = text.trim_start_matches('\u{feff}').trim_start();
    while let Some(after) = skip_prolog_node(rest) {
        rest = after.trim_start();
    }

    let Some(head) = rest.get(..4) else {
        return false;
    };
    head.eq_ignore_ascii_case("<svg")
        && rest[4..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_whitespace() || c == '>' || c == '/')
}

/// Classify a buffer by its leading bytes. `None` means unknown.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

// SVG has no magic bytes, so it is recognized only when it was declared.
fn detect_mime(buffer: &[u8], ext: &str) -> Option<&'static str> {
    let sniffed = sniff_mime(buffer);
    if ext != SVG_EXTENSION {
        return sniffed;
    }
    match sniffed {
        None | Some("text/xml") | Some("application/xml") | Some("text/html")
            if is_svg_document(buffer) =>
        {
            Some("image/svg+xml")
        }
        other => other,
    }
}

/// Confirm that `buffer` really is one of the types whitelisted for `extension`.
///
/// An unknown sniff result passes only for `.txt` and `.json`. SVG markup is
/// only recognized for `.svg`, and only when `<svg` is the document root.
pub fn validate_content_type(buffer: &[u8], extension: &str) -> Result<(), ValidationError> {
    let ext = normalize_extension(extension);
    let allowed = allowed_mime_types(&ext)
        .ok_or_else(|| ValidationError::UnsupportedExtension(ext.clone()))?;

    match detect_mime(buffer, &ext) {
        Some(detected) if allowed.contains(&detected) => Ok(()),
        None if MAGICLESS_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        detected => {
            let detected = detected.unwrap_or("unknown").to_string();
            tracing::warn!(
                extension = %ext,
                detected_mime = %detected,
                size = buffer.len(),
                "Upload content does not match its extension"
            );
            Err(ValidationError::ContentMismatch {
                extension: ext,
                detected,
            })
        }
    }
}

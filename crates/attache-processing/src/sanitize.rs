//! Filename sanitizing and display-name policy.

use crate::validator::{is_allowed_extension, ValidationError};

const DANGEROUS_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

fn is_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x1F | 0x7F)
}

fn sanitize_pass(name: &str) -> String {
    let without_nul: String = name.chars().filter(|&c| c != '\0').collect();
    let without_separators: String = without_nul
        .chars()
        .filter(|&c| c != '/' && c != '\\')
        .collect();
    let without_leading_dots = without_separators.trim_start_matches('.');
    let without_traversal = without_leading_dots.replace("..", "");

    without_traversal
        .chars()
        .filter(|&c| !is_control(c))
        .filter(|c| !DANGEROUS_CHARS.contains(c))
        .collect()
}

/// Strip traversal sequences and dangerous characters from a user-supplied filename.
///
/// Steps, in order: drop NUL bytes, drop `/` and `\`, strip leading dots, remove every
/// `..`, drop control characters, drop `< > : " | ? *`, truncate to `max_length`
/// characters. Removing a character can glue two dots back together (`a.\x01.b`), so
/// the steps are repeated until the name stops changing. Fails only when nothing is
/// left.
pub fn sanitize_filename(name: &str, max_length: usize) -> Result<String, ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::InvalidFilename(
            "Filename must be a non-empty string".to_string(),
        ));
    }

    let mut sanitized = sanitize_pass(name);
    loop {
        let next = sanitize_pass(&sanitized);
        if next == sanitized {
            break;
        }
        sanitized = next;
    }

    let sanitized: String = sanitized.chars().take(max_length).collect();

    if sanitized.is_empty() {
        tracing::warn!(
            original_length = name.len(),
            "Filename empty after sanitizing, possible traversal attempt"
        );
        return Err(ValidationError::InvalidFilename(
            "Filename is invalid or empty after sanitization".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Lower-cased extension including the leading dot, if the name has a non-empty stem.
pub fn file_extension(name: &str) -> Option<String> {
    let idx = name.rfind('.')?;
    if idx == 0 || idx == name.len() - 1 {
        return None;
    }
    Some(name[idx..].to_ascii_lowercase())
}

/// Display-name policy applied to the raw caller filename.
///
/// The name may not contain path separators, must contain exactly one period and
/// its extension must be whitelisted. Returns the lower-cased extension.
pub fn check_display_name(name: &str) -> Result<String, ValidationError> {
    if name.contains('/') || name.contains('\\') {
        return Err(ValidationError::InvalidFilename(format!(
            "{} contains a path separator",
            name
        )));
    }

    let periods = name.chars().filter(|&c| c == '.').count();
    if periods != 1 {
        return Err(ValidationError::InvalidFilename(format!(
            "{} must contain exactly one period, found {}",
            name, periods
        )));
    }

    let extension = file_extension(name).ok_or_else(|| {
        ValidationError::InvalidFilename(format!("{} has no usable extension", name))
    })?;

    if !is_allowed_extension(&extension) {
        return Err(ValidationError::InvalidFilename(format!(
            "{} has a disallowed extension",
            name
        )));
    }

    Ok(extension)
}

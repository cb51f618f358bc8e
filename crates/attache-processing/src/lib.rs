//! Attache Processing Library
//!
//! Pure, I/O-free checks applied to untrusted uploads before anything touches disk:
//! display-name policy, filename sanitizing and magic-byte content validation.

pub mod sanitize;
pub mod validator;

pub use sanitize::{check_display_name, file_extension, sanitize_filename};
pub use validator::{
    allowed_mime_types, is_allowed_extension, sniff_mime, validate_content_type,
    ValidationError, ALLOWED_TYPES,
};

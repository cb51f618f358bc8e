use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Storage category of an upload, derived from its extension.
///
/// The category doubles as the subfolder name under the uploads root and as the
/// middle segment of the logical path (`/uploads/<category>/<name>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Images,
    Text,
    Json,
    Others,
}

impl MediaCategory {
    /// Map a file extension (with or without the leading dot, any case) to its category.
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "svg" => MediaCategory::Images,
            "txt" => MediaCategory::Text,
            "json" => MediaCategory::Json,
            _ => MediaCategory::Others,
        }
    }

    /// Subfolder name under the uploads root.
    pub fn folder(&self) -> &'static str {
        match self {
            MediaCategory::Images => "images",
            MediaCategory::Text => "text",
            MediaCategory::Json => "json",
            MediaCategory::Others => "others",
        }
    }

    /// Parse a subfolder name back into a category.
    pub fn from_folder(folder: &str) -> Option<Self> {
        match folder {
            "images" => Some(MediaCategory::Images),
            "text" => Some(MediaCategory::Text),
            "json" => Some(MediaCategory::Json),
            "others" => Some(MediaCategory::Others),
            _ => None,
        }
    }

    pub fn all() -> [MediaCategory; 4] {
        [
            MediaCategory::Images,
            MediaCategory::Text,
            MediaCategory::Json,
            MediaCategory::Others,
        ]
    }
}

impl Display for MediaCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.folder())
    }
}

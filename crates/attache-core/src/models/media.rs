use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::constants::LIVE;
use crate::AppError;

/// Durable media record (one row of the `media` table).
///
/// `filename` is the sanitized display name; `filepath` is the logical path
/// `/uploads/<category>/<random-hex><ext>` and the only link to the bytes on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct MediaRecord {
    pub id: i64,
    pub container_id: i64,
    pub filename: String,
    pub filepath: String,
    pub file_size: i64,
    pub video_length: Option<f64>,
    pub create_date_utc: DateTime<Utc>,
    pub update_date_utc: Option<DateTime<Utc>>,
    pub delete_date_utc: Option<DateTime<Utc>>,
    pub deleted: i16,
}

impl MediaRecord {
    pub fn is_live(&self) -> bool {
        self.deleted == LIVE
    }
}

/// Row to insert; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMediaRecord {
    pub container_id: i64,
    pub filename: String,
    pub filepath: String,
    pub file_size: i64,
    pub video_length: Option<f64>,
    pub create_date_utc: DateTime<Utc>,
}

/// Full set of mutable columns written by an update.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUpdate {
    pub filename: String,
    pub filepath: String,
    pub file_size: i64,
    pub video_length: Option<f64>,
    pub update_date_utc: DateTime<Utc>,
}

/// Caller-supplied metadata for a new media record.
///
/// There is no `filepath` field: a client-provided path is dropped
/// during deserialization and the stored path always comes from the storage writer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateMediaRequest {
    pub container_id: i64,
    pub filename: String,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub video_length: Option<f64>,
    /// Optional file content, base64 encoded. Absent means a metadata-only record.
    #[serde(default)]
    pub base64: Option<String>,
    #[serde(default)]
    pub create_date_utc: Option<DateTime<Utc>>,
}

impl CreateMediaRequest {
    /// Parse an untyped request body, rejecting `null` and malformed shapes.
    pub fn from_json(value: &JsonValue) -> Result<Self, AppError> {
        if value.is_null() {
            return Err(AppError::InvalidArgument("Media is not given.".to_string()));
        }

        let request: CreateMediaRequest = serde_json::from_value(value.clone())
            .map_err(|e| AppError::InvalidArgument(format!("Invalid parameters: {}", e)))?;
        request.validate()?;
        Ok(request)
    }

    /// Check required fields before any component runs.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.filename.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "filename is required".to_string(),
            ));
        }
        if matches!(self.file_size, Some(size) if size < 0) {
            return Err(AppError::InvalidArgument(
                "file_size must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// The payload to decode, treating an empty string as absent.
    pub fn payload(&self) -> Option<&str> {
        self.base64.as_deref().filter(|b| !b.is_empty())
    }
}

/// Caller-supplied changes to an existing record. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMediaRequest {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub video_length: Option<f64>,
    #[serde(default)]
    pub base64: Option<String>,
}

impl UpdateMediaRequest {
    pub fn from_json(value: &JsonValue) -> Result<Self, AppError> {
        if value.is_null() {
            return Err(AppError::InvalidArgument("Missing parameters.".to_string()));
        }

        let request: UpdateMediaRequest = serde_json::from_value(value.clone())
            .map_err(|e| AppError::InvalidArgument(format!("Invalid parameters: {}", e)))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if matches!(self.filename.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(AppError::InvalidArgument(
                "filename must not be empty".to_string(),
            ));
        }
        if matches!(self.file_size, Some(size) if size < 0) {
            return Err(AppError::InvalidArgument(
                "file_size must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn payload(&self) -> Option<&str> {
        self.base64.as_deref().filter(|b| !b.is_empty())
    }
}

/// Returned in the create envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedMedia {
    pub id: i64,
    pub filepath: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_null_is_invalid_argument() {
        let err = CreateMediaRequest::from_json(&JsonValue::Null).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_from_json_drops_client_filepath() {
        let request = CreateMediaRequest::from_json(&json!({
            "container_id": 1,
            "filename": "notes.txt",
            "filepath": "/etc/passwd",
            "file_size": 11
        }))
        .unwrap();

        assert_eq!(request.container_id, 1);
        assert_eq!(request.filename, "notes.txt");
        assert_eq!(request.file_size, Some(11));
        assert!(request.base64.is_none());
    }

    #[test]
    fn test_from_json_requires_container_and_filename() {
        let err = CreateMediaRequest::from_json(&json!({ "filename": "notes.txt" })).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let err = CreateMediaRequest::from_json(&json!({ "container_id": 1, "filename": "  " }))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_negative_file_size_rejected() {
        let request = CreateMediaRequest {
            container_id: 1,
            filename: "a.txt".into(),
            file_size: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            request.validate(),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_empty_payload_is_absent() {
        let request = CreateMediaRequest {
            container_id: 1,
            filename: "a.txt".into(),
            base64: Some(String::new()),
            ..Default::default()
        };
        assert!(request.payload().is_none());
    }

    #[test]
    fn test_update_request_from_json() {
        let request = UpdateMediaRequest::from_json(&json!({ "filename": "new.jpg" })).unwrap();
        assert_eq!(request.filename.as_deref(), Some("new.jpg"));
        assert!(request.file_size.is_none());

        assert!(UpdateMediaRequest::from_json(&JsonValue::Null).is_err());
        assert!(UpdateMediaRequest::from_json(&json!({ "filename": "" })).is_err());
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorMetadata};

/// Uniform result envelope returned by every caller-facing media operation.
///
/// Operations never return `Err` to the boundary layer; failures are folded into
/// `success = false` with a status code and a client-safe `error` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaResponse<T> {
    pub success: bool,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> MediaResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            status: 200,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn ok_with_message(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            status: 200,
            data,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(status: u16, error: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }

    /// Build a failure envelope exposing only the client-safe message.
    pub fn from_error(err: &AppError) -> Self {
        Self::failure(err.http_status_code(), err.client_message())
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

//! Request/response models for the intake endpoint.

use serde::{Deserialize, Serialize};

/// JSON body returned to the upload web page, matching what it already expects.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn received(filename: &str) -> Self {
        Self {
            success: true,
            message: Some("File received".to_string()),
            filename: Some(filename.to_string()),
            error: None,
        }
    }

    pub fn failure(error: &str) -> Self {
        Self {
            success: false,
            message: None,
            filename: None,
            error: Some(error.to_string()),
        }
    }
}

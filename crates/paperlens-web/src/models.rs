use serde::{Deserialize, Serialize};

/// Body of `POST /api/extract/text`.
#[derive(Debug, Clone, Deserialize)]
pub struct PastedText {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

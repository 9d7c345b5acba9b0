use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;

/// Form field that carries the document.
pub const FILE_FIELD: &str = "file";

/// An uploaded file with its data and metadata.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Why a multipart upload could not be read.
#[derive(Debug)]
pub struct UploadError {
    pub status: StatusCode,
    pub message: String,
}

impl UploadError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn from_multipart(context: &str, err: MultipartError) -> Self {
        let status = err.status();
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "Uploaded file is too large".to_string()
        } else {
            format!("{}: {}", context, err.body_text())
        };
        Self { status, message }
    }
}

/// Parse a multipart form upload and return the `file` field.
///
/// Unknown fields are drained and ignored. A missing filename is allowed;
/// the format is then decided from the file's leading bytes alone.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadedFile, UploadError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::from_multipart("Failed to read form field", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            FILE_FIELD => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| UploadError::from_multipart("Failed to read file data", e))?
                    .to_vec();
                file = Some(UploadedFile { filename, data });
            }
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
            }
        }
    }

    file.ok_or_else(|| UploadError::bad_request("No file uploaded"))
}

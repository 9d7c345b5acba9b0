use paperlens_extract::Extractor;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub extractor: Extractor,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(extractor: Extractor, max_upload_bytes: usize) -> Self {
        Self {
            extractor,
            max_upload_bytes,
        }
    }
}

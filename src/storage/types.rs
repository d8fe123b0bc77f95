//! Types for storage operations

use serde::{Deserialize, Serialize};

/// Options for uploading a file
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    /// Cache control header, in seconds
    pub cache_control: Option<String>,

    /// Content type of the uploaded part
    pub content_type: Option<String>,
}

impl FileOptions {
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }
}

/// Response to a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// `{bucket}/{path}` of the stored object
    #[serde(rename = "Key")]
    pub key: String,
}

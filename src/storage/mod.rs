//! Storage operations for check-in photos and videos

mod types;

use log::debug;
use reqwest::{multipart, Client};
use std::path::Path;

use crate::error::{Error, Result};
use crate::fetch::{check_status, CLIENT_INFO};

pub use types::*;

/// Client for object storage
#[derive(Debug, Clone)]
pub struct StorageClient {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// Bearer token of the signed-in user, if any
    token: Option<String>,

    /// HTTP client used for requests
    client: Client,
}

/// Client for a specific storage bucket
pub struct BucketClient<'a> {
    storage: &'a StorageClient,
    bucket_id: String,
}

impl StorageClient {
    pub(crate) fn new(url: &str, key: &str, token: Option<String>, client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            token,
            client,
        }
    }

    fn get_url(&self, path: &str) -> String {
        format!("{}/storage/v1{}", self.url, path)
    }

    fn bearer(&self) -> &str {
        self.token.as_deref().unwrap_or(&self.key)
    }

    /// Get a client for a specific bucket
    pub fn from(&self, bucket_id: &str) -> BucketClient<'_> {
        BucketClient {
            storage: self,
            bucket_id: bucket_id.to_string(),
        }
    }
}

impl<'a> BucketClient<'a> {
    /// Upload bytes to `path` inside the bucket
    pub async fn upload(
        &self,
        path: &str,
        file_data: Vec<u8>,
        options: FileOptions,
    ) -> Result<UploadResponse> {
        let url = self
            .storage
            .get_url(&format!("/object/{}/{}", self.bucket_id, path));
        let size = file_data.len();

        let file_name = Path::new(path)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());
        let mut part = multipart::Part::bytes(file_data).file_name(file_name);
        if let Some(content_type) = &options.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| Error::storage(format!("invalid content type {}: {}", content_type, e)))?;
        }
        let form = multipart::Form::new().part("file", part);

        debug!("Uploading {} bytes to {}/{}", size, self.bucket_id, path);

        let response = self
            .storage
            .client
            .post(&url)
            .header("apikey", &self.storage.key)
            .header("Authorization", format!("Bearer {}", self.storage.bearer()))
            .header("X-Client-Info", CLIENT_INFO)
            .header(
                "Cache-Control",
                options.cache_control.unwrap_or_else(|| "3600".to_string()),
            )
            .multipart(form)
            .send()
            .await?;

        let response = check_status(response)
            .await
            .map_err(|e| Error::storage(format!("Upload of {} failed: {}", path, e)))?;
        Ok(response.json::<UploadResponse>().await?)
    }

    /// Get the public URL for an object of a public bucket
    pub fn get_public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.storage.url, self.bucket_id, path
        )
    }

    /// Object path behind a public URL of this bucket, if it is one
    pub fn object_path(&self, public_url: &str) -> Option<String> {
        public_url
            .strip_prefix(&self.get_public_url(""))
            .filter(|path| !path.is_empty())
            .map(str::to_string)
    }
}

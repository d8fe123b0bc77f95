//! Captured photos and videos, and their upload to the media bucket

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::MediaKind;
use crate::storage::{BucketClient, FileOptions};

const CONTENT_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("m4v", "video/x-m4v"),
];

/// MIME type for a file extension, if it is a supported image or video
pub fn content_type_for(extension: &str) -> Option<&'static str> {
    let extension = extension.to_ascii_lowercase();
    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
}

/// File extension for a MIME type
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    CONTENT_TYPES
        .iter()
        .find(|(_, ct)| *ct == content_type)
        .map(|(ext, _)| *ext)
}

/// How a media item appears in exports and session blobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// A photo or video with its bytes held in memory until uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: String,
    pub kind: MediaKind,
    pub file_name: String,
    pub content_type: String,
    data: Vec<u8>,
    /// Public URL once the item lives in the bucket
    pub url: Option<String>,
}

impl MediaItem {
    /// Wrap captured bytes. Only images and videos are accepted.
    pub fn new(file_name: &str, content_type: &str, data: Vec<u8>) -> Result<Self> {
        let kind = MediaKind::from_content_type(content_type).ok_or_else(|| {
            Error::validation(format!(
                "{} is not an image or video ({})",
                file_name, content_type
            ))
        })?;
        Ok(MediaItem {
            id: Uuid::new_v4().to_string(),
            kind,
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            data,
            url: None,
        })
    }

    /// Wrap bytes, guessing the content type from the file name
    pub fn from_bytes(file_name: &str, data: Vec<u8>) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        let content_type = content_type_for(extension).ok_or_else(|| {
            Error::validation(format!("unsupported media file {}", file_name))
        })?;
        Self::new(file_name, content_type, data)
    }

    /// Read a photo or video from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "media".to_string());
        Self::from_bytes(&file_name, data)
    }

    /// Decode an inline `data:<type>;base64,<payload>` URL
    pub fn from_data_url(data_url: &str) -> Result<Self> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| Error::validation("not a data URL"))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::validation("data URL has no payload"))?;
        let content_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| Error::validation("only base64 data URLs are supported"))?;
        let data = STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::validation(format!("invalid base64 payload: {}", e)))?;
        let file_name = format!("media.{}", extension_for(content_type).unwrap_or("bin"));
        Self::new(&file_name, content_type, data)
    }

    /// Rebuild an item from its exported form. Remote items carry no bytes.
    pub fn from_ref(media: &MediaRef) -> Result<Self> {
        if media.url.starts_with("data:") {
            let mut item = Self::from_data_url(&media.url)?;
            item.kind = media.kind;
            return Ok(item);
        }
        let file_name = media
            .url
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("media")
            .to_string();
        let content_type = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(content_type_for)
            .unwrap_or(match media.kind {
                MediaKind::Image => "image/jpeg",
                MediaKind::Video => "video/mp4",
            });
        Ok(MediaItem {
            id: Uuid::new_v4().to_string(),
            kind: media.kind,
            file_name,
            content_type: content_type.to_string(),
            data: Vec::new(),
            url: Some(media.url.clone()),
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_uploaded(&self) -> bool {
        self.url.is_some()
    }

    /// Extension used for the stored object
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .or_else(|| extension_for(&self.content_type).map(str::to_string))
            .unwrap_or_else(|| "bin".to_string())
    }

    /// The bytes as an inline data URL
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.data))
    }

    /// Exported form: the public URL when uploaded, inline bytes otherwise
    pub fn to_ref(&self) -> MediaRef {
        MediaRef {
            url: self.url.clone().unwrap_or_else(|| self.data_url()),
            kind: self.kind,
        }
    }

    /// Upload the bytes to `{prefix}/{uuid}.{ext}` and remember the public
    /// URL. Returns the object path, or `None` if the item was already
    /// uploaded.
    ///
    /// The in-memory bytes are released only once the upload succeeded, so a
    /// failed call can be retried.
    pub async fn upload(&mut self, bucket: &BucketClient<'_>, prefix: &str) -> Result<Option<String>> {
        if self.is_uploaded() {
            return Ok(None);
        }
        let path = format!("{}/{}.{}", prefix, Uuid::new_v4(), self.extension());
        debug!("Uploading {} ({}) as {}", self.file_name, self.kind, path);

        let options = FileOptions::default().with_content_type(&self.content_type);
        bucket.upload(&path, self.data.clone(), options).await?;
        self.url = Some(bucket.get_public_url(&path));
        self.data = Vec::new();
        Ok(Some(path))
    }

    /// Object path of an uploaded item. URLs outside the bucket are kept as-is.
    pub fn stored_path(&self, bucket: &BucketClient<'_>) -> Option<String> {
        let url = self.url.as_deref()?;
        Some(bucket.object_path(url).unwrap_or_else(|| url.to_string()))
    }
}

/// Ordered list of media items attached to a form field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaList {
    items: Vec<MediaItem>,
}

impl MediaList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item and return its id
    pub fn add(&mut self, item: MediaItem) -> String {
        let id = item.id.clone();
        self.items.push(item);
        id
    }

    /// Remove an item; its buffer is freed when the returned value is dropped
    pub fn remove(&mut self, id: &str) -> Option<MediaItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Replace an item in place, keeping its position
    pub fn replace(&mut self, id: &str, mut item: MediaItem) -> Option<MediaItem> {
        let slot = self.items.iter_mut().find(|existing| existing.id == id)?;
        item.id = id.to_string();
        Some(std::mem::replace(slot, item))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaItem> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MediaItem> {
        self.items.iter_mut()
    }

    pub fn refs(&self) -> Vec<MediaRef> {
        self.items.iter().map(MediaItem::to_ref).collect()
    }

    /// Rebuild a list from exported references
    pub fn from_refs(refs: &[MediaRef]) -> Result<Self> {
        let items = refs.iter().map(MediaItem::from_ref).collect::<Result<Vec<_>>>()?;
        Ok(MediaList { items })
    }

    /// Upload every item not yet in the bucket. Returns how many were sent.
    pub async fn upload_all(&mut self, bucket: &BucketClient<'_>, prefix: &str) -> Result<usize> {
        let mut uploaded = 0;
        for item in self.items.iter_mut() {
            if item.upload(bucket, prefix).await?.is_some() {
                uploaded += 1;
            }
        }
        Ok(uploaded)
    }

    /// Object paths and kinds of every item already stored, whether uploaded
    /// by this list or imported as a remote reference
    pub fn stored(&self, bucket: &BucketClient<'_>) -> Vec<(String, MediaKind)> {
        self.items
            .iter()
            .filter_map(|item| Some((item.stored_path(bucket)?, item.kind)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_extension() {
        let item = MediaItem::from_bytes("walkaround.MOV", vec![1, 2, 3]).unwrap();
        assert_eq!(item.kind, MediaKind::Video);
        assert_eq!(item.content_type, "video/quicktime");
        assert_eq!(item.extension(), "mov");
        assert!(MediaItem::from_bytes("invoice.pdf", vec![]).is_err());
    }

    #[test]
    fn reads_media_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tyre.webp");
        std::fs::write(&file, b"webp").unwrap();

        let item = MediaItem::from_path(&file).unwrap();
        assert_eq!(item.file_name, "tyre.webp");
        assert_eq!(item.content_type, "image/webp");
        assert_eq!(item.data(), b"webp");
        assert!(matches!(
            MediaItem::from_path(dir.path().join("missing.jpg")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn data_url_round_trip() {
        let item = MediaItem::new("dent.png", "image/png", b"png-bytes".to_vec()).unwrap();
        let exported = item.to_ref();
        assert!(exported.url.starts_with("data:image/png;base64,"));

        let back = MediaItem::from_ref(&exported).unwrap();
        assert_eq!(back.data(), b"png-bytes");
        assert_eq!(back.kind, MediaKind::Image);
        assert_eq!(back.to_ref(), exported);
    }

    #[test]
    fn remote_ref_keeps_url() {
        let media = MediaRef {
            url: "https://proj.example/storage/v1/object/public/checkin-media/checkins/k/exterior/a.jpg"
                .to_string(),
            kind: MediaKind::Image,
        };
        let item = MediaItem::from_ref(&media).unwrap();
        assert!(item.is_uploaded());
        assert!(item.data().is_empty());
        assert_eq!(item.to_ref(), media);
    }

    #[test]
    fn stored_lists_remote_and_skips_pending_items() {
        let storage = crate::storage::StorageClient::new(
            "https://proj.example",
            "anon",
            None,
            reqwest::Client::new(),
        );
        let bucket = storage.from("checkin-media");

        let mut list = MediaList::new();
        list.add(MediaItem::from_bytes("new.jpg", vec![1, 2]).unwrap());
        list.add(
            MediaItem::from_ref(&MediaRef {
                url: bucket.get_public_url("checkins/k0/exterior/a.jpg"),
                kind: MediaKind::Image,
            })
            .unwrap(),
        );
        list.add(
            MediaItem::from_ref(&MediaRef {
                url: "https://cdn.example/clip.mp4".to_string(),
                kind: MediaKind::Video,
            })
            .unwrap(),
        );

        assert_eq!(
            list.stored(&bucket),
            vec![
                ("checkins/k0/exterior/a.jpg".to_string(), MediaKind::Image),
                ("https://cdn.example/clip.mp4".to_string(), MediaKind::Video),
            ]
        );
    }

    #[test]
    fn malformed_data_urls_are_rejected() {
        assert!(MediaItem::from_data_url("https://x/y.jpg").is_err());
        assert!(MediaItem::from_data_url("data:image/png;base64").is_err());
        assert!(MediaItem::from_data_url("data:image/png,raw").is_err());
        assert!(MediaItem::from_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn list_remove_and_replace() {
        let mut list = MediaList::new();
        let first = list.add(MediaItem::from_bytes("a.jpg", vec![0; 16]).unwrap());
        let second = list.add(MediaItem::from_bytes("b.jpg", vec![1; 16]).unwrap());

        let old = list
            .replace(&first, MediaItem::from_bytes("c.mp4", vec![2; 4]).unwrap())
            .unwrap();
        assert_eq!(old.file_name, "a.jpg");
        assert_eq!(list.iter().next().unwrap().id, first);
        assert_eq!(list.iter().next().unwrap().kind, MediaKind::Video);

        assert!(list.remove(&second).is_some());
        assert!(list.remove(&second).is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn media_ref_uses_type_key() {
        let value = serde_json::to_value(MediaRef {
            url: "u".to_string(),
            kind: MediaKind::Video,
        })
        .unwrap();
        assert_eq!(value, serde_json::json!({ "url": "u", "type": "video" }));
    }
}

//! Object storage for gallery media and team avatars.
//!
//! Media rows persist the object path; public URLs are derived from it on read.

mod local;
mod remote;

pub use local::LocalStorage;
pub use remote::RemoteStorage;

use std::path::Path;
use std::sync::Arc;

use axum::body::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const PROJECT_MEDIA_BUCKET: &str = "project-media";
pub const TEAM_AVATARS_BUCKET: &str = "team-avatars";

/// Upload ceiling enforced before any bytes leave the process.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoredObject {
    pub url: String,
    pub path: String,
    pub mime: String,
    pub size: i64,
}

pub enum StorageBackend {
    Local(LocalStorage),
    Remote(RemoteStorage),
}

#[derive(Clone)]
pub struct StorageService {
    backend: Arc<StorageBackend>,
    max_upload_bytes: usize,
}

impl StorageService {
    pub fn new(backend: StorageBackend) -> Self {
        Self {
            backend: Arc::new(backend),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Directory served under `/storage` when objects live on local disk.
    pub fn local_root(&self) -> Option<&Path> {
        match self.backend.as_ref() {
            StorageBackend::Local(local) => Some(local.root()),
            StorageBackend::Remote(_) => None,
        }
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        match self.backend.as_ref() {
            StorageBackend::Local(local) => local.public_url(bucket, path),
            StorageBackend::Remote(remote) => remote.public_url(bucket, path),
        }
    }

    /// Store an uploaded file under a fresh object name in `bucket`.
    pub async fn upload(
        &self,
        bucket: &str,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> AppResult<StoredObject> {
        check_upload_size(bytes.len(), self.max_upload_bytes)?;

        let ext = extension_of(file_name);
        let mime = content_type
            .filter(|ct| !ct.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime(&ext).to_string());
        let path = object_name(&ext);
        let size = bytes.len() as i64;

        match self.backend.as_ref() {
            StorageBackend::Local(local) => local.put(bucket, &path, &bytes).await?,
            StorageBackend::Remote(remote) => remote.put(bucket, &path, &mime, bytes).await?,
        }

        info!("📦 Stored {} ({} bytes) in bucket {}", path, size, bucket);

        Ok(StoredObject {
            url: self.public_url(bucket, &path),
            path,
            mime,
            size,
        })
    }

    pub async fn remove(&self, bucket: &str, path: &str) -> AppResult<()> {
        match self.backend.as_ref() {
            StorageBackend::Local(local) => local.delete(bucket, path).await,
            StorageBackend::Remote(remote) => remote.delete(bucket, path).await,
        }
    }
}

pub fn check_upload_size(size: usize, max: usize) -> AppResult<()> {
    if size > max {
        return Err(AppError::PayloadTooLarge(format!(
            "File exceeds the allowed limit ({} MB)",
            max / 1024 / 1024
        )));
    }
    Ok(())
}

fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
        _ => "bin".to_string(),
    }
}

pub fn guess_mime(ext: &str) -> &'static str {
    match ext {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

fn object_name(ext: &str) -> String {
    format!("{}-{}.{}", Utc::now().timestamp_millis(), Uuid::new_v4(), ext)
}

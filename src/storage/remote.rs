use axum::body::Bytes;
use reqwest::Client;

use crate::error::{AppError, AppResult};

/// Hosted object storage speaking the Supabase storage REST API.
pub struct RemoteStorage {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RemoteStorage {
    pub fn new(base_url: &str, service_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        }
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    pub async fn put(&self, bucket: &str, path: &str, mime: &str, bytes: Bytes) -> AppResult<()> {
        let response = self
            .client
            .post(self.object_url(bucket, path))
            .bearer_auth(&self.service_key)
            .header("content-type", mime)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!("upload failed ({}): {}", status, body)));
        }
        Ok(())
    }

    pub async fn delete(&self, bucket: &str, path: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.object_url(bucket, path))
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::Storage(format!("delete failed ({})", response.status())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_points_at_public_object_route() {
        let storage = RemoteStorage::new("https://abc.supabase.co/", "service-key");
        assert_eq!(
            storage.public_url("project-media", "1700-x.jpg"),
            "https://abc.supabase.co/storage/v1/object/public/project-media/1700-x.jpg"
        );
    }
}

//! MinIO/S3-compatible storage for report photos
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use crate::core::config::MinIOConfig;
use crate::core::error::AppError;
use crate::features::reports::services::{PhotoKind, PhotoStorage, PhotoUpload};

/// MinIO/S3-compatible photo store
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    photo_prefix: String,
}

impl MinIOClient {
    /// Create a new MinIO client from configuration, creating the bucket if needed
    pub async fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // Path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            photo_prefix: config.photo_prefix,
        };

        client.ensure_bucket_exists().await;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}, photo_prefix: {}",
            client.endpoint,
            client.bucket.name(),
            client.photo_prefix
        );

        Ok(client)
    }

    /// Create the bucket unless it is already there. Failures are logged, not fatal.
    async fn ensure_bucket_exists(&self) {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => info!("Bucket '{}' created successfully", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }
    }

    fn base_url(&self) -> String {
        format!(
            "{}/{}",
            self.public_endpoint.trim_end_matches('/'),
            self.bucket.name()
        )
    }

    /// Direct URL for a stored object, built from the public endpoint
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url(), key)
    }
}

/// rust-s3 is built without `fail-on-err`, so non-2xx responses arrive as `Ok`
fn check_status(action: &str, key: &str, status: u16) -> Result<(), AppError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        tracing::error!("MinIO {} of '{}' returned HTTP {}", action, key, status);
        Err(AppError::ExternalServiceError(format!(
            "Photo {} failed with status {}",
            action, status
        )))
    }
}

/// Object key of a URL produced by `public_url`
fn key_from_url<'a>(base_url: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(base_url)?
        .strip_prefix('/')
        .filter(|key| !key.is_empty())
}

#[async_trait]
impl PhotoStorage for MinIOClient {
    async fn store(
        &self,
        ticket_number: &str,
        kind: PhotoKind,
        photo: PhotoUpload,
    ) -> Result<String, AppError> {
        let key = photo.object_key(&self.photo_prefix, ticket_number, kind);

        let response = self
            .bucket
            .put_object_with_content_type(&key, &photo.bytes, photo.content_type)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upload photo '{}': {:?}", key, e);
                AppError::ExternalServiceError(format!("Failed to upload photo: {}", e))
            })?;
        check_status("upload", &key, response.status_code())?;

        debug!(
            "Uploaded {} photo '{}' ({} bytes) to bucket '{}'",
            kind.as_str(),
            key,
            photo.bytes.len(),
            self.bucket.name()
        );

        Ok(self.public_url(&key))
    }

    async fn remove(&self, url: &str) -> Result<(), AppError> {
        let base_url = self.base_url();
        let key = key_from_url(&base_url, url).ok_or_else(|| {
            AppError::BadRequest(format!("Photo URL is not in bucket {}", self.bucket.name()))
        })?;

        let response = self.bucket.delete_object(key).await.map_err(|e| {
            tracing::error!("Failed to delete photo '{}': {:?}", key, e);
            AppError::ExternalServiceError(format!("Failed to delete photo: {}", e))
        })?;
        check_status("delete", key, response.status_code())?;

        debug!("Deleted photo '{}'", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status_accepts_only_success() {
        assert!(check_status("upload", "k", 200).is_ok());
        assert!(check_status("delete", "k", 204).is_ok());
        for status in [301, 403, 404, 500, 503] {
            assert!(matches!(
                check_status("upload", "k", status),
                Err(AppError::ExternalServiceError(_))
            ));
        }
    }

    #[test]
    fn test_key_from_url() {
        let base = "https://cdn.example.org/civic-reports";
        assert_eq!(
            key_from_url(base, "https://cdn.example.org/civic-reports/public/reports/CE000001/before-ab.png"),
            Some("public/reports/CE000001/before-ab.png")
        );
        assert_eq!(key_from_url(base, "https://elsewhere.org/civic-reports/x.png"), None);
        assert_eq!(key_from_url(base, "https://cdn.example.org/civic-reports/"), None);
    }
}

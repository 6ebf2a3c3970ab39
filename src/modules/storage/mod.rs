//! Storage module for report photos
//!
//! Provides the MinIO/S3-compatible implementation of the photo store.

mod minio_client;

pub use minio_client::MinIOClient;

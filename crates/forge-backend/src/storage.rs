use async_trait::async_trait;
use bytes::Bytes;

use crate::BackendError;

/// An object to write into a bucket
#[derive(Debug, Clone)]
pub struct Upload<'a> {
    pub bucket: &'a str,
    pub path: &'a str,
    pub content_type: &'a str,
    pub upsert: bool,
    pub bytes: Bytes,
}

/// Object storage with publicly readable buckets
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object, replacing an existing one only when `upsert` is set
    async fn upload(&self, upload: Upload<'_>) -> Result<(), BackendError>;

    /// Public URL under which an uploaded object can be fetched
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use forge_core::GenerationJob;
use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{BackendError, IdentityService, JobStore, ObjectStore, SecretStore, Upload};

/// A stored object
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Bytes,
}

/// In-process backend used for local runs and tests
///
/// Tokens map directly to user ids. Row-level security is not modelled:
/// every known token sees every job.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    sessions: RwLock<HashMap<String, String>>,
    objects: RwLock<HashMap<(String, String), StoredObject>>,
    jobs: RwLock<Vec<GenerationJob>>,
    secrets: RwLock<HashMap<(String, String), String>>,
    fail_uploads: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `Bearer {token}` as `user_id`
    pub async fn add_session(&self, token: &str, user_id: &str) {
        self.sessions
            .write()
            .await
            .insert(format!("Bearer {token}"), user_id.to_owned());
    }

    pub async fn insert_job(&self, job: GenerationJob) {
        self.jobs.write().await.push(job);
    }

    pub async fn set_user_api_key(&self, user_id: &str, key_name: &str, key: &str) {
        self.secrets
            .write()
            .await
            .insert((user_id.to_owned(), key_name.to_owned()), key.to_owned());
    }

    /// Make every following upload fail with a storage error
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::Relaxed);
    }

    pub async fn object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_owned(), path.to_owned()))
            .cloned()
    }

    /// Paths of every object in a bucket, sorted
    pub async fn object_paths(&self, bucket: &str) -> Vec<String> {
        let mut paths: Vec<_> = self
            .objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, p)| p.clone())
            .collect();
        paths.sort();
        paths
    }

    async fn check_session(&self, authorization: &str) -> Result<String, BackendError> {
        self.sessions
            .read()
            .await
            .get(authorization)
            .cloned()
            .ok_or(BackendError::Unauthorized)
    }
}

#[async_trait]
impl IdentityService for MemoryBackend {
    async fn user_id(&self, authorization: &str) -> Result<String, BackendError> {
        self.check_session(authorization).await
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(&self, upload: Upload<'_>) -> Result<(), BackendError> {
        if self.fail_uploads.load(Ordering::Relaxed) {
            return Err(BackendError::Api {
                status: 500,
                message: "storage unavailable".to_string(),
            });
        }

        let key = (upload.bucket.to_owned(), upload.path.to_owned());
        let mut objects = self.objects.write().await;

        if !upload.upsert && objects.contains_key(&key) {
            return Err(BackendError::Api {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }

        objects.insert(
            key,
            StoredObject {
                content_type: upload.content_type.to_owned(),
                bytes: upload.bytes,
            },
        );

        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }
}

#[async_trait]
impl JobStore for MemoryBackend {
    async fn job(&self, authorization: &str, job_id: &str) -> Result<Option<GenerationJob>, BackendError> {
        self.check_session(authorization).await?;

        Ok(self
            .jobs
            .read()
            .await
            .iter()
            .find(|j| column_equals(j.get("id"), job_id))
            .cloned())
    }

    async fn project_jobs(&self, authorization: &str, project_id: &str) -> Result<Vec<GenerationJob>, BackendError> {
        self.check_session(authorization).await?;

        let mut jobs: Vec<_> = self
            .jobs
            .read()
            .await
            .iter()
            .filter(|j| column_equals(j.get("project_id"), project_id))
            .cloned()
            .collect();

        jobs.sort_by(|a, b| b.created_at_timestamp().cmp(&a.created_at_timestamp()));

        Ok(jobs)
    }
}

/// Compare a column the way an `eq.` filter does, on its text form
fn column_equals(value: Option<&Value>, expected: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == expected,
        Some(Value::Bool(b)) => b.to_string() == expected,
        _ => false,
    }
}

#[async_trait]
impl SecretStore for MemoryBackend {
    async fn user_api_key(&self, user_id: &str, key_name: &str) -> Result<Option<SecretString>, BackendError> {
        Ok(self
            .secrets
            .read()
            .await
            .get(&(user_id.to_owned(), key_name.to_owned()))
            .map(|k| SecretString::from(k.clone())))
    }
}

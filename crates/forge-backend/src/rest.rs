use async_trait::async_trait;
use forge_config::BackendConfig;
use forge_core::GenerationJob;
use http::{StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::{BackendError, IdentityService, JobStore, ObjectStore, SecretStore, Upload};

const VAULT_RPC: &str = "get_user_api_key_for_service";

/// REST client for the managed backend
///
/// One project URL hosts every service: identity under `/auth/v1`, storage
/// under `/storage/v1` and the data API (including the vault RPC) under
/// `/rest/v1`.
#[derive(Clone)]
pub struct RestBackend {
    http: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
    service_role_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
}

impl RestBackend {
    /// Create a new backend client
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        if config.url.cannot_be_a_base() {
            return Err(BackendError::Config(format!(
                "backend URL `{}` cannot be used as a base",
                config.url
            )));
        }

        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
            service_role_key: config.service_role_key.clone(),
        })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn object_segments<'a>(prefix: &'a [&'a str], bucket: &'a str, path: &'a str) -> impl Iterator<Item = &'a str> {
        prefix
            .iter()
            .copied()
            .chain(std::iter::once(bucket))
            .chain(path.split('/').filter(|s| !s.is_empty()))
    }

    async fn error_from(response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        BackendError::Api { status, message }
    }

    async fn fetch_jobs(&self, authorization: &str, query: &[(&str, String)]) -> Result<Vec<GenerationJob>, BackendError> {
        let url = self.endpoint(["rest", "v1", "generation_jobs"]);

        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, authorization)
            .header("apikey", self.anon_key.expose_secret())
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("failed to parse job rows: {e}")))
    }
}

#[async_trait]
impl IdentityService for RestBackend {
    async fn user_id(&self, authorization: &str) -> Result<String, BackendError> {
        let url = self.endpoint(["auth", "v1", "user"]);

        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, authorization)
            .header("apikey", self.anon_key.expose_secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(BackendError::Unauthorized),
            status if !status.is_success() => return Err(Self::error_from(response).await),
            _ => {}
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("failed to parse user: {e}")))?;

        if user.id.is_empty() {
            return Err(BackendError::Unauthorized);
        }

        Ok(user.id)
    }
}

#[async_trait]
impl ObjectStore for RestBackend {
    async fn upload(&self, upload: Upload<'_>) -> Result<(), BackendError> {
        let url = self.endpoint(Self::object_segments(&["storage", "v1", "object"], upload.bucket, upload.path));
        let size = upload.bytes.len();

        let response = self
            .http
            .post(url)
            .bearer_auth(self.service_role_key.expose_secret())
            .header("apikey", self.service_role_key.expose_secret())
            .header(header::CONTENT_TYPE, upload.content_type)
            .header("x-upsert", if upload.upsert { "true" } else { "false" })
            .body(upload.bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        tracing::debug!(bucket = upload.bucket, path = upload.path, size, "object uploaded");

        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.endpoint(Self::object_segments(&["storage", "v1", "object", "public"], bucket, path))
            .to_string()
    }
}

#[async_trait]
impl JobStore for RestBackend {
    async fn job(&self, authorization: &str, job_id: &str) -> Result<Option<GenerationJob>, BackendError> {
        let query = [
            ("select", "*".to_string()),
            ("id", format!("eq.{job_id}")),
            ("limit", "1".to_string()),
        ];

        let rows = self.fetch_jobs(authorization, &query).await?;

        Ok(rows.into_iter().next())
    }

    async fn project_jobs(&self, authorization: &str, project_id: &str) -> Result<Vec<GenerationJob>, BackendError> {
        let query = [
            ("select", "*".to_string()),
            ("project_id", format!("eq.{project_id}")),
            ("order", "created_at.desc".to_string()),
        ];

        self.fetch_jobs(authorization, &query).await
    }
}

#[async_trait]
impl SecretStore for RestBackend {
    async fn user_api_key(&self, user_id: &str, key_name: &str) -> Result<Option<SecretString>, BackendError> {
        let url = self.endpoint(["rest", "v1", "rpc", VAULT_RPC]);

        let response = self
            .http
            .post(url)
            .bearer_auth(self.service_role_key.expose_secret())
            .header("apikey", self.service_role_key.expose_secret())
            .json(&serde_json::json!({
                "target_user_id": user_id,
                "key_name": key_name,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let key: Option<String> = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("failed to parse vault response: {e}")))?;

        Ok(key.filter(|k| !k.is_empty()).map(SecretString::from))
    }
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use forge_config::BucketConfig;
    use forge_core::JobStatus;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn backend(server: &MockServer) -> RestBackend {
        let config = BackendConfig {
            url: Url::parse(&server.uri()).unwrap(),
            anon_key: SecretString::from("anon-key".to_owned()),
            service_role_key: SecretString::from("service-key".to_owned()),
            buckets: BucketConfig::default(),
        };

        RestBackend::new(&config).unwrap()
    }

    #[tokio::test]
    async fn user_id_forwards_authorization() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer user-token"))
            .and(header("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user-1",
                "email": "someone@example.com"
            })))
            .mount(&server)
            .await;

        let user = backend(&server).user_id("Bearer user-token").await.unwrap();
        assert_eq!(user, "user-1");
    }

    #[tokio::test]
    async fn rejected_token_is_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "invalid JWT"})))
            .mount(&server)
            .await;

        let err = backend(&server).user_id("Bearer expired").await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized));
    }

    #[tokio::test]
    async fn upload_sends_object_with_service_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/storage/v1/object/audio-files/user-1/temp/1700000000000_minimax_generated.mp3"))
            .and(header("authorization", "Bearer service-key"))
            .and(header("content-type", "audio/mpeg"))
            .and(header("x-upsert", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Key": "audio-files/user-1/..."})))
            .expect(1)
            .mount(&server)
            .await;

        backend(&server)
            .upload(Upload {
                bucket: "audio-files",
                path: "user-1/temp/1700000000000_minimax_generated.mp3",
                content_type: "audio/mpeg",
                upsert: true,
                bytes: Bytes::from_static(b"Hello"),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn upload_failure_carries_backend_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Bucket not found"))
            .mount(&server)
            .await;

        let err = backend(&server)
            .upload(Upload {
                bucket: "missing",
                path: "a.jpg",
                content_type: "image/jpeg",
                upsert: false,
                bytes: Bytes::new(),
            })
            .await
            .unwrap_err();

        match err {
            BackendError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Bucket not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn public_url_encodes_path_segments() {
        let server = MockServer::start().await;
        let url = backend(&server).public_url("style-references", "user-1/thumbnails/examples/1_my shot.png");

        assert_eq!(
            url,
            format!(
                "{}/storage/v1/object/public/style-references/user-1/thumbnails/examples/1_my%20shot.png",
                server.uri()
            )
        );
    }

    #[tokio::test]
    async fn job_by_id_returns_first_row() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/generation_jobs"))
            .and(query_param("id", "eq.job-1"))
            .and(query_param("limit", "1"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "job-1",
                "project_id": "proj-1",
                "status": "processing",
                "created_at": "2025-01-02T10:00:00Z",
                "progress": 40
            }])))
            .mount(&server)
            .await;

        let job = backend(&server)
            .job("Bearer user-token", "job-1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(job.status(), Some(JobStatus::Processing));
        assert_eq!(job.get("progress"), Some(&json!(40)));
    }

    #[tokio::test]
    async fn job_row_is_kept_as_stored() {
        let server = MockServer::start().await;
        let row = json!({"id": 7, "status": "pending", "created_at": null, "result": null});

        Mock::given(method("GET"))
            .and(path("/rest/v1/generation_jobs"))
            .and(query_param("id", "eq.7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row.clone()])))
            .mount(&server)
            .await;

        let job = backend(&server).job("Bearer user-token", "7").await.unwrap().unwrap();

        assert!(job.is_active());
        assert_eq!(serde_json::to_value(&job).unwrap(), row);
    }

    #[tokio::test]
    async fn missing_job_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/generation_jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let job = backend(&server).job("Bearer user-token", "nope").await.unwrap();
        assert!(job.is_none());
    }

    #[tokio::test]
    async fn project_jobs_are_ordered_by_backend() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/generation_jobs"))
            .and(query_param("project_id", "eq.proj-1"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "b", "project_id": "proj-1", "status": "pending", "created_at": "2025-01-02T00:00:00Z"},
                {"id": "a", "project_id": "proj-1", "status": "completed", "created_at": "2025-01-01T00:00:00Z"}
            ])))
            .mount(&server)
            .await;

        let jobs = backend(&server)
            .project_jobs("Bearer user-token", "proj-1")
            .await
            .unwrap();

        let ids: Vec<_> = jobs.iter().filter_map(|j| j.get("id")).collect();
        assert_eq!(ids, [&json!("b"), &json!("a")]);
    }

    #[tokio::test]
    async fn vault_lookup_returns_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/get_user_api_key_for_service"))
            .and(body_json(json!({"target_user_id": "user-1", "key_name": "minimax"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("mm-secret")))
            .mount(&server)
            .await;

        let key = backend(&server).user_api_key("user-1", "minimax").await.unwrap().unwrap();
        assert_eq!(key.expose_secret(), "mm-secret");
    }

    #[tokio::test]
    async fn vault_null_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/get_user_api_key_for_service"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
            .mount(&server)
            .await;

        let key = backend(&server).user_api_key("user-1", "minimax").await.unwrap();
        assert!(key.is_none());
    }
}

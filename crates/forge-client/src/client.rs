use bytes::Bytes;
use forge_core::GenerationJob;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use crate::error::{ForgeClientError, Result};
use crate::types::{
    ExampleTitlesRequest, ImageRequest, ImageResponse, JobStatusRequest, ProjectJobs, SpeechRequest, SpeechResponse,
    TagsRequest, TagsResponse, TitlesRequest, TitlesResponse,
};

/// Typed client for the Forge functions and backend storage
///
/// Functions are called under `{functions_url}/functions/v1/`. Storage and
/// identity live on the managed backend, which defaults to the same host.
#[derive(Clone)]
pub struct ForgeClient {
    http: reqwest::Client,
    functions_url: Url,
    backend_url: Url,
    access_token: Option<SecretString>,
    anon_key: Option<SecretString>,
}

#[derive(Deserialize)]
struct UserResponse {
    id: String,
}

impl ForgeClient {
    /// Create a new client pointing at the given base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid
    pub fn new(base_url: &str) -> Result<Self> {
        let functions_url = parse_base(base_url)?;

        Ok(Self {
            http: reqwest::Client::new(),
            backend_url: functions_url.clone(),
            functions_url,
            access_token: None,
            anon_key: None,
        })
    }

    /// Send storage and identity calls to a different backend host
    pub fn with_backend_url(mut self, backend_url: &str) -> Result<Self> {
        self.backend_url = parse_base(backend_url)?;
        Ok(self)
    }

    /// Authenticate as a signed-in user
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(SecretString::from(token.into()));
        self
    }

    /// Project key sent as `apikey` on every call
    #[must_use]
    pub fn with_anon_key(mut self, key: impl Into<String>) -> Self {
        self.anon_key = Some(SecretString::from(key.into()));
        self
    }

    pub const fn functions_url(&self) -> &Url {
        &self.functions_url
    }

    // -- Functions --

    /// Generate images and wait for the result
    pub async fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse> {
        self.invoke("generate-image-seedream", request).await
    }

    /// Fetch a provider prediction as-is
    pub async fn prediction(&self, prediction_id: &str) -> Result<Value> {
        self.invoke("generate-image-seedream", &serde_json::json!({ "predictionId": prediction_id }))
            .await
    }

    /// Synthesize speech with the caller's own provider key
    pub async fn generate_audio(&self, request: &SpeechRequest) -> Result<SpeechResponse> {
        self.invoke("generate-audio-minimax", request).await
    }

    pub async fn generate_tags(&self, request: &TagsRequest) -> Result<TagsResponse> {
        self.invoke("generate-tags", request).await
    }

    pub async fn generate_titles(&self, request: &TitlesRequest) -> Result<TitlesResponse> {
        self.invoke("generate-titles", request).await
    }

    pub async fn generate_titles_from_examples(&self, request: &ExampleTitlesRequest) -> Result<TitlesResponse> {
        self.invoke("generate-titles-from-examples", request).await
    }

    /// Fetch one job, verbatim
    pub async fn job(&self, job_id: &str) -> Result<GenerationJob> {
        let request = JobStatusRequest {
            job_id: Some(job_id),
            project_id: None,
        };
        self.invoke("get-job-status", &request).await
    }

    /// Fetch every job of a project
    pub async fn project_jobs(&self, project_id: &str) -> Result<ProjectJobs> {
        let request = JobStatusRequest {
            job_id: None,
            project_id: Some(project_id),
        };
        self.invoke("get-job-status", &request).await
    }

    // -- Backend --

    /// Id of the signed-in user
    pub async fn user_id(&self) -> Result<String> {
        let url = make_url(&self.backend_url, ["auth", "v1", "user"]);
        let response = self.authorize(self.http.get(url)).send().await?;

        let user: UserResponse = handle_error(response)
            .await?
            .json()
            .await
            .map_err(|e| ForgeClientError::Parse(e.to_string()))?;

        Ok(user.id)
    }

    /// Upload an object as the signed-in user and return its public URL
    pub async fn upload(&self, bucket: &str, path: &str, content_type: &str, bytes: Bytes) -> Result<String> {
        let url = make_url(&self.backend_url, object_segments(&["storage", "v1", "object"], bucket, path));

        tracing::debug!(bucket, path, size = bytes.len(), "uploading object");

        let response = self
            .authorize(self.http.post(url))
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        handle_error(response).await?;

        Ok(self.public_url(bucket, path))
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        make_url(
            &self.backend_url,
            object_segments(&["storage", "v1", "object", "public"], bucket, path),
        )
        .into()
    }

    /// Download an arbitrary URL, such as a generated image
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        let response = self.http.get(url).send().await?;
        Ok(handle_error(response).await?.bytes().await?)
    }

    async fn invoke<B, T>(&self, function: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = make_url(&self.functions_url, ["functions", "v1", function]);

        let response = self.authorize(self.http.post(url)).json(body).send().await?;

        handle_error(response)
            .await?
            .json()
            .await
            .map_err(|e| ForgeClientError::Parse(e.to_string()))
    }

    fn authorize(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.access_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        if let Some(key) = &self.anon_key {
            builder = builder.header("apikey", key.expose_secret());
        }

        builder
    }
}

impl std::fmt::Debug for ForgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgeClient")
            .field("functions_url", &self.functions_url)
            .field("backend_url", &self.backend_url)
            .finish_non_exhaustive()
    }
}

fn parse_base(url: &str) -> Result<Url> {
    let url = Url::parse(url).map_err(|e| ForgeClientError::Config(format!("invalid base URL: {e}")))?;

    if url.cannot_be_a_base() {
        return Err(ForgeClientError::Config(format!("`{url}` cannot be used as a base URL")));
    }

    Ok(url)
}

/// Append path segments to a base URL, percent-encoding each one
fn make_url<'a>(base_url: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base_url.clone();
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

/// Check an HTTP response for errors
async fn handle_error(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(ForgeClientError::Api {
        status: status.as_u16(),
        message: parse_error_body(&body),
    })
}

/// The `error` string of a function error body, or the raw body
fn parse_error_body(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("error").and_then(Value::as_str).map(ToOwned::to_owned))
        .unwrap_or_else(|| body.to_owned())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> ForgeClient {
        ForgeClient::new(&server.uri())
            .unwrap()
            .with_access_token("user-token")
            .with_anon_key("anon")
    }

    #[test]
    fn relative_base_is_rejected() {
        assert!(matches!(ForgeClient::new("not a url"), Err(ForgeClientError::Config(_))));
        assert!(matches!(ForgeClient::new("mailto:a@b.c"), Err(ForgeClientError::Config(_))));
    }

    #[test]
    fn public_url_encodes_segments() {
        let client = ForgeClient::new("https://project.example.co").unwrap();
        assert_eq!(
            client.public_url("style-references", "u1/thumbnails/examples/1_my file.png"),
            "https://project.example.co/storage/v1/object/public/style-references/u1/thumbnails/examples/1_my%20file.png"
        );
    }

    #[tokio::test]
    async fn tags_are_posted_with_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/functions/v1/generate-tags"))
            .and(header("authorization", "Bearer user-token"))
            .and(header("apikey", "anon"))
            .and(body_json(json!({"videoScript": "abc", "videoTitle": "t"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tags": ["a", "b"]})))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)
            .generate_tags(&TagsRequest {
                video_script: "abc".to_owned(),
                video_title: Some("t".to_owned()),
            })
            .await
            .unwrap();

        assert_eq!(response.tags, ["a", "b"]);
    }

    #[tokio::test]
    async fn function_errors_expose_status_and_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/functions/v1/generate-titles-from-examples"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "exampleTitles must be a non-empty array"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .generate_titles_from_examples(&ExampleTitlesRequest {
                video_script: "abc".to_owned(),
                example_titles: Vec::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "400: exampleTitles must be a non-empty array");
    }

    #[tokio::test]
    async fn project_jobs_are_decoded() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/functions/v1/get-job-status"))
            .and(body_json(json!({"projectId": "p1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jobs": [
                    {"id": "j2", "project_id": "p1", "status": "processing", "created_at": "2025-05-02T00:00:00Z"},
                    {"id": "j1", "project_id": "p1", "status": "completed", "created_at": "2025-05-01T00:00:00Z"}
                ],
                "activeJobs": [
                    {"id": "j2", "project_id": "p1", "status": "processing", "created_at": "2025-05-02T00:00:00Z"}
                ],
                "hasActiveJobs": true
            })))
            .mount(&server)
            .await;

        let jobs = client(&server).project_jobs("p1").await.unwrap();

        assert_eq!(jobs.jobs.len(), 2);
        assert_eq!(jobs.active_jobs[0].get("id"), Some(&json!("j2")));
        assert!(jobs.has_active_jobs);
    }

    #[tokio::test]
    async fn upload_returns_public_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/storage/v1/object/generated-images/u1/thumbnails/generated/p1_1_v1.jpg"))
            .and(header("content-type", "image/jpeg"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Key": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let url = client(&server)
            .upload(
                "generated-images",
                "u1/thumbnails/generated/p1_1_v1.jpg",
                "image/jpeg",
                Bytes::from_static(b"jpeg"),
            )
            .await
            .unwrap();

        assert_eq!(
            url,
            format!(
                "{}/storage/v1/object/public/generated-images/u1/thumbnails/generated/p1_1_v1.jpg",
                server.uri()
            )
        );
    }

    #[tokio::test]
    async fn user_id_comes_from_identity_service() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "user-1", "email": "a@b.c"})))
            .mount(&server)
            .await;

        assert_eq!(client(&server).user_id().await.unwrap(), "user-1");
    }
}

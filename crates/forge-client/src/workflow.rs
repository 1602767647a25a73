//! Upload-and-generate flow for YouTube thumbnails
//!
//! The user uploads one or more example thumbnails and a character
//! reference, then asks for three variants. Each variant is generated
//! through the image function, downloaded, and stored under the user's own
//! prefix in the generated-images bucket.

use async_trait::async_trait;
use bytes::Bytes;

use crate::{ForgeClient, ForgeClientError, ImageRequest, ImageResponse};

const DEFAULT_STYLE_BUCKET: &str = "style-references";
const DEFAULT_GENERATED_BUCKET: &str = "generated-images";
const VARIANTS: u32 = 3;
const SCRIPT_EXCERPT_CHARS: usize = 500;
const WIDTH: u32 = 1920;
const HEIGHT: u32 = 1080;

/// Services the workflow needs from the platform
#[async_trait]
pub trait ThumbnailBackend: Send + Sync {
    /// Id of the signed-in user, used as the storage prefix
    async fn user_id(&self) -> crate::Result<String>;

    /// Store an object and return its public URL
    async fn upload(&self, bucket: &str, path: &str, content_type: &str, bytes: Bytes) -> crate::Result<String>;

    async fn generate_image(&self, request: &ImageRequest) -> crate::Result<ImageResponse>;

    async fn download(&self, url: &str) -> crate::Result<Bytes>;
}

#[async_trait]
impl ThumbnailBackend for ForgeClient {
    async fn user_id(&self) -> crate::Result<String> {
        Self::user_id(self).await
    }

    async fn upload(&self, bucket: &str, path: &str, content_type: &str, bytes: Bytes) -> crate::Result<String> {
        Self::upload(self, bucket, path, content_type, bytes).await
    }

    async fn generate_image(&self, request: &ImageRequest) -> crate::Result<ImageResponse> {
        Self::generate_image(self, request).await
    }

    async fn download(&self, url: &str) -> crate::Result<Bytes> {
        Self::download(self, url).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    UploadingExample,
    HasExamples,
    UploadingCharacter,
    Ready,
    Generating,
    Done,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("at least one example thumbnail is required")]
    MissingExamples,

    #[error("a character reference is required")]
    MissingCharacter,

    #[error("image generation returned no output for version {variant}")]
    EmptyOutput { variant: u32 },

    #[error(transparent)]
    Client(#[from] ForgeClientError),
}

/// Thumbnail generation for one project
pub struct ThumbnailWorkflow<B> {
    backend: B,
    project_id: String,
    script: String,
    style_bucket: String,
    generated_bucket: String,
    examples: Vec<String>,
    character: Option<String>,
    generated: Vec<String>,
    state: WorkflowState,
}

impl<B: ThumbnailBackend> ThumbnailWorkflow<B> {
    pub fn new(backend: B, project_id: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            backend,
            project_id: project_id.into(),
            script: script.into(),
            style_bucket: DEFAULT_STYLE_BUCKET.to_owned(),
            generated_bucket: DEFAULT_GENERATED_BUCKET.to_owned(),
            examples: Vec::new(),
            character: None,
            generated: Vec::new(),
            state: WorkflowState::Idle,
        }
    }

    /// Use the deployment's `[backend.buckets]` names instead of the defaults
    #[must_use]
    pub fn with_buckets(mut self, style_references: impl Into<String>, generated_images: impl Into<String>) -> Self {
        self.style_bucket = style_references.into();
        self.generated_bucket = generated_images.into();
        self
    }

    pub const fn state(&self) -> WorkflowState {
        self.state
    }

    /// Public URLs of the uploaded examples, in upload order
    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    pub fn character(&self) -> Option<&str> {
        self.character.as_deref()
    }

    /// Public URLs of the thumbnails from the latest generation
    pub fn generated(&self) -> &[String] {
        &self.generated
    }

    /// Upload an example thumbnail and add it to the style references
    pub async fn upload_example(&mut self, file_name: &str, bytes: Bytes) -> Result<&str, WorkflowError> {
        self.state = WorkflowState::UploadingExample;

        let result = self.store(&self.style_bucket, "examples", file_name, bytes).await;
        let url = self.settle(result)?;

        self.examples.push(url);
        self.state = self.resting_state();

        Ok(self.examples.last().map_or("", String::as_str))
    }

    /// Upload the character reference, replacing any previous one
    pub async fn upload_character(&mut self, file_name: &str, bytes: Bytes) -> Result<&str, WorkflowError> {
        self.state = WorkflowState::UploadingCharacter;

        let result = self.store(&self.style_bucket, "character", file_name, bytes).await;
        let url = self.settle(result)?;

        self.state = self.resting_state_with(true);
        Ok(self.character.insert(url).as_str())
    }

    /// Remove an example; out-of-range indexes are ignored
    pub fn remove_example(&mut self, index: usize) {
        if index < self.examples.len() {
            self.examples.remove(index);
            self.state = self.resting_state();
        }
    }

    pub fn clear_character(&mut self) {
        self.character = None;
        self.state = self.resting_state();
    }

    /// Generate three thumbnail variants in sequence
    ///
    /// Stops at the first failure. Variants finished before it stay in
    /// [`Self::generated`].
    pub async fn generate(&mut self) -> Result<&[String], WorkflowError> {
        if self.examples.is_empty() {
            return Err(WorkflowError::MissingExamples);
        }

        let Some(character) = self.character.clone() else {
            return Err(WorkflowError::MissingCharacter);
        };

        self.state = WorkflowState::Generating;
        self.generated.clear();

        let mut image_urls = self.examples.clone();
        image_urls.push(character);

        for variant in 1..=VARIANTS {
            let result = self.generate_variant(variant, image_urls.clone()).await;
            let url = self.settle(result)?;

            tracing::debug!(variant, %url, "thumbnail generated");
            self.generated.push(url);
        }

        self.state = WorkflowState::Done;
        Ok(&self.generated)
    }

    async fn generate_variant(&self, variant: u32, image_urls: Vec<String>) -> Result<String, WorkflowError> {
        let request = ImageRequest {
            image_urls,
            width: Some(WIDTH),
            height: Some(HEIGHT),
            ..ImageRequest::new(prompt(&self.script, variant))
        };

        let response = self.backend.generate_image(&request).await?;
        let Some(output) = response.output.first() else {
            return Err(WorkflowError::EmptyOutput { variant });
        };

        let bytes = self.backend.download(output).await?;
        let user = self.backend.user_id().await?;
        let path = format!(
            "{user}/thumbnails/generated/{}_{}_v{variant}.jpg",
            self.project_id,
            now_millis()
        );

        Ok(self.backend.upload(&self.generated_bucket, &path, "image/jpeg", bytes).await?)
    }

    async fn store(&self, bucket: &str, folder: &str, file_name: &str, bytes: Bytes) -> Result<String, WorkflowError> {
        let user = self.backend.user_id().await?;
        let path = format!("{user}/thumbnails/{folder}/{}_{file_name}", now_millis());

        Ok(self
            .backend
            .upload(bucket, &path, content_type(file_name), bytes)
            .await?)
    }

    /// Return to a resting state when an operation failed
    fn settle<T>(&mut self, result: Result<T, WorkflowError>) -> Result<T, WorkflowError> {
        if result.is_err() {
            self.state = self.resting_state();
        }
        result
    }

    fn resting_state(&self) -> WorkflowState {
        self.resting_state_with(self.character.is_some())
    }

    fn resting_state_with(&self, has_character: bool) -> WorkflowState {
        match (self.examples.is_empty(), has_character) {
            (false, true) => WorkflowState::Ready,
            (false, false) => WorkflowState::HasExamples,
            (true, _) => WorkflowState::Idle,
        }
    }
}

fn prompt(script: &str, variant: u32) -> String {
    let excerpt: String = script.chars().take(SCRIPT_EXCERPT_CHARS).collect();

    format!(
        "Create a YouTube thumbnail in the style of the provided examples. \
         Include the character from the reference image. \
         The video is about: {excerpt}. \
         Make it eye-catching, professional, and similar in composition to the example thumbnails. \
         Version {variant} with slight variations."
    )
}

fn content_type(file_name: &str) -> &'static str {
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

fn now_millis() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}

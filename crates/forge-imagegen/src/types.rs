use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEFAULT_WIDTH: u32 = 1024;
const DEFAULT_HEIGHT: u32 = 1024;
const DEFAULT_NUM_OUTPUTS: u32 = 1;
const DEFAULT_OUTPUT_FORMAT: &str = "webp";
const DEFAULT_OUTPUT_QUALITY: u32 = 80;

/// Body of a generate-image call
///
/// Either a generation request, or a status check when `predictionId` is set.
/// Built leniently from the raw body with [`ImageRequest::from_body`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageRequest {
    /// Prediction to look up instead of generating
    #[serde(rename = "predictionId", skip_serializing_if = "Option::is_none")]
    pub prediction_id: Option<String>,
    /// Text description of the desired image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Conditioning images
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_outputs: Option<u32>,
    /// `webp`, `jpg` or `png`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_quality: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_inference_steps: Option<u32>,
}

impl ImageRequest {
    /// Read a request body, treating `null` and wrongly typed fields as unset
    pub fn from_body(body: &Map<String, Value>) -> Self {
        Self {
            prediction_id: string_field(body, "predictionId"),
            prompt: string_field(body, "prompt"),
            image_urls: body
                .get("image_urls")
                .and_then(Value::as_array)
                .map(|urls| urls.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default(),
            width: u32_field(body, "width"),
            height: u32_field(body, "height"),
            num_outputs: u32_field(body, "num_outputs"),
            output_format: string_field(body, "output_format"),
            output_quality: u32_field(body, "output_quality"),
            seed: body.get("seed").and_then(Value::as_i64),
            guidance_scale: body.get("guidance_scale").and_then(Value::as_f64),
            num_inference_steps: u32_field(body, "num_inference_steps"),
        }
    }
}

fn string_field(body: &Map<String, Value>, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

fn u32_field(body: &Map<String, Value>, key: &str) -> Option<u32> {
    body.get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
}

/// Model input sent to the provider, with defaults applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionInput {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub num_outputs: u32,
    pub output_format: String,
    pub output_quality: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_inference_steps: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
}

impl PredictionInput {
    /// Build the model input for a generation request
    ///
    /// Returns `None` when the prompt is missing or empty. Zero-valued
    /// numbers and empty strings count as unset.
    pub fn from_request(request: &ImageRequest) -> Option<Self> {
        let prompt = request.prompt.as_deref().filter(|p| !p.is_empty())?;

        Some(Self {
            prompt: prompt.to_string(),
            width: positive(request.width).unwrap_or(DEFAULT_WIDTH),
            height: positive(request.height).unwrap_or(DEFAULT_HEIGHT),
            num_outputs: positive(request.num_outputs).unwrap_or(DEFAULT_NUM_OUTPUTS),
            output_format: request
                .output_format
                .clone()
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_string()),
            output_quality: positive(request.output_quality).unwrap_or(DEFAULT_OUTPUT_QUALITY),
            seed: request.seed,
            guidance_scale: request.guidance_scale,
            num_inference_steps: request.num_inference_steps,
            image_urls: request.image_urls.clone(),
        })
    }
}

fn positive(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v > 0)
}

/// Finished generation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageResponse {
    /// Output image URLs
    pub output: Vec<String>,
}

/// What a generate-image call returns
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ImageGenResponse {
    /// The provider's prediction object, unchanged
    Prediction(Value),
    /// Output of a finished generation
    Output(ImageResponse),
}

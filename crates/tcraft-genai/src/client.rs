//! Gemini API client.

use std::time::Duration;

use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use tcraft_models::{Frame, TextContent};

use crate::error::{GenAiError, GenAiResult};

/// Default API base URL.
pub(crate) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used for structured text content.
const TEXT_MODEL: &str = "gemini-2.5-pro";
/// Model used for still-image and frame-set analysis.
const VISION_MODEL: &str = "gemini-2.5-flash";
/// Model used for whole-video analysis after upload.
const VIDEO_MODEL: &str = "gemini-2.5-pro";
/// Model used for thumbnail edits (image output).
const EDIT_MODEL: &str = "gemini-2.5-flash-image";
/// Model used for thumbnail generation.
const IMAGE_MODEL: &str = "imagen-4.0-generate-001";

/// Polling behavior for provider-side video processing.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between status checks.
    pub interval: Duration,
    /// Hard cap on total wait for a terminal state.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) client: Client,
    pub(crate) poll: PollConfig,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Deserialize)]
struct ResponseInlineData {
    data: String,
}

#[derive(Debug, Serialize)]
struct ImagenRequest {
    instances: Vec<ImagenInstance>,
    parameters: ImagenParameters,
}

#[derive(Debug, Serialize)]
struct ImagenInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagenParameters {
    sample_count: usize,
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct ImagenResponse {
    #[serde(default)]
    predictions: Vec<ImagenPrediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagenPrediction {
    bytes_base64_encoded: String,
}

/// Response schema sent with the text call so the model returns exactly the
/// contracted shape.
fn text_content_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "titles": {
                "type": "ARRAY",
                "description": "5 catchy, SEO-optimized YouTube video titles. Each title should be compelling and likely to get clicks.",
                "items": { "type": "STRING" }
            },
            "description": {
                "type": "STRING",
                "description": "An engaging, SEO-optimized YouTube video description that includes relevant keywords and a call-to-action."
            },
            "hashtags": {
                "type": "ARRAY",
                "description": "A list of 10-15 relevant hashtags to improve discoverability.",
                "items": { "type": "STRING" }
            },
            "predictedCtr": {
                "type": "STRING",
                "description": "A predicted Click-Through Rate (CTR) as a percentage (e.g., '5-7%'). Include a brief justification for this prediction based on title strength and topic relevance."
            }
        },
        "required": ["titles", "description", "hashtags", "predictedCtr"]
    })
}

impl GeminiClient {
    /// Create a client from the environment. Absence of the API key is a
    /// fatal configuration error.
    pub fn from_env() -> GenAiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| GenAiError::MissingApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
            poll: PollConfig::default(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override polling behavior for video processing.
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    // =========================================================================
    // Text content
    // =========================================================================

    /// Generate titles, description, hashtags, and predicted CTR.
    #[instrument(skip_all)]
    pub async fn generate_text_content(&self, prompt: &str) -> GenAiResult<TextContent> {
        let framed = format!(
            "Based on the following information, generate a set of YouTube video \
             titles, a description, hashtags, and a predicted CTR. The tone should \
             be engaging and optimized for maximum clicks.\n\n{prompt}"
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::Text { text: framed }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(text_content_schema()),
                ..Default::default()
            }),
        };

        let response = self.call_generate_content(TEXT_MODEL, &request).await?;
        let text = first_text(&response)?;

        serde_json::from_str(strip_code_fences(&text))
            .map_err(|e| GenAiError::SchemaViolation(e.to_string()))
    }

    // =========================================================================
    // Thumbnails
    // =========================================================================

    /// Generate `count` thumbnails, returned as base64-encoded bytes.
    #[instrument(skip_all, fields(count))]
    pub async fn generate_thumbnails(
        &self,
        prompt: &str,
        count: usize,
        aspect_ratio: &str,
    ) -> GenAiResult<Vec<String>> {
        let url = format!(
            "{}/v1beta/models/{}:predict?key={}",
            self.base_url, IMAGE_MODEL, self.api_key
        );

        let request = ImagenRequest {
            instances: vec![ImagenInstance {
                prompt: prompt.to_string(),
            }],
            parameters: ImagenParameters {
                sample_count: count,
                aspect_ratio: aspect_ratio.to_string(),
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let response = check_status(response).await?;
        let imagen: ImagenResponse = response.json().await?;

        let images: Vec<String> = imagen
            .predictions
            .into_iter()
            .map(|p| p.bytes_base64_encoded)
            .collect();

        if images.len() != count {
            return Err(GenAiError::ImageCountMismatch {
                expected: count,
                actual: images.len(),
            });
        }

        Ok(images)
    }

    // =========================================================================
    // Vision analysis
    // =========================================================================

    /// Describe a single still image.
    #[instrument(skip_all)]
    pub async fn describe_image_bytes(&self, bytes: &[u8], mime_type: &str) -> GenAiResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: base64::engine::general_purpose::STANDARD.encode(bytes),
                        },
                    },
                    Part::Text {
                        text: "Briefly describe this image as if it were a frame from a \
                               YouTube video. What is happening? What is the main subject \
                               and mood?"
                            .to_string(),
                    },
                ],
            }],
            generation_config: None,
        };

        let response = self.call_generate_content(VISION_MODEL, &request).await?;
        first_text(&response)
    }

    /// Describe a video from an ordered set of sampled frames.
    #[instrument(skip_all, fields(frames = frames.len()))]
    pub async fn describe_frame_set(&self, frames: &[Frame]) -> GenAiResult<String> {
        let mut parts: Vec<Part> = frames
            .iter()
            .map(|frame| Part::InlineData {
                inline_data: InlineData {
                    mime_type: frame.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&frame.bytes),
                },
            })
            .collect();

        parts.push(Part::Text {
            text: format!(
                "These are {} still frames sampled evenly from a video, in order. \
                 Analyze them and provide a summary for a thumbnail creator. Describe \
                 the key subjects, the overall mood, and suggest 2-3 visually \
                 interesting moments that would make a great thumbnail.",
                frames.len()
            ),
        });

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: None,
        };

        let response = self.call_generate_content(VISION_MODEL, &request).await?;
        first_text(&response)
    }

    /// Describe an already-uploaded video by its file URI.
    pub(crate) async fn describe_uploaded_video(
        &self,
        file_uri: &str,
        mime_type: &str,
    ) -> GenAiResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::FileData {
                        file_data: FileData {
                            mime_type: mime_type.to_string(),
                            file_uri: file_uri.to_string(),
                        },
                    },
                    Part::Text {
                        text: "Analyze this video and provide a summary for a thumbnail \
                               creator. Describe the key subjects, the overall mood, and \
                               suggest 2-3 visually interesting moments that would make a \
                               great thumbnail."
                            .to_string(),
                    },
                ],
            }],
            generation_config: None,
        };

        let response = self.call_generate_content(VIDEO_MODEL, &request).await?;
        first_text(&response)
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Edit one image according to a free-text instruction.
    #[instrument(skip_all)]
    pub async fn edit_image_base64(
        &self,
        image_base64: &str,
        mime_type: &str,
        instruction: &str,
    ) -> GenAiResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: image_base64.to_string(),
                        },
                    },
                    Part::Text {
                        text: instruction.to_string(),
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                ..Default::default()
            }),
        };

        let response = self.call_generate_content(EDIT_MODEL, &request).await?;

        response
            .candidates
            .first()
            .map(|c| c.content.parts.iter())
            .into_iter()
            .flatten()
            .find_map(|part| part.inline_data.as_ref().map(|d| d.data.clone()))
            .ok_or(GenAiError::NoImagePayload)
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    async fn call_generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GenAiResult<GeminiResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );
        debug!(model, "Calling Gemini generateContent");

        let response = self.client.post(&url).json(request).send().await?;
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| GenAiError::request_failed(format!("Failed to parse Gemini response: {e}")))
    }
}

/// Fail on non-2xx with the response body in the error.
async fn check_status(response: reqwest::Response) -> GenAiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GenAiError::Http {
        status: status.as_u16(),
        body,
    })
}

/// First text part of the first candidate.
fn first_text(response: &GeminiResponse) -> GenAiResult<String> {
    response
        .candidates
        .first()
        .and_then(|c| c.content.parts.iter().find_map(|p| p.text.clone()))
        .ok_or(GenAiError::NoContent)
}

/// Strip markdown code fences some models wrap JSON in.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn text_response(payload: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": payload }] }
            }]
        })
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_generate_text_content_parses_contract() {
        let server = MockServer::start().await;
        let payload = serde_json::json!({
            "titles": ["t1", "t2", "t3", "t4", "t5"],
            "description": "desc",
            "hashtags": ["#a", "#b"],
            "predictedCtr": "5-7% because strong hook"
        })
        .to_string();

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&payload)))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key").with_base_url(server.uri());
        let text = client.generate_text_content("prompt").await.unwrap();

        assert_eq!(text.titles.len(), 5);
        assert!(text.predicted_ctr.starts_with("5-7%"));
    }

    #[tokio::test]
    async fn test_generate_text_content_missing_field_is_schema_violation() {
        let server = MockServer::start().await;
        // predictedCtr absent: protocol violation, not a default.
        let payload = serde_json::json!({
            "titles": ["t1"],
            "description": "desc",
            "hashtags": ["#a"]
        })
        .to_string();

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&payload)))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key").with_base_url(server.uri());
        let err = client.generate_text_content("prompt").await.unwrap_err();

        assert!(matches!(err, GenAiError::SchemaViolation(_)));
    }

    #[tokio::test]
    async fn test_generate_text_content_strips_fences() {
        let server = MockServer::start().await;
        let payload = format!(
            "```json\n{}\n```",
            serde_json::json!({
                "titles": ["t"],
                "description": "d",
                "hashtags": ["#a"],
                "predictedCtr": "3%"
            })
        );

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&payload)))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key").with_base_url(server.uri());
        assert!(client.generate_text_content("prompt").await.is_ok());
    }

    #[tokio::test]
    async fn test_generate_thumbnails_returns_exact_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/imagen-4.0-generate-001:predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [
                    { "bytesBase64Encoded": "aaa" },
                    { "bytesBase64Encoded": "bbb" },
                    { "bytesBase64Encoded": "ccc" },
                    { "bytesBase64Encoded": "ddd" }
                ]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key").with_base_url(server.uri());
        let images = client.generate_thumbnails("prompt", 4, "16:9").await.unwrap();
        assert_eq!(images, vec!["aaa", "bbb", "ccc", "ddd"]);
    }

    #[tokio::test]
    async fn test_generate_thumbnails_count_mismatch_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/imagen-4.0-generate-001:predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [{ "bytesBase64Encoded": "only" }]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key").with_base_url(server.uri());
        let err = client
            .generate_thumbnails("prompt", 4, "16:9")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenAiError::ImageCountMismatch {
                expected: 4,
                actual: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_edit_image_returns_inline_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash-image:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [
                        { "text": "here you go" },
                        { "inlineData": { "mimeType": "image/png", "data": "edited-bytes" } }
                    ]}
                }]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key").with_base_url(server.uri());
        let image = client
            .edit_image_base64("orig", "image/png", "add a sunset")
            .await
            .unwrap();
        assert_eq!(image, "edited-bytes");
    }

    #[tokio::test]
    async fn test_edit_image_without_payload_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash-image:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "sorry, no image" }] }
                }]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key").with_base_url(server.uri());
        let err = client
            .edit_image_base64("orig", "image/png", "add a sunset")
            .await
            .unwrap_err();
        assert!(matches!(err, GenAiError::NoImagePayload));
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key").with_base_url(server.uri());
        let err = client.generate_text_content("prompt").await.unwrap_err();
        match err {
            GenAiError::Http { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("quota exceeded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

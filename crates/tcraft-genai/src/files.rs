//! Provider-side file upload and processing lifecycle.
//!
//! Video analysis by upload is asynchronous on the provider side: the file
//! is uploaded, then polled until it reaches a terminal state. The loop is
//! capped; a stuck upload surfaces `ProcessingTimeout`, distinct from a
//! provider-rejected `ProcessingFailed`.

use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::client::GeminiClient;
use crate::error::{GenAiError, GenAiResult};

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Processing,
    Active,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Metadata for an uploaded file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadedFile {
    /// Resource name, e.g. "files/abc123".
    pub name: String,
    /// URI used to reference the file in generateContent calls.
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub state: FileState,
    /// Provider-supplied failure description, when present.
    #[serde(rename = "stateDescription", default)]
    pub state_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

impl GeminiClient {
    /// Upload raw video bytes and wait for provider-side processing.
    ///
    /// Returns the file metadata once `Active`. The total wait is bounded
    /// by the client's poll config.
    #[instrument(skip_all, fields(mime_type))]
    pub(crate) async fn upload_and_process(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> GenAiResult<UploadedFile> {
        let file = self.upload_file(bytes, mime_type).await?;
        info!(name = %file.name, "Uploaded video, waiting for processing");
        self.wait_until_active(file).await
    }

    /// Upload raw bytes via the files endpoint.
    async fn upload_file(&self, bytes: Vec<u8>, mime_type: &str) -> GenAiResult<UploadedFile> {
        let url = format!("{}/upload/v1beta/files?key={}", self.base_url, self.api_key);

        let response = self
            .client
            .post(&url)
            .header("X-Goog-Upload-Protocol", "raw")
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenAiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let upload: UploadResponse = response.json().await.map_err(|e| {
            GenAiError::request_failed(format!("File upload returned no metadata: {e}"))
        })?;

        Ok(upload.file)
    }

    /// Fetch current file metadata by resource name.
    async fn get_file(&self, name: &str) -> GenAiResult<UploadedFile> {
        let url = format!("{}/v1beta/{}?key={}", self.base_url, name, self.api_key);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenAiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Poll until the file reaches a terminal state or the cap is hit.
    async fn wait_until_active(&self, mut file: UploadedFile) -> GenAiResult<UploadedFile> {
        let started = Instant::now();

        loop {
            match file.state {
                FileState::Active => return Ok(file),
                FileState::Failed => {
                    return Err(GenAiError::ProcessingFailed(
                        file.state_description
                            .unwrap_or_else(|| "provider reported failure".to_string()),
                    ))
                }
                FileState::Unknown => {
                    return Err(GenAiError::request_failed(format!(
                        "Unexpected state for file {}",
                        file.name
                    )))
                }
                FileState::Processing => {}
            }

            if started.elapsed() >= self.poll.timeout {
                return Err(GenAiError::ProcessingTimeout(self.poll.timeout.as_secs()));
            }

            debug!(name = %file.name, "Video still processing");
            tokio::time::sleep(self.poll.interval).await;
            file = self.get_file(&file.name).await?;
        }
    }

    /// Full video-analysis path: upload, wait, describe.
    pub async fn analyze_video_upload(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> GenAiResult<String> {
        let file = self.upload_and_process(bytes, mime_type).await?;
        self.describe_uploaded_video(&file.uri, &file.mime_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::client::PollConfig;

    fn file_json(state: &str) -> serde_json::Value {
        serde_json::json!({
            "name": "files/abc",
            "uri": "https://example.test/files/abc",
            "mimeType": "video/mp4",
            "state": state
        })
    }

    fn fast_poll() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(5),
            timeout: Duration::from_millis(50),
        }
    }

    #[test]
    fn test_file_state_parses_wire_names() {
        let file: UploadedFile = serde_json::from_value(file_json("PROCESSING")).unwrap();
        assert_eq!(file.state, FileState::Processing);
        let file: UploadedFile = serde_json::from_value(file_json("ACTIVE")).unwrap();
        assert_eq!(file.state, FileState::Active);
        let file: UploadedFile = serde_json::from_value(file_json("SOMETHING_NEW")).unwrap();
        assert_eq!(file.state, FileState::Unknown);
    }

    #[tokio::test]
    async fn test_upload_immediately_active() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "file": file_json("ACTIVE") })),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new("k")
            .with_base_url(server.uri())
            .with_poll_config(fast_poll());

        let file = client
            .upload_and_process(b"video".to_vec(), "video/mp4")
            .await
            .unwrap();
        assert_eq!(file.state, FileState::Active);
    }

    #[tokio::test]
    async fn test_processing_then_active() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "file": file_json("PROCESSING") })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_json("ACTIVE")))
            .mount(&server)
            .await;

        let client = GeminiClient::new("k")
            .with_base_url(server.uri())
            .with_poll_config(fast_poll());

        let file = client
            .upload_and_process(b"video".to_vec(), "video/mp4")
            .await
            .unwrap();
        assert_eq!(file.state, FileState::Active);
    }

    #[tokio::test]
    async fn test_failed_processing_surfaces_description() {
        let server = MockServer::start().await;
        let mut failed = file_json("FAILED");
        failed["stateDescription"] = serde_json::json!("unsupported codec");

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "file": failed })),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new("k")
            .with_base_url(server.uri())
            .with_poll_config(fast_poll());

        let err = client
            .upload_and_process(b"video".to_vec(), "video/mp4")
            .await
            .unwrap_err();
        match err {
            GenAiError::ProcessingFailed(desc) => assert!(desc.contains("unsupported codec")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stuck_processing_times_out_distinctly() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "file": file_json("PROCESSING") })),
            )
            .mount(&server)
            .await;
        // Never leaves PROCESSING.
        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_json("PROCESSING")))
            .mount(&server)
            .await;

        let client = GeminiClient::new("k")
            .with_base_url(server.uri())
            .with_poll_config(fast_poll());

        let err = client
            .upload_and_process(b"video".to_vec(), "video/mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, GenAiError::ProcessingTimeout(_)));
    }
}

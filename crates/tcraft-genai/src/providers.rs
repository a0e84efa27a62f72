//! Engine collaborator trait implementations for the Gemini client.

use async_trait::async_trait;

use tcraft_engine::{ImageEditor, ImageGenerator, TextGenerator, VisionAnalyzer};
use tcraft_models::{Frame, TextContent};

use crate::client::GeminiClient;

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> anyhow::Result<TextContent> {
        Ok(self.generate_text_content(prompt).await?)
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate_images(
        &self,
        prompt: &str,
        count: usize,
        aspect_ratio: &str,
    ) -> anyhow::Result<Vec<String>> {
        Ok(self.generate_thumbnails(prompt, count, aspect_ratio).await?)
    }
}

#[async_trait]
impl VisionAnalyzer for GeminiClient {
    async fn describe_image(&self, bytes: &[u8], mime_type: &str) -> anyhow::Result<String> {
        Ok(self.describe_image_bytes(bytes, mime_type).await?)
    }

    async fn describe_frames(&self, frames: &[Frame]) -> anyhow::Result<String> {
        Ok(self.describe_frame_set(frames).await?)
    }

    async fn describe_video_file(&self, bytes: &[u8], mime_type: &str) -> anyhow::Result<String> {
        Ok(self.analyze_video_upload(bytes.to_vec(), mime_type).await?)
    }
}

#[async_trait]
impl ImageEditor for GeminiClient {
    async fn edit_image(
        &self,
        image_base64: &str,
        mime_type: &str,
        instruction: &str,
    ) -> anyhow::Result<String> {
        Ok(self
            .edit_image_base64(image_base64, mime_type, instruction)
            .await?)
    }
}

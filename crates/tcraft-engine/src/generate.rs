//! Generation orchestrator.
//!
//! Coordinates one full generation: pre-flight credit check, media
//! analysis, prompt composition, the concurrent text/image fan-out, and
//! the persist-then-debit commit sequence.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use tcraft_models::{
    CreditKind, CreditTransaction, GeneratedContent, GenerationRequest, MediaInput,
    PastGeneration,
};

use crate::analyzer;
use crate::credits::CreditLedger;
use crate::error::{EngineError, EngineResult};
use crate::prompt;
use crate::traits::{FrameSampler, ImageGenerator, ProfileStore, TextGenerator, VisionAnalyzer};

/// How video uploads are analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// Sample evenly spaced frames locally and describe those.
    #[default]
    Frames,
    /// Upload the whole file and let the provider process it.
    Upload,
}

/// Orchestrator tuning.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Frames sampled per video in `Frames` mode.
    pub frame_count: usize,
    /// Thumbnails per generation. Fixed for the lifetime of a generation.
    pub thumbnail_count: usize,
    pub analysis_mode: AnalysisMode,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            frame_count: tcraft_media::DEFAULT_FRAME_COUNT,
            thumbnail_count: tcraft_models::generation::THUMBNAIL_COUNT,
            analysis_mode: AnalysisMode::Frames,
        }
    }
}

/// Runs generations against the injected collaborators.
pub struct GenerationOrchestrator {
    vision: Arc<dyn VisionAnalyzer>,
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageGenerator>,
    sampler: Arc<dyn FrameSampler>,
    store: Arc<dyn ProfileStore>,
    config: GenerationConfig,
}

impl GenerationOrchestrator {
    pub fn new(
        vision: Arc<dyn VisionAnalyzer>,
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
        sampler: Arc<dyn FrameSampler>,
        store: Arc<dyn ProfileStore>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            vision,
            text,
            images,
            sampler,
            store,
            config,
        }
    }

    /// Run one generation to completion.
    ///
    /// Either fully succeeds (content persisted, one credit debited) or
    /// fails with no partial content. The ledger is the pre-flight gate:
    /// a zero balance is rejected before any network activity.
    #[instrument(skip_all, fields(user_id = %user_id, style = %request.style))]
    pub async fn generate(
        &self,
        user_id: &str,
        request: GenerationRequest,
        ledger: &CreditLedger,
    ) -> EngineResult<PastGeneration> {
        if ledger.balance() == 0 {
            return Err(EngineError::InsufficientCredits);
        }

        let analysis = self.analyze_media(&request.media).await?;

        let thumbnail_prompt =
            prompt::compose_thumbnail_prompt(request.style, &request.user_prompt, &analysis);
        let text_prompt =
            prompt::compose_text_prompt(request.style, &request.user_prompt, &analysis);

        // The two calls are independent and each takes seconds; run them
        // concurrently so the latencies overlap. try_join fails fast, and
        // each branch tags its own error so the caller knows which half
        // fell over.
        let (text, thumbnails) = tokio::try_join!(
            async {
                self.text
                    .generate_text(&text_prompt)
                    .await
                    .map_err(|e| EngineError::TextGeneration(e.to_string()))
            },
            async {
                let images = self
                    .images
                    .generate_images(&thumbnail_prompt, self.config.thumbnail_count, "16:9")
                    .await
                    .map_err(|e| EngineError::ThumbnailGeneration(e.to_string()))?;
                if images.len() != self.config.thumbnail_count {
                    return Err(EngineError::ThumbnailGeneration(format!(
                        "expected {} thumbnails, got {}",
                        self.config.thumbnail_count,
                        images.len()
                    )));
                }
                Ok(images)
            }
        )?;

        let generation = PastGeneration {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            prompt: request.user_prompt.clone(),
            style: request.style,
            content: GeneratedContent::from_parts(text, thumbnails),
            created_at: Utc::now(),
        };

        // Persist first: a failed write must not consume a credit.
        self.store
            .save_generation(&generation)
            .await
            .map_err(|e| EngineError::Store(e.to_string()))?;

        self.debit_credit(user_id, &generation.id, ledger).await;

        info!(generation_id = %generation.id, "Generation complete");
        Ok(generation)
    }

    /// Analyze the uploaded media into a free-text description.
    async fn analyze_media(&self, media: &MediaInput) -> EngineResult<String> {
        match media {
            MediaInput::Image { bytes, mime_type } => {
                analyzer::analyze_image(self.vision.as_ref(), bytes, mime_type).await
            }
            MediaInput::Video { handle, mime_type } => match self.config.analysis_mode {
                AnalysisMode::Frames => {
                    let frames = self
                        .sampler
                        .sample(handle.path(), self.config.frame_count)
                        .await?;
                    analyzer::analyze_frames(self.vision.as_ref(), &frames).await
                }
                AnalysisMode::Upload => {
                    let bytes = handle
                        .read_bytes()
                        .map_err(|e| EngineError::Ingest(e.to_string()))?;
                    analyzer::analyze_video_file(self.vision.as_ref(), &bytes, mime_type).await
                }
            },
        }
    }

    /// Debit one credit after the record exists.
    ///
    /// The store retries internally; if the debit still fails, the persisted
    /// record is the recoverable source of truth, the mirror is debited
    /// locally, and the balances reconcile on the next profile read.
    async fn debit_credit(&self, user_id: &str, generation_id: &str, ledger: &CreditLedger) {
        match self.store.adjust_credits(user_id, -1).await {
            Ok(balance) => {
                ledger.sync(balance);
                let tx = CreditTransaction::new(
                    user_id,
                    CreditKind::Generation,
                    1,
                    balance,
                    format!("Content generation {generation_id}"),
                );
                if let Err(e) = self.store.record_transaction(&tx).await {
                    warn!(user_id, error = %e, "Failed to record credit transaction");
                }
            }
            Err(e) => {
                error!(
                    user_id,
                    generation_id,
                    error = %e,
                    "Credit debit failed after successful persistence"
                );
                let _ = ledger.debit_one();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tcraft_models::{Frame, TextContent, ThumbnailStyle};

    use crate::traits::{
        MockFrameSampler, MockImageGenerator, MockProfileStore, MockTextGenerator,
        MockVisionAnalyzer,
    };

    fn sample_text() -> TextContent {
        TextContent {
            titles: (1..=5).map(|i| format!("Title {i}")).collect(),
            description: "A description".into(),
            hashtags: (1..=10).map(|i| format!("#tag{i}")).collect(),
            predicted_ctr: "5-7% strong hook".into(),
        }
    }

    fn sample_thumbnails() -> Vec<String> {
        vec!["t0".into(), "t1".into(), "t2".into(), "t3".into()]
    }

    fn image_request() -> GenerationRequest {
        GenerationRequest {
            user_prompt: "cooking tutorial".into(),
            style: ThumbnailStyle::Retro,
            media: crate::ingest::ingest(vec![0xFF, 0xD8], "image/jpeg").unwrap(),
        }
    }

    struct Mocks {
        vision: MockVisionAnalyzer,
        text: MockTextGenerator,
        images: MockImageGenerator,
        sampler: MockFrameSampler,
        store: MockProfileStore,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                vision: MockVisionAnalyzer::new(),
                text: MockTextGenerator::new(),
                images: MockImageGenerator::new(),
                sampler: MockFrameSampler::new(),
                store: MockProfileStore::new(),
            }
        }

        fn into_orchestrator(self) -> GenerationOrchestrator {
            GenerationOrchestrator::new(
                Arc::new(self.vision),
                Arc::new(self.text),
                Arc::new(self.images),
                Arc::new(self.sampler),
                Arc::new(self.store),
                GenerationConfig::default(),
            )
        }
    }

    #[tokio::test]
    async fn test_zero_credits_rejected_before_any_call() {
        // No expectations set: any collaborator call would panic.
        let orchestrator = Mocks::new().into_orchestrator();
        let ledger = CreditLedger::new(0);

        let err = orchestrator
            .generate("user-1", image_request(), &ledger)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::InsufficientCredits));
    }

    #[tokio::test]
    async fn test_image_failure_fails_whole_generation() {
        let mut mocks = Mocks::new();
        mocks
            .vision
            .expect_describe_image()
            .returning(|_, _| Ok("analysis".into()));
        mocks
            .text
            .expect_generate_text()
            .returning(|_| Ok(sample_text()));
        mocks
            .images
            .expect_generate_images()
            .returning(|_, _, _| Err(anyhow::anyhow!("imagen unavailable")));
        // save_generation must never run: no expectation set on the store.

        let orchestrator = mocks.into_orchestrator();
        let ledger = CreditLedger::new(3);

        let err = orchestrator
            .generate("user-1", image_request(), &ledger)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::ThumbnailGeneration(_)));
        assert!(err.to_string().contains("imagen unavailable"));
        assert_eq!(ledger.balance(), 3);
    }

    #[tokio::test]
    async fn test_text_failure_fails_whole_generation() {
        let mut mocks = Mocks::new();
        mocks
            .vision
            .expect_describe_image()
            .returning(|_, _| Ok("analysis".into()));
        mocks
            .text
            .expect_generate_text()
            .returning(|_| Err(anyhow::anyhow!("schema violation")));
        mocks
            .images
            .expect_generate_images()
            .returning(|_, _, _| Ok(sample_thumbnails()));

        let orchestrator = mocks.into_orchestrator();
        let ledger = CreditLedger::new(1);

        let err = orchestrator
            .generate("user-1", image_request(), &ledger)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::TextGeneration(_)));
    }

    #[tokio::test]
    async fn test_wrong_thumbnail_count_is_a_failure() {
        let mut mocks = Mocks::new();
        mocks
            .vision
            .expect_describe_image()
            .returning(|_, _| Ok("analysis".into()));
        mocks
            .text
            .expect_generate_text()
            .returning(|_| Ok(sample_text()));
        mocks
            .images
            .expect_generate_images()
            .returning(|_, _, _| Ok(vec!["only-one".into()]));

        let orchestrator = mocks.into_orchestrator();
        let ledger = CreditLedger::new(1);

        let err = orchestrator
            .generate("user-1", image_request(), &ledger)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::ThumbnailGeneration(_)));
    }

    #[tokio::test]
    async fn test_success_persists_then_debits() {
        let mut mocks = Mocks::new();
        let mut seq = mockall::Sequence::new();

        mocks
            .vision
            .expect_describe_image()
            .returning(|_, _| Ok("analysis".into()));
        mocks
            .text
            .expect_generate_text()
            .returning(|_| Ok(sample_text()));
        mocks
            .images
            .expect_generate_images()
            .withf(|_, count, aspect| *count == 4 && aspect == "16:9")
            .returning(|_, _, _| Ok(sample_thumbnails()));

        mocks
            .store
            .expect_save_generation()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mocks
            .store
            .expect_adjust_credits()
            .withf(|_, delta| *delta == -1)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(2));
        mocks
            .store
            .expect_record_transaction()
            .times(1)
            .returning(|_| Ok(()));

        let orchestrator = mocks.into_orchestrator();
        let ledger = CreditLedger::new(3);

        let generation = orchestrator
            .generate("user-1", image_request(), &ledger)
            .await
            .unwrap();

        assert_eq!(generation.content.thumbnails.len(), 4);
        assert_eq!(generation.prompt, "cooking tutorial");
        assert_eq!(ledger.balance(), 2);
    }

    #[tokio::test]
    async fn test_video_request_samples_frames_then_analyzes() {
        let mut mocks = Mocks::new();

        mocks.sampler.expect_sample().times(1).returning(|_, count| {
            Ok((0..count)
                .map(|i| Frame {
                    bytes: vec![0xFF],
                    mime_type: "image/jpeg".into(),
                    timestamp_secs: i as f64 * 2.0,
                })
                .collect())
        });
        mocks
            .vision
            .expect_describe_frames()
            .withf(|frames| frames.len() == 5)
            .times(1)
            .returning(|_| Ok("video analysis".into()));
        mocks
            .text
            .expect_generate_text()
            .returning(|_| Ok(sample_text()));
        mocks
            .images
            .expect_generate_images()
            .returning(|_, _, _| Ok(sample_thumbnails()));
        mocks
            .store
            .expect_save_generation()
            .returning(|_| Ok(()));
        mocks
            .store
            .expect_adjust_credits()
            .returning(|_, _| Ok(0));
        mocks
            .store
            .expect_record_transaction()
            .returning(|_| Ok(()));

        let request = GenerationRequest {
            user_prompt: "travel vlog".into(),
            style: ThumbnailStyle::Cinematic,
            media: crate::ingest::ingest(b"video".to_vec(), "video/mp4").unwrap(),
        };

        let orchestrator = mocks.into_orchestrator();
        let ledger = CreditLedger::new(1);

        let generation = orchestrator
            .generate("user-1", request, &ledger)
            .await
            .unwrap();

        assert_eq!(generation.style, ThumbnailStyle::Cinematic);
        assert_eq!(ledger.balance(), 0);
    }

    #[tokio::test]
    async fn test_debit_failure_still_returns_content() {
        let mut mocks = Mocks::new();
        mocks
            .vision
            .expect_describe_image()
            .returning(|_, _| Ok("analysis".into()));
        mocks
            .text
            .expect_generate_text()
            .returning(|_| Ok(sample_text()));
        mocks
            .images
            .expect_generate_images()
            .returning(|_, _, _| Ok(sample_thumbnails()));
        mocks
            .store
            .expect_save_generation()
            .returning(|_| Ok(()));
        mocks
            .store
            .expect_adjust_credits()
            .returning(|_, _| Err(anyhow::anyhow!("precondition churn")));

        let orchestrator = mocks.into_orchestrator();
        let ledger = CreditLedger::new(3);

        let generation = orchestrator
            .generate("user-1", image_request(), &ledger)
            .await;

        // The persisted record is the source of truth; the mirror debits
        // locally so the user cannot generate for free until re-sync.
        assert!(generation.is_ok());
        assert_eq!(ledger.balance(), 2);
    }
}

//! Application state.

use std::sync::Arc;

use tcraft_engine::{
    CreditLedgers, EditOrchestrator, EditSessions, FfmpegSampler, GenerationConfig,
    GenerationOrchestrator, ImageEditor, ImageGenerator, ProfileStore, TextGenerator,
    VisionAnalyzer,
};
use tcraft_firestore::{FirestoreClient, FirestoreProfileStore};
use tcraft_genai::GeminiClient;

use crate::auth::JwksCache;
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn ProfileStore>,
    pub generator: Arc<GenerationOrchestrator>,
    pub editor: Arc<EditOrchestrator>,
    pub ledgers: Arc<CreditLedgers>,
    pub edit_sessions: Arc<EditSessions>,
    pub jwks: Arc<JwksCache>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Fails fast when the generation credential or store credentials are
    /// missing; the server must not come up half-wired.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let gemini = Arc::new(GeminiClient::from_env()?);
        let vision: Arc<dyn VisionAnalyzer> = Arc::clone(&gemini) as Arc<dyn VisionAnalyzer>;
        let text: Arc<dyn TextGenerator> = Arc::clone(&gemini) as Arc<dyn TextGenerator>;
        let images: Arc<dyn ImageGenerator> = Arc::clone(&gemini) as Arc<dyn ImageGenerator>;
        let image_editor: Arc<dyn ImageEditor> = Arc::clone(&gemini) as Arc<dyn ImageEditor>;
        let firestore = FirestoreClient::from_env().await?;
        let store: Arc<dyn ProfileStore> = Arc::new(FirestoreProfileStore::new(firestore));
        let jwks = JwksCache::new().await?;

        let generation_config = GenerationConfig {
            frame_count: config.frame_count,
            thumbnail_count: config.thumbnail_count,
            analysis_mode: config.analysis_mode,
        };

        let generator = Arc::new(GenerationOrchestrator::new(
            vision,
            text,
            images,
            Arc::new(FfmpegSampler),
            Arc::clone(&store),
            generation_config,
        ));

        let editor = Arc::new(EditOrchestrator::new(image_editor));

        Ok(Self {
            config,
            store,
            generator,
            editor,
            ledgers: Arc::new(CreditLedgers::new()),
            edit_sessions: Arc::new(EditSessions::new()),
            jwks: Arc::new(jwks),
        })
    }
}

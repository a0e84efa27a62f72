//! Generation and thumbnail edit handlers.

use std::time::Instant;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use tcraft_engine::ProfileStore;
use tcraft_models::{GeneratedContent, GenerationRequest, PastGeneration, ThumbnailStyle};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Upper bound on the user prompt, matching the UI's textarea limit.
const MAX_PROMPT_LEN: usize = 2000;

/// Create a new generation from an uploaded image or video.
///
/// Multipart form: `media` (the file), `prompt` (free text), `style`
/// (one of the style tags; unknown values fall back to cinematic).
pub async fn create_generation(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<PastGeneration>> {
    let mut media: Option<(Vec<u8>, String)> = None;
    let mut prompt = String::new();
    let mut style = ThumbnailStyle::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("media") => {
                let mime_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;
                media = Some((bytes.to_vec(), mime_type));
            }
            Some("prompt") => {
                prompt = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read prompt: {e}")))?;
            }
            Some("style") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read style: {e}")))?;
                style = ThumbnailStyle::parse_lossy(&raw);
            }
            _ => {}
        }
    }

    let (bytes, mime_type) =
        media.ok_or_else(|| ApiError::bad_request("Missing 'media' file field"))?;

    let prompt = prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(ApiError::bad_request("Describe your video before generating"));
    }
    if prompt.len() > MAX_PROMPT_LEN {
        return Err(ApiError::bad_request("Prompt too long"));
    }

    let media = tcraft_engine::ingest(bytes, &mime_type)?;

    // Sync the in-memory mirror from the store, then let the orchestrator
    // run its network-free pre-flight against it.
    let profile = state
        .store
        .get_or_create_profile(&user.uid, user.email.clone())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let ledger = state.ledgers.ledger_for(&user.uid);
    ledger.sync(profile.credits);

    let request = GenerationRequest {
        user_prompt: prompt,
        style,
        media,
    };

    let start = Instant::now();
    let result = state.generator.generate(&user.uid, request, &ledger).await;

    let outcome = if result.is_ok() { "success" } else { "failure" };
    metrics::record_generation(style.as_str(), outcome, start.elapsed().as_secs_f64());

    Ok(Json(result?))
}

/// List the user's past generations, newest first.
pub async fn list_generations(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<PastGeneration>>> {
    let generations = state
        .store
        .list_generations(&user.uid)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(generations))
}

/// Edit request body.
#[derive(Debug, Deserialize)]
pub struct EditThumbnailRequest {
    /// Free-text edit instruction, e.g. "make the sky more dramatic".
    pub prompt: String,
}

/// Edit one thumbnail of an existing generation.
///
/// Returns the full content with only the addressed slot replaced. The
/// edit is session-local: history keeps the original thumbnails.
pub async fn edit_thumbnail(
    State(state): State<AppState>,
    user: AuthUser,
    Path((generation_id, index)): Path<(String, usize)>,
    Json(body): Json<EditThumbnailRequest>,
) -> ApiResult<Json<GeneratedContent>> {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::bad_request("Describe the edit you want"));
    }

    let generation = state
        .store
        .get_generation(&user.uid, &generation_id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found(format!("Generation {generation_id}")))?;

    // One edit in flight per generation; concurrent submissions are
    // rejected rather than queued.
    let session = state.edit_sessions.session_for(&generation_id);
    let _guard = session.begin()?;

    let result = state
        .editor
        .edit_thumbnail(&generation.content, index, prompt)
        .await;

    let outcome = if result.is_ok() { "success" } else { "failure" };
    metrics::record_thumbnail_edit(outcome);

    if let Err(ref e) = result {
        warn!(
            user_id = %user.uid,
            generation_id = %generation_id,
            index,
            error = %e,
            "Thumbnail edit failed"
        );
    }

    Ok(Json(result?))
}

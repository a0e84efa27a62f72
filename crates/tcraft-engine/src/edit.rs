//! Thumbnail edit orchestrator.
//!
//! Replaces exactly one thumbnail slot in an existing generation. The
//! orchestrator never mutates in place: it returns a new content value or
//! an error, so the caller always holds the prior state as a rollback
//! point. An `EditSession` guard enforces at most one edit in flight per
//! thumbnail set.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{info, instrument};

use tcraft_models::GeneratedContent;

use crate::error::{EngineError, EngineResult};
use crate::traits::ImageEditor;

/// Thumbnails are produced as PNG; edits operate on the same encoding.
const THUMBNAIL_MIME: &str = "image/png";

/// Runs single-thumbnail edits against the injected editor.
pub struct EditOrchestrator {
    editor: Arc<dyn ImageEditor>,
}

impl EditOrchestrator {
    pub fn new(editor: Arc<dyn ImageEditor>) -> Self {
        Self { editor }
    }

    /// Edit one thumbnail, returning a new content value.
    ///
    /// Bounds-checks the index before any network call. On success the
    /// result differs from `current` only at `thumbnails[index]`; on
    /// failure `current` is untouched.
    #[instrument(skip_all, fields(index))]
    pub async fn edit_thumbnail(
        &self,
        current: &GeneratedContent,
        index: usize,
        edit_prompt: &str,
    ) -> EngineResult<GeneratedContent> {
        let len = current.thumbnails.len();
        if index >= len {
            return Err(EngineError::InvalidThumbnailIndex { index, len });
        }

        let edited = self
            .editor
            .edit_image(&current.thumbnails[index], THUMBNAIL_MIME, edit_prompt)
            .await
            .map_err(|e| EngineError::Edit(e.to_string()))?;

        info!("Thumbnail edit complete");
        Ok(current.with_thumbnail(index, edited))
    }
}

/// Edit state visible to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Idle,
    Editing,
}

/// One-edit-at-a-time guard for a thumbnail set.
///
/// State machine: Idle -> Editing -> Idle, on both success and failure.
/// The transition back to Idle rides on guard drop, so an early return or
/// an upstream error cannot wedge the session.
#[derive(Debug, Default)]
pub struct EditSession {
    editing: AtomicBool,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditState {
        if self.editing.load(Ordering::Acquire) {
            EditState::Editing
        } else {
            EditState::Idle
        }
    }

    /// Enter the Editing state. Fails when an edit is already in flight.
    pub fn begin(&self) -> EngineResult<EditGuard<'_>> {
        if self
            .editing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EngineError::EditInProgress);
        }
        Ok(EditGuard { session: self })
    }
}

/// Held for the duration of one edit; returns the session to Idle on drop.
#[derive(Debug)]
pub struct EditGuard<'a> {
    session: &'a EditSession,
}

impl Drop for EditGuard<'_> {
    fn drop(&mut self) {
        self.session.editing.store(false, Ordering::Release);
    }
}

/// Per-generation edit session registry shared across request handlers.
#[derive(Debug, Default)]
pub struct EditSessions {
    sessions: Mutex<HashMap<String, Arc<EditSession>>>,
}

impl EditSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_for(&self, generation_id: &str) -> Arc<EditSession> {
        let mut sessions = self.sessions.lock().unwrap();
        Arc::clone(
            sessions
                .entry(generation_id.to_string())
                .or_insert_with(|| Arc::new(EditSession::new())),
        )
    }
}

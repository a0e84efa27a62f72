//! User profile repository.
//!
//! Profiles live at `users/{uid}` with an email and a credit balance. Credit
//! adjustments use optimistic locking on the document's `updateTime` so
//! concurrent writers cannot produce an incorrect balance; debits floor at
//! zero.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use tcraft_models::{UserProfile, STARTING_CREDITS};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, ToFirestoreValue};

/// Maximum retries for atomic credit operations (optimistic locking).
const MAX_CREDIT_RETRIES: u32 = 5;

/// Base delay for exponential backoff on retry (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 50;

/// Collection holding user profiles.
const USERS_COLLECTION: &str = "users";

/// Repository for user profile documents.
pub struct ProfileRepository {
    client: FirestoreClient,
}

impl ProfileRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Get a profile, or `None` when the user has no document yet.
    pub async fn get(&self, user_id: &str) -> FirestoreResult<Option<UserProfile>> {
        let doc = self.client.get_document(USERS_COLLECTION, user_id).await?;
        Ok(doc.as_ref().map(document_to_profile))
    }

    /// Get the profile, creating it with the starting credit grant when
    /// absent. Creation races resolve by re-reading the winner's document.
    pub async fn get_or_create(
        &self,
        user_id: &str,
        email: Option<&str>,
    ) -> FirestoreResult<UserProfile> {
        if let Some(profile) = self.get(user_id).await? {
            return Ok(profile);
        }

        let profile = UserProfile::new(email.map(|e| e.to_string()));
        let mut fields = HashMap::new();
        if let Some(email) = &profile.email {
            fields.insert("email".to_string(), email.to_firestore_value());
        }
        fields.insert("credits".to_string(), profile.credits.to_firestore_value());
        fields.insert("created_at".to_string(), Utc::now().to_firestore_value());

        match self
            .client
            .create_document(USERS_COLLECTION, user_id, fields)
            .await
        {
            Ok(_) => {
                info!(user_id, credits = STARTING_CREDITS, "Created user profile");
                Ok(profile)
            }
            Err(FirestoreError::AlreadyExists(_)) => {
                // Lost a creation race; the other writer's document wins.
                self.get(user_id)
                    .await?
                    .ok_or_else(|| FirestoreError::not_found(format!("users/{user_id}")))
            }
            Err(e) => Err(e),
        }
    }

    /// Atomically adjust the credit balance by `delta` and return the new
    /// balance. Debits floor at zero; the balance can never go negative.
    ///
    /// Uses the document's `updateTime` as a precondition and retries with
    /// backoff when a concurrent writer lands first.
    pub async fn adjust_credits(&self, user_id: &str, delta: i64) -> FirestoreResult<u32> {
        let mut last_error = None;

        for attempt in 0..MAX_CREDIT_RETRIES {
            let doc = self
                .client
                .get_document(USERS_COLLECTION, user_id)
                .await?
                .ok_or_else(|| {
                    warn!(user_id, "User not found when adjusting credits");
                    FirestoreError::not_found(format!("users/{user_id}"))
                })?;

            let current: u32 = doc.field("credits").unwrap_or(0);
            let new_balance = if delta >= 0 {
                current.saturating_add(delta as u32)
            } else {
                current.saturating_sub(delta.unsigned_abs() as u32)
            };

            let mut fields = HashMap::new();
            fields.insert("credits".to_string(), new_balance.to_firestore_value());
            fields.insert("updated_at".to_string(), Utc::now().to_firestore_value());

            let update_mask = vec!["credits".to_string(), "updated_at".to_string()];

            match self
                .client
                .update_document_with_precondition(
                    USERS_COLLECTION,
                    user_id,
                    fields,
                    Some(update_mask),
                    doc.update_time.as_deref(),
                )
                .await
            {
                Ok(_) => {
                    info!(user_id, delta, balance = new_balance, "Adjusted credits");
                    return Ok(new_balance);
                }
                Err(e) if e.is_precondition_failed() => {
                    debug!(
                        user_id,
                        attempt = attempt + 1,
                        "Credit adjustment precondition failed, retrying"
                    );
                    last_error = Some(e);
                    let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * (attempt as u64 + 1));
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(e) => {
                    warn!(user_id, error = %e, "Failed to adjust credits");
                    return Err(e);
                }
            }
        }

        warn!(
            user_id,
            retries = MAX_CREDIT_RETRIES,
            error = ?last_error,
            "Credit adjustment failed after retries"
        );
        Err(FirestoreError::request_failed(
            "Failed to adjust credits due to concurrent updates",
        ))
    }
}

/// Map a Firestore document onto a profile.
fn document_to_profile(doc: &Document) -> UserProfile {
    UserProfile {
        email: doc.field("email"),
        credits: doc.field("credits").unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn doc_with(fields: Vec<(&str, Value)>) -> Document {
        Document {
            name: None,
            fields: Some(
                fields
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            ),
            create_time: None,
            update_time: Some("2026-01-01T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_document_to_profile() {
        let doc = doc_with(vec![
            ("email", Value::StringValue("a@b.c".into())),
            ("credits", Value::IntegerValue("3".into())),
        ]);
        let profile = document_to_profile(&doc);
        assert_eq!(profile.email.as_deref(), Some("a@b.c"));
        assert_eq!(profile.credits, 3);
    }

    #[test]
    fn test_missing_credits_defaults_to_zero() {
        let doc = doc_with(vec![("email", Value::StringValue("a@b.c".into()))]);
        assert_eq!(document_to_profile(&doc).credits, 0);
    }
}

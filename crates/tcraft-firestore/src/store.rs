//! `ProfileStore` implementation backed by Firestore.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::info;

use tcraft_engine::ProfileStore;
use tcraft_models::{CreditTransaction, PastGeneration, UserProfile};

use crate::client::FirestoreClient;
use crate::generations::GenerationRepository;
use crate::profiles::ProfileRepository;
use crate::types::ToFirestoreValue;

/// Firestore-backed profile/credit/history store.
pub struct FirestoreProfileStore {
    client: FirestoreClient,
    profiles: ProfileRepository,
    generations: GenerationRepository,
}

impl FirestoreProfileStore {
    pub fn new(client: FirestoreClient) -> Self {
        Self {
            profiles: ProfileRepository::new(client.clone()),
            generations: GenerationRepository::new(client.clone()),
            client,
        }
    }
}

#[async_trait]
impl ProfileStore for FirestoreProfileStore {
    async fn get_or_create_profile(
        &self,
        user_id: &str,
        email: Option<String>,
    ) -> anyhow::Result<UserProfile> {
        Ok(self.profiles.get_or_create(user_id, email.as_deref()).await?)
    }

    async fn adjust_credits(&self, user_id: &str, delta: i64) -> anyhow::Result<u32> {
        Ok(self.profiles.adjust_credits(user_id, delta).await?)
    }

    async fn save_generation(&self, generation: &PastGeneration) -> anyhow::Result<()> {
        Ok(self.generations.create(generation).await?)
    }

    async fn get_generation(
        &self,
        user_id: &str,
        generation_id: &str,
    ) -> anyhow::Result<Option<PastGeneration>> {
        Ok(self.generations.get(user_id, generation_id).await?)
    }

    async fn list_generations(&self, user_id: &str) -> anyhow::Result<Vec<PastGeneration>> {
        Ok(self.generations.list(user_id).await?)
    }

    async fn record_transaction(&self, tx: &CreditTransaction) -> anyhow::Result<()> {
        let collection = format!("users/{}/credit_transactions", tx.user_id);

        let mut fields = HashMap::new();
        fields.insert("kind".to_string(), tx.kind.as_str().to_firestore_value());
        fields.insert("amount".to_string(), tx.amount.to_firestore_value());
        fields.insert(
            "balance_after".to_string(),
            tx.balance_after.to_firestore_value(),
        );
        fields.insert(
            "description".to_string(),
            tx.description.to_firestore_value(),
        );
        fields.insert("created_at".to_string(), tx.created_at.to_firestore_value());

        self.client
            .create_document(&collection, &tx.id, fields)
            .await?;

        info!(
            user_id = %tx.user_id,
            transaction_id = %tx.id,
            kind = tx.kind.as_str(),
            amount = tx.amount,
            "Recorded credit transaction"
        );
        Ok(())
    }
}

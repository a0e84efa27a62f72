//! Generation history repository.
//!
//! Generations live in a top-level `generations` collection keyed by a
//! client-minted ID, with a `userId` field scoping them per user. Listing
//! orders by `createdAt` descending (newest first).

use std::collections::HashMap;

use tracing::{info, warn};

use tcraft_models::{GeneratedContent, PastGeneration, ThumbnailStyle};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{
    CollectionSelector, Document, FieldFilter, FieldReference, Filter, Order, StructuredQuery,
    ToFirestoreValue, Value,
};

/// Collection holding generation records.
const GENERATIONS_COLLECTION: &str = "generations";

/// Default page size for history listings.
const LIST_LIMIT: i32 = 50;

/// Repository for generation documents.
pub struct GenerationRepository {
    client: FirestoreClient,
}

impl GenerationRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Persist a completed generation.
    pub async fn create(&self, generation: &PastGeneration) -> FirestoreResult<()> {
        let fields = generation_to_fields(generation);
        self.client
            .create_document(GENERATIONS_COLLECTION, &generation.id, fields)
            .await?;
        info!(
            generation_id = %generation.id,
            user_id = %generation.user_id,
            "Saved generation"
        );
        Ok(())
    }

    /// Load one generation, scoped to its owner. Returns `None` when the
    /// document is absent or belongs to another user.
    pub async fn get(
        &self,
        user_id: &str,
        generation_id: &str,
    ) -> FirestoreResult<Option<PastGeneration>> {
        let doc = self
            .client
            .get_document(GENERATIONS_COLLECTION, generation_id)
            .await?;

        match doc {
            Some(d) => {
                let generation = document_to_generation(&d)?;
                if generation.user_id != user_id {
                    return Ok(None);
                }
                Ok(Some(generation))
            }
            None => Ok(None),
        }
    }

    /// List the user's generations, newest first.
    pub async fn list(&self, user_id: &str) -> FirestoreResult<Vec<PastGeneration>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: GENERATIONS_COLLECTION.to_string(),
                all_descendants: None,
            }],
            filter: Some(Filter {
                field_filter: Some(FieldFilter {
                    field: FieldReference {
                        field_path: "userId".to_string(),
                    },
                    op: "EQUAL".to_string(),
                    value: Value::StringValue(user_id.to_string()),
                }),
            }),
            order_by: Some(vec![Order {
                field: FieldReference {
                    field_path: "createdAt".to_string(),
                },
                direction: "DESCENDING".to_string(),
            }]),
            limit: Some(LIST_LIMIT),
        };

        let docs = self.client.run_query(None, query).await?;

        let mut generations = Vec::new();
        for doc in docs {
            match document_to_generation(&doc) {
                Ok(generation) => generations.push(generation),
                Err(e) => {
                    warn!(
                        user_id,
                        doc_id = doc.doc_id().unwrap_or(""),
                        error = %e,
                        "Failed to parse generation document"
                    );
                }
            }
        }

        Ok(generations)
    }
}

/// Flatten a generation into Firestore fields.
fn generation_to_fields(
    generation: &PastGeneration,
) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("userId".to_string(), generation.user_id.to_firestore_value());
    fields.insert("prompt".to_string(), generation.prompt.to_firestore_value());
    fields.insert(
        "style".to_string(),
        generation.style.as_str().to_firestore_value(),
    );
    fields.insert(
        "titles".to_string(),
        generation.content.titles.to_firestore_value(),
    );
    fields.insert(
        "description".to_string(),
        generation.content.description.to_firestore_value(),
    );
    fields.insert(
        "hashtags".to_string(),
        generation.content.hashtags.to_firestore_value(),
    );
    fields.insert(
        "predictedCtr".to_string(),
        generation.content.predicted_ctr.to_firestore_value(),
    );
    fields.insert(
        "thumbnails".to_string(),
        generation.content.thumbnails.to_firestore_value(),
    );
    fields.insert(
        "createdAt".to_string(),
        generation.created_at.to_firestore_value(),
    );
    fields
}

/// Rebuild a generation from a Firestore document.
fn document_to_generation(doc: &Document) -> FirestoreResult<PastGeneration> {
    let id = doc
        .doc_id()
        .ok_or_else(|| FirestoreError::invalid_response("generation document without a name"))?
        .to_string();

    let user_id: String = doc
        .field("userId")
        .ok_or_else(|| FirestoreError::invalid_response(format!("generation {id} missing userId")))?;

    let content = GeneratedContent {
        titles: doc.field("titles").unwrap_or_default(),
        description: doc.field("description").unwrap_or_default(),
        hashtags: doc.field("hashtags").unwrap_or_default(),
        predicted_ctr: doc.field("predictedCtr").unwrap_or_default(),
        thumbnails: doc.field("thumbnails").unwrap_or_default(),
    };

    Ok(PastGeneration {
        id,
        user_id,
        prompt: doc.field("prompt").unwrap_or_default(),
        style: doc
            .field::<String>("style")
            .map(|s| ThumbnailStyle::parse_lossy(&s))
            .unwrap_or_default(),
        content,
        created_at: doc.field("createdAt").unwrap_or_else(chrono::Utc::now),
    })
}

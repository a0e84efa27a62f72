//! Firestore REST API client for the ThumbCrafter backend.
//!
//! This crate provides:
//! - A tuned REST client with token caching and bounded retries
//! - The user profile repository (credits with optimistic locking)
//! - The generation history repository
//! - The engine's `ProfileStore` implementation

pub mod client;
pub mod error;
pub mod generations;
pub mod profiles;
pub mod retry;
pub mod store;
pub mod token_cache;
pub mod types;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use generations::GenerationRepository;
pub use profiles::ProfileRepository;
pub use retry::RetryConfig;
pub use store::FirestoreProfileStore;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};

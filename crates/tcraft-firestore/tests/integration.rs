//! Firestore integration tests.
//!
//! These hit a live Firestore project and are ignored by default.
//! Run with `cargo test -p tcraft-firestore -- --ignored`.

use tcraft_firestore::{FirestoreClient, GenerationRepository, ProfileRepository};
use tcraft_models::{GeneratedContent, PastGeneration, ThumbnailStyle};

/// Test Firestore connection.
#[tokio::test]
#[ignore = "requires Firestore credentials"]
async fn test_firestore_connection() {
    dotenvy::dotenv().ok();

    let client = FirestoreClient::from_env()
        .await
        .expect("Failed to create Firestore client");

    // Health check document read (NotFound is fine, it proves reachability)
    let result = client.get_document("_health", "_check").await;
    match result {
        Ok(_) => println!("Health check document read OK"),
        Err(e) => panic!("Unexpected error: {}", e),
    }
}

/// Test profile creation and credit adjustment round trip.
#[tokio::test]
#[ignore = "requires Firestore credentials"]
async fn test_profile_credit_lifecycle() {
    dotenvy::dotenv().ok();

    let client = FirestoreClient::from_env()
        .await
        .expect("Failed to create Firestore client");
    let repo = ProfileRepository::new(client);

    let user_id = "test_user_integration";
    let profile = repo
        .get_or_create(user_id, Some("integration@test.local"))
        .await
        .expect("Failed to create profile");
    assert!(profile.credits <= 1000);

    let after_add = repo.adjust_credits(user_id, 2).await.expect("add failed");
    let after_debit = repo.adjust_credits(user_id, -1).await.expect("debit failed");
    assert_eq!(after_debit, after_add - 1);
}

/// Test generation save and newest-first listing.
#[tokio::test]
#[ignore = "requires Firestore credentials"]
async fn test_generation_history_round_trip() {
    dotenvy::dotenv().ok();

    let client = FirestoreClient::from_env()
        .await
        .expect("Failed to create Firestore client");
    let repo = GenerationRepository::new(client);

    let user_id = "test_user_integration";
    let generation = PastGeneration {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        prompt: "integration test".to_string(),
        style: ThumbnailStyle::Minimalist,
        content: GeneratedContent {
            titles: vec!["T1".into()],
            description: "d".into(),
            hashtags: vec!["#it".into()],
            predicted_ctr: "1%".into(),
            thumbnails: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        },
        created_at: chrono::Utc::now(),
    };

    repo.create(&generation).await.expect("save failed");

    let listed = repo.list(user_id).await.expect("list failed");
    assert!(!listed.is_empty());
    // Newest first: the one we just wrote leads the list.
    assert_eq!(listed[0].id, generation.id);
}

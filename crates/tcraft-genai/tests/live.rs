//! Live Gemini API tests.
//!
//! These spend real quota and are ignored by default.
//! Run with `cargo test -p tcraft-genai -- --ignored`.

use tcraft_genai::GeminiClient;

#[tokio::test]
#[ignore = "requires GEMINI_API_KEY and spends quota"]
async fn test_live_text_generation() {
    dotenvy::dotenv().ok();

    let client = GeminiClient::from_env().expect("GEMINI_API_KEY not set");
    let text = client
        .generate_text_content("Style: cinematic\nVideo topic: a quick sourdough bread recipe")
        .await
        .expect("text generation failed");

    assert!(!text.titles.is_empty());
    assert!(!text.description.is_empty());
    assert!(!text.hashtags.is_empty());
}

#[tokio::test]
#[ignore = "requires GEMINI_API_KEY and spends quota"]
async fn test_live_thumbnail_generation() {
    dotenvy::dotenv().ok();

    let client = GeminiClient::from_env().expect("GEMINI_API_KEY not set");
    let images = client
        .generate_thumbnails(
            "A rustic sourdough loaf on a wooden table, warm morning light",
            4,
            "16:9",
        )
        .await
        .expect("thumbnail generation failed");

    assert_eq!(images.len(), 4);
    assert!(images.iter().all(|img| !img.is_empty()));
}

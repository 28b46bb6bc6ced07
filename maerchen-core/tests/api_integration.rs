//! Integration tests that call a real completion endpoint.
//!
//! These tests require OPENAI_API_KEY (or provider-specific variables, see
//! `Config::from_env`) to be set via .env file or environment.
//! Run with: `cargo test -p maerchen-core --test api_integration -- --ignored`
//!
//! They are marked #[ignore] by default to avoid:
//! - API costs in CI
//! - Test failures when no API key is available
//! - Slow test runs (completion calls take seconds)

use maerchen_core::{Config, GradeTier, Generator, Limits, StoryRequest, StoryService};

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

/// Check if an API key is available
fn has_api_key() -> bool {
    let key = Config::from_env().api_key;
    !key.is_empty() && key != "dummy-key"
}

fn sample_request() -> StoryRequest {
    StoryRequest {
        thema: "Freundschaft".to_string(),
        personen_tiere: "Ein kleiner Hase namens Erwin".to_string(),
        ort: "im Wald".to_string(),
        stimmung: "fröhlich".to_string(),
        laenge: 2,
        klassenstufe: GradeTier::Lower,
        stil: None,
        model: None,
    }
}

#[tokio::test]
#[ignore]
async fn test_generate_short_story() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: no API key configured");
        return;
    }

    let generator = Generator::new(&Config::from_env());
    let story = generator
        .generate(&sample_request())
        .await
        .expect("generation failed");

    println!("Titel: {}", story.title);
    println!("{}", story.content);
    println!("Grundwortschatz: {:?}", story.grundwortschatz);

    assert!(!story.title.is_empty());
    assert!(!story.content.is_empty());
    assert!(story.tokens_used > 0);
    assert!(story.generation_time > 0.0);
    // A German children's story without a single base word would be odd.
    assert!(!story.grundwortschatz.is_empty());
    // Emphasis markup must have been stripped.
    assert!(!story.content.contains("**"));
}

#[tokio::test]
#[ignore]
async fn test_service_flow_records_cost() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: no API key configured");
        return;
    }

    let service = StoryService::new(&Config::from_env(), Limits::default());

    let before = service.stats();
    let story = service
        .generate("integration-test", &sample_request())
        .await
        .expect("generation failed");
    let after = service.stats();

    assert!(!story.content.is_empty());
    assert_eq!(
        after.global_requests_today,
        before.global_requests_today + 1
    );
    assert!(after.estimated_cost_today >= before.estimated_cost_today);
}

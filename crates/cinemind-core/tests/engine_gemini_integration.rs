use std::sync::Arc;

use cinemind_core::{
    EngineSettings, RecommendError, RecommendationEngine, SearchPhase, SearchSession,
    USER_FACING_ERROR,
};
use cinemind_provider::{CompletionProvider, GeminiClient};
use cinemind_schema::{DurationPreference, UserPreferences};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"text": text}]
            },
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 120,
            "candidatesTokenCount": 80
        }
    })
}

fn two_movie_payload() -> String {
    serde_json::json!({
        "recommendations": [
            {
                "title": "Coherence",
                "year": 2013,
                "director": "James Ward Byrkit",
                "genre": ["Sci-Fi", "Thriller"],
                "rating": "7.2/10",
                "matchScore": 92,
                "reasoning": "Tense, low-key mind-bender in the Interstellar mood.",
                "plotSummary": "A dinner party unravels during a comet pass.",
                "cast": ["Emily Baldoni", "Maury Sterling", "Nicholas Brendon"]
            },
            {
                "title": "Moon",
                "year": 2009,
                "director": "Duncan Jones",
                "genre": ["Sci-Fi", "Drama"],
                "rating": "7.8/10",
                "matchScore": 95,
                "reasoning": "Lonely, tense space isolation.",
                "plotSummary": "A lunar worker nears the end of his contract.",
                "cast": ["Sam Rockwell", "Kevin Spacey"]
            }
        ]
    })
    .to_string()
}

fn engine_for(server: &MockServer) -> RecommendationEngine {
    let client = GeminiClient::new("test-key").with_base_url(server.uri());
    let provider: Arc<dyn CompletionProvider> = Arc::new(client);
    RecommendationEngine::new(
        EngineSettings {
            model: "gemini-2.5-flash".into(),
            temperature: 0.6,
            recommendation_count: 6,
            max_output_tokens: 8192,
        },
        Some(provider),
    )
}

fn tense_scifi_prefs() -> UserPreferences {
    UserPreferences {
        mood: Some("Tense".into()),
        favorite_genres: vec!["Sci-Fi".into()],
        recently_watched: "Interstellar".into(),
        duration_preference: DurationPreference::Long,
    }
}

#[tokio::test]
async fn submitted_preferences_reach_the_wire_and_drive_the_session_to_ready() {
    let server = MockServer::start().await;

    // The prompt must carry every preference literally.
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("Tense"))
        .and(body_string_contains("Sci-Fi"))
        .and(body_string_contains("Interstellar"))
        .and(body_string_contains("long"))
        .and(body_string_contains("CineMind"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(&two_movie_payload())))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let mut session = SearchSession::new();
    assert_eq!(session.phase(), SearchPhase::Idle);

    session.begin();
    assert_eq!(session.phase(), SearchPhase::Loading);

    let outcome = engine.get_recommendations(&tense_scifi_prefs()).await;
    session.finish(outcome);

    assert_eq!(session.phase(), SearchPhase::Ready);
    assert_eq!(session.movies().len(), 2);
    assert_eq!(session.movies()[0].title, "Coherence");

    let ids: Vec<&str> = session.movies().iter().map(|m| m.id.as_str()).collect();
    assert!(ids.iter().all(|id| !id.is_empty()));
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn no_response_text_resolves_to_an_empty_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let mut session = SearchSession::new();
    session.begin();
    session.finish(engine.get_recommendations(&tense_scifi_prefs()).await);

    assert_eq!(session.phase(), SearchPhase::Empty);
    assert!(session.error().is_none());
}

#[tokio::test]
async fn malformed_response_text_fails_the_session_with_the_fixed_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply("Sure! Here are some great movies:")),
        )
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let outcome = engine.get_recommendations(&tense_scifi_prefs()).await;
    assert!(matches!(outcome, Err(RecommendError::Parse(_))));

    let mut session = SearchSession::new();
    session.begin();
    session.finish(outcome);
    assert_eq!(session.phase(), SearchPhase::Failed);
    assert_eq!(session.error(), Some(USER_FACING_ERROR));
}

#[tokio::test]
async fn provider_failure_fails_the_session_with_the_fixed_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let mut session = SearchSession::new();
    session.begin();
    session.finish(engine.get_recommendations(&tense_scifi_prefs()).await);

    assert_eq!(session.phase(), SearchPhase::Failed);
    assert_eq!(session.error(), Some(USER_FACING_ERROR));
    assert!(session.movies().is_empty());
}

#[tokio::test]
async fn identical_submissions_always_hit_the_provider_again() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(&two_movie_payload())))
        .expect(2)
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let prefs = tense_scifi_prefs();
    engine.get_recommendations(&prefs).await.unwrap();
    engine.get_recommendations(&prefs).await.unwrap();
    // Mock expectation of exactly two calls verifies on drop.
}

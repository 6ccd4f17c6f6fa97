//! Integration tests for infrastructure crate
//!
//! Tests cover:
//! - A full turn through the real adapters against a mocked OpenAI API
//! - Media store cleanup around the pipeline
//! - Serving artifacts once under concurrent fetches

use std::sync::Arc;

use ai_core::InferenceConfig;
use ai_speech::SpeechConfig;
use application::{
    ApplicationError, FailureKind, TurnPipeline, TurnPipelineConfig, ports::MediaStorePort,
};
use chrono::{Duration, Utc};
use domain::{AudioFormat, ChatMessage};
use infrastructure::{
    DialogueAdapter, LocalMediaStore, MediaConfig, SynthesisAdapter, TranscriptionAdapter,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Test Helpers
// ============================================================================

struct Harness {
    server: MockServer,
    media_root: TempDir,
    store: Arc<LocalMediaStore>,
    pipeline: TurnPipeline,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let media_root = tempfile::tempdir().unwrap();

    let inference = InferenceConfig {
        base_url: server.uri(),
        api_key: Some("sk-test".to_string()),
        ..InferenceConfig::default()
    };
    let speech = SpeechConfig {
        openai_base_url: server.uri(),
        openai_api_key: Some("sk-test".to_string()),
        ..SpeechConfig::default()
    };
    let media = MediaConfig {
        directory: media_root.path().to_path_buf(),
        ..MediaConfig::default()
    };

    let store = Arc::new(LocalMediaStore::open(&media).unwrap());
    let pipeline = TurnPipeline::with_config(
        Arc::new(TranscriptionAdapter::new(&speech).unwrap()),
        Arc::new(DialogueAdapter::new(inference).unwrap()),
        Arc::new(SynthesisAdapter::new(&speech).unwrap()),
        store.clone(),
        TurnPipelineConfig::default(),
    );

    Harness {
        server,
        media_root,
        store,
        pipeline,
    }
}

async fn mount_whisper(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": text,
            "language": "english",
            "duration": 2.0
        })))
        .mount(server)
        .await;
}

async fn mount_chat(server: &MockServer, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": reply},
                "finish_reason": "stop"
            }]
        })))
        .mount(server)
        .await;
}

async fn mount_tts(server: &MockServer, audio: &[u8]) {
    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(audio.to_vec()))
        .mount(server)
        .await;
}

fn files_in(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map(Iterator::count).unwrap_or(0)
}

// ============================================================================
// Full Turn Tests
// ============================================================================

mod full_turn_tests {
    use super::*;

    #[tokio::test]
    async fn voice_turn_produces_fetchable_mp3() {
        let h = harness().await;
        mount_whisper(&h.server, "Yesterday I go to the park").await;
        mount_chat(&h.server, "Nice! We say: Yesterday I went to the park.").await;
        mount_tts(&h.server, b"ID3-spoken-reply").await;

        let outcome = h
            .pipeline
            .run_voice_turn(b"ID3-user-audio".to_vec(), AudioFormat::Mp3, vec![])
            .await
            .unwrap();

        assert_eq!(outcome.transcription, "Yesterday I go to the park");
        assert!(outcome.response.contains("went"));
        assert_eq!(files_in(h.store.upload_dir()), 0);

        let content = h
            .pipeline
            .fetch_artifact(&outcome.audio.to_string())
            .await
            .unwrap();

        assert_eq!(content.mime_type(), "audio/mpeg");
        assert_eq!(content.data, b"ID3-spoken-reply");
    }

    #[tokio::test]
    async fn artifact_is_served_once() {
        let h = harness().await;
        mount_chat(&h.server, "Hello!").await;
        mount_tts(&h.server, b"ID3").await;

        let outcome = h.pipeline.chat("Hi", vec![]).await.unwrap();
        let id = outcome.audio.to_string();

        assert!(h.pipeline.fetch_artifact(&id).await.is_ok());
        assert!(matches!(
            h.pipeline.fetch_artifact(&id).await,
            Err(ApplicationError::ArtifactNotFound(_))
        ));
        assert_eq!(files_in(h.store.artifact_dir()), 0);
    }

    #[tokio::test]
    async fn concurrent_fetches_serve_artifact_once() {
        let h = harness().await;
        mount_chat(&h.server, "Hello!").await;
        mount_tts(&h.server, b"ID3").await;

        let outcome = h.pipeline.chat("Hi", vec![]).await.unwrap();
        let id = outcome.audio.to_string();

        let (first, second) = tokio::join!(
            h.pipeline.fetch_artifact(&id),
            h.pipeline.fetch_artifact(&id)
        );

        assert_ne!(first.is_ok(), second.is_ok());
        let rejected = if first.is_ok() { second } else { first };
        assert!(matches!(rejected, Err(ApplicationError::ArtifactNotFound(_))));
        assert_eq!(files_in(h.store.artifact_dir()), 0);
    }

    #[tokio::test]
    async fn history_is_forwarded_after_persona() {
        let h = harness().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("My cat are black"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-3.5-turbo",
                "choices": [{
                    "message": {"role": "assistant", "content": "Say: my cat is black."}
                }]
            })))
            .expect(1)
            .mount(&h.server)
            .await;
        mount_tts(&h.server, b"ID3").await;

        let history = vec![
            ChatMessage::user("My cat are black"),
            ChatMessage::assistant("Tell me more!"),
        ];
        let outcome = h.pipeline.chat("She likes milk", history).await.unwrap();

        assert_eq!(outcome.response, "Say: my cat is black.");
    }

    #[tokio::test]
    async fn sweep_removes_unfetched_artifacts() {
        let h = harness().await;
        mount_chat(&h.server, "Good morning!").await;
        mount_tts(&h.server, b"ID3").await;

        h.pipeline.chat("Good morning", vec![]).await.unwrap();
        assert_eq!(files_in(h.store.artifact_dir()), 1);

        let removed = h
            .pipeline
            .sweep_expired(Utc::now() + Duration::seconds(601))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(files_in(h.store.artifact_dir()), 0);
        assert!(h.media_root.path().exists());
    }
}

// ============================================================================
// Failure Tests
// ============================================================================

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn whisper_failure_still_removes_upload() {
        let h = harness().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&h.server)
            .await;

        let err = h
            .pipeline
            .transcribe(b"ID3".to_vec(), AudioFormat::Mp3)
            .await
            .unwrap_err();

        assert_eq!(err.failure_kind(), Some(FailureKind::Upstream));
        assert_eq!(files_in(h.store.upload_dir()), 0);
    }

    #[tokio::test]
    async fn abandoned_transcription_removes_upload() {
        let h = harness().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"text": "too late"}))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&h.server)
            .await;

        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            h.pipeline.transcribe(b"ID3".to_vec(), AudioFormat::Mp3),
        )
        .await;

        assert!(abandoned.is_err());
        assert_eq!(files_in(h.store.upload_dir()), 0);
    }

    #[tokio::test]
    async fn chat_rate_limit_skips_synthesis() {
        let h = harness().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&h.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3".to_vec()))
            .expect(0)
            .mount(&h.server)
            .await;

        let err = h.pipeline.chat("Hello", vec![]).await.unwrap_err();

        assert!(matches!(err, ApplicationError::RateLimited));
        assert_eq!(h.store.live_artifacts(), 0);
    }

    #[tokio::test]
    async fn path_traversal_is_not_found() {
        let h = harness().await;
        for id in ["../../../etc/passwd", "..%2F..%2Fetc%2Fpasswd", "/etc/passwd"] {
            assert!(matches!(
                h.pipeline.fetch_artifact(id).await,
                Err(ApplicationError::ArtifactNotFound(_))
            ));
        }
    }
}

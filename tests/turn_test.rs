// tests/turn_test.rs — Integration test: turn processing against a mock model

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use sentichat::infra::config::{Config, RetryConfig};
use sentichat::infra::errors::SentiChatError;
use sentichat::provider::{ChatRequest, ChatResponse, ModelProvider, TokenUsage};
use sentichat::sentiment::adjust;
use sentichat::sentiment::aggregator::{Conversation, Trend};
use sentichat::sentiment::processor::{TurnOutcome, TurnProcessor};
use sentichat::sentiment::{Emotion, SentimentLabel, Turn, TurnAnalysis, FALLBACK_REPLY};

/// Answers every request with the same body, or fails every time.
struct FixedProvider {
    body: Option<String>,
    calls: AtomicUsize,
}

impl FixedProvider {
    fn replying(body: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            body: Some(body.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            body: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ModelProvider for FixedProvider {
    fn id(&self) -> &str {
        "fixed"
    }

    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, SentiChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.body {
            Some(ref body) => Ok(ChatResponse {
                content: body.clone(),
                usage: TokenUsage::default(),
            }),
            None => Err(SentiChatError::Provider {
                provider: "fixed".into(),
                message: "connection refused".into(),
                retriable: true,
            }),
        }
    }
}

fn processor(provider: Arc<FixedProvider>, max_attempts: u32) -> TurnProcessor {
    TurnProcessor::new(provider, &Config::default()).with_retry(RetryConfig {
        max_attempts,
        delay_ms: 0,
    })
}

async fn analyze(raw: f64, emotion: &str, text: &str) -> TurnAnalysis {
    let provider = FixedProvider::replying(serde_json::json!({
        "sentiment_score": raw,
        "emotion": emotion,
        "reply": "ok",
    }));
    processor(provider, 3)
        .process_turn(text, &[])
        .await
        .into_analysis()
}

#[tokio::test]
async fn test_shouting_amplifies_score() {
    let a = analyze(0.4, "Joy", "THIS IS GREAT").await;
    assert!((a.score - 0.6).abs() < 1e-9);
    assert_eq!(a.label, SentimentLabel::Positive);
}

#[tokio::test]
async fn test_profanity_penalty() {
    let a = analyze(0.0, "Neutral", "stupid").await;
    assert!((a.score + 0.4).abs() < 1e-9);
    assert_eq!(a.label, SentimentLabel::Negative);
}

#[tokio::test]
async fn test_shouting_and_profanity_combine() {
    let a = analyze(0.5, "Neutral", "YOU ARE STUPID").await;
    assert!((a.score - 0.35).abs() < 1e-9);
    assert_eq!(a.label, SentimentLabel::Positive);
}

#[tokio::test]
async fn test_strong_negative_overrides_emotion() {
    assert_eq!(analyze(-0.9, "Sadness", "bad").await.emotion, Emotion::Anger);
    assert_eq!(analyze(-0.9, "Fear", "bad").await.emotion, Emotion::Fear);
    assert_eq!(analyze(-0.9, "Disgust", "bad").await.emotion, Emotion::Disgust);
}

#[tokio::test]
async fn test_model_label_is_ignored() {
    let provider = FixedProvider::replying(serde_json::json!({
        "sentiment_score": 0.05,
        "sentiment_label": "Positive",
        "emotion": "Joy",
        "reply": "ok",
    }));
    let a = processor(provider, 1)
        .process_turn("fine", &[])
        .await
        .into_analysis();
    assert_eq!(a.label, SentimentLabel::Neutral);
}

#[tokio::test]
async fn test_scores_stay_in_range() {
    for (raw, text) in [
        (1.0, "AMAZING AMAZING"),
        (-1.0, "YOU STUPID IDIOT MORON"),
        (7.5, "hello"),
        (-3.0, "damn crap"),
    ] {
        let a = analyze(raw, "Neutral", text).await;
        assert!((-1.0..=1.0).contains(&a.score), "{raw} {text} -> {}", a.score);
        assert_eq!(a.label, SentimentLabel::from_score(a.score));
    }
}

#[tokio::test]
async fn test_exhausted_attempts_yield_fallback() {
    for max_attempts in [1, 3, 5] {
        let provider = FixedProvider::failing();
        let outcome = processor(provider.clone(), max_attempts)
            .process_turn("hello?", &[])
            .await;

        assert!(matches!(outcome, TurnOutcome::ExhaustedFallback(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), max_attempts as usize);

        let a = outcome.into_analysis();
        assert_eq!(a.score, 0.0);
        assert_eq!(a.label, SentimentLabel::Neutral);
        assert_eq!(a.emotion, Emotion::Neutral);
        assert_eq!(a.reply, FALLBACK_REPLY);
    }
}

#[tokio::test]
async fn test_fenced_json_is_repaired() {
    let provider = Arc::new(FixedProvider {
        body: Some(concat!(
            "Sure! ```json\n",
            r#"{"sentiment_score": -0.3, "emotion": "sadness", "reply": "I hear you."}"#,
            "\n```"
        )
        .into()),
        calls: AtomicUsize::new(0),
    });
    let a = processor(provider.clone(), 3)
        .process_turn("rough day", &[])
        .await
        .into_analysis();

    assert_eq!(a.emotion, Emotion::Sadness);
    assert_eq!(a.reply, "I hear you.");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_trend_examples() {
    let conversation = |scores: &[f64]| {
        Conversation::from_turns(
            scores
                .iter()
                .map(|&score| {
                    let (score, emotion, label) = adjust::finalize(score, Emotion::Neutral, "ok");
                    Turn::new(
                        "ok",
                        TurnAnalysis {
                            score,
                            label,
                            emotion,
                            reply: String::new(),
                        },
                    )
                })
                .collect(),
        )
    };

    assert_eq!(conversation(&[0.0, 0.5]).trend(), Trend::Improving);
    assert_eq!(conversation(&[0.5, 0.5]).trend(), Trend::Stable);
    assert_eq!(conversation(&[0.5, 0.0]).trend(), Trend::Declining);
}

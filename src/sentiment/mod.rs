// src/sentiment/mod.rs — Turn analysis types and thresholds

pub mod adjust;
pub mod aggregator;
pub mod processor;
pub mod prompt;
pub mod registry;
pub mod response;

use serde::{Deserialize, Serialize};

/// Scores at or above this are Positive.
pub const POSITIVE_THRESHOLD: f64 = 0.1;
/// Scores at or below this are Negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

pub const FALLBACK_REPLY: &str =
    "I'm currently experiencing connection issues. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Bucket a score with the fixed thresholds.
    pub fn from_score(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            Self::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Disgust,
        Emotion::Neutral,
    ];

    /// Case-insensitive lookup of a model-supplied emotion name.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(name))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Joy => "Joy",
            Self::Sadness => "Sadness",
            Self::Anger => "Anger",
            Self::Fear => "Fear",
            Self::Surprise => "Surprise",
            Self::Disgust => "Disgust",
            Self::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured result of one turn, after local adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnAnalysis {
    pub score: f64,
    pub label: SentimentLabel,
    pub emotion: Emotion,
    pub reply: String,
}

impl TurnAnalysis {
    /// Payload returned once every attempt has failed.
    pub fn fallback() -> Self {
        Self {
            score: 0.0,
            label: SentimentLabel::Neutral,
            emotion: Emotion::Neutral,
            reply: FALLBACK_REPLY.into(),
        }
    }

    pub fn sentiment(&self) -> TurnSentiment {
        TurnSentiment {
            label: self.label,
            score: self.score,
            emotion: self.emotion,
        }
    }
}

/// Sentiment portion of a turn, as persisted alongside the user's message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnSentiment {
    pub label: SentimentLabel,
    pub score: f64,
    pub emotion: Emotion,
}

/// One user message and the analysis produced for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub user_text: String,
    pub analysis: TurnAnalysis,
}

impl Turn {
    pub fn new(user_text: impl Into<String>, analysis: TurnAnalysis) -> Self {
        Self {
            user_text: user_text.into(),
            analysis,
        }
    }
}

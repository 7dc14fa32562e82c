// src/sentiment/aggregator.rs — Per-session conversation statistics

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Emotion, SentimentLabel, Turn};

/// Mean difference between halves needed to call a trend.
pub const TREND_DELTA: f64 = 0.2;

pub const NO_CONVERSATION: &str = "No conversation recorded.";
pub const SUMMARY_FAILED: &str = "Analysis failed";
pub const UNKNOWN_EMOTION: &str = "Unknown";

/// Ordered turns of a single session.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Mean score bucketed by the label thresholds, or `None` when empty.
    pub fn overall(&self) -> Option<OverallSentiment> {
        let average = mean(self.turns.iter().map(|t| t.analysis.score))?;
        Some(OverallSentiment {
            label: SentimentLabel::from_score(average),
            average,
        })
    }

    /// Compare the mean of the second half against the first.
    pub fn trend(&self) -> Trend {
        if self.turns.len() < 2 {
            return Trend::NotEnoughData;
        }
        let (first, second) = self.turns.split_at(self.turns.len() / 2);
        let (Some(first), Some(second)) = (
            mean(first.iter().map(|t| t.analysis.score)),
            mean(second.iter().map(|t| t.analysis.score)),
        ) else {
            return Trend::NotEnoughData;
        };

        let diff = second - first;
        if diff > TREND_DELTA {
            Trend::Improving
        } else if diff < -TREND_DELTA {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    /// Turn count per emotion; emotions never seen are omitted.
    pub fn emotion_breakdown(&self) -> BTreeMap<Emotion, usize> {
        let mut counts = BTreeMap::new();
        for turn in &self.turns {
            *counts.entry(turn.analysis.emotion).or_insert(0) += 1;
        }
        counts
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverallSentiment {
    pub label: SentimentLabel,
    pub average: f64,
}

impl std::fmt::Display for OverallSentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (Avg Score: {:.2})", self.label, self.average)
    }
}

/// Human-readable overall sentiment, with the empty-history sentinel.
pub fn describe_overall(overall: Option<OverallSentiment>) -> String {
    overall
        .map(|o| o.to_string())
        .unwrap_or_else(|| NO_CONVERSATION.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    NotEnoughData,
}

impl Trend {
    pub fn description(&self) -> &'static str {
        match self {
            Trend::Improving => "Improving (Mood lifted over time)",
            Trend::Declining => "Declining (Mood worsened over time)",
            Trend::Stable => "Stable (Consistent mood)",
            Trend::NotEnoughData => "Not enough data for trend analysis.",
        }
    }
}

/// One-sentence opinion of the conversation from the secondary model call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub summary: String,
    pub dominant_emotion: String,
}

impl ExecutiveSummary {
    pub fn failed() -> Self {
        Self {
            summary: SUMMARY_FAILED.into(),
            dominant_emotion: UNKNOWN_EMOTION.into(),
        }
    }

    pub fn empty() -> Self {
        Self {
            summary: NO_CONVERSATION.into(),
            dominant_emotion: UNKNOWN_EMOTION.into(),
        }
    }
}

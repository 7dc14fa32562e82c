// src/sentiment/adjust.rs — Deterministic post-processing of the model's raw score
//
// The model's score is a starting point only. Shouting amplifies it,
// listed profanity pulls it down, and the result is clamped. The label is
// always re-derived from the adjusted value.

use std::collections::HashSet;

use super::{Emotion, SentimentLabel};

/// Multiplier applied when the message is mostly uppercase.
pub const INTENSITY_MULTIPLIER: f64 = 1.5;
/// Uppercase share of alphabetic characters that counts as shouting.
pub const CAPS_RATIO_THRESHOLD: f64 = 0.6;
/// Shorter messages are never treated as shouting ("OK", "NO").
pub const MIN_ALPHA_FOR_INTENSITY: usize = 4;
/// Subtracted once per distinct listed word found.
pub const PROFANITY_PENALTY: f64 = 0.4;
/// At or below this, a calm emotion from the model is overridden.
pub const ANGER_OVERRIDE_SCORE: f64 = -0.8;

pub const PROFANITY: &[&str] = &[
    "stupid", "idiot", "idiots", "dumb", "moron", "damn", "crap", "shit", "fuck", "bastard",
    "bitch", "asshole",
];

/// Emotions that already fit a strongly negative score.
const HOSTILE_EMOTIONS: [Emotion; 3] = [Emotion::Anger, Emotion::Disgust, Emotion::Fear];

/// Share of alphabetic characters that are uppercase, or `None` when the
/// text has too few letters to judge.
pub fn caps_ratio(text: &str) -> Option<f64> {
    let (alpha, upper) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(alpha, upper), c| {
            (alpha + 1, upper + usize::from(c.is_uppercase()))
        });

    if alpha < MIN_ALPHA_FOR_INTENSITY {
        return None;
    }
    Some(upper as f64 / alpha as f64)
}

pub fn is_shouting(text: &str) -> bool {
    caps_ratio(text).is_some_and(|ratio| ratio > CAPS_RATIO_THRESHOLD)
}

/// Listed words that occur in `text` as whole words (case-insensitive).
pub fn profanity_hits(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    let words: HashSet<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .collect();

    PROFANITY
        .iter()
        .copied()
        .filter(|word| words.contains(word))
        .collect()
}

/// Clamp into [-1.0, 1.0]. NaN collapses to neutral.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(-1.0, 1.0)
}

/// Apply the intensity and profanity rules to the model's raw score.
pub fn adjust_score(raw_score: f64, text: &str) -> f64 {
    let mut score = raw_score;

    if is_shouting(text) {
        score *= INTENSITY_MULTIPLIER;
    }

    let hits = profanity_hits(text);
    score -= PROFANITY_PENALTY * hits.len() as f64;

    clamp_score(score)
}

/// Force Anger for strongly negative turns the model labeled calmly.
pub fn override_emotion(adjusted_score: f64, emotion: Emotion) -> Emotion {
    if adjusted_score <= ANGER_OVERRIDE_SCORE && !HOSTILE_EMOTIONS.contains(&emotion) {
        Emotion::Anger
    } else {
        emotion
    }
}

/// Run the full adjustment: score, emotion override, label.
pub fn finalize(raw_score: f64, emotion: Emotion, text: &str) -> (f64, Emotion, SentimentLabel) {
    let score = adjust_score(raw_score, text);
    let emotion = override_emotion(score, emotion);
    (score, emotion, SentimentLabel::from_score(score))
}

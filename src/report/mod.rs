// src/report/mod.rs — Session report assembly and rendering

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::sentiment::aggregator::{describe_overall, Conversation, ExecutiveSummary};
use crate::sentiment::processor::TurnProcessor;
use crate::sentiment::registry::ConversationRegistry;
use crate::sentiment::{Emotion, SentimentLabel};
use crate::storage::StoreHandle;

const FILENAME_PREFIX: &str = "sentiment_report_";
const FALLBACK_FILENAME: &str = "chat";

/// Aggregate view of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub title: String,
    pub generated_at: String,
    pub overall_sentiment: String,
    pub average_score: Option<f64>,
    pub trend: String,
    pub executive_summary: String,
    pub dominant_emotion: String,
    pub turn_count: usize,
    pub emotion_breakdown: BTreeMap<String, usize>,
    pub transcript: Vec<TranscriptLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptLine {
    pub message: String,
    pub label: SentimentLabel,
    pub score: f64,
    pub emotion: Emotion,
}

impl SessionReport {
    /// Assemble a report from a conversation and its executive summary.
    pub fn build(
        session_id: &str,
        title: &str,
        conversation: &Conversation,
        summary: ExecutiveSummary,
    ) -> Self {
        let overall = conversation.overall();
        Self {
            session_id: session_id.to_string(),
            title: title.to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            overall_sentiment: describe_overall(overall),
            average_score: overall.map(|o| o.average),
            trend: conversation.trend().description().to_string(),
            executive_summary: summary.summary,
            dominant_emotion: summary.dominant_emotion,
            turn_count: conversation.len(),
            emotion_breakdown: conversation
                .emotion_breakdown()
                .into_iter()
                .map(|(emotion, count)| (emotion.to_string(), count))
                .collect(),
            transcript: conversation
                .turns()
                .iter()
                .map(|t| TranscriptLine {
                    message: t.user_text.clone(),
                    label: t.analysis.label,
                    score: t.analysis.score,
                    emotion: t.analysis.emotion,
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fixed plain-text layout for downloads.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(50);

        let _ = writeln!(out, "SENTIMENT ANALYSIS REPORT");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Session: {}", self.title);
        let _ = writeln!(out, "Session ID: {}", self.session_id);
        let _ = writeln!(out, "Generated: {}", self.generated_at);
        let _ = writeln!(out);
        let _ = writeln!(out, "Overall Sentiment: {}", self.overall_sentiment);
        let _ = writeln!(out, "Trend: {}", self.trend);
        let _ = writeln!(out, "Messages Analyzed: {}", self.turn_count);
        let _ = writeln!(out);
        let _ = writeln!(out, "Executive Summary: {}", self.executive_summary);
        let _ = writeln!(out, "Dominant Emotion: {}", self.dominant_emotion);

        if !self.emotion_breakdown.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Emotion Breakdown:");
            for (emotion, count) in &self.emotion_breakdown {
                let _ = writeln!(out, "  {emotion}: {count}");
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Transcript:");
        let _ = writeln!(out, "{}", "-".repeat(50));
        if self.transcript.is_empty() {
            let _ = writeln!(out, "(no messages)");
        }
        for (i, line) in self.transcript.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. [{} {:+.2} {}] {}",
                i + 1,
                line.label,
                line.score,
                line.emotion,
                line.message
            );
        }
        out
    }

    pub fn render(&self, format: ReportFormat) -> anyhow::Result<String> {
        match format {
            ReportFormat::Json => self.to_json(),
            ReportFormat::Txt => Ok(self.to_text()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Txt,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Txt => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Txt => "text/plain; charset=utf-8",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "txt" => Ok(Self::Txt),
            other => Err(format!("Unsupported report format: {other} (expected json or txt)")),
        }
    }
}

/// Keep ASCII alphanumerics, spaces, `-` and `_`; spaces become `_`.
pub fn sanitize_filename(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let cleaned = kept.trim().replace(' ', "_");
    if cleaned.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned
    }
}

pub fn attachment_filename(title: &str, format: ReportFormat) -> String {
    format!(
        "{FILENAME_PREFIX}{}.{}",
        sanitize_filename(title),
        format.extension()
    )
}

/// Build the report for a session, or `None` if it does not exist.
///
/// Without a processor the executive summary is reported as failed.
pub async fn generate_report(
    store: &StoreHandle,
    registry: &ConversationRegistry,
    processor: Option<&TurnProcessor>,
    session_id: &str,
) -> anyhow::Result<Option<SessionReport>> {
    let Some(record) = store.get_session(session_id).await? else {
        return Ok(None);
    };
    let Some(conversation) = registry.get_or_load(session_id, store).await? else {
        return Ok(None);
    };

    let summary = match processor {
        Some(p) => p.summarize(conversation.turns()).await,
        None if conversation.is_empty() => ExecutiveSummary::empty(),
        None => ExecutiveSummary::failed(),
    };

    tracing::info!(
        session_id,
        turns = conversation.len(),
        "Generated sentiment report"
    );
    Ok(Some(SessionReport::build(
        &record.id,
        &record.title,
        &conversation,
        summary,
    )))
}

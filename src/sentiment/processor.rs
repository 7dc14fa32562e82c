// src/sentiment/processor.rs — Turn processing: call, validate, adjust, retry
//
// Every failure of the remote call or of response validation counts as a
// failed attempt. Attempts are separated by a fixed delay; once the budget
// is spent the caller gets the fallback payload, which looks like any other
// neutral turn.

use std::sync::Arc;

use super::aggregator::ExecutiveSummary;
use super::{adjust, prompt, response, Turn, TurnAnalysis};
use crate::infra::config::{Config, RetryConfig};
use crate::infra::errors::SentiChatError;
use crate::provider::{ChatRequest, Message, ModelProvider};

/// Result of processing a turn.
///
/// A single attempt yields `Success` or `RetryableFailure`; the bounded loop
/// in [`TurnProcessor::process_turn`] yields `Success` or `ExhaustedFallback`.
#[derive(Debug)]
pub enum TurnOutcome {
    Success(TurnAnalysis),
    RetryableFailure(SentiChatError),
    ExhaustedFallback(TurnAnalysis),
}

impl TurnOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, TurnOutcome::ExhaustedFallback(_))
    }

    /// The payload to show and persist. A stray `RetryableFailure` maps to
    /// the fallback as well.
    pub fn into_analysis(self) -> TurnAnalysis {
        match self {
            TurnOutcome::Success(analysis) | TurnOutcome::ExhaustedFallback(analysis) => analysis,
            TurnOutcome::RetryableFailure(_) => TurnAnalysis::fallback(),
        }
    }
}

pub struct TurnProcessor {
    provider: Arc<dyn ModelProvider>,
    model: String,
    temperature: Option<f32>,
    retry: RetryConfig,
    context_turns: usize,
}

impl TurnProcessor {
    pub fn new(provider: Arc<dyn ModelProvider>, config: &Config) -> Self {
        Self {
            provider,
            model: config.model.name.clone(),
            temperature: config.model.temperature,
            retry: config.retry.clone(),
            context_turns: config.model.context_turns,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Analyze `text` given the session's prior turns, retrying up to the
    /// configured attempt budget.
    pub async fn process_turn(&self, text: &str, context: &[Turn]) -> TurnOutcome {
        let max_attempts = self.retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.attempt(text, context).await {
                TurnOutcome::RetryableFailure(e) => {
                    tracing::warn!(
                        provider = self.provider.id(),
                        attempt,
                        max_attempts,
                        retriable = e.is_retriable(),
                        "Turn attempt failed: {}",
                        e
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(self.retry.delay()).await;
                    }
                }
                done => return done,
            }
        }

        tracing::error!("Max attempts reached. Returning fallback response.");
        TurnOutcome::ExhaustedFallback(TurnAnalysis::fallback())
    }

    /// One remote call plus validation and adjustment.
    pub async fn attempt(&self, text: &str, context: &[Turn]) -> TurnOutcome {
        match self.try_attempt(text, context).await {
            Ok(analysis) => TurnOutcome::Success(analysis),
            Err(e) => TurnOutcome::RetryableFailure(e),
        }
    }

    async fn try_attempt(
        &self,
        text: &str,
        context: &[Turn],
    ) -> Result<TurnAnalysis, SentiChatError> {
        let request = self.build_request(text, context)?;
        let response = self.provider.chat(request).await?;
        tracing::debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            total_tokens = response.usage.total(),
            "Turn response received"
        );
        let verdict = response::parse_turn_response(&response.content)?;

        let (score, emotion, label) = adjust::finalize(verdict.raw_score, verdict.emotion, text);
        tracing::debug!(
            raw_score = verdict.raw_score,
            score,
            emotion = %emotion,
            label = %label,
            "Turn analyzed"
        );

        Ok(TurnAnalysis {
            score,
            label,
            emotion,
            reply: verdict.reply,
        })
    }

    fn build_request(&self, text: &str, context: &[Turn]) -> Result<ChatRequest, SentiChatError> {
        let recent = &context[context.len().saturating_sub(self.context_turns)..];

        let mut messages = Vec::with_capacity(recent.len() * 2 + 1);
        for turn in recent {
            messages.push(Message::user(turn.user_text.clone()));
            messages.push(Message::assistant(turn.analysis.reply.clone()));
        }
        messages.push(Message::user(text));

        Ok(ChatRequest {
            model: self.model.clone(),
            messages,
            system: Some(prompt::turn_system_instruction()?),
            temperature: self.temperature,
            json_response: true,
            ..Default::default()
        })
    }

    /// Ask the model for a one-sentence opinion of the whole conversation.
    ///
    /// Single attempt; any failure yields [`ExecutiveSummary::failed`].
    pub async fn summarize(&self, turns: &[Turn]) -> ExecutiveSummary {
        if turns.is_empty() {
            return ExecutiveSummary::empty();
        }

        match self.try_summarize(turns).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(provider = self.provider.id(), "Executive summary failed: {}", e);
                ExecutiveSummary::failed()
            }
        }
    }

    async fn try_summarize(&self, turns: &[Turn]) -> Result<ExecutiveSummary, SentiChatError> {
        let messages: Vec<&str> = turns.iter().map(|t| t.user_text.as_str()).collect();
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt::summary_prompt(&messages)?)],
            temperature: self.temperature,
            json_response: true,
            ..Default::default()
        };

        let response = self.provider.chat(request).await?;
        let verdict = response::parse_summary_response(&response.content)?;
        Ok(ExecutiveSummary {
            summary: verdict.summary,
            dominant_emotion: verdict
                .dominant_emotion
                .unwrap_or_else(|| super::aggregator::UNKNOWN_EMOTION.into()),
        })
    }
}

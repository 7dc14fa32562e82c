// src/sentiment/prompt.rs — Prompt templates for the turn and summary calls

use minijinja::{context, Environment};

use super::Emotion;
use crate::infra::errors::SentiChatError;

const TURN_SYSTEM_TEMPLATE: &str = r#"You are a helpful and empathetic conversational assistant.
For every user message you must do three things:
1. Analyze the sentiment of the message and score it from -1.0 (very negative) to 1.0 (very positive).
2. Detect the single strongest emotion, one of: {{ emotions | join(", ") }}.
3. Write a helpful, natural reply that fits the conversation so far.

Respond with strict JSON only, no Markdown and no commentary:
{"sentiment_score": <float>, "emotion": "<emotion>", "reply": "<string>"}"#;

const SUMMARY_TEMPLATE: &str = r#"Below are the messages a user sent during a conversation, in order.

{% for message in messages -%}
{{ loop.index }}. {{ message }}
{% endfor %}
In one sentence, give your opinion of the user's overall mood across the conversation, and name the dominant emotion.
Respond with strict JSON only:
{"summary": "<one sentence>", "dominant_emotion": "<emotion>"}"#;

fn environment() -> Result<Environment<'static>, SentiChatError> {
    let mut env = Environment::new();
    env.add_template("turn_system", TURN_SYSTEM_TEMPLATE)
        .map_err(template_error)?;
    env.add_template("summary", SUMMARY_TEMPLATE)
        .map_err(template_error)?;
    Ok(env)
}

fn template_error(e: minijinja::Error) -> SentiChatError {
    SentiChatError::Other(anyhow::Error::new(e).context("prompt template"))
}

/// System instruction sent with every turn.
pub fn turn_system_instruction() -> Result<String, SentiChatError> {
    let env = environment()?;
    let emotions: Vec<&str> = Emotion::ALL.iter().map(Emotion::as_str).collect();
    env.get_template("turn_system")
        .and_then(|t| t.render(context! { emotions => emotions }))
        .map_err(template_error)
}

/// Prompt for the executive summary over all user messages.
pub fn summary_prompt(messages: &[&str]) -> Result<String, SentiChatError> {
    let env = environment()?;
    env.get_template("summary")
        .and_then(|t| t.render(context! { messages => messages }))
        .map_err(template_error)
}

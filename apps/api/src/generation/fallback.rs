//! Sequential model fallback.
//!
//! Models are tried strictly in chain order, one at a time, never
//! concurrently. A request therefore costs at most one successful provider
//! call, and the chain's head absorbs nearly all traffic while it is healthy.

use thiserror::Error;
use tracing::warn;

use crate::llm_client::ModelGateway;

/// The ordered fallback chain. Position in this list is the only selection
/// policy there is: cheap, fast models first, premium models behind them.
pub const MODEL_CHAIN: &[&str] = &[
    // OpenAI (fast + reliable)
    "openai/gpt-3.5-turbo",
    "openai/gpt-4o-mini",
    // Meta (open-weight LLaMA)
    "meta-llama/llama-2-70b-chat",
    "meta-llama/llama-3-70b-instruct",
    // Anthropic (creative + safe output)
    "anthropic/claude-3-haiku",
    "anthropic/claude-3-opus",
    // Mistral (good reasoning)
    "mistralai/mixtral-8x7b",
    "mistralai/mistral-7b-instruct",
    // Google Gemini (balanced tone)
    "google/gemini-1.5-flash",
    // Cohere (short-form text and hooks)
    "cohere/command-r-plus",
    // Falcon (fast, open source)
    "tiiuae/falcon-180b-chat",
    // OpenRouter's free sandbox
    "openrouter/free-tier",
];

/// Every model in the chain failed or produced unusable output.
///
/// Only the last failure survives; earlier ones have already been logged
/// and absorbed by moving down the chain.
#[derive(Debug, Error)]
#[error("All AI models failed. Last error: {last_error}")]
pub struct FallbackError {
    pub last_error: String,
}

/// Walks the chain until one model's output survives `parse`.
///
/// A transport failure, an API error, and output `parse` rejects are all
/// treated the same way: log a warning, remember the failure, try the next
/// model. The first parsed value short-circuits the rest of the chain.
pub async fn generate_with_fallback<T, P>(
    gateway: &dyn ModelGateway,
    models: &[&str],
    prompt: &str,
    max_tokens: u32,
    parse: P,
) -> Result<T, FallbackError>
where
    P: Fn(&str) -> Option<T>,
{
    let mut last_error = String::from("No models configured");

    for model in models {
        match gateway.invoke(model, prompt, max_tokens).await {
            Ok(raw) => match parse(&raw) {
                Some(parsed) => return Ok(parsed),
                None => {
                    warn!("Unusable output from {model}, trying next model");
                    last_error = format!("Failed to parse response from {model}");
                }
            },
            Err(e) => {
                warn!("{e}, trying next model");
                last_error = e.to_string();
            }
        }
    }

    Err(FallbackError { last_error })
}

/// LLM Client — the single point of entry for all OpenRouter calls in LaunchPost.
///
/// ARCHITECTURAL RULE: No other module may call the OpenRouter API directly.
/// All model interactions MUST go through this module. Which models get
/// called, and in what order, is the fallback chain's business, not ours.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// Sampling temperature for every generation call, regardless of task.
const TEMPERATURE: f64 = 0.7;
/// Application title reported to OpenRouter for request attribution.
const APP_TITLE: &str = "LaunchPost";
/// Per-attempt timeout. The fallback chain is twelve models deep, so a single
/// slow backend must not be allowed to eat the whole request budget.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Why one backend attempt produced nothing usable.
///
/// Callers never branch on the variant. The distinctions exist so the
/// message names the model and the failure mode, because the last of these
/// messages is all that survives an exhausted fallback chain.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Model {model} failed with status {status}")]
    Api { model: String, status: u16 },

    #[error("No content from {model}")]
    EmptyContent { model: String },

    #[error("Error with {model}: {source}")]
    Request {
        model: String,
        #[source]
        source: reqwest::Error,
    },
}

/// One chat-completion call against one named model.
///
/// `LlmClient` is the production implementation; tests substitute scripted
/// fakes so pipelines can be exercised without the network.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn invoke(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, GatewayError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text of the first choice, if the backend returned one.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// The single OpenRouter client shared by all generation code.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    referer: String,
}

impl LlmClient {
    /// `referer` is sent as the HTTP-Referer header, which OpenRouter uses
    /// to attribute traffic to the deployed app.
    pub fn new(api_key: String, referer: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            referer,
        }
    }
}

#[async_trait]
impl ModelGateway for LlmClient {
    /// Issues exactly one chat-completion request to one model.
    ///
    /// Transport failures, non-2xx statuses, undecodable bodies, and missing
    /// or empty `choices[0].message.content` all collapse into `GatewayError`.
    /// The caller's policy is the same for every cause: try the next model.
    async fn invoke(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        let request_body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens,
        };

        let response = self
            .client
            .post(OPENROUTER_API_URL)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", APP_TITLE)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GatewayError::Request {
                model: model.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Api {
                model: model.to_string(),
                status: status.as_u16(),
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| GatewayError::Request {
            model: model.to_string(),
            source: e,
        })?;

        if let Some(usage) = &chat.usage {
            debug!(
                "{} responded: prompt_tokens={}, completion_tokens={}",
                model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        match chat.first_content() {
            Some(content) if !content.is_empty() => Ok(content.to_string()),
            _ => Err(GatewayError::EmptyContent {
                model: model.to_string(),
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Scripted gateway for tests: pops one canned outcome per call and
    /// records which models were invoked, in order.
    pub struct ScriptedGateway {
        outcomes: Mutex<VecDeque<Result<String, u16>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        /// `Ok(text)` scripts a successful response, `Err(status)` an API
        /// failure with that status. An exhausted script keeps failing.
        pub fn new(outcomes: Vec<Result<&str, u16>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().map(|o| o.map(str::to_string)).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        async fn invoke(
            &self,
            model: &str,
            _prompt: &str,
            _max_tokens: u32,
        ) -> Result<String, GatewayError> {
            self.calls.lock().unwrap().push(model.to_string());
            match self.outcomes.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(status)) => Err(GatewayError::Api {
                    model: model.to_string(),
                    status,
                }),
                None => Err(GatewayError::Api {
                    model: model.to_string(),
                    status: 503,
                }),
            }
        }
    }
}

//! OpenAI-compatible chat-completions client

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatMessage, CompletionBackend, CompletionRequest};
use crate::config::ChatConfig;
use crate::error::{RdfError, RdfResult};
use crate::tools::ToolDefinition;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenAiClient {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl OpenAiClient {
    pub fn new(config: &ChatConfig) -> RdfResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RdfError::Completion(e.to_string()))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> RdfResult<ChatMessage> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            tools: &request.tools,
        };

        let mut http = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        debug!(model = %self.model, messages = request.messages.len(), "Requesting completion");
        let response = http
            .send()
            .await
            .map_err(|e| RdfError::Completion(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RdfError::Completion(format!("{}: {}", status, error_text)));
        }

        let data: CompletionResponse = response
            .json()
            .await
            .map_err(|e| RdfError::Completion(e.to_string()))?;

        data.choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| RdfError::Completion("Response contained no choices".to_string()))
    }
}

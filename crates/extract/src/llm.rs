use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A chat-completion backend: one request in, the first reply's text out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Identifier recorded alongside every analysis.
    fn model_id(&self) -> &str;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint, as served by
/// local model runtimes.
#[derive(Clone)]
pub struct ChatClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

impl ChatClient {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Swap the configured alias for the concrete id the runtime serves.
    ///
    /// Picks the first listed model whose id contains the alias
    /// (case-insensitive). If the listing fails or nothing matches, the alias
    /// is kept as is.
    pub async fn resolve_model(mut self) -> Self {
        match self.list_models().await {
            Ok(ids) => {
                let alias = self.model.to_lowercase();
                if let Some(id) = ids.into_iter().find(|id| id.to_lowercase().contains(&alias)) {
                    debug!(alias = %self.model, model = %id, "Resolved model alias");
                    self.model = id;
                } else {
                    warn!(alias = %self.model, "No served model matches alias, using it verbatim");
                }
            }
            Err(e) => {
                warn!(error = %e, alias = %self.model, "Could not list models, using alias verbatim");
            }
        }
        self
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .context("Failed to query model list")?;

        if !response.status().is_success() {
            anyhow::bail!("Model list request failed: {}", response.status());
        }

        let list: ModelList = response
            .json()
            .await
            .context("Failed to parse model list")?;

        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl ChatModel for ChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = CompletionRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .authorize(self.client.post(&url).json(&request))
            .send()
            .await
            .context("Failed to send request to model endpoint")?;

        if !response.status().is_success() {
            anyhow::bail!("Model request failed: {}", response.status());
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse model response")?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .context("Model response contained no choices")?;

        Ok(choice.message.content.unwrap_or_default())
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

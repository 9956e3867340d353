//! Text-generation provider abstraction
//!
//! The resolver is parameterized over [`ModelClient`], not over a specific
//! vendor. The OpenAI-style chat-completions envelope covers both hosted
//! open-weights and hosted proprietary deployments; switching between them
//! is a matter of endpoint and model name.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

use crate::error::ProviderError;

/// Capability: submit prompt text, receive free text or a classified failure.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Chat-completions client over an OpenAI-compatible endpoint.
pub struct OpenAiChatModel {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiChatModel {
    pub fn new(endpoint: Option<&str>, api_key: &str, model: &str, timeout: Duration) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = endpoint {
            config = config.with_api_base(base);
        }
        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiChatModel {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| classify(&e))?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(vec![ChatCompletionRequestMessage::User(message)])
            .temperature(0.0)
            .build()
            .map_err(|e| classify(&e))?;

        // The resolver must never block indefinitely on the provider.
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| classify(&e))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                ProviderError::MalformedResponse("completion carried no content".to_string())
            })?;

        Ok(content.trim().to_string())
    }
}

fn classify(err: &OpenAIError) -> ProviderError {
    match err {
        OpenAIError::ApiError(api) => {
            let detail = format!(
                "{} {}",
                api.message,
                api.r#type.clone().unwrap_or_default()
            );
            classify_api_message(&detail)
        }
        OpenAIError::JSONDeserialize(e) => ProviderError::MalformedResponse(e.to_string()),
        OpenAIError::InvalidArgument(msg) => ProviderError::MalformedResponse(msg.clone()),
        other => ProviderError::Network(other.to_string()),
    }
}

fn classify_api_message(detail: &str) -> ProviderError {
    let lower = detail.to_lowercase();
    if lower.contains("rate limit") || lower.contains("rate_limit") || lower.contains("quota") {
        ProviderError::RateLimit(detail.trim().to_string())
    } else if lower.contains("api key")
        || lower.contains("authentication")
        || lower.contains("unauthorized")
    {
        ProviderError::Auth(detail.trim().to_string())
    } else {
        ProviderError::Network(detail.trim().to_string())
    }
}

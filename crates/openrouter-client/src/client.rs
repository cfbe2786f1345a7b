//! HTTP client for the OpenRouter API.

use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::api_types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::config::OpenRouterConfig;
use crate::error::{error_from_body, UpstreamError};

/// Client for OpenRouter's chat completion and model listing endpoints.
///
/// The API key is passed per call since the relay switches between the
/// caller's own key and the shared trial key.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OpenRouterConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder().build().map_err(|e| {
            UpstreamError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        info!(
            "OpenRouter client initialized: {} (timeout: {}s)",
            config.api_url,
            config.request_timeout.as_secs()
        );

        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    ///
    /// See [`OpenRouterConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, UpstreamError> {
        Self::new(OpenRouterConfig::from_env())
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    fn authorized(&self, builder: RequestBuilder, api_key: &str, title: &str) -> RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.config.http_referer)
            .header("X-Title", title)
    }

    /// Make a chat completion request.
    ///
    /// Non-2xx answers are mapped through [`error_from_body`].
    pub async fn chat_completion(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, UpstreamError> {
        let url = self.config.completions_url();

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .authorized(self.client.post(&url), api_key, &self.config.x_title)
            .timeout(self.config.request_timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                body = %error_text,
                model = %request.model,
                "OpenRouter returned an error"
            );
            return Err(error_from_body(status.as_u16(), &error_text));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if let Some(ref usage) = completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        Ok(completion)
    }

    /// List the models available to the given key.
    ///
    /// Returns the entries of the `data` array unchanged.
    pub async fn list_models(&self, api_key: &str) -> Result<Vec<Value>, UpstreamError> {
        let url = self.config.models_url();
        let title = format!("{}-debug", self.config.x_title);

        info!("Fetching available models from OpenRouter");

        let response = self
            .authorized(self.client.get(&url), api_key, &title)
            .timeout(self.config.models_timeout)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                body = %error_text,
                "Error fetching models from OpenRouter"
            );
            return Err(error_from_body(status.as_u16(), &error_text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        models_from_body(body)
    }
}

fn models_from_body(body: Value) -> Result<Vec<Value>, UpstreamError> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(models)) => {
                info!("Fetched {} models from OpenRouter", models.len());
                Ok(models)
            }
            _ => Err(UpstreamError::InvalidResponse(
                "Missing 'data' list in models response".to_string(),
            )),
        },
        _ => Err(UpstreamError::InvalidResponse(
            "Models response is not an object".to_string(),
        )),
    }
}

//! Configuration for the OpenRouter client.

use std::env;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1";

/// Default `HTTP-Referer` header value.
pub const DEFAULT_HTTP_REFERER: &str = "https://kostiks.com";

/// Default `X-Title` header value.
pub const DEFAULT_X_TITLE: &str = "snapback-luo";

/// Configuration for [`OpenRouterClient`](crate::OpenRouterClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRouterConfig {
    /// API base URL, without a trailing slash.
    pub api_url: String,

    /// Value sent as `HTTP-Referer` for provider attribution.
    pub http_referer: String,

    /// Value sent as `X-Title`. Model listing appends `-debug`.
    pub x_title: String,

    /// Timeout for chat completions.
    pub request_timeout: Duration,

    /// Timeout for the model listing.
    pub models_timeout: Duration,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_referer: DEFAULT_HTTP_REFERER.to_string(),
            x_title: DEFAULT_X_TITLE.to_string(),
            request_timeout: Duration::from_secs(90),
            models_timeout: Duration::from_secs(30),
        }
    }
}

impl OpenRouterConfig {
    /// Create configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `OPENROUTER_API_URL` - API base URL (default: https://openrouter.ai/api/v1)
    /// - `OPENROUTER_HTTP_REFERER` - Referer header (default: https://kostiks.com)
    /// - `OPENROUTER_X_TITLE` - Title header (default: snapback-luo)
    /// - `OPENROUTER_TIMEOUT_SECS` - Completion timeout (default: 90)
    /// - `OPENROUTER_MODELS_TIMEOUT_SECS` - Model listing timeout (default: 30)
    ///
    /// The API key is not part of this config; it is chosen per call.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_url = env::var("OPENROUTER_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let http_referer = env::var("OPENROUTER_HTTP_REFERER").unwrap_or(defaults.http_referer);
        let x_title = env::var("OPENROUTER_X_TITLE").unwrap_or(defaults.x_title);

        let request_timeout = env::var("OPENROUTER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let models_timeout = env::var("OPENROUTER_MODELS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.models_timeout);

        Self {
            api_url,
            http_referer,
            x_title,
            request_timeout,
            models_timeout,
        }
    }

    /// Create a new config builder.
    pub fn builder() -> OpenRouterConfigBuilder {
        OpenRouterConfigBuilder::default()
    }

    /// URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url)
    }

    /// URL of the model listing endpoint.
    pub fn models_url(&self) -> String {
        format!("{}/models", self.api_url)
    }
}

/// Builder for OpenRouterConfig.
#[derive(Debug, Default)]
pub struct OpenRouterConfigBuilder {
    config: OpenRouterConfig,
}

impl OpenRouterConfigBuilder {
    /// Set the API base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the referer header.
    pub fn http_referer(mut self, referer: impl Into<String>) -> Self {
        self.config.http_referer = referer.into();
        self
    }

    /// Set the title header.
    pub fn x_title(mut self, title: impl Into<String>) -> Self {
        self.config.x_title = title.into();
        self
    }

    /// Set the completion timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the model listing timeout.
    pub fn models_timeout(mut self, timeout: Duration) -> Self {
        self.config.models_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OpenRouterConfig {
        self.config
    }
}

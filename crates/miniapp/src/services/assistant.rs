//! Anthropic Messages API client that powers the shopping assistant.
//!
//! Sends one user message plus a catalog-aware system prompt, then parses
//! the model output into a structured [`GeneratedReply`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

use bazaar_core::Product;

use crate::config::AssistantConfig;

use super::recommender::{GeneratedReply, ReplyGenerator};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Errors that can occur when talking to the assistant API.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded the configured time budget.
    #[error("request timed out")]
    Timeout,

    /// The API returned an error.
    #[error("API error ({error_type}): {message}")]
    Api {
        /// Error type from the API.
        error_type: String,
        /// Error message.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid configuration prevented building the client.
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// API error response body.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

/// Successful Messages API response, reduced to what the assistant reads.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

/// Messages API client.
#[derive(Clone)]
pub struct AssistantClient {
    inner: Arc<AssistantClientInner>,
}

struct AssistantClientInner {
    client: reqwest::Client,
    model: String,
    max_catalog_items: usize,
}

impl AssistantClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key contains invalid header characters
    /// or the HTTP client cannot be built.
    pub fn new(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key_value = HeaderValue::from_str(api_key)
            .map_err(|e| AssistantError::InvalidApiKey(e.to_string()))?;
        key_value.set_sensitive(true);
        headers.insert("x-api-key", key_value);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            inner: Arc::new(AssistantClientInner {
                client,
                model: config.model.clone(),
                max_catalog_items: config.max_catalog_items,
            }),
        })
    }

    /// Send one chat turn and return the parsed structured reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails, times out, or returns an
    /// error response.
    #[instrument(skip(self, message, catalog), fields(model = %self.inner.model, catalog_len = catalog.len()))]
    pub async fn chat(
        &self,
        message: &str,
        catalog: &[Product],
    ) -> Result<GeneratedReply, AssistantError> {
        let request = json!({
            "model": self.inner.model,
            "max_tokens": DEFAULT_MAX_TOKENS,
            "system": build_system_prompt(catalog, self.inner.max_catalog_items),
            "messages": [{"role": "user", "content": message}],
        });

        let response = self
            .inner
            .client
            .post(ANTHROPIC_API_URL)
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_status(status, response).await);
        }

        let body: MessagesResponse = response.json().await.map_err(map_send_error)?;
        let text = body
            .content
            .iter()
            .find(|block| block.block_type == "text")
            .map(|block| block.text.as_str())
            .ok_or_else(|| AssistantError::Parse("no text content in response".to_string()))?;

        Ok(parse_reply(text))
    }
}

impl ReplyGenerator for AssistantClient {
    async fn generate(
        &self,
        message: &str,
        catalog: &[Product],
    ) -> Result<GeneratedReply, AssistantError> {
        self.chat(message, catalog).await
    }
}

/// Preserve timeouts as their own variant; everything else stays HTTP.
fn map_send_error(error: reqwest::Error) -> AssistantError {
    if error.is_timeout() {
        AssistantError::Timeout
    } else {
        AssistantError::Http(error)
    }
}

/// Handle an error status code.
async fn handle_error_status(
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> AssistantError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return AssistantError::RateLimited(retry_after);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return AssistantError::Unauthorized("Invalid API key".to_string());
    }

    match response.text().await {
        Ok(body) => {
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                AssistantError::Api {
                    error_type: api_error.error.error_type,
                    message: api_error.error.message,
                }
            } else {
                AssistantError::Api {
                    error_type: "unknown".to_string(),
                    message: body,
                }
            }
        }
        Err(e) => AssistantError::Http(e),
    }
}

/// Build the system prompt from the catalog, bounded to keep the request
/// within token limits.
fn build_system_prompt(catalog: &[Product], max_items: usize) -> String {
    let mut prompt = String::from(
        "You are a friendly shopping assistant for an online store. \
         Help the customer pick products from the catalog below. \
         Answer in the customer's language, briefly and concretely.\n\n\
         Catalog:\n",
    );

    for product in catalog.iter().take(max_items) {
        prompt.push_str(&format!(
            "- id: {} | name: {} | price: {} | {}\n",
            product.key(),
            product.name,
            product.price,
            product.description,
        ));
    }

    prompt.push_str(
        "\nRespond with a single JSON object and nothing else:\n\
         {\"reply\": \"your answer\", \"product_ids\": [\"id\", ...], \
         \"order_buttons_mode\": true_or_false}\n\
         Use only ids that appear in the catalog. Set order_buttons_mode to \
         true when the customer is ready to order the recommended products.",
    );

    prompt
}

/// Structured payload the model is instructed to emit.
#[derive(Debug, Deserialize)]
struct StructuredReply {
    reply: String,
    #[serde(default)]
    product_ids: Vec<String>,
    #[serde(default)]
    order_buttons_mode: bool,
}

/// Parse model output into a [`GeneratedReply`].
///
/// Models wrap JSON in code fences often enough that the fences are
/// stripped first. Output that is not the expected JSON object is used
/// verbatim as the reply text with no product references.
fn parse_reply(text: &str) -> GeneratedReply {
    let stripped = strip_code_fences(text);

    if let Ok(parsed) = serde_json::from_str::<StructuredReply>(stripped) {
        return GeneratedReply {
            reply: parsed.reply,
            product_ids: parsed.product_ids,
            order_buttons_mode: parsed.order_buttons_mode,
        };
    }

    GeneratedReply {
        reply: text.trim().to_string(),
        product_ids: Vec::new(),
        order_buttons_mode: false,
    }
}

/// Strip a surrounding Markdown code fence, with or without a language tag.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag line if present.
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim()
}

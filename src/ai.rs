use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Model and token budget are fixed; every batch gets the same treatment.
pub const MODEL: &str = "claude-sonnet-4-5";
pub const MAX_TOKENS: u32 = 4096;

const WEB_SEARCH_TOOL_TYPE: &str = "web_search_20250305";
const WEB_SEARCH_MAX_USES: u32 = 6;

/// Failure of one batch's network call. The scan loop recovers from these
/// per batch; they never abort a session.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search endpoint returned {status}: {message}")]
    Endpoint { status: u16, message: String },
}

/// One web-search-backed model call per batch. Implemented by the Anthropic
/// client in production and by scripted providers in tests.
#[async_trait]
pub trait SearchProvider {
    async fn search(&self, prompt: &str) -> Result<String, SearchError>;
}

// --- Wire types (Messages API) ---

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    tools: Vec<WebSearchTool<'a>>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct WebSearchTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'a str,
    name: &'a str,
    max_uses: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

/// Web-search responses interleave text blocks with tool-use and
/// search-result blocks; only the text carries postings.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

impl MessagesResponse {
    /// All text blocks concatenated in response order.
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect()
    }
}

// --- Anthropic provider ---

#[derive(Debug)]
pub struct AnthropicSearch {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl AnthropicSearch {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set. Set it with: export ANTHROPIC_API_KEY=your-key-here")?;
        let api_url =
            env::var("SCOUT_API_URL").unwrap_or_else(|_| ANTHROPIC_API_URL.to_string());
        // No request timeout: a batch is allowed to take as long as the
        // endpoint needs, and the scan loop never runs batches in parallel.
        let client = reqwest::Client::new();
        Ok(Self {
            client,
            api_key,
            api_url,
        })
    }
}

#[async_trait]
impl SearchProvider for AnthropicSearch {
    async fn search(&self, prompt: &str) -> Result<String, SearchError> {
        let request = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            tools: vec![WebSearchTool {
                tool_type: WEB_SEARCH_TOOL_TYPE,
                name: "web_search",
                max_uses: WEB_SEARCH_MAX_USES,
            }],
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(prompt_chars = prompt.len(), "sending search request");

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "search endpoint rejected request");
            return Err(SearchError::Endpoint {
                status: status.as_u16(),
                message,
            });
        }

        let body: MessagesResponse = response.json().await?;
        let text = body.text();
        debug!(
            blocks = body.content.len(),
            text_chars = text.len(),
            "search response received"
        );
        Ok(text)
    }
}

//! Language-model completion clients.
//!
//! [`OpenAiClient`] talks to an OpenAI-compatible chat completions endpoint.
//! [`SimulatedLlm`] answers offline from canned responses and is what the
//! demos use when no API key is around.

use std::future::Future;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use docsprompt_shared::{AppConfig, DocsPromptError, LlmConfig, Result, resolve_api_key};

use crate::prompt::question_of;

/// Anything that turns prompt text into response text.
pub trait CompletionProvider {
    /// Complete `prompt`, returning the model's reply.
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// OpenAI-compatible client
// ---------------------------------------------------------------------------

/// Chat completions client for OpenAI-compatible APIs.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>, config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| DocsPromptError::Llm(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
        })
    }

    /// Create a client, reading the API key from the configured env var.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api_key = resolve_api_key(config)?;
        Self::new(api_key, &config.llm)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| DocsPromptError::config("API key is not a valid header value"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl CompletionProvider for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, "sending chat completion request");

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| DocsPromptError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(DocsPromptError::Llm(format!("API returned {status}: {text}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DocsPromptError::Llm(format!("failed to parse response: {e}")))?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| DocsPromptError::Llm("response contained no choices".into()))?;

        info!(answer_len = answer.len(), "completion received");
        Ok(answer)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}

// ---------------------------------------------------------------------------
// Simulated responder
// ---------------------------------------------------------------------------

const CREATE_DOCUMENT_ANSWER: &str = "\
Based on the documentation provided, here's how to create a document:

1. Create a new .md file in the `docs/` directory.
2. Write your content using Markdown syntax.
3. Add front matter such as `sidebar_label` and `sidebar_position` to place it in the sidebar.
4. Docusaurus builds the sidebar from the docs folder, so the page shows up in navigation automatically.";

const DOCUSAURUS_ANSWER: &str = "\
Based on your site documentation, Docusaurus is a static site generator that:

- is designed to be installed and running quickly,
- lets you focus on your docs while it handles the site plumbing,
- is built with React, so layouts can be extended and customized.";

const GET_STARTED_ANSWER: &str = "\
Based on your documentation, here's how to get started:

1. Install Node.js 18.0 or above.
2. Generate a site: `npm init docusaurus@latest my-website classic`.
3. Run `cd my-website` and then `npm run start`.
4. Open http://localhost:3000/ to view your site.";

const GENERIC_ANSWER: &str = "\
I can help answer questions about your documentation site, such as creating documents \
and pages, getting started, and site configuration. Please ask a more specific question.";

/// Offline responder that picks a canned answer from the prompt's question.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedLlm;

impl SimulatedLlm {
    /// The canned answer for `prompt`.
    pub fn respond(&self, prompt: &str) -> &'static str {
        let question = question_of(prompt).to_ascii_lowercase();

        if question.contains("create") && question.contains("document") {
            CREATE_DOCUMENT_ANSWER
        } else if question.contains("docusaurus") || question.contains("what is") {
            DOCUSAURUS_ANSWER
        } else if question.contains("get started") || question.contains("new here") {
            GET_STARTED_ANSWER
        } else {
            GENERIC_ANSWER
        }
    }
}

impl CompletionProvider for SimulatedLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(self.respond(prompt).to_string())
    }
}

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

/// Either a live API client or the offline responder.
pub enum LlmBackend {
    OpenAi(OpenAiClient),
    Simulated(SimulatedLlm),
}

impl LlmBackend {
    /// Pick the simulated responder when asked, else a live client from config.
    pub fn from_config(config: &AppConfig, simulate: bool) -> Result<Self> {
        if simulate {
            return Ok(Self::Simulated(SimulatedLlm));
        }
        Ok(Self::OpenAi(OpenAiClient::from_config(config)?))
    }

    /// Short label for display.
    pub fn label(&self) -> &str {
        match self {
            Self::OpenAi(client) => client.model(),
            Self::Simulated(_) => "simulated",
        }
    }
}

impl CompletionProvider for LlmBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        match self {
            Self::OpenAi(client) => client.complete(prompt).await,
            Self::Simulated(sim) => sim.complete(prompt).await,
        }
    }
}

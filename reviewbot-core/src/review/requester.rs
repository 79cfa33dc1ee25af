//! Review requester: one diff in, one Markdown review out
//!
//! The requester performs exactly one chat-completions call per review. It never
//! retries, and it never reads the process environment: endpoint, model and
//! credential are all handed in by the caller.

use std::time::Instant;

use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::StatusCode;
use tracing::{debug, error, info};

use crate::config::InferenceConfig;
use crate::secrets::Credential;
use crate::{Error, Result};

use super::prompt::{ReviewPrompt, DEFAULT_INSTRUCTIONS};
use super::wire::{ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse};

/// Maximum number of characters of an error body kept in errors and logs
const SNIPPET_LEN: usize = 300;

/// Everything needed for a single inference call
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    /// Model identifier
    pub model: String,
    /// Prompt carrying the instructions and the diff
    pub prompt: ReviewPrompt,
    /// Bearer token
    pub credential: Credential,
}

impl ReviewRequest {
    /// Create a request, rejecting a blank model identifier
    pub fn new(model: impl Into<String>, prompt: ReviewPrompt, credential: Credential) -> Result<Self> {
        let model = model.into().trim().to_string();
        if model.is_empty() {
            return Err(Error::ModelUnavailable {
                model,
                detail: "no model identifier given".to_string(),
            });
        }

        Ok(Self {
            model,
            prompt,
            credential,
        })
    }
}

/// A successful review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Model that produced the review
    pub model: String,
    /// Markdown returned by the model
    pub markdown: String,
}

impl std::fmt::Display for Review {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.markdown)
    }
}

/// Client for the inference endpoint
#[derive(Debug, Clone)]
pub struct ReviewRequester {
    client: reqwest::Client,
    config: InferenceConfig,
    instructions: Option<String>,
}

impl ReviewRequester {
    /// Create a requester for the configured endpoint
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("reviewbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(client_setup_error)?;

        debug!(
            endpoint = %config.endpoint,
            timeout_secs = config.timeout.as_secs(),
            "Created review requester"
        );

        Ok(Self {
            client,
            config,
            instructions: None,
        })
    }

    /// Replace the built-in reviewer instructions
    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions.filter(|i| !i.trim().is_empty());
        self
    }

    /// Build the prompt this requester would send for `diff_text`
    pub fn build_prompt(&self, diff_text: &str) -> Result<ReviewPrompt> {
        let instructions = self.instructions.as_deref().unwrap_or(DEFAULT_INSTRUCTIONS);
        ReviewPrompt::with_instructions(instructions, diff_text)
    }

    /// Review a diff with the given model and bearer token
    ///
    /// Inputs are validated before any I/O: a blank diff fails with
    /// [`Error::EmptyDiff`], a blank credential with [`Error::Authentication`],
    /// a blank model with [`Error::ModelUnavailable`].
    pub async fn request_review(&self, diff_text: &str, model: &str, credential: &str) -> Result<Review> {
        let prompt = self.build_prompt(diff_text)?;
        let credential = Credential::new(credential)?;
        let request = ReviewRequest::new(model, prompt, credential)?;
        self.send(request).await
    }

    /// Send a prepared request; exactly one HTTP call, no retry
    pub async fn send(&self, request: ReviewRequest) -> Result<Review> {
        let started = Instant::now();
        let body = ChatCompletionRequest::user(&request.model, request.prompt.as_str());

        debug!(
            model = %request.model,
            prompt_len = request.prompt.len(),
            "POST {}", self.config.endpoint
        );

        let api_version = HeaderValue::from_str(&self.config.api_version)
            .map_err(|e| Error::Config(format!("Invalid API version header: {}", e)))?;

        let resp = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(request.credential.expose())
            .header(ACCEPT, "application/json")
            .header("X-GitHub-Api-Version", api_version)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| {
                error!(
                    error = %e,
                    model = %request.model,
                    latency_ms = started.elapsed().as_millis(),
                    "Inference request failed"
                )
            })?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let err = classify_status(status, &request.model, &text);
            error!(
                %status,
                model = %request.model,
                latency_ms = started.elapsed().as_millis(),
                error = %err,
                "Inference endpoint returned non-success status"
            );
            return Err(err);
        }

        let markdown = extract_completion(&text)?;

        info!(
            model = %request.model,
            latency_ms = started.elapsed().as_millis(),
            review_len = markdown.len(),
            "Review completed"
        );

        Ok(Review {
            model: request.model,
            markdown,
        })
    }
}

/// A client that cannot be built is a local setup problem, not a failed call
fn client_setup_error(err: reqwest::Error) -> Error {
    Error::Config(format!("Cannot build HTTP client: {}", err))
}

/// Pull the completion text out of a successful response body
fn extract_completion(body: &str) -> Result<String> {
    let out: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        Error::MalformedResponse(format!(
            "{}; expected `choices[0].message.content` in {}",
            e,
            snippet(body)
        ))
    })?;

    let content = out
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.into_text())
        .ok_or(Error::EmptyResponse)?;

    if content.trim().is_empty() {
        return Err(Error::EmptyResponse);
    }

    Ok(content)
}

/// Map a non-success status onto the error taxonomy
fn classify_status(status: StatusCode, model: &str, body: &str) -> Error {
    let api_error = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_default();
    let code = api_error.code.unwrap_or_default().to_lowercase();
    let detail = api_error.message.unwrap_or_else(|| snippet(body));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(format!(
            "Inference endpoint rejected the credential ({}): {}",
            status, detail
        )),
        StatusCode::NOT_FOUND => Error::ModelUnavailable {
            model: model.to_string(),
            detail,
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY
            if names_unknown_model(&code, &detail) =>
        {
            Error::ModelUnavailable {
                model: model.to_string(),
                detail,
            }
        }
        _ => Error::UnexpectedStatus {
            status: status.as_u16(),
            snippet: snippet(body),
        },
    }
}

fn names_unknown_model(code: &str, message: &str) -> bool {
    let message = message.to_lowercase();
    code.contains("model")
        || message.contains("unknown model")
        || message.contains("model not found")
        || message.contains("unavailable model")
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= SNIPPET_LEN {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(SNIPPET_LEN).collect();
    format!("{}…", cut)
}

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::{build_prompt, ReplyGenerator};
use crate::config::schema::ReplyConfig;

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API returned no choices")]
    EmptyResponse,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    n: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat Completions client. Blocking: the pipeline is synchronous.
pub struct OpenAiReplier {
    http: reqwest::blocking::Client,
    api_key: SecretString,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiReplier {
    pub fn new(config: &ReplyConfig, api_key: SecretString) -> Result<Self, ReplyError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("supportdesk/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// One request, no retries.
    pub fn request(&self, subject: &str, body: &str) -> Result<String, ReplyError> {
        let prompt = build_prompt(subject, body);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            n: 1,
        };

        debug!(model = %self.model, "Requesting reply draft");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReplyError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: ChatResponse = response.json()?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(ReplyError::EmptyResponse)
    }
}

impl ReplyGenerator for OpenAiReplier {
    fn generate(&self, subject: &str, body: &str) -> String {
        match self.request(subject, body) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Reply generation failed, returning fallback");
                fallback_reply(subject, &e)
            }
        }
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

fn fallback_reply(subject: &str, error: &ReplyError) -> String {
    format!(
        "[AI generation error: {}] Hello, thanks for contacting support about '{}'. We'll follow up shortly.",
        error, subject
    )
}

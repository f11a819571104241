use super::CompletionBackend;
use super::prompt_builder::{truncate, RenderedPrompt};
use super::prompts;
use crate::config::BackendCredentials;
use crate::error::CompletionError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimal request/response structs for OpenAI Chat Completions API.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// OpenAI-based implementation of CompletionBackend.
pub struct OpenAiClient {
    client: Client,
    model: String,
    default_base_url: String,
}

impl OpenAiClient {
    /// `timeout` bounds every request made by this client.
    pub fn new(
        model: String,
        default_base_url: String,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CompletionError::Transport)?;

        Ok(OpenAiClient {
            client,
            model,
            default_base_url,
        })
    }

    pub(crate) fn build_request(&self, prompt: &RenderedPrompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::PR_INSTRUCTIONS.to_owned(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.as_str().to_owned(),
                },
            ],
            temperature: 1.0,
            top_p: 1.0,
        }
    }
}

fn chat_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{base}/chat/completions")
    } else {
        format!("{base}/v1/chat/completions")
    }
}

/// Pull the first candidate's text out of a raw response body.
fn extract_content(body: &str) -> Result<String, CompletionError> {
    let chat_resp: ChatResponse = serde_json::from_str(body).map_err(CompletionError::Decode)?;

    if let Some(usage) = &chat_resp.usage {
        log::info!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
    }

    chat_resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(CompletionError::EmptyCompletion)
}

impl CompletionBackend for OpenAiClient {
    fn complete(
        &self,
        prompt: &RenderedPrompt,
        credentials: &BackendCredentials,
    ) -> Result<String, CompletionError> {
        let base_url = credentials
            .base_url
            .as_deref()
            .unwrap_or(&self.default_base_url);
        let url = chat_url(base_url);
        let req = self.build_request(prompt);

        log::info!("Calling OpenAI model {:?}", &req.model);
        log::trace!("User prompt:\n{}", truncate(prompt.as_str(), 3000));

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&credentials.api_key)
            .json(&req)
            .send()
            .map_err(CompletionError::Transport)?;

        let status = resp.status();
        let body = resp.text().map_err(CompletionError::Transport)?;

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        log::trace!("OpenAI raw JSON response: {}", truncate(&body, 3000));

        extract_content(&body)
    }
}

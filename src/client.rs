use crate::config::GenerateConfig;
use crate::error::{Error, Result};
use crate::prompt::SYSTEM_INSTRUCTION;
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// One message of a chat-completion conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role (`system` or `user`)
    pub role: String,

    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request payload for the chat-completions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model name
    pub model: String,

    /// Conversation messages (system instruction plus user prompt)
    pub messages: Vec<ChatMessage>,
}

/// Response payload of the chat-completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Completion choices; the first one is used
    pub choices: Vec<ChatChoice>,
}

/// A single completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// The generated message
    pub message: ChatMessage,
}

impl ChatResponse {
    /// Extracts the text of the first completion choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the service returned no choices.
    pub fn into_first_choice(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::api("response contained no completion choices"))
    }
}

/// Synchronous access to a chat-completion service.
///
/// The trait is the seam for tests: the generator only depends on
/// `dyn CompletionClient`.
pub trait CompletionClient {
    /// Sends one user message (with the fixed system instruction) and
    /// returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns an error on request failure or a malformed response.
    fn complete(&self, user_message: &str) -> Result<String>;
}

/// Blocking client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiClient {
    /// Creates a client, reading the API key from the process environment.
    ///
    /// A `.env` file next to the working directory is honored.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is not set.
    pub fn from_env(config: &GenerateConfig) -> Result<Self> {
        dotenv::dotenv().ok();

        let api_key =
            std::env::var(API_KEY_VAR).map_err(|_| Error::credential(API_KEY_VAR))?;

        // Completions on large notes routinely outlive the default request
        // timeout; the batch blocks until the service answers.
        let http = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()?;

        Ok(Self {
            http,
            api_key,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
        })
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, user_message: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_INSTRUCTION),
                ChatMessage::user(user_message),
            ],
        };

        debug!("Sending completion request to {}", self.api_url);

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::api(format!("HTTP {status}: {body}")));
        }

        let completion: ChatResponse = response.json()?;

        debug!("Got response from completion service");
        completion.into_first_choice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_payload_shape() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![
                ChatMessage::system("be terse"),
                ChatMessage::user("hello"),
            ],
        };

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "be terse");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_response_first_choice() {
        let raw = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "Q: A?\nA: B\n\n"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        }"#;

        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        let text = response.into_first_choice().unwrap();

        assert_eq!(text, "Q: A?\nA: B\n\n");
    }

    #[test]
    fn test_response_without_choices() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        let result = response.into_first_choice();

        assert!(matches!(result, Err(Error::Api { .. })));
    }

    #[test]
    fn test_response_ignores_extra_fields() {
        let raw = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "usage": {"total_tokens": 42},
            "choices": [{"index": 0, "finish_reason": "stop",
                         "message": {"role": "assistant", "content": "ok"}}]
        }"#;

        let response: ChatResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(response.into_first_choice().unwrap(), "ok");
    }
}

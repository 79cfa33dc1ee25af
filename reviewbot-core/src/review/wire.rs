//! Chat-completions payloads exchanged with the inference endpoint

use serde::{Deserialize, Serialize};

/// Request body: one user message, non-streaming
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: [ChatMessage<'a>; 1],
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn user(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMessageOut {
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// Completion content: plain text, a list of content parts, or any other
/// JSON value rendered as-is
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ContentPart {
    Text { text: String },
    Other(serde_json::Value),
}

impl MessageContent {
    /// Flatten into text; parts without a `text` field are rendered as JSON
    pub fn into_text(self) -> String {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Parts(parts) => parts
                .into_iter()
                .map(|part| match part {
                    ContentPart::Text { text } => text,
                    ContentPart::Other(value) => value.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            MessageContent::Other(value) => value.to_string(),
        }
    }
}

/// Error envelope used by OpenAI-compatible endpoints
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(ChatCompletionRequest::user("m", "p")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"model": "m", "messages": [{"role": "user", "content": "p"}]})
        );
    }

    #[test]
    fn test_content_parts_joined() {
        let raw = serde_json::json!({"choices": [{"message": {"content": [
            {"type": "text", "text": "## Review"},
            {"type": "text", "text": "- ok"}
        ]}}]});
        let resp: ChatCompletionResponse = serde_json::from_value(raw).unwrap();
        let content = resp.choices.into_iter().next().unwrap().message.content.unwrap();
        assert_eq!(content.into_text(), "## Review\n- ok");
    }

    #[test]
    fn test_non_text_content_rendered() {
        let raw = r#"{"choices":[{"message":{"content":{"summary":"ok"}}}]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let content = resp.choices.into_iter().next().unwrap().message.content.unwrap();
        assert_eq!(content.into_text(), r#"{"summary":"ok"}"#);

        let raw = r#"{"choices":[{"message":{"content":42}}]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let content = resp.choices.into_iter().next().unwrap().message.content.unwrap();
        assert_eq!(content.into_text(), "42");
    }

    #[test]
    fn test_null_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert!(resp.choices[0].message.content.is_none());
    }
}

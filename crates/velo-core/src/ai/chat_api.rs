use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::CompletionBackend;
use crate::error::ChatError;
use crate::state::{Citation, CompletionReply, CompletionRequest};

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

/// Client for the advisor backend (`/api/chat/completion`, `/api/health`).
#[derive(Clone)]
pub struct ChatApiClient {
    client: Client,
    base_url: String,
}

impl ChatApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns true when the backend reports `{"status": "ok"}`.
    pub async fn health(&self) -> bool {
        let url = format!("{}/api/health", self.base_url);

        let response = match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "health check failed");
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "health check unreachable");
                return false;
            }
        };

        match response.json::<HealthResponse>().await {
            Ok(health) => health.status == "ok",
            Err(e) => {
                tracing::warn!(error = %e, "health check returned an unexpected body");
                false
            }
        }
    }
}

#[async_trait]
impl CompletionBackend for ChatApiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply, ChatError> {
        let url = format!("{}/api/chat/completion", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Protocol(format!(
                "completion request failed with status: {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        parse_reply(&body)
    }
}

/// Parse a completion body. Only a string `response` field is mandatory;
/// an unusable `citations` value is dropped rather than failing the turn.
pub fn parse_reply(body: &str) -> Result<CompletionReply, ChatError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ChatError::Protocol(format!("body is not JSON: {}", e)))?;

    let response = value
        .get("response")
        .and_then(Value::as_str)
        .ok_or_else(|| ChatError::Protocol("body has no string 'response' field".to_string()))?
        .to_string();

    let citations = match value.get("citations") {
        None | Some(Value::Null) => Vec::new(),
        Some(raw) => serde_json::from_value::<Vec<Citation>>(raw.clone()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring malformed citations");
            Vec::new()
        }),
    };

    Ok(CompletionReply {
        response,
        citations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_with_citations() {
        let reply = parse_reply(
            r#"{"response":"Nimm das Stereo [doc1]","citations":[{"title":"stereo.md","content":"...","url":null}]}"#,
        )
        .unwrap();
        assert_eq!(reply.response, "Nimm das Stereo [doc1]");
        assert_eq!(reply.citations.len(), 1);
        assert_eq!(reply.citations[0].title, "stereo.md");
    }

    #[test]
    fn test_parse_reply_rejects_non_json() {
        assert!(matches!(parse_reply("<html>"), Err(ChatError::Protocol(_))));
    }

    #[test]
    fn test_parse_reply_rejects_missing_response() {
        assert!(matches!(
            parse_reply(r#"{"citations":[]}"#),
            Err(ChatError::Protocol(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"response":42}"#),
            Err(ChatError::Protocol(_))
        ));
    }

    #[test]
    fn test_parse_reply_drops_malformed_citations() {
        let reply = parse_reply(r#"{"response":"ok","citations":"none"}"#).unwrap();
        assert!(reply.citations.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ChatApiClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}

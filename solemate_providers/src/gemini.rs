use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use solemate_core::{Completion, CompletionProvider, PromptRequest, ProviderError, Role, Usage};
use tracing::{debug, info, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Google Gemini over the `generateContent` REST endpoint.
///
/// One call is one attempt; retries belong to the caller's `RetryPolicy`.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating GeminiProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Client-side request timeout, independent of the retry policy's
    /// per-attempt timeout. The current client is kept if a new one cannot
    /// be built.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        match Client::builder().timeout(timeout).build() {
            Ok(client) => self.client = client,
            Err(e) => warn!("Could not apply {timeout:?} request timeout, keeping defaults: {e}"),
        }
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

fn request_body(request: &PromptRequest) -> Value {
    let contents: Vec<Value> = request
        .messages
        .iter()
        .map(|m| {
            json!({
                "role": wire_role(m.role),
                "parts": [{ "text": m.text }],
            })
        })
        .collect();

    json!({
        "systemInstruction": { "parts": [{ "text": request.system }] },
        "contents": contents,
    })
}

fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    let detail = format!("HTTP {status}: {}", body.chars().take(200).collect::<String>());
    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        ProviderError::Transient(detail)
    } else {
        ProviderError::Permanent(detail)
    }
}

fn classify_transport(err: &reqwest::Error) -> ProviderError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        ProviderError::Transient(err.to_string())
    } else {
        ProviderError::Permanent(err.to_string())
    }
}

fn token_count(usage: &Value, key: &str) -> u32 {
    u32::try_from(usage[key].as_u64().unwrap_or(0)).unwrap_or(0)
}

fn parse_response(response: &Value) -> Result<Completion, ProviderError> {
    if let Some(reason) = response["promptFeedback"]["blockReason"].as_str() {
        return Err(ProviderError::Permanent(format!("prompt blocked: {reason}")));
    }

    let candidate = &response["candidates"][0];
    if candidate["finishReason"].as_str() == Some("SAFETY") {
        return Err(ProviderError::Permanent(
            "completion stopped by safety filter".to_string(),
        ));
    }

    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ProviderError::Permanent(
            "Invalid response format: missing text".to_string(),
        ));
    }

    let usage = response
        .get("usageMetadata")
        .filter(|meta| meta.is_object())
        .map(|meta| Usage {
            prompt_tokens: token_count(meta, "promptTokenCount"),
            completion_tokens: token_count(meta, "candidatesTokenCount"),
            total_tokens: token_count(meta, "totalTokenCount"),
        });

    Ok(Completion {
        text: text.trim().to_string(),
        usage,
    })
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, request: &PromptRequest) -> Result<Completion, ProviderError> {
        debug!(
            "Sending request to Gemini: model={}, messages={}",
            self.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::Permanent(format!("undecodable response: {e}")))?;

        let completion = parse_response(&value)?;
        if let Some(usage) = completion.usage {
            debug!("Gemini usage: {} tokens", usage.total_tokens);
        }
        Ok(completion)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solemate_core::PromptMessage;

    #[test]
    fn test_request_body_maps_roles() {
        let request = PromptRequest {
            system: "You are a shoe assistant.".to_string(),
            messages: vec![
                PromptMessage {
                    role: Role::User,
                    text: "Hi".to_string(),
                },
                PromptMessage {
                    role: Role::Assistant,
                    text: "Hello!".to_string(),
                },
                PromptMessage {
                    role: Role::User,
                    text: "Nike?".to_string(),
                },
            ],
        };
        let body = request_body(&request);
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a shoe assistant."
        );
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "Nike?");
    }

    #[test]
    fn test_builder_settings_survive_timeout() {
        let provider = GeminiProvider::new("key".to_string())
            .with_base_url("http://localhost:9999/v1beta/".to_string())
            .with_model("gemini-test".to_string())
            .with_timeout(Duration::from_secs(5));

        assert_eq!(provider.model(), "gemini-test");
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_parse_response_with_usage() {
        let value = json!({
            "candidates": [{
                "content": { "parts": [{ "text": " Yes, we have " }, { "text": "Nike Air. " }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 40,
                "candidatesTokenCount": 6,
                "totalTokenCount": 46
            }
        });
        let completion = parse_response(&value).unwrap();
        assert_eq!(completion.text, "Yes, we have Nike Air.");
        assert_eq!(completion.usage.unwrap().total_tokens, 46);
    }

    #[test]
    fn test_blocked_prompt_is_permanent() {
        let value = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(
            parse_response(&value),
            Err(ProviderError::Permanent(_))
        ));

        let value = json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        assert!(matches!(
            parse_response(&value),
            Err(ProviderError::Permanent(_))
        ));
    }

    #[test]
    fn test_missing_text_is_permanent() {
        let value = json!({ "candidates": [] });
        assert!(matches!(
            parse_response(&value),
            Err(ProviderError::Permanent(_))
        ));
    }

    #[test]
    fn test_status_classification() {
        assert!(classify_status(StatusCode::TOO_MANY_REQUESTS, "").is_transient());
        assert!(classify_status(StatusCode::SERVICE_UNAVAILABLE, "").is_transient());
        assert!(classify_status(StatusCode::REQUEST_TIMEOUT, "").is_transient());
        assert!(!classify_status(StatusCode::BAD_REQUEST, "").is_transient());
        assert!(!classify_status(StatusCode::UNAUTHORIZED, "").is_transient());
    }

    #[test]
    fn test_endpoint_uses_model() {
        let provider = GeminiProvider::new("key".to_string())
            .with_base_url("http://localhost:9999/v1beta/".to_string())
            .with_model("gemini-test".to_string());
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
        assert_eq!(provider.name(), "gemini");
    }
}

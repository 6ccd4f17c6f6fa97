//! OpenAI chat-completion client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::{
    InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage,
};

/// Inference engine backed by an OpenAI-compatible `/chat/completions` API
#[derive(Debug, Clone)]
pub struct OpenAIInferenceEngine {
    client: Client,
    config: InferenceConfig,
}

impl OpenAIInferenceEngine {
    /// Create a new OpenAI inference engine
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        config.validate().map_err(InferenceError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::Configuration(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            "Initialized OpenAI inference engine"
        );

        Ok(Self { client, config })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }

    /// Get the model to use for a request
    fn resolve_model<'a>(&'a self, request: &'a InferenceRequest) -> &'a str {
        request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model)
    }

    /// Map a transport error, filling in the configured timeout
    fn map_transport_error(&self, err: reqwest::Error) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Timeout(self.config.timeout_ms)
        } else {
            err.into()
        }
    }

    /// Turn a non-success response into an error
    async fn error_from_response(&self, response: Response, model: &str) -> InferenceError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "Inference request failed");

        let detail = serde_json::from_str::<ApiError>(&body).ok().map(|e| e.error);
        let code = detail.as_ref().and_then(|d| d.code.as_deref());
        let message = detail
            .as_ref()
            .map_or_else(|| format!("Status {status}: {body}"), |d| d.message.clone());

        match (status, code) {
            (StatusCode::TOO_MANY_REQUESTS, _) | (_, Some("rate_limit_exceeded")) => {
                InferenceError::RateLimited
            },
            (_, Some("model_not_found")) | (StatusCode::NOT_FOUND, _) => {
                InferenceError::ModelNotAvailable(model.to_string())
            },
            (StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE, _) => {
                InferenceError::InvalidRequest(message)
            },
            (s, _) if s.is_server_error() => InferenceError::ServerError(message),
            _ => InferenceError::RequestFailed(message),
        }
    }
}

/// Chat-completion request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [InferenceMessage],
    max_tokens: u32,
    temperature: f32,
}

/// Chat-completion response body
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Models list response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

#[async_trait]
impl InferenceEngine for OpenAIInferenceEngine {
    #[instrument(skip(self, request), fields(model = %self.resolve_model(&request), messages = request.messages.len()))]
    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        let model = self.resolve_model(&request).to_string();

        let body = ChatCompletionRequest {
            model: &model,
            messages: &request.messages,
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.unwrap_or(self.config.temperature),
        };

        debug!("Sending chat completion request");

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(self.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response, &model).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::InvalidResponse("Response has no choices".to_string()))?;

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| InferenceError::InvalidResponse("Response has no content".to_string()))?;

        debug!(tokens = ?completion.usage, "Inference completed");

        Ok(InferenceResponse {
            content,
            model: completion.model,
            usage: completion.usage,
            finish_reason: choice.finish_reason,
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, InferenceError> {
        let response = self
            .client
            .get(self.api_url("models"))
            .bearer_auth(self.api_key())
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) if e.is_timeout() || e.is_connect() => Ok(false),
            Err(e) => Err(InferenceError::RequestFailed(e.to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn list_models(&self) -> Result<Vec<String>, InferenceError> {
        let response = self
            .client
            .get(self.api_url("models"))
            .bearer_auth(self.api_key())
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(InferenceError::ServerError(response.status().to_string()));
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        Ok(models.data.into_iter().map(|m| m.id).collect())
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}

#[cfg(test)]
mod tests {
    use domain::ChatMessage;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config_for(server: &MockServer) -> InferenceConfig {
        InferenceConfig {
            base_url: format!("{}/v1", server.uri()),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "gpt-3.5-turbo-0125",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        })
    }

    #[test]
    fn new_rejects_missing_api_key() {
        let result = OpenAIInferenceEngine::new(InferenceConfig::default());
        assert!(matches!(result, Err(InferenceError::Configuration(_))));
    }

    #[test]
    fn api_url_joins_cleanly() {
        let engine = OpenAIInferenceEngine::new(InferenceConfig {
            base_url: "https://api.openai.com/v1/".to_string(),
            api_key: Some("sk".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            engine.api_url("/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn generate_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-3.5-turbo"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hello there!")))
            .expect(1)
            .mount(&server)
            .await;

        let engine = OpenAIInferenceEngine::new(config_for(&server)).unwrap();
        let response = engine
            .generate(InferenceRequest::simple("Hi"))
            .await
            .unwrap();

        assert_eq!(response.content, "Hello there!");
        assert_eq!(response.model, "gpt-3.5-turbo-0125");
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        assert_eq!(response.usage.unwrap().total_tokens, 17);
    }

    #[tokio::test]
    async fn generate_sends_messages_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "system", "content": "persona"},
                    {"role": "user", "content": "one"},
                    {"role": "assistant", "content": "two"},
                    {"role": "user", "content": "three"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let engine = OpenAIInferenceEngine::new(config_for(&server)).unwrap();
        let prompt = [
            ChatMessage::system("persona"),
            ChatMessage::user("one"),
            ChatMessage::assistant("two"),
            ChatMessage::user("three"),
        ];
        let response = engine
            .generate(InferenceRequest::from_messages(&prompt))
            .await
            .unwrap();
        assert_eq!(response.content, "ok");
    }

    #[tokio::test]
    async fn generate_rejects_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"model": "gpt-3.5-turbo", "choices": []})),
            )
            .mount(&server)
            .await;

        let engine = OpenAIInferenceEngine::new(config_for(&server)).unwrap();
        let result = engine.generate(InferenceRequest::simple("Hi")).await;
        assert!(matches!(result, Err(InferenceError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn generate_rejects_blank_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("  ")))
            .mount(&server)
            .await;

        let engine = OpenAIInferenceEngine::new(config_for(&server)).unwrap();
        let result = engine.generate(InferenceRequest::simple("Hi")).await;
        assert!(matches!(result, Err(InferenceError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Slow down", "type": "requests", "code": "rate_limit_exceeded"}
            })))
            .mount(&server)
            .await;

        let engine = OpenAIInferenceEngine::new(config_for(&server)).unwrap();
        let result = engine.generate(InferenceRequest::simple("Hi")).await;
        assert!(matches!(result, Err(InferenceError::RateLimited)));
    }

    #[tokio::test]
    async fn unknown_model_maps_to_model_not_available() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"message": "The model does not exist", "code": "model_not_found"}
            })))
            .mount(&server)
            .await;

        let engine = OpenAIInferenceEngine::new(config_for(&server)).unwrap();
        let result = engine
            .generate(InferenceRequest::simple("Hi").with_model("gpt-nope"))
            .await;
        assert!(matches!(result, Err(InferenceError::ModelNotAvailable(m)) if m == "gpt-nope"));
    }

    #[tokio::test]
    async fn bad_request_maps_to_invalid_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "maximum context length exceeded", "code": "context_length_exceeded"}
            })))
            .mount(&server)
            .await;

        let engine = OpenAIInferenceEngine::new(config_for(&server)).unwrap();
        let result = engine.generate(InferenceRequest::simple("Hi")).await;
        assert!(
            matches!(result, Err(InferenceError::InvalidRequest(msg)) if msg.contains("context length"))
        );
    }

    #[tokio::test]
    async fn server_error_maps_to_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let engine = OpenAIInferenceEngine::new(config_for(&server)).unwrap();
        let result = engine.generate(InferenceRequest::simple("Hi")).await;
        assert!(matches!(result, Err(InferenceError::ServerError(msg)) if msg.contains("overloaded")));
    }

    #[tokio::test]
    async fn slow_server_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let engine = OpenAIInferenceEngine::new(InferenceConfig {
            timeout_ms: 50,
            ..config_for(&server)
        })
        .unwrap();
        let result = engine.generate(InferenceRequest::simple("Hi")).await;
        assert!(matches!(result, Err(InferenceError::Timeout(50))));
    }

    #[tokio::test]
    async fn list_models_and_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{"id": "gpt-3.5-turbo"}, {"id": "whisper-1"}]
            })))
            .mount(&server)
            .await;

        let engine = OpenAIInferenceEngine::new(config_for(&server)).unwrap();
        assert!(engine.health_check().await.unwrap());
        assert_eq!(
            engine.list_models().await.unwrap(),
            vec!["gpt-3.5-turbo".to_string(), "whisper-1".to_string()]
        );
    }

    #[tokio::test]
    async fn health_check_false_when_unreachable() {
        let engine = OpenAIInferenceEngine::new(InferenceConfig {
            base_url: "http://127.0.0.1:1/v1".to_string(),
            api_key: Some("sk".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(!engine.health_check().await.unwrap());
    }
}

//! OpenRouter (OpenAI-compatible) chat-completions client

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use super::CompletionClient;
use crate::{
    error::{Error, Result},
    types::{CompletionOptions, Context, DEFAULT_ENDPOINT, Message},
};

/// Environment variable holding the OpenRouter API key by default
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Chat-completions client for OpenRouter or any compatible endpoint
pub struct OpenRouterClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    referer: Option<String>,
    title: Option<String>,
    options: CompletionOptions,
}

impl OpenRouterClient {
    /// Create a client for the default endpoint without credentials
    pub fn new(options: CompletionOptions) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            referer: None,
            title: None,
            options,
        }
    }

    /// Point the client at another endpoint (e.g. a credential-injecting proxy)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set or clear the bearer token
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    /// Set the `HTTP-Referer` attribution header
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Set the `X-Title` attribution header
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    /// Whether requests carry an `Authorization` header
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref key) = self.api_key {
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", key))?);
        }
        if let Some(ref referer) = self.referer {
            headers.insert(HeaderName::from_static("http-referer"), header_value(referer)?);
        }
        if let Some(ref title) = self.title {
            headers.insert(HeaderName::from_static("x-title"), header_value(title)?);
        }

        Ok(headers)
    }

    fn build_request(&self, history: &[Message], user_message: &str) -> ChatRequest {
        let context = Context::for_turn(
            self.options.system_prompt.as_deref(),
            history,
            user_message,
            self.options.context_limit,
        );

        let mut messages = Vec::with_capacity(context.messages.len() + 1);

        if let Some(system_prompt) = context.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system_prompt,
            });
        }

        messages.extend(context.messages.into_iter().map(|m| ChatMessage {
            role: m.sender.role().to_string(),
            content: m.text,
        }));

        ChatRequest {
            model: self.options.model.clone(),
            messages,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, history: &[Message], user_message: &str) -> Result<String> {
        let request = self.build_request(history, user_message);
        tracing::debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.build_headers()?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::status(status.as_u16(), body));
        }

        let body = response.text().await?;
        let reply = parse_reply(&body)?;
        tracing::debug!(chars = reply.chars().count(), "Received chat completion");
        Ok(reply)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidConfig(format!("invalid header value: {}", e)))
}

/// Extract the first choice's message content from a response body
fn parse_reply(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)?;

    let Some(choice) = response.choices.into_iter().next() else {
        return Err(match response.error {
            Some(err) => Error::api(
                err.code.map(|c| c.to_string()).unwrap_or_default(),
                err.message.unwrap_or_default(),
            ),
            None => Error::UnexpectedResponse("no choices in response".to_string()),
        });
    };

    choice
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| Error::UnexpectedResponse("first choice has no message content".to_string()))
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<serde_json::Value>,
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn history(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("q{}", i))
                } else {
                    Message::bot(format!("a{}", i))
                }
            })
            .collect()
    }

    // ----- request building -----

    #[test]
    fn test_request_has_persona_history_and_user_message() {
        let client = OpenRouterClient::new(CompletionOptions::default());
        let request = client.build_request(&history(2), "apa kabar?");

        let roles: Vec<&str> = request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(request.messages[3].content, "apa kabar?");
        assert_eq!(request.max_tokens, Some(1000));
        assert_eq!(request.temperature, Some(0.7));
    }

    #[test]
    fn test_request_caps_context_to_last_ten() {
        let client = OpenRouterClient::new(CompletionOptions::default());
        let request = client.build_request(&history(37), "latest");

        // system + 10 prior + new user message
        assert_eq!(request.messages.len(), 12);
        assert_eq!(request.messages[1].content, "a27");
        assert_eq!(request.messages[10].content, "q36");
        assert_eq!(request.messages[11].content, "latest");
    }

    #[test]
    fn test_request_without_persona() {
        let options = CompletionOptions {
            system_prompt: None,
            ..Default::default()
        };
        let client = OpenRouterClient::new(options);
        let request = client.build_request(&[], "hi");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
    }

    #[test]
    fn test_request_json_shape() {
        let options = CompletionOptions {
            model: "test-model".into(),
            max_tokens: None,
            temperature: Some(0.2),
            context_limit: 10,
            system_prompt: None,
        };
        let client = OpenRouterClient::new(options);
        let json = serde_json::to_value(client.build_request(&[], "hi")).unwrap();

        assert_eq!(json["model"], "test-model");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("temperature").is_some());
    }

    // ----- headers -----

    #[test]
    fn test_headers_without_key_have_no_authorization() {
        let client = OpenRouterClient::new(CompletionOptions::default());
        let headers = client.build_headers().unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_headers_with_key_and_attribution() {
        let client = OpenRouterClient::new(CompletionOptions::default())
            .with_api_key(Some("sk-test".into()))
            .with_referer("https://karirkita.example")
            .with_title("KarirKita Career Assistant");
        let headers = client.build_headers().unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer sk-test");
        assert_eq!(headers.get("http-referer").unwrap(), "https://karirkita.example");
        assert_eq!(headers.get("x-title").unwrap(), "KarirKita Career Assistant");
    }

    #[test]
    fn test_empty_key_treated_as_absent() {
        let client =
            OpenRouterClient::new(CompletionOptions::default()).with_api_key(Some(String::new()));
        assert!(!client.has_api_key());
    }

    #[test]
    fn test_invalid_header_value_is_config_error() {
        let client = OpenRouterClient::new(CompletionOptions::default()).with_title("bad\nvalue");
        assert!(matches!(client.build_headers(), Err(Error::InvalidConfig(_))));
    }

    // ----- response parsing -----

    #[test]
    fn test_parse_reply_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), "hello");
    }

    #[test]
    fn test_parse_reply_no_choices() {
        let err = parse_reply(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));

        let err = parse_reply(r#"{"id":"x"}"#).unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }

    #[test]
    fn test_parse_reply_missing_content() {
        let err = parse_reply(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));

        let err = parse_reply(r#"{"choices":[{"finish_reason":"stop"}]}"#).unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }

    #[test]
    fn test_parse_reply_error_object() {
        let body = r#"{"error":{"code":429,"message":"Rate limit exceeded"}}"#;
        match parse_reply(body).unwrap_err() {
            Error::Api { code, message } => {
                assert_eq!(code, "429");
                assert_eq!(message, "Rate limit exceeded");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_reply_invalid_json() {
        assert!(matches!(parse_reply("<html>"), Err(Error::Json(_))));
    }

    // ----- end-to-end against a local socket -----

    fn content_length(head: &str) -> usize {
        head.lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Serve exactly one HTTP response and hand back the raw request text.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&buf[..pos]).to_string();
                    if buf.len() >= pos + 4 + content_length(&head) {
                        break;
                    }
                }
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });

        (format!("http://{}/api/v1/chat/completions", addr), handle)
    }

    #[tokio::test]
    async fn test_complete_success() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"content":"Halo juga!"}}]}"#,
        )
        .await;

        let client = OpenRouterClient::new(CompletionOptions::default())
            .with_endpoint(url)
            .with_api_key(Some("sk-test".into()));
        let reply = client.complete(&history(3), "halo").await.unwrap();
        assert_eq!(reply, "Halo juga!");

        let raw = server.await.unwrap();
        let lower = raw.to_lowercase();
        assert!(raw.starts_with("POST /api/v1/chat/completions"));
        assert!(lower.contains("authorization: bearer sk-test"));
        assert!(raw.contains(r#""max_tokens":1000"#));
    }

    #[tokio::test]
    async fn test_complete_non_success_status() {
        let (url, server) = serve_once(
            "HTTP/1.1 500 Internal Server Error",
            r#"{"error":{"message":"boom"}}"#,
        )
        .await;

        let client = OpenRouterClient::new(CompletionOptions::default()).with_endpoint(url);
        let err = client.complete(&[], "halo").await.unwrap_err();
        match err {
            Error::Status { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("expected Status error, got {:?}", other),
        }

        let raw = server.await.unwrap();
        assert!(!raw.to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_complete_malformed_shape() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"choices":[]}"#).await;

        let client = OpenRouterClient::new(CompletionOptions::default()).with_endpoint(url);
        let err = client.complete(&[], "halo").await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
        server.await.unwrap();
    }
}

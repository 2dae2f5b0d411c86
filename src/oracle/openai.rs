//! OpenAI-compatible chat and image service client

use crate::config::OracleConfig;
use crate::error::{HaggleError, Result};
use crate::types::{ItemDescription, Message, Money, Speaker};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::NegotiationOracle;

const OWNER_PERSONA: &str = "You are a store owner skilled in negotiation. \
Decide on a counteroffer price based on the customer's plea. \
Include the price you are offering back in your response, and make sure it is different from any price the customer mentioned. \
Clearly state your counteroffer price in a format like '$X'. \
Do not mention any prices proposed by the customer in your response. \
You are sassy, a bit sarcastic, and can also choose to increase the price if you want. \
Be sure to keep the conversation short and sweet.";

const ITEM_PROMPT: &str = "Invent a single quirky second-hand shop item for customers to haggle over. \
Respond with only a JSON object with the keys \"name\" (at most four words) and \"description\" (one sentence).";

#[derive(Serialize, Deserialize, Clone, Debug)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        let role = match message.speaker() {
            Speaker::Player => "user",
            Speaker::Owner => "assistant",
        };
        Self {
            role: role.to_string(),
            content: message.text().to_string(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: String,
    n: u32,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

/// Oracle backed by an OpenAI-compatible HTTP API
pub struct OpenAiOracle {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    image_model: String,
    image_size: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiOracle {
    /// Build a client from configuration. Fails without an API key.
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| HaggleError::MissingConfig("OPENAI_API_KEY".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            image_model: config.image_model.clone(),
            image_size: config.image_size.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn chat(&self, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!("Chat request: model={} messages={}", self.model, body.messages.len());

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| HaggleError::ServiceRequest(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HaggleError::ServiceStatus { status, body });
        }

        let completion = response.json::<ChatCompletionResponse>().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| HaggleError::MalformedResponse("response contained no choices".to_string()))
    }
}

/// Messages sent for an owner reply: persona, conversation, then the price.
fn owner_messages(history: &[Message], current_price: Money) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(OWNER_PERSONA));
    messages.extend(history.iter().map(ChatMessage::from));
    messages.push(ChatMessage::system(format!(
        "The current price is {}. Respond accordingly.",
        current_price
    )));
    messages
}

/// Parse the item JSON, tolerating a markdown code fence around it.
fn parse_item(content: &str) -> Result<ItemDescription> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let item: ItemDescription = serde_json::from_str(unfenced)?;
    if item.name.trim().is_empty() {
        return Err(HaggleError::MalformedResponse("item has no name".to_string()));
    }
    Ok(item)
}

#[async_trait]
impl NegotiationOracle for OpenAiOracle {
    async fn owner_response(&self, history: &[Message], current_price: Money) -> Result<String> {
        self.chat(owner_messages(history, current_price), self.max_tokens)
            .await
    }

    async fn generate_item(&self) -> Result<ItemDescription> {
        let content = self
            .chat(vec![ChatMessage::system(ITEM_PROMPT)], self.max_tokens)
            .await?;
        parse_item(&content)
    }

    async fn generate_item_image(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let body = ImageRequest {
            model: &self.image_model,
            prompt: format!("A product photo of {} on a dusty antique shop shelf", name),
            n: 1,
            size: &self.image_size,
        };

        let response = self
            .client
            .post(self.endpoint("images/generations"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| HaggleError::ServiceRequest(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HaggleError::ServiceStatus { status, body });
        }

        let images = response.json::<ImageResponse>().await?;
        let Some(url) = images.data.into_iter().find_map(|image| image.url) else {
            return Ok(None);
        };

        tracing::debug!("Downloading image for {}", name);
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(Some(bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> OracleConfig {
        OracleConfig {
            api_key: api_key.map(String::from),
            ..OracleConfig::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        assert!(matches!(
            OpenAiOracle::new(&config(None)),
            Err(HaggleError::MissingConfig(_))
        ));
        assert!(matches!(
            OpenAiOracle::new(&config(Some("  "))),
            Err(HaggleError::MissingConfig(_))
        ));
        assert!(OpenAiOracle::new(&config(Some("sk-test"))).is_ok());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let mut cfg = config(Some("sk-test"));
        cfg.base_url = "http://localhost:8080/v1/".to_string();
        let oracle = OpenAiOracle::new(&cfg).unwrap();
        assert_eq!(oracle.endpoint("chat/completions"), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_owner_messages_layout() {
        let history = vec![Message::player("$50?"), Message::owner("Ha! $300.")];
        let messages = owner_messages(&history, Money(250.0));

        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "system"]);
        assert_eq!(messages[1].content, "$50?");
        assert_eq!(
            messages[3].content,
            "The current price is $250.00. Respond accordingly."
        );
    }

    #[test]
    fn test_parse_item() {
        let item = parse_item(r#"{"name": "Brass Lamp", "description": "Rubbing not advised."}"#).unwrap();
        assert_eq!(item.name, "Brass Lamp");

        let fenced = "```json\n{\"name\": \"Owl Clock\", \"description\": \"Hoots hourly.\"}\n```";
        assert_eq!(parse_item(fenced).unwrap().name, "Owl Clock");

        assert!(parse_item("a lovely lamp").is_err());
        assert!(parse_item(r#"{"name": " ", "description": "x"}"#).is_err());
    }

    #[test]
    fn test_completion_deserialization() {
        let raw = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"$120, take it or leave it."}}]}"#;
        let completion: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(completion.choices[0].message.content, "$120, take it or leave it.");
    }

    /// Serve a single canned HTTP response on a local port and return its base URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            // Drain the request so the client is not cut off mid-write
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            let body_start = loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break request.len();
                }
                request.extend_from_slice(&chunk[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let headers = String::from_utf8_lossy(&request[..body_start]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while request.len() < body_start + content_length {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    async fn oracle_at(status: &'static str, body: &'static str) -> OpenAiOracle {
        let mut cfg = config(Some("sk-test"));
        cfg.base_url = serve_once(status, body).await;
        OpenAiOracle::new(&cfg).unwrap()
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let oracle = oracle_at("429 Too Many Requests", "rate limited").await;

        let err = oracle.owner_response(&[], Money(100.0)).await.unwrap_err();
        assert!(err.is_service_error());
        match err {
            HaggleError::ServiceStatus { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let oracle = oracle_at("200 OK", r#"{"choices":[]}"#).await;

        let err = oracle.owner_response(&[], Money(100.0)).await.unwrap_err();
        assert!(matches!(err, HaggleError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_reply_content_returned() {
        let oracle = oracle_at(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Fine, $90."}}]}"#,
        )
        .await;

        let reply = oracle.owner_response(&[], Money(100.0)).await.unwrap();
        assert_eq!(reply, "Fine, $90.");
    }
}

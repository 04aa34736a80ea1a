use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{BotInfo, ChatId, Marker, MessageAck, OutboundMessage, Platform, Update, UpdateBatch};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// Client for the MAX Bot API (`https://platform-api.max.ru`).
pub struct MaxClient {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    #[serde(default)]
    updates: Vec<Value>,
    #[serde(default)]
    marker: Option<Marker>,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    message: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    #[serde(default)]
    body: Option<SentBody>,
}

#[derive(Debug, Deserialize)]
struct SentBody {
    #[serde(default)]
    mid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct CallbackAnswer<'a> {
    notification: &'a str,
}

impl MaxClient {
    pub fn new(config: &ApiConfig, token: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("MAX API {} {}", method, url);
        self.client
            .request(method, url)
            .header("Authorization", &self.token)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;

        if !status.is_success() {
            let remote: Option<RemoteError> = serde_json::from_str(&body).ok();
            let (code, message) = remote.map(|r| (r.code, r.message)).unwrap_or_default();
            return Err(ApiError::Protocol {
                endpoint,
                status: status.as_u16(),
                code,
                message,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { endpoint, source })
    }
}

#[async_trait]
impl Platform for MaxClient {
    async fn get_bot_info(&self) -> Result<BotInfo, ApiError> {
        self.call("GET /me", self.request(Method::GET, "/me")).await
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &OutboundMessage,
    ) -> Result<MessageAck, ApiError> {
        let request = self
            .request(Method::POST, "/messages")
            .query(&[("chat_id", chat_id)])
            .json(message);
        let response: SendMessageResponse = self.call("POST /messages", request).await?;
        Ok(MessageAck {
            mid: response.message.and_then(|m| m.body).and_then(|b| b.mid),
        })
    }

    async fn answer_callback(&self, callback_id: &str, notification: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/answers")
            .query(&[("callback_id", callback_id)])
            .json(&CallbackAnswer { notification });
        let _: Value = self.call("POST /answers", request).await?;
        Ok(())
    }

    async fn fetch_updates(
        &self,
        marker: Option<Marker>,
        timeout: u32,
        limit: u32,
    ) -> Result<UpdateBatch, ApiError> {
        let mut params = vec![
            ("timeout", timeout.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(marker) = marker {
            params.push(("marker", marker.to_string()));
        }

        let request = self.request(Method::GET, "/updates").query(&params);
        let response: UpdatesResponse = self.call("GET /updates", request).await?;

        Ok(UpdateBatch {
            updates: response
                .updates
                .into_iter()
                .map(Update::from_value)
                .collect(),
            marker: response.marker,
        })
    }
}

//! SessionBridge — one request/response exchange with the remote service per call.
//!
//! No retries, batching, or queueing happen here. Any failure, transport or
//! status, surfaces as a single `BridgeError`; the caller decides what the
//! user sees. A successful exchange whose body is not a JSON object is not a
//! failure: it yields `Ok(None)`.

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::error::BridgeError;

use super::model::SessionReply;

/// How chat parameters are carried on the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatEncoding {
    /// `POST /chat?session_id=..&message=..`
    #[default]
    Query,
    /// `POST /chat` with a JSON body `{session_id, message}`.
    Json,
}

impl std::str::FromStr for ChatEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query" => Ok(Self::Query),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown chat encoding: {other}")),
        }
    }
}

/// Adapter between the local conversation and the remote eligibility service.
#[async_trait]
pub trait SessionBridge: Send + Sync {
    /// Send one utterance, continuing `session_id` when there is one.
    ///
    /// `Ok(None)` means the server answered without a reply payload.
    async fn send(
        &self,
        session_id: Option<&str>,
        message: &str,
    ) -> Result<Option<SessionReply>, BridgeError>;

    /// Fetch the server's current view of a session.
    async fn fetch_session(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionReply>, BridgeError>;
}

/// `reqwest`-backed bridge.
pub struct HttpSessionBridge {
    client: reqwest::Client,
    base_url: String,
    encoding: ChatEncoding,
}

#[derive(serde::Serialize)]
struct ChatBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    message: &'a str,
}

impl HttpSessionBridge {
    pub fn new(config: &AppConfig) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            encoding: config.chat_encoding,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn decode(response: reqwest::Response) -> Result<Option<SessionReply>, BridgeError> {
        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::Status {
                status: status.as_u16(),
            });
        }
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BridgeError::InvalidResponse(e.to_string()))?;
        let reply = SessionReply::from_body(body);
        if reply.is_none() {
            tracing::debug!("Reply body is not an object; nothing to fold in");
        }
        Ok(reply)
    }
}

#[async_trait]
impl SessionBridge for HttpSessionBridge {
    async fn send(
        &self,
        session_id: Option<&str>,
        message: &str,
    ) -> Result<Option<SessionReply>, BridgeError> {
        let body = ChatBody {
            session_id,
            message,
        };
        let request = self.client.post(self.url("chat"));
        let request = match self.encoding {
            ChatEncoding::Query => request.query(&body),
            ChatEncoding::Json => request.json(&body),
        };

        tracing::debug!(session_id = ?session_id, encoding = ?self.encoding, "Sending chat message");
        let response = request.send().await?;
        let reply = Self::decode(response).await?;
        if let Some(reply) = &reply {
            tracing::debug!(
                session_id = ?reply.session_id,
                mode = ?reply.mode,
                schemes = reply.schemes.as_ref().map_or(0, Vec::len),
                "Chat reply received"
            );
        }
        Ok(reply)
    }

    async fn fetch_session(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionReply>, BridgeError> {
        let mut url = reqwest::Url::parse(&self.url("session"))
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| BridgeError::Transport(format!("{} cannot carry a path", self.base_url)))?
            .push(session_id);

        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }
}

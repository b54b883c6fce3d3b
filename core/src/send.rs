use std::future::Future;

use huddle_protocol::SendMessageRequest;
use huddle_protocol::SendMessageResponse;
use tracing::debug;
use tracing::info;

use crate::config::Config;
use crate::error::HuddleErr;
use crate::error::Result;
use crate::error::check_status;
use crate::user_agent::build_http_client;

/// The external send-message interface.
pub trait MessageSender: Send + Sync {
    /// Persist `request` and return the new message id.
    fn send(&self, request: &SendMessageRequest) -> impl Future<Output = Result<String>> + Send;
}

/// Posts messages as JSON to the configured send endpoint.
#[derive(Debug, Clone)]
pub struct HttpMessageSender {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMessageSender {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(build_http_client(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = config
            .send_endpoint
            .as_deref()
            .ok_or(HuddleErr::MissingEndpoint("send"))?;
        Ok(Self::new(endpoint))
    }
}

impl MessageSender for HttpMessageSender {
    async fn send(&self, request: &SendMessageRequest) -> Result<String> {
        debug!(url = %self.endpoint, channel = %request.channel_id, "POST");
        let resp = self.client.post(&self.endpoint).json(request).send().await?;
        let resp = check_status(resp).await?;
        let SendMessageResponse { message_id } = resp.json().await?;
        info!(%message_id, channel = %request.channel_id, "message sent");
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;
    use wiremock::matchers::body_json;
    use wiremock::matchers::method;
    use wiremock::matchers::path;

    fn request() -> SendMessageRequest {
        SendMessageRequest {
            channel_id: "general".to_string(),
            content: "hi @bob".to_string(),
            user_name: "alice".to_string(),
            rich_content: None,
            reply_to_id: None,
            reply_to_content: None,
            reply_to_user_name: None,
        }
    }

    #[tokio::test]
    async fn posts_camel_case_body_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/messages"))
            .and(body_json(json!({
                "channelId": "general",
                "content": "hi @bob",
                "userName": "alice",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "m_42" })))
            .expect(1)
            .mount(&server)
            .await;

        let sender = HttpMessageSender::new(format!("{}/api/messages", server.uri()));
        assert_eq!(sender.send(&request()).await.unwrap(), "m_42");
    }

    #[tokio::test]
    async fn non_success_status_is_a_typed_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
            .mount(&server)
            .await;

        let sender = HttpMessageSender::new(server.uri());
        let err = sender.send(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            HuddleErr::UnexpectedStatus(status, ref body)
                if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR && body == "db down"
        ));
    }
}

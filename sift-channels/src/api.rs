//! Transactional email API channel.
//!
//! Sends the report through a Brevo-compatible HTTP API: one JSON payload
//! carrying the inline body and the artifact as a base64 attachment,
//! authenticated with an `api-key` header. One attempt, bounded timeout.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use sift_common::config::ApiConfig;

use crate::traits::{Artifact, ChannelError, ChannelResult, DeliveryChannel};
use crate::{REPORT_BODY, REPORT_SUBJECT};

/// Send endpoint, relative to the configured API base URL.
const SEND_PATH: &str = "/v3/smtp/email";

/// HTTP timeout for the send call.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Wire Payload
// ============================================================================

#[derive(Debug, Serialize)]
struct SendEmailRequest {
    sender: Sender,
    to: Vec<Recipient>,
    subject: String,
    #[serde(rename = "htmlContent")]
    html_content: String,
    attachment: Vec<AttachmentPayload>,
}

#[derive(Debug, Serialize)]
struct Sender {
    email: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct Recipient {
    email: String,
}

#[derive(Debug, Serialize)]
struct AttachmentPayload {
    /// Base64-encoded file content
    content: String,
    name: String,
}

// ============================================================================
// API Channel
// ============================================================================

/// Email API channel - posts one transactional email per report.
pub struct ApiChannel {
    endpoint: String,
    api_key: String,
    sender_email: String,
    sender_name: String,
    recipient: String,
    client: reqwest::Client,
}

impl ApiChannel {
    /// Create a new API channel from resolved credentials.
    pub fn new(config: &ApiConfig, recipient: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            sender_email: config.sender_email.clone(),
            sender_name: config.sender_name.clone(),
            recipient,
            client,
        }
    }

    fn build_payload(&self, artifact: &Artifact) -> SendEmailRequest {
        SendEmailRequest {
            sender: Sender {
                email: self.sender_email.clone(),
                name: self.sender_name.clone(),
            },
            to: vec![Recipient {
                email: self.recipient.clone(),
            }],
            subject: REPORT_SUBJECT.to_string(),
            html_content: format!("<p>{}</p>", REPORT_BODY),
            attachment: vec![AttachmentPayload {
                content: BASE64.encode(&artifact.bytes),
                name: artifact.file_name.clone(),
            }],
        }
    }
}

#[async_trait]
impl DeliveryChannel for ApiChannel {
    fn name(&self) -> &'static str {
        "email-api"
    }

    async fn send(&self, artifact: &Artifact) -> ChannelResult<()> {
        let url = format!("{}{}", self.endpoint, SEND_PATH);
        let payload = self.build_payload(artifact);

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChannelError::Connection(format!("email API request failed: {e}")))?;

        let status = response.status();
        if !matches!(status.as_u16(), 200 | 201 | 202) {
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed(format!(
                "email API returned HTTP {status}: {body}"
            )));
        }

        info!(
            recipient = %self.recipient,
            attachment = %artifact.file_name,
            "Email API accepted report"
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(endpoint: String) -> ApiConfig {
        ApiConfig {
            api_key: "xkeysib-test".into(),
            sender_email: "bot@example.com".into(),
            sender_name: "Sift Screener".into(),
            endpoint,
        }
    }

    fn test_artifact() -> Artifact {
        Artifact::new("royalty_report.txt", b"Ticker | Proxy".to_vec())
    }

    #[test]
    fn test_payload_shape() {
        let channel = ApiChannel::new(
            &test_config("https://api.example.com".into()),
            "desk@example.com".into(),
        );
        let payload = channel.build_payload(&test_artifact());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["sender"]["email"], "bot@example.com");
        assert_eq!(json["to"][0]["email"], "desk@example.com");
        assert_eq!(json["subject"], REPORT_SUBJECT);
        assert!(json["htmlContent"].as_str().unwrap().contains("attached"));
        assert_eq!(
            json["attachment"][0]["content"],
            BASE64.encode(b"Ticker | Proxy")
        );
        assert_eq!(json["attachment"][0]["name"], "royalty_report.txt");
    }

    #[tokio::test]
    async fn test_send_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/smtp/email"))
            .and(header("api-key", "xkeysib-test"))
            .and(body_partial_json(serde_json::json!({
                "to": [{"email": "desk@example.com"}],
                "subject": REPORT_SUBJECT,
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let channel = ApiChannel::new(&test_config(server.uri()), "desk@example.com".into());
        channel.send(&test_artifact()).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_non_2xx_is_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/smtp/email"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .expect(1)
            .mount(&server)
            .await;

        let channel = ApiChannel::new(&test_config(server.uri()), "desk@example.com".into());
        let err = channel.send(&test_artifact()).await.unwrap_err();

        match err {
            ChannelError::SendFailed(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("unauthorized"));
            }
            other => panic!("Expected SendFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_transport_error_is_connection() {
        // Nothing is listening on this port.
        let config = test_config("http://127.0.0.1:1".into());
        let channel = ApiChannel::new(&config, "desk@example.com".into());
        let err = channel.send(&test_artifact()).await.unwrap_err();
        assert!(matches!(err, ChannelError::Connection(_)));
    }
}

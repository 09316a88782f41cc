//! SMTP delivery channel.
//!
//! The transport mode is derived from the configured port: 465 means TLS
//! from the first byte, any other port means a plaintext connect followed by
//! a STARTTLS upgrade before authentication. Both paths converge on one
//! authenticated session sending a single multipart message with the report
//! attached.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;
use tracing::info;

use sift_common::config::SmtpConfig;

use crate::traits::{Artifact, ChannelError, ChannelResult, DeliveryChannel};
use crate::{REPORT_BODY, REPORT_SUBJECT};

/// Timeout for the SMTP session.
const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Transport Mode
// ============================================================================

/// TLS negotiation mode for the SMTP session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// TLS wrapper from connection start (smtps, port 465)
    Implicit,
    /// Plaintext connect, then STARTTLS upgrade (ports 587, 2525, ...)
    StartTls,
}

impl TlsMode {
    /// Derive the negotiation mode from the configured port.
    pub fn from_port(port: u16) -> Self {
        if port == 465 {
            Self::Implicit
        } else {
            Self::StartTls
        }
    }
}

// ============================================================================
// Transport Seam
// ============================================================================

/// Seam between message construction and the wire protocol, so tests can
/// observe which handshake a channel selects.
pub trait MailTransport: Send + Sync {
    /// Open a session using `mode`, authenticate, send `message`, close.
    fn deliver(&self, mode: TlsMode, message: &Message) -> ChannelResult<()>;
}

/// lettre-backed production transport.
pub struct LettreTransport {
    host: String,
    port: u16,
    username: String,
    password: String,
}

impl LettreTransport {
    /// Create a transport from resolved SMTP credentials.
    pub fn new(config: &SmtpConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

impl MailTransport for LettreTransport {
    fn deliver(&self, mode: TlsMode, message: &Message) -> ChannelResult<()> {
        let builder = match mode {
            TlsMode::Implicit => SmtpTransport::relay(&self.host),
            TlsMode::StartTls => SmtpTransport::starttls_relay(&self.host),
        }
        .map_err(|e| ChannelError::Connection(format!("SMTP setup failed: {e}")))?;

        let creds = Credentials::new(self.username.clone(), self.password.clone());
        let transport = builder
            .port(self.port)
            .credentials(creds)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        transport
            .send(message)
            .map_err(|e| ChannelError::SendFailed(format!("SMTP send failed: {e}")))?;
        Ok(())
    }
}

// ============================================================================
// SMTP Channel
// ============================================================================

/// SMTP channel - one authenticated session per report.
pub struct SmtpChannel<T: MailTransport = LettreTransport> {
    transport: T,
    mode: TlsMode,
    from_address: String,
    recipient: String,
}

impl SmtpChannel<LettreTransport> {
    /// Create a new SMTP channel from resolved credentials. The username is
    /// also used as the from address.
    pub fn new(config: &SmtpConfig, recipient: String) -> Self {
        Self {
            transport: LettreTransport::new(config),
            mode: TlsMode::from_port(config.port),
            from_address: config.username.clone(),
            recipient,
        }
    }
}

impl<T: MailTransport> SmtpChannel<T> {
    /// Create a channel over a custom transport (used by tests).
    pub fn with_transport(transport: T, port: u16, from_address: String, recipient: String) -> Self {
        Self {
            transport,
            mode: TlsMode::from_port(port),
            from_address,
            recipient,
        }
    }

    /// The handshake this channel will use.
    pub fn mode(&self) -> TlsMode {
        self.mode
    }

    fn build_message(&self, artifact: &Artifact) -> ChannelResult<Message> {
        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|e| ChannelError::SendFailed(format!("Invalid from address: {e}")))?;
        let to: Mailbox = self
            .recipient
            .parse()
            .map_err(|e| ChannelError::SendFailed(format!("Invalid recipient: {e}")))?;

        let content_type = ContentType::parse("application/octet-stream")
            .map_err(|e| ChannelError::SendFailed(format!("Invalid attachment type: {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(REPORT_SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(REPORT_BODY.to_string()))
                    .singlepart(
                        Attachment::new(artifact.file_name.clone())
                            .body(artifact.bytes.clone(), content_type),
                    ),
            )
            .map_err(|e| ChannelError::SendFailed(format!("Failed to build email: {e}")))
    }
}

#[async_trait]
impl<T: MailTransport> DeliveryChannel for SmtpChannel<T> {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, artifact: &Artifact) -> ChannelResult<()> {
        let message = self.build_message(artifact)?;
        self.transport.deliver(self.mode, &message)?;

        info!(
            recipient = %self.recipient,
            mode = ?self.mode,
            attachment = %artifact.file_name,
            "SMTP message sent"
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
    use std::sync::Mutex;

    /// Fake transport recording which handshake was requested.
    struct RecordingTransport {
        modes: Mutex<Vec<TlsMode>>,
        fail: bool,
    }

    impl RecordingTransport {
        fn new(fail: bool) -> Self {
            Self {
                modes: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    impl MailTransport for RecordingTransport {
        fn deliver(&self, mode: TlsMode, _message: &Message) -> ChannelResult<()> {
            self.modes.lock().unwrap().push(mode);
            if self.fail {
                Err(ChannelError::Connection("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    fn test_artifact() -> Artifact {
        Artifact::new("royalty_report.txt", b"Ticker | Proxy".to_vec())
    }

    fn test_channel(port: u16, fail: bool) -> SmtpChannel<RecordingTransport> {
        SmtpChannel::with_transport(
            RecordingTransport::new(fail),
            port,
            "bot@example.com".into(),
            "desk@example.com".into(),
        )
    }

    #[test]
    fn test_mode_from_port() {
        assert_eq!(TlsMode::from_port(465), TlsMode::Implicit);
        assert_eq!(TlsMode::from_port(587), TlsMode::StartTls);
        assert_eq!(TlsMode::from_port(2525), TlsMode::StartTls);
        assert_eq!(TlsMode::from_port(25), TlsMode::StartTls);
    }

    #[tokio::test]
    async fn test_port_465_uses_implicit_tls() {
        let channel = test_channel(465, false);
        channel.send(&test_artifact()).await.unwrap();

        let modes = channel.transport.modes.lock().unwrap();
        assert_eq!(modes.as_slice(), &[TlsMode::Implicit]);
    }

    #[tokio::test]
    async fn test_port_587_uses_starttls() {
        let channel = test_channel(587, false);
        channel.send(&test_artifact()).await.unwrap();

        let modes = channel.transport.modes.lock().unwrap();
        assert_eq!(modes.as_slice(), &[TlsMode::StartTls]);
    }

    #[tokio::test]
    async fn test_single_attempt_per_send() {
        let channel = test_channel(587, true);
        let err = channel.send(&test_artifact()).await.unwrap_err();
        assert!(matches!(err, ChannelError::Connection(_)));

        // The channel never retries on its own.
        assert_eq!(channel.transport.modes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_recipient_fails_before_transport() {
        let channel = SmtpChannel::with_transport(
            RecordingTransport::new(false),
            465,
            "bot@example.com".into(),
            "not an address".into(),
        );
        let err = channel.send(&test_artifact()).await.unwrap_err();
        assert!(matches!(err, ChannelError::SendFailed(_)));
        assert!(channel.transport.modes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_build_message_contains_subject() {
        let channel = test_channel(465, false);
        let message = channel.build_message(&test_artifact()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains(REPORT_SUBJECT));
        assert!(raw.contains("royalty_report.txt"));
    }
}

//! Delivery channel traits and shared types.

use async_trait::async_trait;

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Channel error type.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Delivery not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Message send failed: {0}")]
    SendFailed(String),
}

/// A rendered report ready for delivery.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// File name presented to the recipient
    pub file_name: String,
    /// Raw artifact bytes
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Create an artifact from in-memory bytes.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Delivery channel adapter trait.
///
/// Implement this trait to add support for a new delivery channel. A channel
/// makes exactly one transmission attempt per `send` call; retry and
/// fallback policy live in the router.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Get the channel name.
    fn name(&self) -> &'static str;

    /// Send the artifact to the configured recipient.
    async fn send(&self, artifact: &Artifact) -> ChannelResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_new() {
        let artifact = Artifact::new("report.txt", b"hello".to_vec());
        assert_eq!(artifact.file_name, "report.txt");
        assert_eq!(artifact.bytes, b"hello");
    }

    #[test]
    fn test_error_display() {
        let err = ChannelError::NotConfigured("no recipient".into());
        assert!(err.to_string().contains("no recipient"));

        let err = ChannelError::SendFailed("HTTP 500".into());
        assert!(err.to_string().contains("HTTP 500"));
    }
}

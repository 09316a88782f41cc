//! Delivery routing with strict channel priority.
//!
//! Channels are attempted in configuration priority order (email API first,
//! then SMTP) until one reports success or the list is exhausted. One
//! attempt per channel per invocation, no retries anywhere.

use std::sync::Arc;
use tracing::{info, warn};

use sift_common::config::DeliveryConfig;

use crate::api::ApiChannel;
use crate::smtp::SmtpChannel;
use crate::traits::{Artifact, ChannelError, ChannelResult, DeliveryChannel};

/// Routes a rendered report to the first working delivery channel.
pub struct DeliveryRouter {
    /// Channels in priority order
    channels: Vec<Arc<dyn DeliveryChannel>>,
}

impl DeliveryRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Append a channel at the lowest priority.
    pub fn with_channel(mut self, channel: Arc<dyn DeliveryChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    /// Build the channel list from resolved credentials.
    ///
    /// A channel is registered only when its credential block is complete
    /// and a recipient is configured.
    pub fn from_config(delivery: &DeliveryConfig) -> Self {
        let mut router = Self::new();

        let Some(recipient) = delivery.recipient.as_ref().filter(|r| !r.is_empty()) else {
            return router;
        };

        if let Some(api) = delivery.api.as_ref().filter(|a| a.is_complete()) {
            router = router.with_channel(Arc::new(ApiChannel::new(api, recipient.clone())));
        }

        if let Some(smtp) = delivery.smtp.as_ref().filter(|s| s.is_complete()) {
            router = router.with_channel(Arc::new(SmtpChannel::new(smtp, recipient.clone())));
        }

        router
    }

    /// Whether at least one channel is configured.
    pub fn is_configured(&self) -> bool {
        !self.channels.is_empty()
    }

    /// Registered channel names in priority order.
    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Attempt delivery, returning the name of the channel that succeeded.
    ///
    /// Failures are logged and the next channel is tried; the error of the
    /// last channel surfaces when every attempt fails.
    pub async fn deliver(&self, artifact: &Artifact) -> ChannelResult<&'static str> {
        if self.channels.is_empty() {
            return Err(ChannelError::NotConfigured(
                "no delivery channel configured; set a recipient plus API or SMTP credentials"
                    .into(),
            ));
        }

        let mut last_error = None;

        for channel in &self.channels {
            info!(channel = channel.name(), "Attempting report delivery");

            match channel.send(artifact).await {
                Ok(()) => {
                    info!(channel = channel.name(), "Report delivered");
                    return Ok(channel.name());
                }
                Err(e) => {
                    warn!(
                        channel = channel.name(),
                        error = %e,
                        "Delivery channel failed, falling back to next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ChannelError::SendFailed("all delivery channels failed".into())))
    }
}

impl Default for DeliveryRouter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

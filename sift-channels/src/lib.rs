//! Sift Channels - delivery channel adapters for the Sift screener.
//!
//! This crate provides adapters for shipping the rendered report:
//! - Email API (Brevo-compatible HTTP endpoint)
//! - SMTP (implicit TLS or STARTTLS, derived from the port)
//!
//! The [`DeliveryRouter`] tries channels in strict priority order with one
//! attempt each; a delivery failure never terminates the screening run.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod api;
pub mod router;
pub mod smtp;
pub mod traits;

// Re-export commonly used types
pub use api::ApiChannel;
pub use router::DeliveryRouter;
pub use smtp::{LettreTransport, MailTransport, SmtpChannel, TlsMode};
pub use traits::{Artifact, ChannelError, ChannelResult, DeliveryChannel};

/// Subject line for the daily report email.
pub const REPORT_SUBJECT: &str = "Daily Royalty Screener Report";

/// Plain-text body accompanying the attachment.
pub const REPORT_BODY: &str = "Daily report attached (corr, beta, z, price).";

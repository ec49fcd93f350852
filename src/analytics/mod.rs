//! Reporting checked answers to the interaction-recording endpoint.
//!
//! Delivery is best-effort: failures are logged and recorded, never surfaced
//! to the quiz flow.

mod emitter;
mod http;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::AuthError;
use crate::protocol::InteractionRecord;

pub use emitter::{Delivery, Emitter};
pub use http::HttpSink;
pub use memory::MemorySink;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalyticsError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("interaction request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("interaction endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("no async runtime available to deliver interaction")]
    NoRuntime,
    #[error("interaction rejected: {0}")]
    Rejected(String),
}

/// Destination for interaction records.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record_interaction(&self, record: &InteractionRecord) -> Result<(), AnalyticsError>;
}

//! Transport error types.
//!
//! A `GatewayError` means the round trip itself did not complete. The cascade
//! treats it exactly like a rejected acknowledgment; the distinction only
//! matters for logging.

use std::time::Duration;

use thiserror::Error;

/// A failed mutation round trip.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The mutation could not be encoded as JSON.
    #[error("failed to encode {function} message: {source}")]
    Encode {
        function: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The consumer side of the outbound channel is gone.
    #[error("outbound channel closed")]
    ChannelClosed,

    /// The consumer dropped the reply handle without acknowledging.
    #[error("acknowledgment dropped before a reply was sent")]
    ReplyDropped,

    /// No acknowledgment arrived within the configured timeout.
    #[error("no acknowledgment within {0:?}")]
    Timeout(Duration),
}

impl GatewayError {
    /// Returns true if the message may have reached the persistence tier.
    ///
    /// A timeout or dropped reply happens after the request was handed off,
    /// so the write may or may not have been applied.
    pub fn may_have_applied(&self) -> bool {
        matches!(self, GatewayError::Timeout(_) | GatewayError::ReplyDropped)
    }
}

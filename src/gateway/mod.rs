//! Messaging transport for mutation requests.
//!
//! This module provides the `MutationGateway` implementation used by the
//! binary: requests travel over an in-process channel to whichever consumer
//! owns the receiving end, and each request carries its own reply handle.

mod channel;
mod error;

pub use channel::{ChannelGateway, OutboundMessage, channel};
pub use error::GatewayError;

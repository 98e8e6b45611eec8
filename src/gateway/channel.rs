//! Channel-backed mutation gateway.
//!
//! `ChannelGateway` publishes each mutation on a `tokio::sync::mpsc` channel
//! together with a `oneshot` reply handle, then waits for the consumer (a
//! broker bridge or the in-memory store) to acknowledge it.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::effects::{Acknowledgment, MutationEffect, MutationGateway};
use crate::types::SessionId;

use super::error::GatewayError;

/// One request on the outbound channel.
#[derive(Debug)]
pub struct OutboundMessage {
    /// Queue the request is addressed to.
    pub queue: String,

    /// Encoded request body (`message`, `function`, `runtime_session_id`).
    pub body: Value,

    reply: oneshot::Sender<Acknowledgment>,
}

impl OutboundMessage {
    /// Sends the acknowledgment back to the waiting gateway.
    ///
    /// Returns false if the gateway stopped waiting (e.g. timed out).
    pub fn acknowledge(self, ack: Acknowledgment) -> bool {
        self.reply.send(ack).is_ok()
    }
}

/// A mutation gateway over an in-process channel.
#[derive(Debug, Clone)]
pub struct ChannelGateway {
    tx: mpsc::Sender<OutboundMessage>,
    queue: String,
    ack_timeout: Option<Duration>,
}

/// Creates a gateway and the receiving end its requests arrive on.
pub fn channel(config: &Config) -> (ChannelGateway, mpsc::Receiver<OutboundMessage>) {
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let gateway = ChannelGateway {
        tx,
        queue: config.queue_to_sql.clone(),
        ack_timeout: config.ack_timeout,
    };
    (gateway, rx)
}

impl ChannelGateway {
    /// Returns the queue this gateway publishes to.
    pub fn queue(&self) -> &str {
        &self.queue
    }

    async fn await_reply(
        &self,
        rx: oneshot::Receiver<Acknowledgment>,
    ) -> Result<Acknowledgment, GatewayError> {
        match self.ack_timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(reply) => reply.map_err(|_| GatewayError::ReplyDropped),
                Err(_) => Err(GatewayError::Timeout(limit)),
            },
            None => rx.await.map_err(|_| GatewayError::ReplyDropped),
        }
    }
}

impl MutationGateway for ChannelGateway {
    type Error = GatewayError;

    async fn mutate(
        &self,
        effect: &MutationEffect,
        session: &SessionId,
    ) -> Result<Acknowledgment, Self::Error> {
        let function = effect.function_tag();
        let body = effect
            .to_message(session)
            .map_err(|source| GatewayError::Encode { function, source })?;

        let (reply, rx) = oneshot::channel();
        let message = OutboundMessage {
            queue: self.queue.clone(),
            body,
            reply,
        };

        trace!(queue = %self.queue, function, %session, "Publishing mutation");
        self.tx
            .send(message)
            .await
            .map_err(|_| GatewayError::ChannelClosed)?;

        let ack = self.await_reply(rx).await.inspect_err(|e| {
            if e.may_have_applied() {
                warn!(
                    function,
                    %session,
                    error = %e,
                    "Mutation may have been applied without acknowledgment"
                );
            }
        })?;
        debug!(function, %session, ack = %ack.0, "Received acknowledgment");
        Ok(ack)
    }
}

//! Mutations-as-data for the persistence tier.
//!
//! A `MutationEffect` describes one row write without executing it. This enables:
//! - Cascade logic that is independent of the messaging transport
//! - Testability via mock gateways that record what was sent
//! - Logging/tracing of intended writes
//!
//! Gateways that execute these effects live in `crate::gateway`.

use serde::Serialize;

use crate::types::{CampaignRecord, EntityKind, GameRecord, HeaderRecord, SessionId};

pub mod ack;
pub mod interpreter;

pub use ack::{AckOutcome, Acknowledgment, RejectReason};
pub use interpreter::{EntityReader, MutationGateway};

/// A single row write destined for the persistence tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEffect {
    /// Write an `EventHeader` row.
    Header(HeaderRecord),
    /// Write an `EventCampaign` row.
    Campaign(CampaignRecord),
    /// Write an `EventGame` row.
    Game(GameRecord),
}

/// Wire shape of a mutation request.
#[derive(Serialize)]
struct OutboundMutation<'a, T: Serialize> {
    message: &'a T,
    function: &'static str,
    runtime_session_id: &'a SessionId,
}

impl MutationEffect {
    pub fn kind(&self) -> EntityKind {
        match self {
            MutationEffect::Header(_) => EntityKind::Header,
            MutationEffect::Campaign(_) => EntityKind::Campaign,
            MutationEffect::Game(_) => EntityKind::Game,
        }
    }

    /// The `function` tag for this effect.
    pub fn function_tag(&self) -> &'static str {
        self.kind().function_tag()
    }

    /// Encodes the request body sent to the persistence tier:
    /// `{ "message": <record>, "function": <tag>, "runtime_session_id": <session> }`.
    pub fn to_message(&self, session: &SessionId) -> Result<serde_json::Value, serde_json::Error> {
        let function = self.function_tag();
        match self {
            MutationEffect::Header(record) => serde_json::to_value(OutboundMutation {
                message: record,
                function,
                runtime_session_id: session,
            }),
            MutationEffect::Campaign(record) => serde_json::to_value(OutboundMutation {
                message: record,
                function,
                runtime_session_id: session,
            }),
            MutationEffect::Game(record) => serde_json::to_value(OutboundMutation {
                message: record,
                function,
                runtime_session_id: session,
            }),
        }
    }

    /// Decodes a request body produced by [`MutationEffect::to_message`].
    ///
    /// Returns the effect and its session, or `None` if the body is not a
    /// recognised mutation.
    pub fn from_message(body: &serde_json::Value) -> Option<(Self, SessionId)> {
        let kind = EntityKind::from_function_tag(body.get("function")?.as_str()?)?;
        let message = body.get("message")?.clone();
        let session = body
            .get("runtime_session_id")
            .and_then(|s| s.as_str())
            .map(SessionId::from)
            .unwrap_or_default();

        let effect = match kind {
            EntityKind::Header => MutationEffect::Header(serde_json::from_value(message).ok()?),
            EntityKind::Campaign => {
                MutationEffect::Campaign(serde_json::from_value(message).ok()?)
            }
            EntityKind::Game => MutationEffect::Game(serde_json::from_value(message).ok()?),
        };
        Some((effect, session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CampaignId, DeletionFlag, EventId, GameId};
    use serde_json::json;

    #[test]
    fn header_message_shape() {
        let effect = MutationEffect::Header(HeaderRecord::new(EventId(5), DeletionFlag::Deleted));
        let body = effect.to_message(&SessionId::new("s-1")).unwrap();
        assert_eq!(
            body,
            json!({
                "message": {"Event": 5, "IsMarkedForDeletion": true},
                "function": "EventHeader",
                "runtime_session_id": "s-1"
            })
        );
    }

    #[test]
    fn child_messages_carry_their_function_tag() {
        let session = SessionId::new("s-2");
        let campaign = MutationEffect::Campaign(CampaignRecord::new(
            EventId(1),
            CampaignId(2),
            DeletionFlag::Restored,
        ));
        let game = MutationEffect::Game(GameRecord::new(EventId(1), GameId(9), DeletionFlag::Deleted));

        assert_eq!(campaign.to_message(&session).unwrap()["function"], "EventCampaign");
        assert_eq!(game.to_message(&session).unwrap()["function"], "EventGame");
        assert_eq!(game.to_message(&session).unwrap()["message"]["Game"], 9);
    }

    #[test]
    fn decodes_what_it_encodes() {
        let session = SessionId::new("s-3");
        let effect = MutationEffect::Game(GameRecord::new(EventId(4), GameId(8), DeletionFlag::Restored));
        let body = effect.to_message(&session).unwrap();
        assert_eq!(MutationEffect::from_message(&body), Some((effect, session)));
    }

    #[test]
    fn rejects_unknown_function() {
        let body = json!({"message": {"Event": 1}, "function": "EventItem", "runtime_session_id": "x"});
        assert_eq!(MutationEffect::from_message(&body), None);
    }
}

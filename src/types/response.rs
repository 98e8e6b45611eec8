//! Outbound response envelope.

use serde::{Deserialize, Serialize};

use super::ids::SessionId;
use super::records::{CampaignRecord, EntityKind, GameRecord, HeaderRecord};

/// Records that were successfully mutated, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletesMessage {
    #[serde(rename = "Header")]
    pub header: Option<HeaderRecord>,

    #[serde(rename = "Campaign", default)]
    pub campaigns: Vec<CampaignRecord>,

    #[serde(rename = "Game", default)]
    pub games: Vec<GameRecord>,
}

impl DeletesMessage {
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.campaigns.is_empty() && self.games.is_empty()
    }
}

/// The response handed to the output serialiser.
///
/// Request metadata is echoed back so the caller can correlate the reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub connection_key: String,
    pub runtime_session_id: SessionId,
    pub business_partner: Option<i64>,
    pub service_label: String,
    pub api_type: String,
    pub api_schema: String,
    pub accepter: Vec<EntityKind>,

    /// `Some(false)` once any mutation was reported as failed; `None` otherwise.
    pub sql_update_result: Option<bool>,

    /// Cause of the first reported failure, empty when there was none.
    pub sql_update_error: String,

    pub message: DeletesMessage,
}

impl ResponseEnvelope {
    /// True when no failure was reported.
    pub fn succeeded(&self) -> bool {
        self.sql_update_result != Some(false)
    }
}

//! Inbound deletion request.

use serde::{Deserialize, Serialize};

use super::flag::DeletionFlag;
use super::ids::{CampaignId, EventId, GameId, SessionId};
use super::records::{CampaignRecord, EntityKind, GameRecord};

/// The only operation type this service handles.
pub const DELETES_API_TYPE: &str = "deletes";

/// Top-level operation requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiType {
    Deletes,
}

impl ApiType {
    /// Parses the request's `api_type` string. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            DELETES_API_TYPE => Some(ApiType::Deletes),
            _ => None,
        }
    }
}

/// A decoded deletion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub connection_key: String,

    #[serde(default)]
    pub runtime_session_id: SessionId,

    #[serde(default)]
    pub business_partner: Option<i64>,

    #[serde(default)]
    pub service_label: String,

    pub api_type: String,

    #[serde(default)]
    pub api_schema: String,

    /// Entity kinds to process, in order. Not deduplicated.
    #[serde(default)]
    pub accepter: Vec<EntityKind>,

    #[serde(rename = "Header")]
    pub header: HeaderInput,
}

/// The header section of a request, carrying the child lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInput {
    #[serde(rename = "Event")]
    pub event: EventId,

    #[serde(rename = "IsMarkedForDeletion", default)]
    pub is_marked_for_deletion: DeletionFlag,

    #[serde(rename = "Campaign", default)]
    pub campaigns: Vec<CampaignInput>,

    #[serde(rename = "Game", default)]
    pub games: Vec<GameInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignInput {
    #[serde(rename = "Campaign")]
    pub campaign: CampaignId,

    #[serde(rename = "IsMarkedForDeletion", default)]
    pub is_marked_for_deletion: DeletionFlag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInput {
    #[serde(rename = "Game")]
    pub game: GameId,

    #[serde(rename = "IsMarkedForDeletion", default)]
    pub is_marked_for_deletion: DeletionFlag,
}

impl HeaderInput {
    pub fn new(event: EventId, is_marked_for_deletion: DeletionFlag) -> Self {
        HeaderInput {
            event,
            is_marked_for_deletion,
            campaigns: Vec::new(),
            games: Vec::new(),
        }
    }

    /// Builds the minimal campaign rows to send: event, campaign and flag only.
    pub fn campaign_records(&self) -> Vec<CampaignRecord> {
        self.campaigns
            .iter()
            .map(|c| CampaignRecord::new(self.event, c.campaign, c.is_marked_for_deletion))
            .collect()
    }

    /// Builds the minimal game rows to send.
    pub fn game_records(&self) -> Vec<GameRecord> {
        self.games
            .iter()
            .map(|g| GameRecord::new(self.event, g.game, g.is_marked_for_deletion))
            .collect()
    }
}

impl DeleteRequest {
    /// Creates a `deletes` request for one event with no kinds selected.
    pub fn deletes(session: impl Into<SessionId>, header: HeaderInput) -> Self {
        DeleteRequest {
            connection_key: String::new(),
            runtime_session_id: session.into(),
            business_partner: None,
            service_label: String::new(),
            api_type: DELETES_API_TYPE.to_string(),
            api_schema: String::new(),
            accepter: Vec::new(),
            header,
        }
    }

    pub fn with_accepter(mut self, kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        self.accepter = kinds.into_iter().collect();
        self
    }

    pub fn api_type(&self) -> Option<ApiType> {
        ApiType::parse(&self.api_type)
    }
}

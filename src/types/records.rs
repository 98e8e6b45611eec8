//! Entity records exchanged with the persistence tier.
//!
//! Field names follow the persistence tier's column naming (`Event`,
//! `IsMarkedForDeletion`, ...) so a record serialises directly into the
//! `message` field of a mutation request.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::flag::DeletionFlag;
use super::ids::{CampaignId, EventId, GameId};

/// The kinds of entity a request can ask to be processed.
///
/// The set is closed: dispatch matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Header,
    Campaign,
    Game,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Header, EntityKind::Campaign, EntityKind::Game];

    /// The `function` tag the persistence tier routes mutations on.
    pub fn function_tag(&self) -> &'static str {
        match self {
            EntityKind::Header => "EventHeader",
            EntityKind::Campaign => "EventCampaign",
            EntityKind::Game => "EventGame",
        }
    }

    /// Parses a `function` tag back into a kind.
    pub fn from_function_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.function_tag() == tag)
    }

    /// Human-readable cause reported when a mutation of this kind is rejected.
    pub fn failure_message(&self) -> &'static str {
        match self {
            EntityKind::Header => "Header Data cannot delete",
            EntityKind::Campaign => "Event Campaign Data cannot delete",
            EntityKind::Game => "Event Game Data cannot delete",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Header => write!(f, "Header"),
            EntityKind::Campaign => write!(f, "Campaign"),
            EntityKind::Game => write!(f, "Game"),
        }
    }
}

/// An event header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRecord {
    #[serde(rename = "Event")]
    pub event: EventId,

    #[serde(rename = "IsMarkedForDeletion", default)]
    pub is_marked_for_deletion: DeletionFlag,
}

impl HeaderRecord {
    pub fn new(event: EventId, is_marked_for_deletion: DeletionFlag) -> Self {
        HeaderRecord {
            event,
            is_marked_for_deletion,
        }
    }
}

/// A campaign row belonging to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRecord {
    #[serde(rename = "Event")]
    pub event: EventId,

    #[serde(rename = "Campaign")]
    pub campaign: CampaignId,

    #[serde(rename = "IsMarkedForDeletion", default)]
    pub is_marked_for_deletion: DeletionFlag,
}

impl CampaignRecord {
    pub fn new(event: EventId, campaign: CampaignId, is_marked_for_deletion: DeletionFlag) -> Self {
        CampaignRecord {
            event,
            campaign,
            is_marked_for_deletion,
        }
    }
}

/// A game row belonging to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(rename = "Event")]
    pub event: EventId,

    #[serde(rename = "Game")]
    pub game: GameId,

    #[serde(rename = "IsMarkedForDeletion", default)]
    pub is_marked_for_deletion: DeletionFlag,
}

impl GameRecord {
    pub fn new(event: EventId, game: GameId, is_marked_for_deletion: DeletionFlag) -> Self {
        GameRecord {
            event,
            game,
            is_marked_for_deletion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_tags_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_function_tag(kind.function_tag()), Some(kind));
        }
        assert_eq!(EntityKind::from_function_tag("EventItem"), None);
    }

    #[test]
    fn failure_messages_match_persistence_wording() {
        assert_eq!(
            EntityKind::Header.failure_message(),
            "Header Data cannot delete"
        );
        assert_eq!(
            EntityKind::Campaign.failure_message(),
            "Event Campaign Data cannot delete"
        );
        assert_eq!(
            EntityKind::Game.failure_message(),
            "Event Game Data cannot delete"
        );
    }

    #[test]
    fn campaign_record_uses_column_names() {
        let record = CampaignRecord::new(EventId(1), CampaignId(2), DeletionFlag::Deleted);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Event": 1, "Campaign": 2, "IsMarkedForDeletion": true})
        );
    }

    #[test]
    fn entity_kind_deserializes_from_accepter_strings() {
        let kinds: Vec<EntityKind> =
            serde_json::from_str(r#"["Header", "Campaign", "Game"]"#).unwrap();
        assert_eq!(kinds, EntityKind::ALL.to_vec());
    }
}

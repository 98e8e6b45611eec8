//! Core domain types for the event deletion service.
//!
//! This module contains the identifiers, records, request and response shapes
//! used throughout the crate.

pub mod flag;
pub mod ids;
pub mod records;
pub mod request;
pub mod response;

// Re-export commonly used types at the module level
pub use flag::DeletionFlag;
pub use ids::{CampaignId, EventId, GameId, SessionId};
pub use records::{CampaignRecord, EntityKind, GameRecord, HeaderRecord};
pub use request::{ApiType, CampaignInput, DELETES_API_TYPE, DeleteRequest, GameInput, HeaderInput};
pub use response::{DeletesMessage, ResponseEnvelope};

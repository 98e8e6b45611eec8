//! In-memory persistence tier.
//!
//! `MemoryStore` plays the role of the SQL writer on the other side of the
//! mutation channel: it answers reads directly and applies mutation requests
//! received from a [`ChannelGateway`](crate::gateway::ChannelGateway),
//! acknowledging each one.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::effects::{Acknowledgment, EntityReader, MutationEffect};
use crate::gateway::OutboundMessage;
use crate::types::{
    CampaignId, CampaignRecord, EventId, GameId, GameRecord, HeaderRecord, SessionId,
};

/// Errors loading a store snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialisable contents of a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(rename = "Header", default)]
    pub headers: Vec<HeaderRecord>,

    #[serde(rename = "Campaign", default)]
    pub campaigns: Vec<CampaignRecord>,

    #[serde(rename = "Game", default)]
    pub games: Vec<GameRecord>,
}

impl StoreSnapshot {
    /// Loads a snapshot from a JSON file.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Debug, Default)]
struct Tables {
    headers: BTreeMap<EventId, HeaderRecord>,
    campaigns: BTreeMap<(EventId, CampaignId), CampaignRecord>,
    games: BTreeMap<(EventId, GameId), GameRecord>,
}

/// A mutation the store applied, kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMutation {
    pub effect: MutationEffect,
    pub session: SessionId,
}

/// An in-memory event store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    applied: RwLock<Vec<AppliedMutation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `snapshot`.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut tables = Tables::default();
        for header in snapshot.headers {
            tables.headers.insert(header.event, header);
        }
        for campaign in snapshot.campaigns {
            tables
                .campaigns
                .insert((campaign.event, campaign.campaign), campaign);
        }
        for game in snapshot.games {
            tables.games.insert((game.event, game.game), game);
        }
        MemoryStore {
            tables: RwLock::new(tables),
            applied: RwLock::new(Vec::new()),
        }
    }

    /// Returns the current contents.
    pub async fn snapshot(&self) -> StoreSnapshot {
        let tables = self.tables.read().await;
        StoreSnapshot {
            headers: tables.headers.values().cloned().collect(),
            campaigns: tables.campaigns.values().cloned().collect(),
            games: tables.games.values().cloned().collect(),
        }
    }

    /// Returns every mutation applied so far, in arrival order.
    pub async fn applied(&self) -> Vec<AppliedMutation> {
        self.applied.read().await.clone()
    }

    /// Applies one mutation. Returns false if the target row does not exist.
    ///
    /// Writes only touch the deletion flag; an `Unset` flag leaves the row as is.
    pub async fn apply(&self, effect: &MutationEffect, session: &SessionId) -> bool {
        let mut tables = self.tables.write().await;
        let applied = match effect {
            MutationEffect::Header(record) => match tables.headers.get_mut(&record.event) {
                Some(row) => {
                    if record.is_marked_for_deletion.is_set() {
                        row.is_marked_for_deletion = record.is_marked_for_deletion;
                    }
                    true
                }
                None => false,
            },
            MutationEffect::Campaign(record) => {
                match tables.campaigns.get_mut(&(record.event, record.campaign)) {
                    Some(row) => {
                        if record.is_marked_for_deletion.is_set() {
                            row.is_marked_for_deletion = record.is_marked_for_deletion;
                        }
                        true
                    }
                    None => false,
                }
            }
            MutationEffect::Game(record) => {
                match tables.games.get_mut(&(record.event, record.game)) {
                    Some(row) => {
                        if record.is_marked_for_deletion.is_set() {
                            row.is_marked_for_deletion = record.is_marked_for_deletion;
                        }
                        true
                    }
                    None => false,
                }
            }
        };
        drop(tables);

        if applied {
            self.applied.write().await.push(AppliedMutation {
                effect: effect.clone(),
                session: session.clone(),
            });
        }
        applied
    }

    /// Consumes mutation requests until the channel closes or `cancel` fires.
    ///
    /// Each request is acknowledged with `{"result": "success"}` when applied
    /// and `{"result": "failure"}` when malformed or aimed at a missing row.
    pub async fn serve(&self, mut rx: mpsc::Receiver<OutboundMessage>, cancel: CancellationToken) {
        info!("Memory store consuming mutation requests");
        loop {
            let message = tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("Memory store shutting down");
                    break;
                }
                message = rx.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };

            let ack = match MutationEffect::from_message(&message.body) {
                Some((effect, session)) => {
                    if self.apply(&effect, &session).await {
                        Acknowledgment::success()
                    } else {
                        warn!(function = effect.function_tag(), "Mutation targets a missing row");
                        Acknowledgment::failure()
                    }
                }
                None => {
                    warn!(body = %message.body, "Malformed mutation request");
                    Acknowledgment::failure()
                }
            };

            if !message.acknowledge(ack) {
                debug!("Sender stopped waiting for acknowledgment");
            }
        }
    }
}

impl EntityReader for MemoryStore {
    type Error = std::convert::Infallible;

    async fn read_header(&self, event: EventId) -> Result<Option<HeaderRecord>, Self::Error> {
        Ok(self.tables.read().await.headers.get(&event).cloned())
    }

    async fn read_campaigns(&self, event: EventId) -> Result<Vec<CampaignRecord>, Self::Error> {
        let tables = self.tables.read().await;
        Ok(tables
            .campaigns
            .range((event, CampaignId(i64::MIN))..=(event, CampaignId(i64::MAX)))
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn read_games(&self, event: EventId) -> Result<Vec<GameRecord>, Self::Error> {
        let tables = self.tables.read().await;
        Ok(tables
            .games
            .range((event, GameId(i64::MIN))..=(event, GameId(i64::MAX)))
            .map(|(_, row)| row.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::effects::MutationGateway;
    use crate::gateway::channel;
    use crate::types::DeletionFlag;
    use std::io::Write;

    fn seeded() -> MemoryStore {
        MemoryStore::from_snapshot(StoreSnapshot {
            headers: vec![
                HeaderRecord::new(EventId(1), DeletionFlag::Restored),
                HeaderRecord::new(EventId(2), DeletionFlag::Restored),
            ],
            campaigns: vec![
                CampaignRecord::new(EventId(1), CampaignId(10), DeletionFlag::Restored),
                CampaignRecord::new(EventId(1), CampaignId(11), DeletionFlag::Restored),
                CampaignRecord::new(EventId(2), CampaignId(10), DeletionFlag::Restored),
            ],
            games: vec![GameRecord::new(EventId(1), GameId(5), DeletionFlag::Restored)],
        })
    }

    #[tokio::test]
    async fn reads_are_scoped_to_the_event() {
        let store = seeded();
        assert_eq!(store.read_campaigns(EventId(1)).await.unwrap().len(), 2);
        assert_eq!(store.read_campaigns(EventId(2)).await.unwrap().len(), 1);
        assert_eq!(store.read_games(EventId(2)).await.unwrap(), vec![]);
        assert_eq!(store.read_header(EventId(3)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn apply_updates_only_existing_rows() {
        let store = seeded();
        let session = SessionId::new("s");

        let hit = MutationEffect::Game(GameRecord::new(EventId(1), GameId(5), DeletionFlag::Deleted));
        assert!(store.apply(&hit, &session).await);
        assert_eq!(
            store.read_games(EventId(1)).await.unwrap()[0].is_marked_for_deletion,
            DeletionFlag::Deleted
        );

        let miss = MutationEffect::Game(GameRecord::new(EventId(1), GameId(6), DeletionFlag::Deleted));
        assert!(!store.apply(&miss, &session).await);
        assert_eq!(store.applied().await.len(), 1);
    }

    #[tokio::test]
    async fn serve_acknowledges_over_the_channel() {
        let store = std::sync::Arc::new(seeded());
        let (gateway, rx) = channel(&Config::new());
        let cancel = CancellationToken::new();

        let server = {
            let store = store.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { store.serve(rx, cancel).await })
        };

        let session = SessionId::new("sess");
        let ok = gateway
            .mutate(
                &MutationEffect::Header(HeaderRecord::new(EventId(2), DeletionFlag::Deleted)),
                &session,
            )
            .await
            .unwrap();
        assert!(ok.is_success());

        let missing = gateway
            .mutate(
                &MutationEffect::Header(HeaderRecord::new(EventId(9), DeletionFlag::Deleted)),
                &session,
            )
            .await
            .unwrap();
        assert!(!missing.is_success());

        cancel.cancel();
        server.await.unwrap();

        let applied = store.applied().await;
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].session, session);
    }

    #[tokio::test]
    async fn loads_snapshot_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"Header": [{{"Event": 4, "IsMarkedForDeletion": false}}],
                "Campaign": [{{"Event": 4, "Campaign": 1, "IsMarkedForDeletion": null}}]}}"#
        )
        .unwrap();

        let snapshot = StoreSnapshot::load(file.path()).await.unwrap();
        assert_eq!(snapshot.headers.len(), 1);
        assert_eq!(snapshot.campaigns[0].is_marked_for_deletion, DeletionFlag::Unset);
        assert!(snapshot.games.is_empty());
    }
}

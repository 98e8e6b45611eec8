//! Shared test utilities: recording mocks and arbitrary generators for
//! property-based testing.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;

use proptest::prelude::*;
use serde_json::Value;
use thiserror::Error;

use crate::effects::{Acknowledgment, EntityReader, MutationEffect, MutationGateway};
use crate::types::{
    CampaignId, CampaignRecord, DeletionFlag, EntityKind, EventId, GameId, GameRecord,
    HeaderRecord, SessionId,
};

// ─── Mock gateway ───

/// Transport error produced by [`MockGateway`].
#[derive(Debug, Error)]
#[error("mock transport failure on call {0}")]
pub struct MockTransportError(pub usize);

/// A scripted failure for one gateway call.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Reply with this acknowledgment body.
    Ack(Value),
    /// Fail the round trip.
    Transport,
}

/// A mutation the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMutation {
    pub effect: MutationEffect,
    pub session: SessionId,
}

/// Gateway that records every call and acknowledges success unless scripted
/// otherwise.
#[derive(Debug, Default)]
pub struct MockGateway {
    sent: Mutex<Vec<SentMutation>>,
    by_call: HashMap<usize, MockFailure>,
    by_kind: HashMap<EntityKind, MockFailure>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `index`-th call (0-based).
    pub fn fail_call(mut self, index: usize, failure: MockFailure) -> Self {
        self.by_call.insert(index, failure);
        self
    }

    /// Fails every call for `kind`.
    pub fn fail_kind(mut self, kind: EntityKind, failure: MockFailure) -> Self {
        self.by_kind.insert(kind, failure);
        self
    }

    pub fn sent(&self) -> Vec<SentMutation> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_effects(&self) -> Vec<MutationEffect> {
        self.sent().into_iter().map(|m| m.effect).collect()
    }

    /// Number of calls made for `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.sent()
            .iter()
            .filter(|m| m.effect.kind() == kind)
            .count()
    }

    /// Header writes, in order.
    pub fn headers_sent(&self) -> Vec<HeaderRecord> {
        self.sent_effects()
            .into_iter()
            .filter_map(|e| match e {
                MutationEffect::Header(h) => Some(h),
                _ => None,
            })
            .collect()
    }
}

impl MutationGateway for MockGateway {
    type Error = MockTransportError;

    fn mutate(
        &self,
        effect: &MutationEffect,
        session: &SessionId,
    ) -> impl Future<Output = Result<Acknowledgment, Self::Error>> + Send {
        let mut sent = self.sent.lock().unwrap();
        let index = sent.len();
        sent.push(SentMutation {
            effect: effect.clone(),
            session: session.clone(),
        });
        drop(sent);

        let failure = self
            .by_call
            .get(&index)
            .or_else(|| self.by_kind.get(&effect.kind()))
            .cloned();

        let result = match failure {
            None => Ok(Acknowledgment::success()),
            Some(MockFailure::Ack(body)) => Ok(Acknowledgment(body)),
            Some(MockFailure::Transport) => Err(MockTransportError(index)),
        };
        async move { result }
    }
}

// ─── Mock reader ───

/// Read error produced by [`MockReader`].
#[derive(Debug, Error)]
#[error("mock read failure")]
pub struct MockReadError;

/// Reader over fixed rows.
#[derive(Debug, Default)]
pub struct MockReader {
    headers: HashMap<EventId, HeaderRecord>,
    campaigns: Vec<CampaignRecord>,
    games: Vec<GameRecord>,
    failing: HashSet<EntityKind>,
}

impl MockReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A live event with `campaigns` campaigns and `games` games, numbered from 1.
    pub fn event(event: i64, campaigns: i64, games: i64) -> Self {
        let event = EventId(event);
        MockReader {
            headers: HashMap::from([(event, HeaderRecord::new(event, DeletionFlag::Restored))]),
            campaigns: (1..=campaigns)
                .map(|c| CampaignRecord::new(event, CampaignId(c), DeletionFlag::Restored))
                .collect(),
            games: (1..=games)
                .map(|g| GameRecord::new(event, GameId(g), DeletionFlag::Restored))
                .collect(),
            failing: HashSet::new(),
        }
    }

    pub fn with_header(mut self, header: HeaderRecord) -> Self {
        self.headers.insert(header.event, header);
        self
    }

    pub fn with_campaign(mut self, campaign: CampaignRecord) -> Self {
        self.campaigns.push(campaign);
        self
    }

    pub fn with_game(mut self, game: GameRecord) -> Self {
        self.games.push(game);
        self
    }

    /// Makes reads of `kind` fail.
    pub fn failing(mut self, kind: EntityKind) -> Self {
        self.failing.insert(kind);
        self
    }

    fn check(&self, kind: EntityKind) -> Result<(), MockReadError> {
        if self.failing.contains(&kind) {
            Err(MockReadError)
        } else {
            Ok(())
        }
    }
}

impl EntityReader for MockReader {
    type Error = MockReadError;

    fn read_header(
        &self,
        event: EventId,
    ) -> impl Future<Output = Result<Option<HeaderRecord>, Self::Error>> + Send {
        let result = self
            .check(EntityKind::Header)
            .map(|()| self.headers.get(&event).cloned());
        async move { result }
    }

    fn read_campaigns(
        &self,
        event: EventId,
    ) -> impl Future<Output = Result<Vec<CampaignRecord>, Self::Error>> + Send {
        let result = self.check(EntityKind::Campaign).map(|()| {
            self.campaigns
                .iter()
                .filter(|c| c.event == event)
                .cloned()
                .collect()
        });
        async move { result }
    }

    fn read_games(
        &self,
        event: EventId,
    ) -> impl Future<Output = Result<Vec<GameRecord>, Self::Error>> + Send {
        let result = self.check(EntityKind::Game).map(|()| {
            self.games
                .iter()
                .filter(|g| g.event == event)
                .cloned()
                .collect()
        });
        async move { result }
    }
}

// ─── Generators ───

pub fn arb_event_id() -> impl Strategy<Value = EventId> {
    (1i64..100_000).prop_map(EventId)
}

pub fn arb_explicit_flag() -> impl Strategy<Value = DeletionFlag> {
    any::<bool>().prop_map(DeletionFlag::from)
}

pub fn arb_flag() -> impl Strategy<Value = DeletionFlag> {
    prop_oneof![
        Just(DeletionFlag::Unset),
        Just(DeletionFlag::Deleted),
        Just(DeletionFlag::Restored),
    ]
}

/// Distinct child numbers, in ascending order.
pub fn arb_child_ids(max: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::btree_set(1i64..10_000, 0..max)
        .prop_map(|ids: BTreeSet<i64>| ids.into_iter().collect())
}

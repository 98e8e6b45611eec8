//! Cascade engine: the three soft-delete routines.
//!
//! Each routine follows the same shape:
//!
//! ```text
//! Idle → ReadCurrent → MutateSelf → { Terminal-Restore | CascadeChildren } → Done
//!                          │                                   │
//!                          └────────── any failure ────────────┴──► Aborted
//! ```
//!
//! Mutations are awaited one at a time. A header is confirmed deleted before
//! any child is told to follow, and a child's restoration is confirmed before
//! the header is told to reopen.

use std::fmt;
use std::future::Future;

use tracing::{debug, error, info, instrument, warn};

use crate::effects::{AckOutcome, EntityReader, MutationEffect, MutationGateway};
use crate::types::{
    CampaignRecord, DeletesMessage, DeletionFlag, EntityKind, EventId, GameRecord, HeaderInput,
    HeaderRecord, SessionId,
};

use super::failure::{MutationFault, RoutineFailure};

/// How a campaign or game batch decides whether the header must be restored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpwardCascadePolicy {
    /// Restore the header iff the first record with an explicit flag restores.
    #[default]
    FirstRecord,
    /// Restore the header iff any record in the batch restores.
    AnyRecord,
}

impl UpwardCascadePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "first" | "first_record" => Some(UpwardCascadePolicy::FirstRecord),
            "any" | "any_record" => Some(UpwardCascadePolicy::AnyRecord),
            _ => None,
        }
    }

    /// Decides from the flags of the mutated records, in request order.
    pub fn restores_parent(&self, flags: impl IntoIterator<Item = DeletionFlag>) -> bool {
        let mut explicit = flags.into_iter().filter(DeletionFlag::is_set);
        match self {
            UpwardCascadePolicy::FirstRecord => explicit.next().is_some_and(|f| f.is_restored()),
            UpwardCascadePolicy::AnyRecord => explicit.any(|f| f.is_restored()),
        }
    }
}

/// A row that belongs to a header and can cascade up to it.
pub trait ChildRecord: Clone {
    const KIND: EntityKind;

    fn flag(&self) -> DeletionFlag;

    fn set_flag(&mut self, flag: DeletionFlag);

    fn to_effect(&self) -> MutationEffect;
}

impl ChildRecord for CampaignRecord {
    const KIND: EntityKind = EntityKind::Campaign;

    fn flag(&self) -> DeletionFlag {
        self.is_marked_for_deletion
    }

    fn set_flag(&mut self, flag: DeletionFlag) {
        self.is_marked_for_deletion = flag;
    }

    fn to_effect(&self) -> MutationEffect {
        MutationEffect::Campaign(self.clone())
    }
}

impl ChildRecord for GameRecord {
    const KIND: EntityKind = EntityKind::Game;

    fn flag(&self) -> DeletionFlag {
        self.is_marked_for_deletion
    }

    fn set_flag(&mut self, flag: DeletionFlag) {
        self.is_marked_for_deletion = flag;
    }

    fn to_effect(&self) -> MutationEffect {
        MutationEffect::Game(self.clone())
    }
}

/// Runs cascade routines against a gateway and a reader.
///
/// The engine holds no mutable state, so one instance can serve concurrent
/// requests; each request's session id keeps its messages apart.
pub struct CascadeEngine<G, R> {
    gateway: G,
    reader: R,
    policy: UpwardCascadePolicy,
}

impl<G, R> CascadeEngine<G, R>
where
    G: MutationGateway + Sync,
    G::Error: fmt::Display,
    R: EntityReader + Sync,
    R::Error: fmt::Display,
{
    /// Creates an engine with the default upward-cascade policy.
    pub fn new(gateway: G, reader: R) -> Self {
        CascadeEngine {
            gateway,
            reader,
            policy: UpwardCascadePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UpwardCascadePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Runs the routine for `kind`.
    pub async fn run(
        &self,
        kind: EntityKind,
        header: &HeaderInput,
        session: &SessionId,
    ) -> Result<DeletesMessage, RoutineFailure> {
        match kind {
            EntityKind::Header => self.delete_header(header, session).await,
            EntityKind::Campaign => {
                let campaigns = self.delete_campaigns(header, session).await?;
                Ok(DeletesMessage {
                    campaigns,
                    ..DeletesMessage::default()
                })
            }
            EntityKind::Game => {
                let games = self.delete_games(header, session).await?;
                Ok(DeletesMessage {
                    games,
                    ..DeletesMessage::default()
                })
            }
        }
    }

    /// Header routine.
    ///
    /// Writes the requested flag to the header. Deleting the header then marks
    /// every campaign and game of the event deleted; restoring it leaves the
    /// children alone. Any failed write discards the whole result, including
    /// the header write that already went through.
    #[instrument(skip(self, input, session), fields(event = %input.event, session = %session))]
    pub async fn delete_header(
        &self,
        input: &HeaderInput,
        session: &SessionId,
    ) -> Result<DeletesMessage, RoutineFailure> {
        let requested = input.is_marked_for_deletion;
        if !requested.is_set() {
            debug!("Header flag not requested, nothing to do");
            return Ok(DeletesMessage::default());
        }

        let mut header = self.read_header(input.event).await?;
        header.is_marked_for_deletion = requested;
        self.send(MutationEffect::Header(header.clone()), session)
            .await?;

        if requested.is_restored() {
            info!("Header restored; children untouched");
            return Ok(DeletesMessage {
                header: Some(header),
                ..DeletesMessage::default()
            });
        }

        let mut campaigns = self
            .read_children(input.event, self.reader.read_campaigns(input.event))
            .await?;
        self.cascade_down(&mut campaigns, requested, session).await?;

        let mut games = self
            .read_children(input.event, self.reader.read_games(input.event))
            .await?;
        self.cascade_down(&mut games, requested, session).await?;

        info!(
            campaigns = campaigns.len(),
            games = games.len(),
            "Header deleted with all children"
        );
        Ok(DeletesMessage {
            header: Some(header),
            campaigns,
            games,
        })
    }

    /// Campaign routine: writes each requested campaign flag, then restores the
    /// header if the batch asks for it.
    #[instrument(skip(self, input, session), fields(event = %input.event, session = %session))]
    pub async fn delete_campaigns(
        &self,
        input: &HeaderInput,
        session: &SessionId,
    ) -> Result<Vec<CampaignRecord>, RoutineFailure> {
        self.mutate_batch(input.event, input.campaign_records(), session)
            .await
    }

    /// Game routine: same as the campaign routine, over games.
    #[instrument(skip(self, input, session), fields(event = %input.event, session = %session))]
    pub async fn delete_games(
        &self,
        input: &HeaderInput,
        session: &SessionId,
    ) -> Result<Vec<GameRecord>, RoutineFailure> {
        self.mutate_batch(input.event, input.game_records(), session)
            .await
    }

    async fn mutate_batch<C: ChildRecord>(
        &self,
        event: EventId,
        records: Vec<C>,
        session: &SessionId,
    ) -> Result<Vec<C>, RoutineFailure> {
        let mut sent = Vec::with_capacity(records.len());
        for record in records {
            if !record.flag().is_set() {
                debug!(kind = %C::KIND, "Skipping record without a requested flag");
                continue;
            }
            self.send(record.to_effect(), session).await?;
            sent.push(record);
        }

        if self.policy.restores_parent(sent.iter().map(C::flag)) {
            self.restore_header(event, session).await?;
        }

        debug!(kind = %C::KIND, count = sent.len(), "Batch applied");
        Ok(sent)
    }

    /// A live child implies a live parent.
    async fn restore_header(&self, event: EventId, session: &SessionId) -> Result<(), RoutineFailure> {
        let mut header = self.read_header(event).await?;
        header.is_marked_for_deletion = DeletionFlag::Restored;
        self.send(MutationEffect::Header(header), session).await?;
        info!(%event, "Header restored by child");
        Ok(())
    }

    async fn cascade_down<C: ChildRecord>(
        &self,
        children: &mut [C],
        flag: DeletionFlag,
        session: &SessionId,
    ) -> Result<(), RoutineFailure> {
        for child in children.iter_mut() {
            child.set_flag(flag);
            self.send(child.to_effect(), session).await?;
        }
        Ok(())
    }

    async fn read_header(&self, event: EventId) -> Result<HeaderRecord, RoutineFailure> {
        match self.reader.read_header(event).await {
            Ok(Some(header)) => Ok(header),
            Ok(None) => {
                warn!(%event, "Header not found");
                Err(RoutineFailure::MissingRecord {
                    kind: EntityKind::Header,
                    event,
                })
            }
            Err(e) => {
                warn!(%event, error = %e, "Failed to read header");
                Err(RoutineFailure::ReadFailed {
                    kind: EntityKind::Header,
                    event,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn read_children<C: ChildRecord>(
        &self,
        event: EventId,
        read: impl Future<Output = Result<Vec<C>, R::Error>>,
    ) -> Result<Vec<C>, RoutineFailure> {
        read.await.map_err(|e| {
            warn!(%event, kind = %C::KIND, error = %e, "Failed to read children");
            RoutineFailure::ReadFailed {
                kind: C::KIND,
                event,
                reason: e.to_string(),
            }
        })
    }

    /// Sends one mutation and interprets its acknowledgment.
    ///
    /// Transport failures and rejected acknowledgments both fail with the
    /// effect's kind.
    async fn send(&self, effect: MutationEffect, session: &SessionId) -> Result<(), RoutineFailure> {
        let kind = effect.kind();
        let ack = match self.gateway.mutate(&effect, session).await {
            Ok(ack) => ack,
            Err(e) => {
                error!(function = kind.function_tag(), error = %e, "Mutation transport error");
                return Err(RoutineFailure::Mutation {
                    kind,
                    fault: MutationFault::Transport(e.to_string()),
                });
            }
        };

        match ack.outcome() {
            AckOutcome::Success => {
                debug!(function = kind.function_tag(), "Mutation acknowledged");
                Ok(())
            }
            AckOutcome::Rejected(reason) => {
                warn!(function = kind.function_tag(), %reason, "Mutation rejected");
                Err(RoutineFailure::Mutation {
                    kind,
                    fault: MutationFault::Rejected(reason),
                })
            }
        }
    }
}

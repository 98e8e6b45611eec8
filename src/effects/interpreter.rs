//! Gateway and reader traits.
//!
//! These traits define how mutations are delivered and how current rows are
//! read. The cascade engine is generic over both, so it never depends on the
//! messaging transport or the database driver.
//!
//! The trait-based design enables:
//! - Mock gateways for testing every cascade branch
//! - Swapping the transport without touching the cascade rules

use std::future::Future;
use std::sync::Arc;

use crate::types::{CampaignRecord, EventId, GameRecord, HeaderRecord, SessionId};

use super::MutationEffect;
use super::ack::Acknowledgment;

/// Delivers one mutation to the persistence tier and waits for its acknowledgment.
///
/// An `Err` is a transport failure: the round trip itself did not complete.
/// A completed round trip returns the acknowledgment body, which the caller
/// classifies.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct AlwaysOk;
///
/// impl MutationGateway for AlwaysOk {
///     type Error = std::convert::Infallible;
///
///     async fn mutate(
///         &self,
///         _effect: &MutationEffect,
///         _session: &SessionId,
///     ) -> Result<Acknowledgment, Self::Error> {
///         Ok(Acknowledgment::success())
///     }
/// }
/// ```
pub trait MutationGateway {
    /// The transport error type.
    type Error;

    /// Send `effect` tagged with `session` and wait for the acknowledgment.
    fn mutate(
        &self,
        effect: &MutationEffect,
        session: &SessionId,
    ) -> impl Future<Output = Result<Acknowledgment, Self::Error>> + Send;
}

/// Reads the current rows for an event.
pub trait EntityReader {
    /// The read error type.
    type Error;

    /// Reads the header row, or `None` if the event does not exist.
    fn read_header(
        &self,
        event: EventId,
    ) -> impl Future<Output = Result<Option<HeaderRecord>, Self::Error>> + Send;

    /// Reads every campaign row of the event.
    fn read_campaigns(
        &self,
        event: EventId,
    ) -> impl Future<Output = Result<Vec<CampaignRecord>, Self::Error>> + Send;

    /// Reads every game row of the event.
    fn read_games(
        &self,
        event: EventId,
    ) -> impl Future<Output = Result<Vec<GameRecord>, Self::Error>> + Send;
}

impl<T: MutationGateway> MutationGateway for &T {
    type Error = T::Error;

    fn mutate(
        &self,
        effect: &MutationEffect,
        session: &SessionId,
    ) -> impl Future<Output = Result<Acknowledgment, Self::Error>> + Send {
        (**self).mutate(effect, session)
    }
}

impl<T: MutationGateway> MutationGateway for Arc<T> {
    type Error = T::Error;

    fn mutate(
        &self,
        effect: &MutationEffect,
        session: &SessionId,
    ) -> impl Future<Output = Result<Acknowledgment, Self::Error>> + Send {
        (**self).mutate(effect, session)
    }
}

impl<T: EntityReader> EntityReader for &T {
    type Error = T::Error;

    fn read_header(
        &self,
        event: EventId,
    ) -> impl Future<Output = Result<Option<HeaderRecord>, Self::Error>> + Send {
        (**self).read_header(event)
    }

    fn read_campaigns(
        &self,
        event: EventId,
    ) -> impl Future<Output = Result<Vec<CampaignRecord>, Self::Error>> + Send {
        (**self).read_campaigns(event)
    }

    fn read_games(
        &self,
        event: EventId,
    ) -> impl Future<Output = Result<Vec<GameRecord>, Self::Error>> + Send {
        (**self).read_games(event)
    }
}

impl<T: EntityReader> EntityReader for Arc<T> {
    type Error = T::Error;

    fn read_header(
        &self,
        event: EventId,
    ) -> impl Future<Output = Result<Option<HeaderRecord>, Self::Error>> + Send {
        (**self).read_header(event)
    }

    fn read_campaigns(
        &self,
        event: EventId,
    ) -> impl Future<Output = Result<Vec<CampaignRecord>, Self::Error>> + Send {
        (**self).read_campaigns(event)
    }

    fn read_games(
        &self,
        event: EventId,
    ) -> impl Future<Output = Result<Vec<GameRecord>, Self::Error>> + Send {
        (**self).read_games(event)
    }
}

//! Reasons a cascade routine aborts.

use thiserror::Error;

use crate::effects::RejectReason;
use crate::types::{EntityKind, EventId};

/// Why a single mutation did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationFault {
    /// The round trip failed (channel closed, timeout, ...).
    Transport(String),
    /// The persistence tier answered, but not with success.
    Rejected(RejectReason),
}

/// A cascade routine aborted. Any records it had accumulated are discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutineFailure {
    /// A mutation of `kind` failed.
    ///
    /// Displays as the kind's human-readable cause, which is what the
    /// response envelope reports.
    #[error("{}", .kind.failure_message())]
    Mutation { kind: EntityKind, fault: MutationFault },

    /// A row the routine needed to read does not exist.
    #[error("{kind} record not found for event {event}")]
    MissingRecord { kind: EntityKind, event: EventId },

    /// Reading current rows failed.
    #[error("failed to read {kind} records for event {event}: {reason}")]
    ReadFailed {
        kind: EntityKind,
        event: EventId,
        reason: String,
    },
}

impl RoutineFailure {
    /// The cause to report in the response envelope.
    ///
    /// Only failed mutations are reported; a missing or unreadable row aborts
    /// the routine without attaching an error.
    pub fn reported_message(&self) -> Option<&'static str> {
        match self {
            RoutineFailure::Mutation { kind, .. } => Some(kind.failure_message()),
            RoutineFailure::MissingRecord { .. } | RoutineFailure::ReadFailed { .. } => None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            RoutineFailure::Mutation { kind, .. }
            | RoutineFailure::MissingRecord { kind, .. }
            | RoutineFailure::ReadFailed { kind, .. } => *kind,
        }
    }
}

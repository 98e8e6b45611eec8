//! Cascade engine for soft-delete propagation.
//!
//! This module implements the rules that keep the deletion flags of an event
//! consistent across its header, campaigns and games:
//!
//! - **Downward**: deleting a header deletes every campaign and game under it
//! - **Upward**: restoring a campaign or game restores its header
//! - **Local**: restoring a header leaves its children as they are
//!
//! # Architecture
//!
//! The engine follows the effects-as-data pattern:
//! - Routines build `MutationEffect` values and hand them to a `MutationGateway`
//! - Current rows come from an `EntityReader`
//! - Mocks of both make every branch testable without a broker
//!
//! # Key Invariants
//!
//! 1. **Ordering**: every mutation is acknowledged before the next is sent.
//!
//! 2. **All or nothing per routine**: the first failed mutation aborts the
//!    routine and discards the records it had accumulated. Writes already
//!    acknowledged are not rolled back.

pub mod engine;
pub mod failure;


// Re-export commonly used types
pub use engine::{CascadeEngine, ChildRecord, UpwardCascadePolicy};
pub use failure::{MutationFault, RoutineFailure};

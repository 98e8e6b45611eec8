//! Reference persistence tier.
//!
//! The service never owns the database; this module provides an in-memory
//! stand-in so the binary and tests can exercise the full request path.

mod memory;

pub use memory::{AppliedMutation, MemoryStore, StoreError, StoreSnapshot};

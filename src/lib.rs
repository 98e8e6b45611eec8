//! Event Deletes - soft-delete cascades for event headers, campaigns and games.
//!
//! This library provides the domain types, the cascade engine that keeps the
//! deletion flags of an event consistent, and the dispatch layer that turns a
//! deletion request into a response envelope. Mutations leave the service as
//! effects handed to a [`MutationGateway`](effects::MutationGateway).

pub mod cascade;
pub mod config;
pub mod dispatch;
pub mod effects;
pub mod gateway;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

//! Request dispatch layer.
//!
//! The dispatcher takes a decoded request, checks its operation type, runs the
//! cascade routine for every entity kind the request's `accepter` list names
//! (in order, duplicates included) and folds the outcomes into one
//! [`ResponseEnvelope`](crate::types::ResponseEnvelope).
//!
//! ```text
//! request ──► Dispatcher ──► CascadeEngine::run(kind) ──► MutationGateway
//!                 │                    │
//!                 │                    └──► ResultAggregator::record
//!                 ▼
//!          ResponseEnvelope
//! ```

mod aggregate;
mod dispatcher;


pub use aggregate::ResultAggregator;
pub use dispatcher::{DispatchError, Dispatcher, Result};

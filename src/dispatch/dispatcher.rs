//! Routing a request's accepter list to cascade routines.

use std::fmt;

use thiserror::Error;
use tracing::{error, info, instrument};

use crate::cascade::CascadeEngine;
use crate::effects::{EntityReader, MutationGateway};
use crate::types::{ApiType, DeleteRequest, ResponseEnvelope};

use super::aggregate::ResultAggregator;

/// Errors that stop a request before any routine runs.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request's `api_type` is not handled by this service.
    #[error("unsupported api type: {0:?}")]
    UnsupportedOperation(String),
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Runs the routines a request asks for and builds its response.
pub struct Dispatcher<G, R> {
    engine: CascadeEngine<G, R>,
}

impl<G, R> Dispatcher<G, R>
where
    G: MutationGateway + Sync,
    G::Error: fmt::Display,
    R: EntityReader + Sync,
    R::Error: fmt::Display,
{
    /// Creates a new dispatcher around `engine`.
    pub fn new(engine: CascadeEngine<G, R>) -> Self {
        Dispatcher { engine }
    }

    pub fn engine(&self) -> &CascadeEngine<G, R> {
        &self.engine
    }

    /// Handles one request.
    ///
    /// Each kind in `accepter` runs in order, including duplicates. A routine
    /// that fails does not stop the ones after it.
    #[instrument(
        skip(self, request),
        fields(session = %request.runtime_session_id, event = %request.header.event)
    )]
    pub async fn handle(&self, request: &DeleteRequest) -> Result<ResponseEnvelope> {
        match request.api_type() {
            Some(ApiType::Deletes) => Ok(self.deletes(request).await),
            None => {
                error!(api_type = %request.api_type, "Unknown api type");
                Err(DispatchError::UnsupportedOperation(request.api_type.clone()))
            }
        }
    }

    async fn deletes(&self, request: &DeleteRequest) -> ResponseEnvelope {
        let mut aggregator = ResultAggregator::new();
        for &kind in &request.accepter {
            let outcome = self
                .engine
                .run(kind, &request.header, &request.runtime_session_id)
                .await;
            aggregator.record(kind, outcome);
        }

        let failed = aggregator.failures().len();
        let envelope = aggregator.finish(request);
        info!(
            kinds = request.accepter.len(),
            failed,
            reported = !envelope.succeeded(),
            "Deletion request handled"
        );
        envelope
    }
}

//! Folding routine outcomes into the response envelope.

use tracing::debug;

use crate::cascade::RoutineFailure;
use crate::types::{DeleteRequest, DeletesMessage, EntityKind, ResponseEnvelope};

/// Collects the outcome of every routine run for one request.
///
/// Successful routines contribute their records. The first failure that
/// carries a reportable cause decides `sql_update_error`; later failures are
/// kept only for inspection.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    message: DeletesMessage,
    first_error: Option<&'static str>,
    failures: Vec<(EntityKind, RoutineFailure)>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of the routine run for `kind`.
    pub fn record(&mut self, kind: EntityKind, outcome: Result<DeletesMessage, RoutineFailure>) {
        match outcome {
            Ok(output) => {
                // Runs without header output, failed ones included, keep an earlier header.
                if let Some(header) = output.header {
                    self.message.header = Some(header);
                }
                self.message.campaigns.extend(output.campaigns);
                self.message.games.extend(output.games);
            }
            Err(failure) => {
                if self.first_error.is_none() {
                    self.first_error = failure.reported_message();
                }
                debug!(%kind, %failure, "Routine aborted");
                self.failures.push((kind, failure));
            }
        }
    }

    /// Failures recorded so far, in order.
    pub fn failures(&self) -> &[(EntityKind, RoutineFailure)] {
        &self.failures
    }

    /// The cause that will be reported, if any.
    pub fn first_error(&self) -> Option<&'static str> {
        self.first_error
    }

    /// Builds the envelope, echoing the request's metadata.
    pub fn finish(self, request: &DeleteRequest) -> ResponseEnvelope {
        let (sql_update_result, sql_update_error) = match self.first_error {
            Some(cause) => (Some(false), cause.to_string()),
            None => (None, String::new()),
        };

        ResponseEnvelope {
            connection_key: request.connection_key.clone(),
            runtime_session_id: request.runtime_session_id.clone(),
            business_partner: request.business_partner,
            service_label: request.service_label.clone(),
            api_type: request.api_type.clone(),
            api_schema: request.api_schema.clone(),
            accepter: request.accepter.clone(),
            sql_update_result,
            sql_update_error,
            message: self.message,
        }
    }
}

//! Acknowledgment payloads and their classification.
//!
//! The persistence tier replies to every mutation with a JSON object. A
//! mutation succeeded iff the object has a `result` field whose value is the
//! string `"success"`. Anything else is a rejection, and every kind of
//! rejection is handled the same way by the cascade.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Literal the persistence tier uses to confirm a write.
pub const SUCCESS_RESULT: &str = "success";

/// A raw acknowledgment body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Acknowledgment(pub Value);

/// Why an acknowledgment was not a success. Only used for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The body has no `result` field (or is not an object).
    MissingResult,
    /// `result` is present but not a string.
    NotAString,
    /// `result` is a string other than `"success"`.
    Result(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingResult => write!(f, "acknowledgment has no result field"),
            RejectReason::NotAString => write!(f, "acknowledgment result is not a string"),
            RejectReason::Result(r) => write!(f, "acknowledgment result was {r:?}"),
        }
    }
}

/// Classification of an acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    Success,
    Rejected(RejectReason),
}

impl AckOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AckOutcome::Success)
    }
}

impl Acknowledgment {
    pub fn success() -> Self {
        Acknowledgment(serde_json::json!({ "result": SUCCESS_RESULT }))
    }

    pub fn failure() -> Self {
        Acknowledgment(serde_json::json!({ "result": "failure" }))
    }

    /// Classifies this acknowledgment.
    pub fn outcome(&self) -> AckOutcome {
        match self.0.get("result") {
            None => AckOutcome::Rejected(RejectReason::MissingResult),
            Some(Value::String(s)) if s == SUCCESS_RESULT => AckOutcome::Success,
            Some(Value::String(s)) => AckOutcome::Rejected(RejectReason::Result(s.clone())),
            Some(_) => AckOutcome::Rejected(RejectReason::NotAString),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome().is_success()
    }
}

impl From<Value> for Acknowledgment {
    fn from(value: Value) -> Self {
        Acknowledgment(value)
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Failure of a single capability invocation.
///
/// These are returned to the model as tool results, they never abort a turn.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum CapabilityError {
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Capability failed: {0}")]
    HandlerFailed(String),
}

impl CapabilityError {
    pub fn kind(&self) -> &'static str {
        match self {
            CapabilityError::UnknownCapability(_) => "UnknownCapability",
            CapabilityError::InvalidArguments(_) => "InvalidArguments",
            CapabilityError::HandlerFailed(_) => "HandlerFailed",
        }
    }

    /// The payload the model sees in place of a successful result
    pub fn to_payload(&self) -> Value {
        json!({
            "error": self.to_string(),
            "kind": self.kind(),
        })
    }
}

pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// A failure that ends the whole turn without an answer
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Model request failed: {0:#}")]
    Provider(anyhow::Error),
}

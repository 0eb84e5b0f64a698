use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A capability that can be offered to a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does, written for the model
    pub description: String,
    /// JSON Schema describing the arguments the tool accepts
    pub parameters: Value,
    /// Whether arguments with fields the parameters do not declare are rejected
    pub strict: bool,
}

impl Tool {
    /// Create a new strict tool with the given name and description
    pub fn new<N, D>(name: N, description: D, parameters: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
            strict: true,
        }
    }
}

/// A tool call requested by the model.
///
/// The arguments are kept exactly as the model produced them. They are untrusted until
/// the registry has parsed them against the tool's parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// The name of the tool to execute
    pub name: String,
    /// Raw JSON arguments
    pub arguments: String,
}

impl ToolCall {
    pub fn new<N: Into<String>, A: Into<String>>(name: N, arguments: A) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

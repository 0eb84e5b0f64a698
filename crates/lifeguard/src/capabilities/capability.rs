use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{CapabilityError, CapabilityResult};
use crate::models::tool::Tool;

/// A lookup the model can ask the agent to run
///
/// Implementations declare their arguments as a typed struct. The registry parses the
/// model's raw arguments into `Args` before `run` is called, so `run` only ever sees
/// validated input.
#[async_trait]
pub trait Capability: Send + Sync {
    type Args: DeserializeOwned + Send;

    /// The descriptor advertised to the model
    fn tool(&self) -> &Tool;

    /// Run the lookup. Any error is reported back to the model as a failed result.
    async fn run(&self, args: Self::Args) -> anyhow::Result<Value>;
}

/// Object safe view of a capability, working on raw arguments
pub(crate) trait Handler: Send + Sync {
    fn parse_and_run<'a>(
        &'a self,
        raw_arguments: &str,
    ) -> CapabilityResult<BoxFuture<'a, anyhow::Result<Value>>>;
}

impl<C> Handler for C
where
    C: Capability + 'static,
{
    fn parse_and_run<'a>(
        &'a self,
        raw_arguments: &str,
    ) -> CapabilityResult<BoxFuture<'a, anyhow::Result<Value>>> {
        let args = parse_arguments::<C::Args>(Capability::tool(self), raw_arguments)?;
        Ok(self.run(args))
    }
}

/// Parse the model's arguments for `tool`.
///
/// A strict tool also rejects any field its parameter schema does not declare, at any depth.
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    tool: &Tool,
    raw_arguments: &str,
) -> CapabilityResult<T> {
    let raw = if raw_arguments.trim().is_empty() {
        "{}"
    } else {
        raw_arguments
    };
    let arguments: Value = serde_json::from_str(raw).map_err(invalid)?;

    if tool.strict {
        if !arguments.is_object() {
            return Err(CapabilityError::InvalidArguments(
                "arguments must be a JSON object".to_string(),
            ));
        }
        let mut unknown = Vec::new();
        undeclared_fields(&tool.parameters, &arguments, "", &mut unknown);
        if !unknown.is_empty() {
            return Err(CapabilityError::InvalidArguments(format!(
                "unknown field(s): {}",
                unknown.join(", ")
            )));
        }
    }

    serde_json::from_value(arguments).map_err(invalid)
}

fn invalid(error: serde_json::Error) -> CapabilityError {
    CapabilityError::InvalidArguments(error.to_string())
}

fn undeclared_fields(schema: &Value, value: &Value, path: &str, found: &mut Vec<String>) {
    match value {
        Value::Object(fields) => {
            let properties = schema.get("properties").and_then(Value::as_object);
            for (key, field) in fields {
                let field_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                match properties.and_then(|properties| properties.get(key)) {
                    Some(field_schema) => undeclared_fields(field_schema, field, &field_path, found),
                    None => found.push(field_path),
                }
            }
        }
        Value::Array(elements) => {
            if let Some(item_schema) = schema.get("items") {
                for (index, element) in elements.iter().enumerate() {
                    let element_path = format!("{}[{}]", path, index);
                    undeclared_fields(item_schema, element, &element_path, found);
                }
            }
        }
        _ => {}
    }
}

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::capability::{Capability, Handler};
use super::pricing::GetPricing;
use super::products::{ProductDetails, SearchProducts, SemanticSearchProducts};
use super::stores::{SearchStores, StoreDetails};
use crate::clients::{Geocoder, PoolApiClient};
use crate::errors::{CapabilityError, CapabilityResult};
use crate::models::tool::Tool;

pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// The catalog of capabilities offered to the model, and the handlers that fulfil them
pub struct CapabilityRegistry {
    tools: Vec<Tool>,
    handlers: HashMap<String, Arc<dyn Handler>>,
    timeout: Duration,
}

impl CapabilityRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            tools: Vec::new(),
            handlers: HashMap::new(),
            timeout,
        }
    }

    /// The registry for the pool supply store: product search, pricing and store lookup
    pub fn pool_store(
        client: PoolApiClient,
        geocoder: Arc<dyn Geocoder>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut registry = Self::new(timeout);
        registry.register(SearchProducts::new(client.clone()))?;
        registry.register(SemanticSearchProducts::new(client.clone()))?;
        registry.register(ProductDetails::new(client.clone()))?;
        registry.register(GetPricing::new(client.clone()))?;
        registry.register(SearchStores::new(client.clone(), geocoder))?;
        registry.register(StoreDetails::new(client))?;
        Ok(registry)
    }

    pub fn register<C: Capability + 'static>(&mut self, capability: C) -> Result<()> {
        let tool = Capability::tool(&capability).clone();
        if self.handlers.contains_key(&tool.name) {
            return Err(anyhow!("Duplicate capability name: {}", tool.name));
        }
        self.handlers.insert(tool.name.clone(), Arc::new(capability));
        self.tools.push(tool);
        Ok(())
    }

    /// Every capability, in registration order
    pub fn list_capabilities(&self) -> &[Tool] {
        &self.tools
    }

    /// Run one capability against the model's raw arguments.
    ///
    /// Never fails outright: an unknown name, arguments that do not parse, and handler
    /// errors or timeouts all come back as a [`CapabilityError`] for the model to read.
    pub async fn execute(&self, name: &str, raw_arguments: &str) -> CapabilityResult<Value> {
        let result = self.dispatch(name, raw_arguments).await;
        match &result {
            Ok(_) => tracing::info!(capability = name, "capability succeeded"),
            Err(e) => tracing::warn!(
                capability = name,
                kind = e.kind(),
                error = %e,
                "capability failed"
            ),
        }
        result
    }

    async fn dispatch(&self, name: &str, raw_arguments: &str) -> CapabilityResult<Value> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| CapabilityError::UnknownCapability(name.to_string()))?;

        let future = handler.parse_and_run(raw_arguments)?;
        match tokio::time::timeout(self.timeout, future).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CapabilityError::HandlerFailed(describe(&e))),
            Err(_) => Err(CapabilityError::HandlerFailed(format!(
                "{} timed out after {}s",
                name,
                self.timeout.as_secs_f32()
            ))),
        }
    }
}

/// The error and its causes joined with ": ", dropping a cause its parent already printed
fn describe(error: &anyhow::Error) -> String {
    let mut message = String::new();
    let mut previous = String::new();
    for cause in error.chain() {
        let text = cause.to_string();
        if !previous.ends_with(&text) {
            if !message.is_empty() {
                message.push_str(": ");
            }
            message.push_str(&text);
        }
        previous = text;
    }
    message
}

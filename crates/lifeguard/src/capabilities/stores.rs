use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::capability::Capability;
use crate::clients::{Geocoder, PoolApiClient};
use crate::models::tool::Tool;

/// Search radius in miles when the model does not give one
const DEFAULT_RADIUS_MILES: u32 = 50;

fn default_radius() -> u32 {
    DEFAULT_RADIUS_MILES
}

/// Finds stores near a free-text location
///
/// The location is geocoded first; the store service only understands coordinates.
pub struct SearchStores {
    client: PoolApiClient,
    geocoder: Arc<dyn Geocoder>,
    tool: Tool,
}

#[derive(Debug, Deserialize)]
pub struct SearchStoresArgs {
    pub location: String,
    #[serde(default = "default_radius")]
    pub radius: u32,
}

impl SearchStores {
    pub fn new(client: PoolApiClient, geocoder: Arc<dyn Geocoder>) -> Self {
        let tool = Tool::new(
            "search_stores",
            "Find stores near a location such as a city, address or zip code.",
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "Where to search, e.g. \"Austin, TX\" or \"78701\""
                    },
                    "radius": {
                        "type": "integer",
                        "description": "Search radius in miles",
                        "default": DEFAULT_RADIUS_MILES
                    }
                },
                "required": ["location"],
                "additionalProperties": false
            }),
        );
        Self {
            client,
            geocoder,
            tool,
        }
    }
}

#[async_trait]
impl Capability for SearchStores {
    type Args = SearchStoresArgs;

    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn run(&self, args: SearchStoresArgs) -> anyhow::Result<Value> {
        let coordinates = self.geocoder.locate(&args.location).await?;
        tracing::debug!(location = %args.location, ?coordinates, "geocoded");

        let stores = self
            .client
            .search_stores(coordinates.lat, coordinates.lng, args.radius)
            .await
            .with_context(|| format!("searching stores near {}", args.location))?;
        Ok(stores)
    }
}

pub struct StoreDetails {
    client: PoolApiClient,
    tool: Tool,
}

#[derive(Debug, Deserialize)]
pub struct StoreDetailsArgs {
    pub store_id: String,
}

impl StoreDetails {
    pub fn new(client: PoolApiClient) -> Self {
        let tool = Tool::new(
            "get_store_details",
            "Get address, phone number and opening hours for one store by its identifier.",
            json!({
                "type": "object",
                "properties": {
                    "store_id": {
                        "type": "string",
                        "description": "The store identifier returned by search_stores"
                    }
                },
                "required": ["store_id"],
                "additionalProperties": false
            }),
        );
        Self { client, tool }
    }
}

#[async_trait]
impl Capability for StoreDetails {
    type Args = StoreDetailsArgs;

    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn run(&self, args: StoreDetailsArgs) -> anyhow::Result<Value> {
        Ok(self.client.store_details(&args.store_id).await?)
    }
}

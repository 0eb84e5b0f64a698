use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::capability::Capability;
use crate::clients::{PoolApiClient, PricingItem};
use crate::models::tool::Tool;

/// Batch price lookup. Every item is quoted per each.
pub struct GetPricing {
    client: PoolApiClient,
    tool: Tool,
}

#[derive(Debug, Deserialize)]
pub struct PricingArgs {
    pub items: Vec<ItemCode>,
}

#[derive(Debug, Deserialize)]
pub struct ItemCode {
    pub item_code: String,
}

impl GetPricing {
    pub fn new(client: PoolApiClient) -> Self {
        let tool = Tool::new(
            "get_pricing",
            "Get current prices for one or more products. Pass every item code you need in a single call.",
            json!({
                "type": "object",
                "properties": {
                    "items": {
                        "type": "array",
                        "description": "The products to price",
                        "items": {
                            "type": "object",
                            "properties": {
                                "item_code": {
                                    "type": "string",
                                    "description": "The product's item code, e.g. LZA406103A"
                                }
                            },
                            "required": ["item_code"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["items"],
                "additionalProperties": false
            }),
        );
        Self { client, tool }
    }
}

#[async_trait]
impl Capability for GetPricing {
    type Args = PricingArgs;

    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn run(&self, args: PricingArgs) -> anyhow::Result<Value> {
        if args.items.is_empty() {
            anyhow::bail!("no item codes to price");
        }
        let items: Vec<PricingItem> = args
            .items
            .into_iter()
            .map(|item| PricingItem::each(item.item_code))
            .collect();
        Ok(self.client.pricing(&items).await?)
    }
}

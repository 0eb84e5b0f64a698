use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::capability::Capability;
use crate::clients::PoolApiClient;
use crate::models::tool::Tool;

const DEFAULT_PAGE_SIZE: u32 = 5;
const DEFAULT_PAGE: u32 = 1;
const DEFAULT_SEMANTIC_LIMIT: u32 = 3;

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_semantic_limit() -> u32 {
    DEFAULT_SEMANTIC_LIMIT
}

/// Keyword and part number search
pub struct SearchProducts {
    client: PoolApiClient,
    tool: Tool,
}

#[derive(Debug, Deserialize)]
pub struct SearchProductsArgs {
    pub term: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl SearchProducts {
    pub fn new(client: PoolApiClient) -> Self {
        let tool = Tool::new(
            "search_products",
            indoc::indoc! {r#"
                Search the product catalog by keyword or part number.
                Use this when the customer names a product, brand or part number.
                Results are paginated; request later pages only if the first page does not answer the question.
            "#},
            json!({
                "type": "object",
                "properties": {
                    "term": {
                        "type": "string",
                        "description": "Keywords or a part number, e.g. \"variable speed pump\" or \"LZA406103A\""
                    },
                    "page_size": {
                        "type": "integer",
                        "description": "Number of results per page",
                        "default": DEFAULT_PAGE_SIZE
                    },
                    "page": {
                        "type": "integer",
                        "description": "Page number, starting at 1",
                        "default": DEFAULT_PAGE
                    }
                },
                "required": ["term"],
                "additionalProperties": false
            }),
        );
        Self { client, tool }
    }
}

#[async_trait]
impl Capability for SearchProducts {
    type Args = SearchProductsArgs;

    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn run(&self, args: SearchProductsArgs) -> anyhow::Result<Value> {
        Ok(self
            .client
            .search_products(&args.term, args.page_size, args.page)
            .await?)
    }
}

/// Natural language search over product descriptions
pub struct SemanticSearchProducts {
    client: PoolApiClient,
    tool: Tool,
}

#[derive(Debug, Deserialize)]
pub struct SemanticSearchArgs {
    pub query: String,
    #[serde(default = "default_semantic_limit")]
    pub limit: u32,
}

impl SemanticSearchProducts {
    pub fn new(client: PoolApiClient) -> Self {
        let tool = Tool::new(
            "semantic_search_products",
            indoc::indoc! {r#"
                Search products by meaning rather than exact keywords.
                Use this for problem descriptions such as "my water is cloudy" or "pump for an above ground pool".
            "#},
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "A natural language description of what the customer needs"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of products to return",
                        "default": DEFAULT_SEMANTIC_LIMIT
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        );
        Self { client, tool }
    }
}

#[async_trait]
impl Capability for SemanticSearchProducts {
    type Args = SemanticSearchArgs;

    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn run(&self, args: SemanticSearchArgs) -> anyhow::Result<Value> {
        Ok(self.client.semantic_search(&args.query, args.limit).await?)
    }
}

pub struct ProductDetails {
    client: PoolApiClient,
    tool: Tool,
}

#[derive(Debug, Deserialize)]
pub struct ProductDetailsArgs {
    pub part_number: String,
}

impl ProductDetails {
    pub fn new(client: PoolApiClient) -> Self {
        let tool = Tool::new(
            "get_product_details",
            "Get full details (specifications, description, images) for one product by its part number.",
            json!({
                "type": "object",
                "properties": {
                    "part_number": {
                        "type": "string",
                        "description": "The manufacturer part number"
                    }
                },
                "required": ["part_number"],
                "additionalProperties": false
            }),
        );
        Self { client, tool }
    }
}

#[async_trait]
impl Capability for ProductDetails {
    type Args = ProductDetailsArgs;

    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn run(&self, args: ProductDetailsArgs) -> anyhow::Result<Value> {
        Ok(self.client.product_details(&args.part_number).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::capability::parse_arguments;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_search_defaults() {
        let client = PoolApiClient::new("http://localhost", Duration::from_secs(1)).unwrap();
        let search = SearchProducts::new(client.clone());
        let args: SearchProductsArgs =
            parse_arguments(search.tool(), r#"{"term": "skimmer"}"#).unwrap();
        assert_eq!(args.page_size, 5);
        assert_eq!(args.page, 1);

        let semantic = SemanticSearchProducts::new(client);
        let args: SemanticSearchArgs =
            parse_arguments(semantic.tool(), r#"{"query": "green water"}"#).unwrap();
        assert_eq!(args.limit, 3);
    }

    #[test]
    fn test_schema_defaults_match_args() {
        let client = PoolApiClient::new("http://localhost", Duration::from_secs(1)).unwrap();
        let search = SearchProducts::new(client.clone());
        let params = &search.tool().parameters;
        assert_eq!(params["properties"]["page_size"]["default"], 5);
        assert_eq!(params["properties"]["page"]["default"], 1);
        assert_eq!(params["required"], json!(["term"]));

        let semantic = SemanticSearchProducts::new(client);
        assert_eq!(semantic.tool().parameters["properties"]["limit"]["default"], 3);
    }

    #[tokio::test]
    async fn test_semantic_search_uses_default_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/search"))
            .and(query_param("query", "cloudy water"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"sku": "CLR-1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = PoolApiClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let capability = SemanticSearchProducts::new(client);
        let args = parse_arguments(capability.tool(), r#"{"query": "cloudy water"}"#).unwrap();
        let result = capability.run(args).await.unwrap();
        assert_eq!(result, json!([{"sku": "CLR-1"}]));
    }

    #[tokio::test]
    async fn test_product_details_failure_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/LZA406103A"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = PoolApiClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let capability = ProductDetails::new(client);
        let args = ProductDetailsArgs {
            part_number: "LZA406103A".to_string(),
        };
        let error = capability.run(args).await.unwrap_err();
        assert!(error.to_string().contains("503"));
    }
}

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://candidate-onsite-study-srs-712206638513.us-central1.run.app";

/// Unit of measure the pricing service quotes in
pub const PRICING_UNIT: &str = "EA";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {endpoint} failed")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}")]
    Status { endpoint: String, status: StatusCode },

    #[error("could not decode response from {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingItem {
    pub item_code: String,
    pub unit: String,
}

impl PricingItem {
    pub fn each<S: Into<String>>(item_code: S) -> Self {
        Self {
            item_code: item_code.into(),
            unit: PRICING_UNIT.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PricingRequest<'a> {
    items: &'a [PricingItem],
}

/// Client for the product, pricing and store lookup service
#[derive(Debug, Clone)]
pub struct PoolApiClient {
    client: Client,
    base_url: String,
}

impl PoolApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Keyword or part number search
    pub async fn search_products(
        &self,
        term: &str,
        page_size: u32,
        page: u32,
    ) -> Result<Value, ApiError> {
        let query = [
            ("term", term.to_string()),
            ("page_size", page_size.to_string()),
            ("page", page.to_string()),
        ];
        self.get("/api/search", &query).await
    }

    /// Semantic search over product descriptions
    pub async fn semantic_search(&self, query: &str, limit: u32) -> Result<Value, ApiError> {
        let params = [("query", query.to_string()), ("limit", limit.to_string())];
        self.get("/api/products/search", &params).await
    }

    pub async fn product_details(&self, part_number: &str) -> Result<Value, ApiError> {
        let path = format!("/api/products/{}", urlencoding::encode(part_number));
        self.get(&path, &[]).await
    }

    pub async fn pricing(&self, items: &[PricingItem]) -> Result<Value, ApiError> {
        self.post("/api/pricing", &PricingRequest { items }).await
    }

    pub async fn search_stores(
        &self,
        latitude: f64,
        longitude: f64,
        radius: u32,
    ) -> Result<Value, ApiError> {
        let params = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("radius", radius.to_string()),
        ];
        self.get("/api/stores/search", &params).await
    }

    pub async fn store_details(&self, store_id: &str) -> Result<Value, ApiError> {
        let path = format!("/api/stores/{}", urlencoding::encode(store_id));
        self.get(&path, &[]).await
    }

    pub async fn health(&self) -> Result<Value, ApiError> {
        self.get("/health", &[]).await
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let endpoint = format!("{}{}", self.base_url, path);
        tracing::debug!(%endpoint, ?query, "GET");

        let response = self
            .client
            .get(&endpoint)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;

        Self::read_json(endpoint, response).await
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Value, ApiError> {
        let endpoint = format!("{}{}", self.base_url, path);
        tracing::debug!(%endpoint, "POST");

        let response = self
            .client
            .post(&endpoint)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;

        Self::read_json(endpoint, response).await
    }

    async fn read_json(endpoint: String, response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { endpoint, status });
        }
        response
            .json()
            .await
            .map_err(|source| ApiError::Decode { endpoint, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> PoolApiClient {
        PoolApiClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_search_products_sends_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .and(query_param("term", "pump"))
            .and(query_param("page_size", "5"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client.search_products("pump", 5, 1).await.unwrap();
        assert_eq!(result, json!({"results": []}));
    }

    #[tokio::test]
    async fn test_pricing_posts_items() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/pricing"))
            .and(body_json(json!({
                "items": [{"item_code": "LZA406103A", "unit": "EA"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prices": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client
            .pricing(&[PricingItem::each("LZA406103A")])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/NOPE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let error = client.product_details("NOPE").await.unwrap_err();
        assert!(matches!(error, ApiError::Status { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_malformed_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let error = client.health().await.unwrap_err();
        assert!(matches!(error, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_store_id_is_escaped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stores/12%2F3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "12/3"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client.store_details("12/3").await.unwrap();
    }
}

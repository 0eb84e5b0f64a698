use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// The error carries no URL, the request query holds the API key
    #[error("Geocoding request failed")]
    Request(#[source] reqwest::Error),
}

/// Resolves a free-text location to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate(&self, location: &str) -> Result<Coordinates, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

/// Geocoder backed by the Google Maps geocoding API
pub struct GoogleGeocoder {
    client: Client,
    url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn locate(&self, location: &str) -> Result<Coordinates, GeocodeError> {
        let response: GeocodeResponse = self
            .client
            .get(&self.url)
            .query(&[("address", location), ("key", self.api_key.as_str())])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(redacted)?
            .json()
            .await
            .map_err(redacted)?;

        if response.status != "OK" {
            tracing::debug!(status = %response.status, location, "geocoder returned no match");
            return Err(GeocodeError::LocationNotFound(location.to_string()));
        }

        response
            .results
            .into_iter()
            .next()
            .map(|result| result.geometry.location)
            .ok_or_else(|| GeocodeError::LocationNotFound(location.to_string()))
    }
}

fn redacted(error: reqwest::Error) -> GeocodeError {
    GeocodeError::Request(error.without_url())
}

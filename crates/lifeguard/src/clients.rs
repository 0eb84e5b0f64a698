//! HTTP clients for the services the capabilities call out to
pub mod geocoding;
pub mod pool_api;

pub use geocoding::{Coordinates, GeocodeError, Geocoder, GoogleGeocoder};
pub use pool_api::{ApiError, PoolApiClient, PricingItem};

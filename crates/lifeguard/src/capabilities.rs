//! Capabilities the model may invoke, and the registry that runs them
mod capability;
mod pricing;
mod products;
mod registry;
mod stores;

pub use capability::Capability;
pub use pricing::{GetPricing, ItemCode, PricingArgs};
pub use products::{
    ProductDetails, ProductDetailsArgs, SearchProducts, SearchProductsArgs, SemanticSearchArgs,
    SemanticSearchProducts,
};
pub use registry::{CapabilityRegistry, DEFAULT_TOOL_TIMEOUT};
pub use stores::{SearchStores, SearchStoresArgs, StoreDetails, StoreDetailsArgs};

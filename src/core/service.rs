//! Service traits for the external collaborators of the filter engine
//!
//! The engine is agnostic to where assets, facets and marketplaces come
//! from. [`crate::storage`] provides an in-memory implementation and a
//! GraphQL-over-HTTP client.

use crate::core::asset::{Address, AssetResult, Marketplace, NftDetail, Storefront, TraitGroup};
use crate::core::error::Result;
use crate::core::filter::QueryVariables;
use async_trait::async_trait;

/// Executes parameterized asset queries
///
/// Must be cheap to call repeatedly; the synchronizer re-invokes it on every
/// committed filter change.
#[async_trait]
pub trait AssetQueryService: Send + Sync {
    /// Run the query and return the complete result set
    async fn query(&self, variables: &QueryVariables) -> Result<Vec<AssetResult>>;
}

/// Supplies the trait groups available for a creator or owner
#[async_trait]
pub trait FacetCatalogProvider: Send + Sync {
    /// Trait groups in catalog order, or `None` if the address is unknown
    async fn trait_groups(&self, address: &Address) -> Result<Option<Vec<TraitGroup>>>;
}

/// Resolves page-level entities from a subdomain
#[async_trait]
pub trait MarketplaceDirectory: Send + Sync {
    async fn marketplace(&self, subdomain: &str) -> Result<Option<Marketplace>>;

    async fn storefront(&self, subdomain: &str) -> Result<Option<Storefront>>;
}

/// Looks up the full detail of a single NFT
#[async_trait]
pub trait AssetDetailService: Send + Sync {
    async fn nft(&self, address: &Address) -> Result<Option<NftDetail>>;
}

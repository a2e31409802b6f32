//! Page context resolution
//!
//! Resolves the read-only inputs of a page view (marketplace or storefront,
//! creator scope, facet catalog, NFT detail) before any filter state exists.
//! A missing entity is a [`PageError`], which callers turn into a not-found
//! response; the filter engine never sees it.

use crate::config::StorefrontConfig;
use crate::core::asset::{Address, Marketplace, NftDetail, Storefront, TraitGroup};
use crate::core::detail::DetailActions;
use crate::core::error::{PageError, Result};
use crate::core::filter::{PresetFilter, available_presets};
use crate::core::normalize::QueryContext;
use crate::core::service::{AssetDetailService, FacetCatalogProvider, MarketplaceDirectory};
use crate::core::store::FilterStateStore;
use std::sync::Arc;

/// A creator's collection inside a marketplace
#[derive(Debug, Clone)]
pub struct CreatorPage {
    pub marketplace: Marketplace,
    pub creator: Address,
    pub trait_groups: Vec<TraitGroup>,
}

impl CreatorPage {
    pub fn query_context(&self, wallet: Option<Address>) -> QueryContext {
        QueryContext::new(
            vec![self.creator.clone()],
            Some(self.marketplace.auction_house.address.clone()),
        )
        .with_wallet(wallet)
    }

    pub fn presets(&self, wallet_connected: bool) -> Vec<PresetFilter> {
        available_presets(wallet_connected, true)
    }

    /// Fresh filter store with one entry per trait group
    pub fn filter_store(&self) -> FilterStateStore {
        FilterStateStore::with_catalog(&self.trait_groups)
    }
}

/// A single-creator storefront home page
#[derive(Debug, Clone)]
pub struct StorefrontPage {
    pub storefront: Storefront,
    pub trait_groups: Vec<TraitGroup>,
}

impl StorefrontPage {
    pub fn query_context(&self, wallet: Option<Address>) -> QueryContext {
        QueryContext::new(vec![self.storefront.owner_address.clone()], None).with_wallet(wallet)
    }

    pub fn presets(&self, wallet_connected: bool) -> Vec<PresetFilter> {
        available_presets(wallet_connected, false)
    }

    pub fn filter_store(&self) -> FilterStateStore {
        FilterStateStore::with_catalog(&self.trait_groups)
    }
}

/// One NFT's detail page
#[derive(Debug, Clone)]
pub struct NftPage {
    pub storefront: Storefront,
    pub nft: NftDetail,
}

impl NftPage {
    pub fn actions(
        &self,
        wallet: Option<&Address>,
        auction_house: Option<&Address>,
    ) -> DetailActions {
        DetailActions::for_viewer(&self.nft, wallet, auction_house)
    }
}

/// Loads page context from the external collaborators
#[derive(Clone)]
pub struct PageLoader {
    config: StorefrontConfig,
    directory: Arc<dyn MarketplaceDirectory>,
    catalog: Arc<dyn FacetCatalogProvider>,
    details: Arc<dyn AssetDetailService>,
}

impl PageLoader {
    pub fn new(
        config: StorefrontConfig,
        directory: Arc<dyn MarketplaceDirectory>,
        catalog: Arc<dyn FacetCatalogProvider>,
        details: Arc<dyn AssetDetailService>,
    ) -> Self {
        Self {
            config,
            directory,
            catalog,
            details,
        }
    }

    fn subdomain(&self, header: Option<&str>) -> Result<String> {
        Ok(self
            .config
            .resolve_subdomain(header)
            .ok_or(PageError::MissingSubdomain)?)
    }

    /// Resolve a creator page; both the marketplace and the creator must exist
    pub async fn creator_page(
        &self,
        header: Option<&str>,
        creator: &Address,
    ) -> Result<CreatorPage> {
        let subdomain = self.subdomain(header)?;
        let (marketplace, trait_groups) = tokio::join!(
            self.directory.marketplace(&subdomain),
            self.catalog.trait_groups(creator)
        );

        let marketplace = marketplace?.ok_or_else(|| PageError::MarketplaceNotFound {
            subdomain: subdomain.clone(),
        })?;
        let trait_groups = trait_groups?.ok_or_else(|| PageError::CreatorNotFound {
            address: creator.to_string(),
        })?;

        tracing::debug!(
            subdomain = %subdomain,
            creator = %creator,
            groups = trait_groups.len(),
            "Creator page resolved"
        );

        Ok(CreatorPage {
            marketplace,
            creator: creator.clone(),
            trait_groups,
        })
    }

    /// Resolve a storefront home page
    ///
    /// The sidebar catalog is best effort: an unknown owner yields no groups.
    pub async fn storefront_page(&self, header: Option<&str>) -> Result<StorefrontPage> {
        let subdomain = self.subdomain(header)?;
        let storefront = self
            .directory
            .storefront(&subdomain)
            .await?
            .ok_or_else(|| PageError::StorefrontNotFound {
                subdomain: subdomain.clone(),
            })?;

        let trait_groups = self
            .catalog
            .trait_groups(&storefront.owner_address)
            .await?
            .unwrap_or_default();

        tracing::debug!(
            subdomain = %subdomain,
            groups = trait_groups.len(),
            "Storefront page resolved"
        );

        Ok(StorefrontPage {
            storefront,
            trait_groups,
        })
    }

    /// Resolve an NFT detail page
    pub async fn nft_page(&self, header: Option<&str>, address: &Address) -> Result<NftPage> {
        let subdomain = self.subdomain(header)?;
        let (storefront, nft) = tokio::join!(
            self.directory.storefront(&subdomain),
            self.details.nft(address)
        );

        let storefront = storefront?.ok_or_else(|| PageError::StorefrontNotFound {
            subdomain: subdomain.clone(),
        })?;
        let nft = nft?.ok_or_else(|| PageError::NftNotFound {
            address: address.to_string(),
        })?;

        Ok(NftPage { storefront, nft })
    }
}

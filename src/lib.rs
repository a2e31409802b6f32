//! # NFT Storefront
//!
//! Filter engine for browsing a marketplace's or creator's NFT collection.
//!
//! ## Features
//!
//! - **Facet filters**: per trait group multi-select, keyed by trait type
//! - **Presets**: All / Listed for sale / Owned by me as a tagged enum
//! - **Pure normalization**: UI state to wire-ready GraphQL variables
//! - **Race-free sync**: every filter change refetches; only the latest
//!   issued request may update the results
//! - **Pluggable backends**: in-memory store or a GraphQL indexer client
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! let loader = PageLoader::new(config, directory, catalog, details);
//! let page = loader.creator_page(Some("skellies"), &creator).await?;
//!
//! let store = page.filter_store();
//! let sync = QuerySynchronizer::mount(&store, service, page.query_context(wallet))?;
//!
//! store.set_preset(PresetFilter::Listed);   // refetches
//! let view = sync.view(config.placeholder_count);
//! ```

pub mod config;
pub mod core;
pub mod page;
pub mod storage;
pub mod sync;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Types ===
    pub use crate::core::{
        asset::{
            Address, AssetResult, AuctionHouse, FacetOption, Listing, Marketplace, NftAttribute,
            NftDetail, Storefront, TraitGroup, TraitVariant,
        },
        detail::{DetailAction, DetailActions},
        error::{ConfigError, PageError, QueryError, StorefrontError, SyncError},
        events::{EventBus, EventEnvelope, QueryEvent},
        filter::{AttributeFilter, FormState, PresetFilter, QueryVariables, available_presets},
        normalize::{QueryContext, normalize},
        presentation::{AssetCard, QueryStatus, ResultState, ResultView},
        service::{
            AssetDetailService, AssetQueryService, FacetCatalogProvider, MarketplaceDirectory,
        },
        store::{FilterStateStore, Subscription},
    };

    // === Engine ===
    pub use crate::sync::{QuerySynchronizer, SynchronizerBuilder};

    // === Pages ===
    pub use crate::page::{CreatorPage, NftPage, PageLoader, StorefrontPage};

    // === Config ===
    pub use crate::config::StorefrontConfig;

    // === Storage ===
    #[cfg(feature = "http")]
    pub use crate::storage::GraphQlClient;
    #[cfg(feature = "in-memory")]
    pub use crate::storage::{InMemoryStorefront, NftRecord};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}

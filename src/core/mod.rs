//! Core module containing the filter engine's types, traits and pure logic

pub mod asset;
pub mod detail;
pub mod error;
pub mod events;
pub mod filter;
pub mod normalize;
pub mod presentation;
pub mod service;
pub mod store;

pub use asset::{
    Address, AssetResult, AuctionHouse, FacetOption, Listing, Marketplace, NftAttribute,
    NftDetail, Storefront, TraitGroup, TraitVariant,
};
pub use detail::{DetailAction, DetailActions};
pub use error::{ConfigError, PageError, QueryError, StorefrontError, SyncError};
pub use events::{EventBus, EventEnvelope, QueryEvent};
pub use filter::{AttributeFilter, FormState, PresetFilter, QueryVariables, available_presets};
pub use normalize::{QueryContext, normalize};
pub use presentation::{AssetCard, QueryStatus, ResultState, ResultView};
pub use service::{
    AssetDetailService, AssetQueryService, FacetCatalogProvider, MarketplaceDirectory,
};
pub use store::{FilterStateStore, Subscription, SubscriptionId};

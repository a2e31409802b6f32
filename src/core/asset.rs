//! Asset, facet and marketplace value types
//!
//! Everything in this module is a read-only snapshot produced by an external
//! collaborator (asset query service, facet catalog, directory). The filter
//! engine copies these around but never mutates them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A base58 public key (wallet, mint, creator or auction house)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form used in sidebars, e.g. `7xKX...sAsU`
    pub fn truncated(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return self.0.clone();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Address {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// One valued variant inside a trait group, with the number of assets carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitVariant {
    pub name: String,
    pub count: u64,
}

/// A named category of attribute (e.g. "Background") and its variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitGroup {
    pub name: String,
    pub variants: Vec<TraitVariant>,
}

impl TraitGroup {
    /// Selectable options for this group, in variant order
    pub fn options(&self) -> Vec<FacetOption> {
        self.variants
            .iter()
            .map(|variant| FacetOption::from_variant(variant))
            .collect()
    }
}

/// A UI-shaped facet selection
///
/// Only `value` is sent to the query service; `label` exists for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
}

impl FacetOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    pub fn from_variant(variant: &TraitVariant) -> Self {
        Self {
            value: variant.name.clone(),
            label: format!("{} ({})", variant.name, variant.count),
        }
    }
}

/// An active listing of an asset on an auction house
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub address: Address,
    pub auction_house: Address,
    /// Price in lamports
    pub price: u64,
}

/// One item of a query result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetResult {
    pub address: Address,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

impl AssetResult {
    /// The listing placed on the given auction house, if any
    pub fn listing_on(&self, auction_house: &Address) -> Option<&Listing> {
        self.listings
            .iter()
            .find(|listing| &listing.auction_house == auction_house)
    }
}

/// Auction house backing a marketplace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionHouse {
    pub address: Address,
    #[serde(default)]
    pub treasury_mint: Option<Address>,
    #[serde(default)]
    pub authority: Option<Address>,
    #[serde(default)]
    pub seller_fee_basis_points: u16,
}

/// A marketplace, resolved from a subdomain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marketplace {
    pub subdomain: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub banner_url: String,
    pub owner_address: Address,
    #[serde(default)]
    pub creators: Vec<Address>,
    pub auction_house: AuctionHouse,
}

/// A single-creator storefront, resolved from a subdomain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Storefront {
    pub subdomain: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub banner_url: String,
    #[serde(default)]
    pub favicon_url: String,
    pub owner_address: Address,
}

/// A trait/value pair carried by a single NFT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftAttribute {
    pub trait_type: String,
    pub value: String,
}

/// Full detail of one NFT, as shown on its own page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftDetail {
    pub address: Address,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub mint_address: Option<Address>,
    #[serde(default)]
    pub seller_fee_basis_points: u16,
    #[serde(default)]
    pub attributes: Vec<NftAttribute>,
    #[serde(default)]
    pub owner: Option<Address>,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

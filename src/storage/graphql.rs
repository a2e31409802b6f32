//! GraphQL-over-HTTP client for a marketplace indexer
//!
//! Implements every collaborator trait against a single GraphQL endpoint.
//! Query variables are sent exactly as [`QueryVariables`] serializes them,
//! so the normalized shape is also the wire shape.

use crate::config::StorefrontConfig;
use crate::core::asset::{
    Address, AssetResult, AuctionHouse, Listing, Marketplace, NftAttribute, NftDetail, Storefront,
    TraitGroup,
};
use crate::core::error::{ConfigError, QueryError, Result};
use crate::core::filter::QueryVariables;
use crate::core::service::{
    AssetDetailService, AssetQueryService, FacetCatalogProvider, MarketplaceDirectory,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

pub const GET_NFTS: &str = r#"
query GetNfts($creators: [PublicKey!]!, $attributes: [AttributeFilter!], $owners: [PublicKey!], $listed: [PublicKey!]) {
  nfts(creators: $creators, attributes: $attributes, owners: $owners, listed: $listed) {
    address
    name
    description
    image
    listings {
      address
      auctionHouse
      price
    }
  }
}
"#;

pub const GET_CREATOR: &str = r#"
query GetCreator($address: String!) {
  creator(address: $address) {
    attributeGroups {
      name
      variants {
        name
        count
      }
    }
  }
}
"#;

pub const GET_MARKETPLACE: &str = r#"
query GetMarketplace($subdomain: String!) {
  marketplace(subdomain: $subdomain) {
    subdomain
    name
    description
    logoUrl
    bannerUrl
    ownerAddress
    creators {
      creatorAddress
    }
    auctionHouse {
      address
      treasuryMint
      authority
      sellerFeeBasisPoints
    }
  }
}
"#;

pub const GET_STOREFRONT: &str = r#"
query GetStorefront($subdomain: String!) {
  storefront(subdomain: $subdomain) {
    subdomain
    title
    description
    logoUrl
    faviconUrl
    bannerUrl
    ownerAddress
  }
}
"#;

pub const GET_NFT: &str = r#"
query GetNft($address: String!) {
  nft(address: $address) {
    address
    name
    description
    image
    mintAddress
    sellerFeeBasisPoints
    attributes {
      traitType
      value
    }
    owner {
      address
    }
    listings {
      address
      auctionHouse
      price
    }
  }
}
"#;

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorMessage>,
}

#[derive(Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

#[derive(Deserialize)]
struct NftsData {
    nfts: Vec<AssetResult>,
}

#[derive(Deserialize)]
struct CreatorData {
    creator: Option<CreatorNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatorNode {
    attribute_groups: Vec<TraitGroup>,
}

#[derive(Deserialize)]
struct MarketplaceData {
    marketplace: Option<MarketplaceNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketplaceNode {
    subdomain: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    logo_url: Option<String>,
    #[serde(default)]
    banner_url: Option<String>,
    owner_address: Address,
    #[serde(default)]
    creators: Vec<CreatorRef>,
    auction_house: AuctionHouse,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatorRef {
    creator_address: Address,
}

impl From<MarketplaceNode> for Marketplace {
    fn from(node: MarketplaceNode) -> Self {
        Marketplace {
            subdomain: node.subdomain,
            name: node.name,
            description: node.description.unwrap_or_default(),
            logo_url: node.logo_url.unwrap_or_default(),
            banner_url: node.banner_url.unwrap_or_default(),
            owner_address: node.owner_address,
            creators: node
                .creators
                .into_iter()
                .map(|creator| creator.creator_address)
                .collect(),
            auction_house: node.auction_house,
        }
    }
}

#[derive(Deserialize)]
struct StorefrontData {
    storefront: Option<Storefront>,
}

#[derive(Deserialize)]
struct NftData {
    nft: Option<NftNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NftNode {
    address: Address,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    mint_address: Option<Address>,
    #[serde(default)]
    seller_fee_basis_points: u16,
    #[serde(default)]
    attributes: Vec<NftAttribute>,
    #[serde(default)]
    owner: Option<OwnerNode>,
    #[serde(default)]
    listings: Vec<Listing>,
}

#[derive(Deserialize)]
struct OwnerNode {
    address: Address,
}

impl From<NftNode> for NftDetail {
    fn from(node: NftNode) -> Self {
        NftDetail {
            address: node.address,
            name: node.name,
            description: node.description.unwrap_or_default(),
            image: node.image.unwrap_or_default(),
            mint_address: node.mint_address,
            seller_fee_basis_points: node.seller_fee_basis_points,
            attributes: node.attributes,
            owner: node.owner.map(|owner| owner.address),
            listings: node.listings,
        }
    }
}

/// Client for a marketplace indexer's GraphQL endpoint
#[derive(Clone)]
pub struct GraphQlClient {
    endpoint: String,
    http: reqwest::Client,
}

impl GraphQlClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    /// Build a client from the configured endpoint and timeout
    pub fn from_config(config: &StorefrontConfig) -> Result<Self> {
        let endpoint = config
            .graphql_endpoint
            .clone()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "graphql_endpoint".to_string(),
                message: "required for the GraphQL client".to_string(),
            })?;
        Self::new(endpoint, Duration::from_secs(config.request_timeout_secs))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let response: GraphQlResponse<T> = self
            .http
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.errors.is_empty() {
            return Err(QueryError::Rejected {
                messages: response.errors.into_iter().map(|e| e.message).collect(),
            }
            .into());
        }

        Ok(response.data.ok_or_else(|| {
            QueryError::Malformed("response carries neither data nor errors".to_string())
        })?)
    }
}

#[async_trait]
impl AssetQueryService for GraphQlClient {
    async fn query(&self, variables: &QueryVariables) -> Result<Vec<AssetResult>> {
        // `[null]` owners and `[]` listed are not valid indexer input
        if variables.matches_nothing() {
            tracing::debug!("Query cannot match any asset, not sent to indexer");
            return Ok(Vec::new());
        }

        let data: NftsData = self.execute(GET_NFTS, serde_json::to_value(variables)?).await?;
        tracing::debug!(items = data.nfts.len(), "GraphQL nfts query resolved");
        Ok(data.nfts)
    }
}

#[async_trait]
impl FacetCatalogProvider for GraphQlClient {
    async fn trait_groups(&self, address: &Address) -> Result<Option<Vec<TraitGroup>>> {
        let data: CreatorData = self
            .execute(GET_CREATOR, json!({ "address": address }))
            .await?;
        Ok(data.creator.map(|creator| creator.attribute_groups))
    }
}

#[async_trait]
impl MarketplaceDirectory for GraphQlClient {
    async fn marketplace(&self, subdomain: &str) -> Result<Option<Marketplace>> {
        let data: MarketplaceData = self
            .execute(GET_MARKETPLACE, json!({ "subdomain": subdomain }))
            .await?;
        Ok(data.marketplace.map(Marketplace::from))
    }

    async fn storefront(&self, subdomain: &str) -> Result<Option<Storefront>> {
        let data: StorefrontData = self
            .execute(GET_STOREFRONT, json!({ "subdomain": subdomain }))
            .await?;
        Ok(data.storefront)
    }
}

#[async_trait]
impl AssetDetailService for GraphQlClient {
    async fn nft(&self, address: &Address) -> Result<Option<NftDetail>> {
        let data: NftData = self.execute(GET_NFT, json!({ "address": address })).await?;
        Ok(data.nft.map(NftDetail::from))
    }
}

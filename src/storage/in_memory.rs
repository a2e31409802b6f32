//! In-memory implementation of every storefront collaborator, for testing
//! and development

use crate::core::asset::{
    Address, AssetResult, Marketplace, NftDetail, Storefront, TraitGroup, TraitVariant,
};
use crate::core::error::{QueryError, Result};
use crate::core::filter::{AttributeFilter, QueryVariables};
use crate::core::service::{
    AssetDetailService, AssetQueryService, FacetCatalogProvider, MarketplaceDirectory,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// An NFT together with the creators it is attributed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftRecord {
    pub nft: NftDetail,
    pub creators: Vec<Address>,
}

impl NftRecord {
    pub fn new(nft: NftDetail, creators: Vec<Address>) -> Self {
        Self { nft, creators }
    }

    fn has_attribute(&self, filter: &AttributeFilter) -> bool {
        self.nft.attributes.iter().any(|attribute| {
            attribute.trait_type == filter.trait_type && filter.values.contains(&attribute.value)
        })
    }

    /// Whether this record satisfies every constraint of the query
    ///
    /// Groups are ANDed, values inside a group are ORed. A `None` owner entry
    /// never matches.
    pub fn matches(&self, variables: &QueryVariables) -> bool {
        let by_creator = self
            .creators
            .iter()
            .any(|creator| variables.creators.contains(creator));

        let by_attributes = variables
            .attributes
            .iter()
            .all(|filter| self.has_attribute(filter));

        let by_owner = variables.owners.as_ref().is_none_or(|owners| {
            owners
                .iter()
                .flatten()
                .any(|owner| self.nft.owner.as_ref() == Some(owner))
        });

        let by_listing = variables.listed.as_ref().is_none_or(|houses| {
            self.nft
                .listings
                .iter()
                .any(|listing| houses.contains(&listing.auction_house))
        });

        by_creator && by_attributes && by_owner && by_listing
    }

    pub fn to_result(&self) -> AssetResult {
        AssetResult {
            address: self.nft.address.clone(),
            name: self.nft.name.clone(),
            description: self.nft.description.clone(),
            image: self.nft.image.clone(),
            listings: self.nft.listings.clone(),
        }
    }
}

#[derive(Default)]
struct Tables {
    nfts: IndexMap<Address, NftRecord>,
    marketplaces: IndexMap<String, Marketplace>,
    storefronts: IndexMap<String, Storefront>,
}

/// In-memory storefront backend
///
/// Uses RwLock for thread-safe access; clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStorefront {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorefront {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        Ok(self
            .tables
            .read()
            .map_err(|e| QueryError::Storage(format!("Failed to acquire read lock: {}", e)))?)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        Ok(self
            .tables
            .write()
            .map_err(|e| QueryError::Storage(format!("Failed to acquire write lock: {}", e)))?)
    }

    /// Insert or replace an NFT, keyed by its address
    pub fn insert_nft(&self, record: NftRecord) -> Result<()> {
        self.write()?
            .nfts
            .insert(record.nft.address.clone(), record);
        Ok(())
    }

    pub fn insert_marketplace(&self, marketplace: Marketplace) -> Result<()> {
        self.write()?
            .marketplaces
            .insert(marketplace.subdomain.clone(), marketplace);
        Ok(())
    }

    pub fn insert_storefront(&self, storefront: Storefront) -> Result<()> {
        self.write()?
            .storefronts
            .insert(storefront.subdomain.clone(), storefront);
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.nfts.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.nfts.is_empty())
    }
}

impl Tables {
    fn knows(&self, address: &Address) -> bool {
        self.marketplaces
            .values()
            .any(|m| &m.owner_address == address || m.creators.contains(address))
            || self
                .storefronts
                .values()
                .any(|s| &s.owner_address == address)
    }
}

#[async_trait]
impl AssetQueryService for InMemoryStorefront {
    async fn query(&self, variables: &QueryVariables) -> Result<Vec<AssetResult>> {
        let tables = self.read()?;

        Ok(tables
            .nfts
            .values()
            .filter(|record| record.matches(variables))
            .map(NftRecord::to_result)
            .collect())
    }
}

#[async_trait]
impl FacetCatalogProvider for InMemoryStorefront {
    /// Trait groups of every NFT created or held by `address`
    ///
    /// Groups appear in first-seen order; variants are sorted by name.
    async fn trait_groups(&self, address: &Address) -> Result<Option<Vec<TraitGroup>>> {
        let tables = self.read()?;

        let mut found = false;
        let mut groups: IndexMap<String, BTreeMap<String, u64>> = IndexMap::new();
        for record in tables.nfts.values() {
            let related =
                record.creators.contains(address) || record.nft.owner.as_ref() == Some(address);
            if !related {
                continue;
            }
            found = true;
            for attribute in &record.nft.attributes {
                *groups
                    .entry(attribute.trait_type.clone())
                    .or_default()
                    .entry(attribute.value.clone())
                    .or_default() += 1;
            }
        }

        if !found && !tables.knows(address) {
            return Ok(None);
        }

        Ok(Some(
            groups
                .into_iter()
                .map(|(name, variants)| TraitGroup {
                    name,
                    variants: variants
                        .into_iter()
                        .map(|(name, count)| TraitVariant { name, count })
                        .collect(),
                })
                .collect(),
        ))
    }
}

#[async_trait]
impl MarketplaceDirectory for InMemoryStorefront {
    async fn marketplace(&self, subdomain: &str) -> Result<Option<Marketplace>> {
        Ok(self.read()?.marketplaces.get(subdomain).cloned())
    }

    async fn storefront(&self, subdomain: &str) -> Result<Option<Storefront>> {
        Ok(self.read()?.storefronts.get(subdomain).cloned())
    }
}

#[async_trait]
impl AssetDetailService for InMemoryStorefront {
    async fn nft(&self, address: &Address) -> Result<Option<NftDetail>> {
        Ok(self.read()?.nfts.get(address).map(|record| record.nft.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::{Listing, NftAttribute};

    fn record(
        address: &str,
        owner: &str,
        traits: &[(&str, &str)],
        listed_on: Option<&str>,
    ) -> NftRecord {
        NftRecord::new(
            NftDetail {
                address: address.into(),
                name: format!("Skull {}", address),
                description: String::new(),
                image: String::new(),
                mint_address: None,
                seller_fee_basis_points: 500,
                attributes: traits
                    .iter()
                    .map(|(trait_type, value)| NftAttribute {
                        trait_type: trait_type.to_string(),
                        value: value.to_string(),
                    })
                    .collect(),
                owner: Some(owner.into()),
                listings: listed_on
                    .map(|house| {
                        vec![Listing {
                            address: format!("L-{}", address).into(),
                            auction_house: house.into(),
                            price: 1_000,
                        }]
                    })
                    .unwrap_or_default(),
            },
            vec!["C".into()],
        )
    }

    fn seeded() -> InMemoryStorefront {
        let store = InMemoryStorefront::new();
        store
            .insert_nft(record(
                "N1",
                "W1",
                &[("Background", "Blue"), ("Eyes", "Laser")],
                Some("AH1"),
            ))
            .unwrap();
        store
            .insert_nft(record("N2", "W2", &[("Background", "Red"), ("Eyes", "Laser")], None))
            .unwrap();
        store
            .insert_nft(record(
                "N3",
                "W1",
                &[("Background", "Blue"), ("Eyes", "Sleepy")],
                Some("AH2"),
            ))
            .unwrap();
        store
    }

    fn addresses(results: &[AssetResult]) -> Vec<&str> {
        results.iter().map(|r| r.address.as_str()).collect()
    }

    #[tokio::test]
    async fn test_query_by_creator() {
        let store = seeded();
        let all = store
            .query(&QueryVariables::for_creators(vec!["C".into()]))
            .await
            .unwrap();
        assert_eq!(addresses(&all), vec!["N1", "N2", "N3"]);

        let none = store
            .query(&QueryVariables::for_creators(vec!["Other".into()]))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_query_attributes_and_across_groups_or_within() {
        let store = seeded();
        let mut vars = QueryVariables::for_creators(vec!["C".into()]);
        vars.attributes = vec![
            AttributeFilter::new("Background", ["Blue", "Red"]),
            AttributeFilter::new("Eyes", ["Laser"]),
        ];

        let results = store.query(&vars).await.unwrap();
        assert_eq!(addresses(&results), vec!["N1", "N2"]);
    }

    #[tokio::test]
    async fn test_query_owners_and_listed() {
        let store = seeded();

        let mut vars = QueryVariables::for_creators(vec!["C".into()]);
        vars.owners = Some(vec![Some("W1".into())]);
        assert_eq!(addresses(&store.query(&vars).await.unwrap()), vec!["N1", "N3"]);

        vars.owners = Some(vec![None]);
        assert!(store.query(&vars).await.unwrap().is_empty());

        vars.owners = None;
        vars.listed = Some(vec!["AH1".into()]);
        assert_eq!(addresses(&store.query(&vars).await.unwrap()), vec!["N1"]);
    }

    #[tokio::test]
    async fn test_trait_groups_counts() {
        let store = seeded();
        let groups = store.trait_groups(&"C".into()).await.unwrap().unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Background");
        assert_eq!(
            groups[0].variants,
            vec![
                TraitVariant {
                    name: "Blue".to_string(),
                    count: 2
                },
                TraitVariant {
                    name: "Red".to_string(),
                    count: 1
                },
            ]
        );

        let owned = store.trait_groups(&"W2".into()).await.unwrap().unwrap();
        assert_eq!(owned[1].variants.len(), 1);
    }

    #[tokio::test]
    async fn test_trait_groups_unknown_address() {
        let store = seeded();
        assert!(store.trait_groups(&"Nobody".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_detail_lookup() {
        let store = seeded();
        let nft = store.nft(&"N2".into()).await.unwrap().unwrap();
        assert_eq!(nft.owner, Some("W2".into()));
        assert!(store.nft(&"N9".into()).await.unwrap().is_none());
        assert_eq!(store.len().unwrap(), 3);
    }
}

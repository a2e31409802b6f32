//! Filter state and query variable shapes
//!
//! [`FormState`] is the UI-shaped selection owned by the filter store.
//! [`QueryVariables`] is the wire-ready shape handed to the asset query
//! service. The only way from one to the other is
//! [`normalize`](crate::core::normalize::normalize).

use crate::core::asset::{Address, FacetOption, TraitGroup};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// High-level filter shortcut, mutually exclusive by construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetFilter {
    /// Every asset in scope
    #[default]
    All,
    /// Assets with an active listing on the marketplace auction house
    Listed,
    /// Assets held by the connected wallet
    Owned,
}

impl PresetFilter {
    /// Label shown next to the preset radio
    pub fn label(&self) -> &'static str {
        match self {
            PresetFilter::All => "All",
            PresetFilter::Listed => "Listed for sale",
            PresetFilter::Owned => "Owned by me",
        }
    }

    /// Stable identifier used as the radio input id
    pub fn id(&self) -> &'static str {
        match self {
            PresetFilter::All => "preset-all",
            PresetFilter::Listed => "preset-listed",
            PresetFilter::Owned => "preset-owned",
        }
    }
}

/// Presets a page should offer
///
/// `All` is always offered. `Listed` needs an auction house in scope and
/// `Owned` needs a connected wallet.
pub fn available_presets(wallet_connected: bool, has_auction_house: bool) -> Vec<PresetFilter> {
    let mut presets = vec![PresetFilter::All];
    if has_auction_house {
        presets.push(PresetFilter::Listed);
    }
    if wallet_connected {
        presets.push(PresetFilter::Owned);
    }
    presets
}

/// One trait group's constraint, in wire format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeFilter {
    pub trait_type: String,
    pub values: Vec<String>,
}

impl AttributeFilter {
    pub fn new<I, S>(trait_type: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trait_type: trait_type.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// The user's current selections
///
/// Groups are keyed by trait type. Iteration order is catalog order when the
/// state was seeded from a catalog, then first-edit order for any group the
/// catalog did not name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    pub preset: PresetFilter,
    pub attributes: IndexMap<String, Vec<FacetOption>>,
}

impl FormState {
    /// Initial state with one unconstrained entry per catalog group
    pub fn from_catalog(groups: &[TraitGroup]) -> Self {
        Self {
            preset: PresetFilter::All,
            attributes: groups
                .iter()
                .map(|group| (group.name.clone(), Vec::new()))
                .collect(),
        }
    }

    /// Selected options for a group (empty if the group is unconstrained)
    pub fn selection(&self, trait_type: &str) -> &[FacetOption] {
        self.attributes
            .get(trait_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether any facet or a non-default preset is active
    pub fn is_filtered(&self) -> bool {
        self.preset != PresetFilter::All
            || self.attributes.values().any(|values| !values.is_empty())
    }
}

/// Normalized, wire-ready query variables
///
/// `owners` and `listed` serialize as explicit `null` when absent. An
/// `owners` entry of `None` stands for "no connected wallet" and an empty
/// `listed` for "no auction house in scope"; neither can match an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVariables {
    pub creators: Vec<Address>,
    pub attributes: Vec<AttributeFilter>,
    pub owners: Option<Vec<Option<Address>>>,
    pub listed: Option<Vec<Address>>,
}

impl QueryVariables {
    /// Unfiltered variables for a creator scope
    pub fn for_creators(creators: Vec<Address>) -> Self {
        Self {
            creators,
            attributes: Vec::new(),
            owners: None,
            listed: None,
        }
    }

    /// True when a preset constraint names no real owner or auction house
    pub fn matches_nothing(&self) -> bool {
        let no_owner = self
            .owners
            .as_ref()
            .is_some_and(|owners| owners.iter().all(Option::is_none));
        let no_auction_house = self.listed.as_ref().is_some_and(Vec::is_empty);
        no_owner || no_auction_house
    }
}

//! Filter normalization
//!
//! Pure mapping from [`FormState`] plus the page-level [`QueryContext`] to
//! [`QueryVariables`]. Identical inputs always produce identical output.

use crate::core::asset::Address;
use crate::core::filter::{AttributeFilter, FormState, PresetFilter, QueryVariables};
use serde::{Deserialize, Serialize};

/// Contextual, read-only inputs to normalization
///
/// `creators` and `auction_house` come from the page route and stay fixed
/// for the page view. `wallet` follows the wallet connection provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    pub creators: Vec<Address>,
    pub auction_house: Option<Address>,
    pub wallet: Option<Address>,
}

impl QueryContext {
    pub fn new(creators: Vec<Address>, auction_house: Option<Address>) -> Self {
        Self {
            creators,
            auction_house,
            wallet: None,
        }
    }

    pub fn with_wallet(mut self, wallet: Option<Address>) -> Self {
        self.wallet = wallet;
        self
    }
}

/// Normalize form state into wire-ready query variables
///
/// 1. Groups without selected values are dropped; kept groups carry option
///    values only, labels are discarded.
/// 2. The preset resolves to at most one of `owners` / `listed`.
/// 3. `creators` is copied from the context unchanged.
pub fn normalize(form: &FormState, context: &QueryContext) -> QueryVariables {
    let attributes = form
        .attributes
        .iter()
        .filter(|(_, selected)| !selected.is_empty())
        .map(|(trait_type, selected)| AttributeFilter {
            trait_type: trait_type.clone(),
            values: selected.iter().map(|option| option.value.clone()).collect(),
        })
        .collect();

    let (owners, listed) = match form.preset {
        PresetFilter::All => (None, None),
        PresetFilter::Owned => (Some(vec![context.wallet.clone()]), None),
        PresetFilter::Listed => (None, Some(context.auction_house.iter().cloned().collect())),
    };

    QueryVariables {
        creators: context.creators.clone(),
        attributes,
        owners,
        listed,
    }
}

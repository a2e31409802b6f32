//! Per-asset detail view model

use crate::core::asset::{Address, Listing, NftDetail};
use serde::Serialize;

/// An action the detail page offers to the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailAction {
    MakeOffer,
    SellNft,
    BuyNow,
}

impl DetailAction {
    pub fn label(&self) -> &'static str {
        match self {
            DetailAction::MakeOffer => "Make Offer",
            DetailAction::SellNft => "Sell NFT",
            DetailAction::BuyNow => "Buy Now",
        }
    }

    /// Relative path of the sub-view for this action, if it has one
    pub fn path(&self, nft: &Address) -> Option<String> {
        match self {
            DetailAction::MakeOffer => Some(format!("/nfts/{}/offers/new", nft)),
            DetailAction::SellNft => Some(format!("/nfts/{}/listings/new", nft)),
            DetailAction::BuyNow => None,
        }
    }
}

/// What the detail page shows for one viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailActions {
    pub is_owner: bool,
    pub listing: Option<Listing>,
    pub actions: Vec<DetailAction>,
}

impl DetailActions {
    /// Derive the available actions from ownership and listing state
    ///
    /// Owners may sell, everyone else may make an offer. Buying needs a
    /// listing on the marketplace's auction house and a viewer who is not the
    /// owner.
    pub fn for_viewer(
        nft: &NftDetail,
        wallet: Option<&Address>,
        auction_house: Option<&Address>,
    ) -> Self {
        let is_owner = matches!((wallet, nft.owner.as_ref()), (Some(w), Some(o)) if w == o);
        let listing = auction_house.and_then(|house| {
            nft.listings
                .iter()
                .find(|listing| &listing.auction_house == house)
                .cloned()
        });

        let mut actions = Vec::new();
        if is_owner {
            actions.push(DetailAction::SellNft);
        } else {
            actions.push(DetailAction::MakeOffer);
            if listing.is_some() {
                actions.push(DetailAction::BuyNow);
            }
        }

        Self {
            is_owner,
            listing,
            actions,
        }
    }
}

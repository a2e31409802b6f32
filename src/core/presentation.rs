//! Result presentation
//!
//! [`ResultState`] is what the synchronizer publishes; [`ResultView`] is
//! what a page renders from it. Rendering is a pure function of the state.

use crate::core::asset::{Address, AssetResult};
use serde::Serialize;

pub const EMPTY_TITLE: &str = "No NFTs found";
pub const EMPTY_MESSAGE: &str = "No NFTs found matching these criteria.";

/// Status of the most recently issued request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryStatus {
    Loading,
    Success,
    Error { message: String },
}

/// Presentation state for one view
///
/// `sequence` is the number of the latest issued request. Only a response
/// carrying that number may replace `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultState {
    pub sequence: u64,
    #[serde(flatten)]
    pub status: QueryStatus,
    pub items: Vec<AssetResult>,
}

impl ResultState {
    /// State before the first request is issued
    pub fn idle() -> Self {
        Self {
            sequence: 0,
            status: QueryStatus::Loading,
            items: Vec::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, QueryStatus::Error { .. })
    }

    /// Mark a new request as in flight and return its sequence number
    ///
    /// Items of the previous cycle are dropped; they are never shown next to
    /// a newer request's status.
    pub(crate) fn begin(&mut self) -> u64 {
        self.sequence += 1;
        self.status = QueryStatus::Loading;
        self.items.clear();
        self.sequence
    }
}

impl Default for ResultState {
    fn default() -> Self {
        Self::idle()
    }
}

/// One grid card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetCard {
    pub address: Address,
    pub name: String,
    pub image: String,
    pub href: String,
    /// Lamport price of the listing on the marketplace auction house
    pub price: Option<u64>,
}

impl AssetCard {
    pub fn from_asset(asset: &AssetResult, auction_house: Option<&Address>) -> Self {
        Self {
            address: asset.address.clone(),
            name: asset.name.clone(),
            image: asset.image.clone(),
            href: format!("/nfts/{}", asset.address),
            price: auction_house
                .and_then(|house| asset.listing_on(house))
                .map(|listing| listing.price),
        }
    }
}

/// What the result area should show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ResultView {
    Loading { placeholders: usize },
    Empty { title: String, message: String },
    Grid { cards: Vec<AssetCard> },
    Error { message: String },
}

impl ResultView {
    /// Render a presentation state
    ///
    /// Loading always wins over data, so an empty result set is only reported
    /// once the request has actually resolved.
    pub fn render(
        state: &ResultState,
        placeholders: usize,
        auction_house: Option<&Address>,
    ) -> Self {
        match &state.status {
            QueryStatus::Loading => ResultView::Loading { placeholders },
            QueryStatus::Error { message } => ResultView::Error {
                message: message.clone(),
            },
            QueryStatus::Success if state.items.is_empty() => ResultView::Empty {
                title: EMPTY_TITLE.to_string(),
                message: EMPTY_MESSAGE.to_string(),
            },
            QueryStatus::Success => ResultView::Grid {
                cards: state
                    .items
                    .iter()
                    .map(|asset| AssetCard::from_asset(asset, auction_house))
                    .collect(),
            },
        }
    }
}

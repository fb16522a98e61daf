use serde::{Deserialize, Serialize};

/// The lifecycle state of an auction listing.
///
/// Auctions are created `Active` and only leave that state when their
/// creator closes them. There is no server-side scheduler: an auction past
/// its deadline simply stops accepting bids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    /// The auction is open for bids (subject to its deadline)
    Active,
    /// The auction has been closed and accepts no further bids
    Closed,
}

impl AuctionStatus {
    /// The canonical string form, as stored by adapters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, thiserror::Error)]
#[error("unknown auction status: {0}")]
pub struct InvalidStatus(pub String);

impl std::str::FromStr for AuctionStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            other => Err(InvalidStatus(other.to_owned())),
        }
    }
}

impl std::fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller-supplied fields of a new auction listing.
///
/// Everything else on [`AuctionRecord`] is assigned by the application
/// (identifiers, creator, timestamps) or derived from the bid table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AuctionData<DateTime> {
    /// Short product title
    pub title: String,
    /// Optional free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional URL of an already-uploaded product image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// The floor price; the first bid must strictly exceed this
    pub base_price: f64,
    /// The instant after which no further bids are accepted
    pub deadline: DateTime,
}

/// An auction listing together with its derived bid statistics.
///
/// `current_bid` is never stored: it is the maximum bid amount for the
/// auction at read time, or `None` when no bids exist yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AuctionRecord<DateTime, BidderId, AuctionId> {
    /// The unique identifier of the auction
    pub id: AuctionId,
    /// The bidder who created the listing
    pub creator_id: BidderId,
    /// Short product title
    pub title: String,
    /// Optional free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional URL of the product image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// The floor price
    pub base_price: f64,
    /// The instant after which no further bids are accepted
    pub deadline: DateTime,
    /// Lifecycle state
    pub status: AuctionStatus,
    /// When the listing was created
    pub created_at: DateTime,
    /// The highest bid amount, if any bids exist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_bid: Option<f64>,
    /// The total number of bids placed
    pub bid_count: i64,
}

impl<DateTime, BidderId, AuctionId> AuctionRecord<DateTime, BidderId, AuctionId> {
    /// The baseline a new bid must strictly exceed: the current highest bid,
    /// or the base price when no bids exist yet.
    pub fn baseline(&self) -> f64 {
        self.current_bid.unwrap_or(self.base_price)
    }
}

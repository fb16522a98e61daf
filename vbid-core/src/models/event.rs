use serde::{Deserialize, Serialize};

/// A change notification emitted by the store after a successful write.
///
/// Events carry identifiers rather than full records: consumers re-read the
/// state they care about on notification. This keeps the subscription
/// contract independent of what any particular view needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent<DateTime, AuctionId, BidId> {
    /// A new auction listing was created
    AuctionCreated {
        /// The new auction
        auction_id: AuctionId,
        /// When it was created
        at: DateTime,
    },
    /// A bid landed on an auction
    BidPlaced {
        /// The auction the bid was placed on
        auction_id: AuctionId,
        /// The new bid
        bid_id: BidId,
        /// The accepted amount
        amount: f64,
        /// When the bid landed
        at: DateTime,
    },
}

impl<DateTime, AuctionId: PartialEq, BidId> AuctionEvent<DateTime, AuctionId, BidId> {
    /// The auction this event concerns.
    pub fn auction_id(&self) -> &AuctionId {
        match self {
            Self::AuctionCreated { auction_id, .. } => auction_id,
            Self::BidPlaced { auction_id, .. } => auction_id,
        }
    }
}

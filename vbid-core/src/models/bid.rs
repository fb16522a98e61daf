use serde::{Deserialize, Serialize};

/// A persisted bid.
///
/// `bidder_name` is denormalized from the bidder's profile at insert time so
/// the history display needs no join; a bidder without a profile is recorded
/// as "Anonymous".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct BidRecord<DateTime, BidderId, AuctionId, BidId> {
    /// The unique identifier of the bid
    pub id: BidId,
    /// The auction this bid was placed on
    pub auction_id: AuctionId,
    /// The bidder who placed it
    pub bidder_id: BidderId,
    /// The bidder's display name at the time of the bid
    pub bidder_name: String,
    /// The bid amount, in dollars
    pub amount: f64,
    /// When the bid landed
    pub created_at: DateTime,
}

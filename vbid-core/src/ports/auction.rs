use super::Repository;
use crate::models::{AuctionData, AuctionRecord};

/// Repository interface for auction listings.
///
/// Auctions are the read baseline for every bid: the derived `current_bid`
/// on the returned records is what a new bid must strictly exceed.
pub trait AuctionRepository: Repository {
    /// Create a new listing owned by `creator_id`.
    fn create_auction(
        &self,
        auction_id: Self::AuctionId,
        creator_id: Self::BidderId,
        data: AuctionData<Self::DateTime>,
        as_of: Self::DateTime,
    ) -> impl Future<
        Output = Result<AuctionRecord<Self::DateTime, Self::BidderId, Self::AuctionId>, Self::Error>,
    > + Send;

    /// Retrieve a single listing with its derived bid statistics, returning
    /// `None` if it does not exist.
    fn get_auction(
        &self,
        auction_id: Self::AuctionId,
    ) -> impl Future<
        Output = Result<
            Option<AuctionRecord<Self::DateTime, Self::BidderId, Self::AuctionId>>,
            Self::Error,
        >,
    > + Send;

    /// Query all listings that are still accepting bids as of the given
    /// instant (active status and unexpired deadline), newest first.
    fn query_auctions(
        &self,
        as_of: Self::DateTime,
    ) -> impl Future<
        Output = Result<
            Vec<AuctionRecord<Self::DateTime, Self::BidderId, Self::AuctionId>>,
            Self::Error,
        >,
    > + Send;
}

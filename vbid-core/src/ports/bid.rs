use super::AuctionRepository;
use crate::models::{BidRecord, DateTimeRangeQuery, DateTimeRangeResponse};

/// The ways a bid insert may be refused by the store.
///
/// These are domain rejections, not infrastructure errors; they travel in
/// the inner `Result` of [`BidRepository::insert_bid`].
#[derive(Debug, Clone, PartialEq)]
pub enum BidFailure {
    /// No such auction exists
    AuctionNotFound,
    /// The auction is closed or past its deadline
    AuctionClosed,
    /// The amount does not strictly exceed the baseline that held at insert
    /// time; `baseline` is the fresh value the bid lost against
    TooLow {
        /// The current highest bid, or the base price if no bids exist
        baseline: f64,
    },
}

/// Repository trait for bid submission and history retrieval.
///
/// `insert_bid` is the persistence half of the bid submission gateway: the
/// amount is re-checked against the baseline *inside* the store's write
/// path, so two bidders racing from the same stale read cannot both land.
pub trait BidRepository: AuctionRepository {
    /// Persist a bid, atomically verifying that `amount` still strictly
    /// exceeds the auction's baseline.
    ///
    /// The bidder's display name is resolved from their profile at insert
    /// time ("Anonymous" if none exists).
    ///
    /// # Returns
    ///
    /// - `Ok(Ok(record))` if the bid landed
    /// - `Ok(Err(failure))` if the store refused it
    /// - `Err(_)` on infrastructure failure; the bid may not have landed
    fn insert_bid(
        &self,
        bid_id: Self::BidId,
        auction_id: Self::AuctionId,
        bidder_id: Self::BidderId,
        amount: f64,
        as_of: Self::DateTime,
    ) -> impl Future<
        Output = Result<
            Result<
                BidRecord<Self::DateTime, Self::BidderId, Self::AuctionId, Self::BidId>,
                BidFailure,
            >,
            Self::Error,
        >,
    > + Send;

    /// Retrieve the bid history for an auction, newest first, paginated.
    fn get_bid_history(
        &self,
        auction_id: Self::AuctionId,
        query: DateTimeRangeQuery<Self::DateTime>,
        limit: usize,
    ) -> impl Future<
        Output = Result<
            DateTimeRangeResponse<
                BidRecord<Self::DateTime, Self::BidderId, Self::AuctionId, Self::BidId>,
                Self::DateTime,
            >,
            Self::Error,
        >,
    > + Send;

    /// The baseline a new bid must strictly exceed right now, or `None` if
    /// the auction does not exist.
    fn current_baseline(
        &self,
        auction_id: Self::AuctionId,
    ) -> impl Future<Output = Result<Option<f64>, Self::Error>> + Send;
}

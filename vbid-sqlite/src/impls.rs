mod auction;
mod bid;
mod notifier;
mod profile;

pub use notifier::EventFeed;

use crate::{
    Db,
    types::{AuctionId, BidId, BidderId, DateTime},
};
use vbid_core::ports::Repository;

impl Repository for Db {
    type Error = sqlx::Error;
    type DateTime = DateTime;
    type BidderId = BidderId;
    type AuctionId = AuctionId;
    type BidId = BidId;
}

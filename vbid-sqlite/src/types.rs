//! Type definitions for the SQLite implementation.
//!
//! This module contains both public types used throughout the crate and
//! internal types used for database row mapping. The public types include
//! strongly-typed IDs and datetime representations that ensure type safety
//! across the system.

use std::str::FromStr as _;

use vbid_core::models::{AuctionRecord, BidRecord, ProfileRecord};

mod datetime;
pub use datetime::DateTime;

mod ids;
pub use ids::{AuctionId, BidId, BidderId};

#[derive(sqlx::FromRow)]
pub(crate) struct AuctionRow {
    pub id: AuctionId,
    pub creator_id: BidderId,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub base_price: f64,
    pub deadline: DateTime,
    pub status: String,
    pub created_at: DateTime,
    pub current_bid: Option<f64>,
    pub bid_count: i64,
}

impl TryFrom<AuctionRow> for AuctionRecord<DateTime, BidderId, AuctionId> {
    type Error = sqlx::Error;

    fn try_from(row: AuctionRow) -> Result<Self, Self::Error> {
        let status = vbid_core::models::AuctionStatus::from_str(&row.status)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Self {
            id: row.id,
            creator_id: row.creator_id,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            base_price: row.base_price,
            deadline: row.deadline,
            status,
            created_at: row.created_at,
            current_bid: row.current_bid,
            bid_count: row.bid_count,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BidRow {
    pub id: BidId,
    pub auction_id: AuctionId,
    pub bidder_id: BidderId,
    pub bidder_name: String,
    pub amount: f64,
    pub created_at: DateTime,
}

impl From<BidRow> for BidRecord<DateTime, BidderId, AuctionId, BidId> {
    fn from(row: BidRow) -> Self {
        Self {
            id: row.id,
            auction_id: row.auction_id,
            bidder_id: row.bidder_id,
            bidder_name: row.bidder_name,
            amount: row.amount,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ProfileRow {
    pub bidder_id: BidderId,
    pub username: String,
    pub created_at: DateTime,
}

impl From<ProfileRow> for ProfileRecord<DateTime, BidderId> {
    fn from(row: ProfileRow) -> Self {
        Self {
            bidder_id: row.bidder_id,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

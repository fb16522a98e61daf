use crate::{
    Db,
    types::{AuctionRow, BidRow, DateTime},
};
use vbid_core::{
    models::{
        AuctionEvent, AuctionStatus, BidRecord, DateTimeRangeQuery, DateTimeRangeResponse,
    },
    ports::{BidFailure, BidRepository},
};

impl BidRepository for Db {
    async fn insert_bid(
        &self,
        bid_id: Self::BidId,
        auction_id: Self::AuctionId,
        bidder_id: Self::BidderId,
        amount: f64,
        as_of: Self::DateTime,
    ) -> Result<
        Result<BidRecord<Self::DateTime, Self::BidderId, Self::AuctionId, Self::BidId>, BidFailure>,
        Self::Error,
    > {
        // The compare-and-set: the insert only happens if the auction is
        // open and the amount still strictly exceeds the baseline, all in
        // one statement on the single-connection writer pool. A bidder
        // racing from a stale read loses here, not at display time.
        let row = sqlx::query_as::<_, BidRow>(
            r#"
            insert into
                bids (id, auction_id, bidder_id, bidder_name, amount, created_at)
            select
                $1, a.id, $3,
                coalesce((select username from profiles where bidder_id = $3), 'Anonymous'),
                $4, $5
            from auctions a
            where
                a.id = $2
            and
                a.status = 'active'
            and
                a.deadline > $5
            and
                $4 > coalesce((select max(amount) from bids where auction_id = a.id), a.base_price)
            returning
                id, auction_id, bidder_id, bidder_name, amount, created_at
            "#,
        )
        .bind(bid_id)
        .bind(auction_id)
        .bind(bidder_id)
        .bind(amount)
        .bind(as_of)
        .fetch_optional(&self.writer)
        .await?;

        if let Some(row) = row {
            let bid: BidRecord<_, _, _, _> = row.into();
            self.publish(AuctionEvent::BidPlaced {
                auction_id: bid.auction_id,
                bid_id: bid.id,
                amount: bid.amount,
                at: bid.created_at,
            });
            return Ok(Ok(bid));
        }

        // The insert was refused; look at the auction to say why.
        let auction = sqlx::query_as::<_, AuctionRow>(
            r#"
            select
                a.id, a.creator_id, a.title, a.description, a.image_url,
                a.base_price, a.deadline, a.status, a.created_at,
                (select max(b.amount) from bids b where b.auction_id = a.id) as current_bid,
                (select count(*) from bids b where b.auction_id = a.id) as bid_count
            from auctions a
            where a.id = $1
            "#,
        )
        .bind(auction_id)
        .fetch_optional(&self.reader)
        .await?;

        let Some(auction) = auction else {
            return Ok(Err(BidFailure::AuctionNotFound));
        };
        let auction: vbid_core::models::AuctionRecord<DateTime, _, _> = auction.try_into()?;

        if auction.status != AuctionStatus::Active || auction.deadline <= as_of {
            Ok(Err(BidFailure::AuctionClosed))
        } else {
            Ok(Err(BidFailure::TooLow {
                baseline: auction.baseline(),
            }))
        }
    }

    async fn get_bid_history(
        &self,
        auction_id: Self::AuctionId,
        query: DateTimeRangeQuery<Self::DateTime>,
        limit: usize,
    ) -> Result<
        DateTimeRangeResponse<
            BidRecord<Self::DateTime, Self::BidderId, Self::AuctionId, Self::BidId>,
            Self::DateTime,
        >,
        Self::Error,
    > {
        let limit_p1 = (limit + 1) as i64;
        let mut rows = sqlx::query_as::<_, BidRow>(
            r#"
            select
                id, auction_id, bidder_id, bidder_name, amount, created_at
            from
                bids
            where
                auction_id = $1
            and
                ($2 is null or created_at < $2)
            and
                ($3 is null or created_at >= $3)
            order by
                created_at desc
            limit $4
            "#,
        )
        .bind(auction_id)
        .bind(query.before)
        .bind(query.after)
        .bind(limit_p1)
        .fetch_all(&self.reader)
        .await?;

        // We paginate by adding 1 to the limit, popping the extra row, and
        // using the last kept row's timestamp as the next page's bound.
        let more = if rows.len() == limit + 1 {
            rows.pop();
            rows.last().map(|last| DateTimeRangeQuery {
                before: Some(last.created_at),
                after: query.after,
            })
        } else {
            None
        };

        Ok(DateTimeRangeResponse {
            results: rows.into_iter().map(Into::into).collect(),
            more,
        })
    }

    async fn current_baseline(
        &self,
        auction_id: Self::AuctionId,
    ) -> Result<Option<f64>, Self::Error> {
        sqlx::query_scalar::<_, f64>(
            r#"
            select
                coalesce((select max(amount) from bids where auction_id = a.id), a.base_price)
            from auctions a
            where a.id = $1
            "#,
        )
        .bind(auction_id)
        .fetch_optional(&self.reader)
        .await
    }
}

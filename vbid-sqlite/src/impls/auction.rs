use crate::{Db, types::AuctionRow};
use vbid_core::{
    models::{AuctionData, AuctionEvent, AuctionRecord, AuctionStatus},
    ports::AuctionRepository,
};

// The derived columns are computed the same way everywhere an auction is
// read, so the baseline the API reports is the one the insert checks.
const AUCTION_COLUMNS: &str = r#"
    a.id, a.creator_id, a.title, a.description, a.image_url,
    a.base_price, a.deadline, a.status, a.created_at,
    (select max(b.amount) from bids b where b.auction_id = a.id) as current_bid,
    (select count(*) from bids b where b.auction_id = a.id) as bid_count
"#;

impl AuctionRepository for Db {
    async fn create_auction(
        &self,
        auction_id: Self::AuctionId,
        creator_id: Self::BidderId,
        data: AuctionData<Self::DateTime>,
        as_of: Self::DateTime,
    ) -> Result<AuctionRecord<Self::DateTime, Self::BidderId, Self::AuctionId>, Self::Error> {
        sqlx::query(
            r#"
            insert into
                auctions (id, creator_id, title, description, image_url, base_price, deadline, status, created_at)
            values
                ($1, $2, $3, $4, $5, $6, $7, 'active', $8)
            "#,
        )
        .bind(auction_id)
        .bind(creator_id.clone())
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.image_url)
        .bind(data.base_price)
        .bind(data.deadline)
        .bind(as_of)
        .execute(&self.writer)
        .await?;

        self.publish(AuctionEvent::AuctionCreated {
            auction_id,
            at: as_of,
        });

        Ok(AuctionRecord {
            id: auction_id,
            creator_id,
            title: data.title,
            description: data.description,
            image_url: data.image_url,
            base_price: data.base_price,
            deadline: data.deadline,
            status: AuctionStatus::Active,
            created_at: as_of,
            current_bid: None,
            bid_count: 0,
        })
    }

    async fn get_auction(
        &self,
        auction_id: Self::AuctionId,
    ) -> Result<Option<AuctionRecord<Self::DateTime, Self::BidderId, Self::AuctionId>>, Self::Error>
    {
        let row = sqlx::query_as::<_, AuctionRow>(&format!(
            r#"
            select {AUCTION_COLUMNS}
            from auctions a
            where a.id = $1
            "#
        ))
        .bind(auction_id)
        .fetch_optional(&self.reader)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn query_auctions(
        &self,
        as_of: Self::DateTime,
    ) -> Result<Vec<AuctionRecord<Self::DateTime, Self::BidderId, Self::AuctionId>>, Self::Error>
    {
        let rows = sqlx::query_as::<_, AuctionRow>(&format!(
            r#"
            select {AUCTION_COLUMNS}
            from auctions a
            where a.status = 'active' and a.deadline > $1
            order by a.created_at desc
            "#
        ))
        .bind(as_of)
        .fetch_all(&self.reader)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

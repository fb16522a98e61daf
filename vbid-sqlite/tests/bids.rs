//! Bid insertion semantics: the compare-and-set against the baseline,
//! display-name resolution, and history pagination.

mod common;

use common::{minutes_from_now, now, open_db};
use uuid::Uuid;
use vbid_core::{
    models::{AuctionData, DateTimeRangeQuery},
    ports::{
        AuctionRepository as _, BidFailure, BidRepository as _, ChangeNotifier as _,
        ProfileRepository as _, Subscription as _,
    },
};
use vbid_sqlite::{
    Db,
    types::{AuctionId, BidderId},
};

async fn seed_auction(db: &Db, base_price: f64) -> (AuctionId, BidderId) {
    let auction_id = AuctionId(Uuid::new_v4());
    let creator = BidderId(Uuid::new_v4());
    db.create_auction(
        auction_id,
        creator,
        AuctionData {
            title: "Vintage Leather Watch".into(),
            description: Some("One careful owner".into()),
            image_url: None,
            base_price,
            deadline: minutes_from_now(60),
        },
        now(),
    )
    .await
    .expect("create auction");
    (auction_id, creator)
}

#[tokio::test]
async fn first_bid_must_exceed_base_price() {
    let (db, _dir) = open_db().await;
    let (auction_id, _) = seed_auction(&db, 100.0).await;
    let bidder = BidderId(Uuid::new_v4());

    let refused = db
        .insert_bid(Uuid::new_v4().into(), auction_id, bidder, 100.0, now())
        .await
        .unwrap();
    assert_eq!(refused, Err(BidFailure::TooLow { baseline: 100.0 }));

    let accepted = db
        .insert_bid(Uuid::new_v4().into(), auction_id, bidder, 101.0, now())
        .await
        .unwrap()
        .expect("bid should land");
    assert_eq!(accepted.amount, 101.0);
}

#[tokio::test]
async fn stale_baseline_loses_the_race() {
    let (db, _dir) = open_db().await;
    let (auction_id, _) = seed_auction(&db, 100.0).await;

    // Two bidders both read baseline=100 and decide to bid.
    let first = db
        .insert_bid(
            Uuid::new_v4().into(),
            auction_id,
            BidderId(Uuid::new_v4()),
            150.0,
            now(),
        )
        .await
        .unwrap();
    assert!(first.is_ok());

    // The second bid exceeded the baseline it saw, but not the fresh one.
    let second = db
        .insert_bid(
            Uuid::new_v4().into(),
            auction_id,
            BidderId(Uuid::new_v4()),
            120.0,
            now(),
        )
        .await
        .unwrap();
    assert_eq!(second, Err(BidFailure::TooLow { baseline: 150.0 }));

    assert_eq!(db.current_baseline(auction_id).await.unwrap(), Some(150.0));
}

#[tokio::test]
async fn bids_after_the_deadline_are_refused() {
    let (db, _dir) = open_db().await;
    let auction_id = AuctionId(Uuid::new_v4());
    db.create_auction(
        auction_id,
        BidderId(Uuid::new_v4()),
        AuctionData {
            title: "Expired lot".into(),
            description: None,
            image_url: None,
            base_price: 10.0,
            deadline: minutes_from_now(-5),
        },
        now(),
    )
    .await
    .unwrap();

    let refused = db
        .insert_bid(
            Uuid::new_v4().into(),
            auction_id,
            BidderId(Uuid::new_v4()),
            50.0,
            now(),
        )
        .await
        .unwrap();
    assert_eq!(refused, Err(BidFailure::AuctionClosed));
}

#[tokio::test]
async fn unknown_auction_is_reported_as_such() {
    let (db, _dir) = open_db().await;
    let refused = db
        .insert_bid(
            Uuid::new_v4().into(),
            AuctionId(Uuid::new_v4()),
            BidderId(Uuid::new_v4()),
            50.0,
            now(),
        )
        .await
        .unwrap();
    assert_eq!(refused, Err(BidFailure::AuctionNotFound));
}

#[tokio::test]
async fn bidder_name_comes_from_the_profile() {
    let (db, _dir) = open_db().await;
    let (auction_id, _) = seed_auction(&db, 10.0).await;

    let named = BidderId(Uuid::new_v4());
    db.create_profile(named, "ada".into(), now())
        .await
        .unwrap()
        .unwrap();

    let bid = db
        .insert_bid(Uuid::new_v4().into(), auction_id, named, 20.0, now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bid.bidder_name, "ada");

    // A bidder without a profile still gets a display name.
    let anonymous = BidderId(Uuid::new_v4());
    let bid = db
        .insert_bid(Uuid::new_v4().into(), auction_id, anonymous, 30.0, now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bid.bidder_name, "Anonymous");
}

#[tokio::test]
async fn history_is_newest_first_and_paginated() {
    let (db, _dir) = open_db().await;
    let (auction_id, _) = seed_auction(&db, 0.5).await;
    let bidder = BidderId(Uuid::new_v4());

    for i in 1..=5 {
        db.insert_bid(
            Uuid::new_v4().into(),
            auction_id,
            bidder,
            i as f64,
            minutes_from_now(i - 60),
        )
        .await
        .unwrap()
        .unwrap();
    }

    let page = db
        .get_bid_history(auction_id, DateTimeRangeQuery::default(), 3)
        .await
        .unwrap();
    assert_eq!(page.results.len(), 3);
    let amounts: Vec<f64> = page.results.iter().map(|b| b.amount).collect();
    assert_eq!(amounts, vec![5.0, 4.0, 3.0]);

    let rest = db
        .get_bid_history(auction_id, page.more.expect("a second page"), 3)
        .await
        .unwrap();
    let amounts: Vec<f64> = rest.results.iter().map(|b| b.amount).collect();
    assert_eq!(amounts, vec![2.0, 1.0]);
    assert!(rest.more.is_none());
}

#[tokio::test]
async fn accepted_bids_are_announced() {
    let (db, _dir) = open_db().await;
    let (auction_id, _) = seed_auction(&db, 10.0).await;
    let mut feed = db.subscribe(Some(auction_id));

    let bid = db
        .insert_bid(
            Uuid::new_v4().into(),
            auction_id,
            BidderId(Uuid::new_v4()),
            25.0,
            now(),
        )
        .await
        .unwrap()
        .unwrap();

    match feed.next().await {
        Some(vbid_core::models::AuctionEvent::BidPlaced {
            auction_id: event_auction,
            bid_id,
            amount,
            ..
        }) => {
            assert_eq!(event_auction, auction_id);
            assert_eq!(bid_id, bid.id);
            assert_eq!(amount, 25.0);
        }
        other => panic!("expected a BidPlaced event, got {other:?}"),
    }

    // A refused bid announces nothing; the next event after another
    // accepted bid is that bid, not the refusal.
    let refused = db
        .insert_bid(
            Uuid::new_v4().into(),
            auction_id,
            BidderId(Uuid::new_v4()),
            20.0,
            now(),
        )
        .await
        .unwrap();
    assert!(refused.is_err());

    db.insert_bid(
        Uuid::new_v4().into(),
        auction_id,
        BidderId(Uuid::new_v4()),
        30.0,
        now(),
    )
    .await
    .unwrap()
    .unwrap();

    match feed.next().await {
        Some(vbid_core::models::AuctionEvent::BidPlaced { amount, .. }) => {
            assert_eq!(amount, 30.0)
        }
        other => panic!("expected a BidPlaced event, got {other:?}"),
    }
}

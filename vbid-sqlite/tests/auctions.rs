//! Auction and profile CRUD against the SQLite adapter.

mod common;

use common::{minutes_from_now, now, open_db};
use uuid::Uuid;
use vbid_core::{
    models::{AuctionData, AuctionStatus},
    ports::{AuctionRepository as _, ProfileFailure, ProfileRepository as _},
};
use vbid_sqlite::types::{AuctionId, BidderId};

#[tokio::test]
async fn created_auctions_round_trip() {
    let (db, _dir) = open_db().await;
    let auction_id = AuctionId(Uuid::new_v4());
    let creator = BidderId(Uuid::new_v4());
    let deadline = minutes_from_now(90);

    let created = db
        .create_auction(
            auction_id,
            creator,
            AuctionData {
                title: "Art Deco Lamp".into(),
                description: Some("Brass, rewired".into()),
                image_url: Some("https://img.example/lamp.jpg".into()),
                base_price: 40.0,
                deadline,
            },
            now(),
        )
        .await
        .unwrap();

    let fetched = db
        .get_auction(auction_id)
        .await
        .unwrap()
        .expect("auction exists");
    assert_eq!(fetched, created);
    assert_eq!(fetched.status, AuctionStatus::Active);
    assert_eq!(fetched.baseline(), 40.0);
    assert_eq!(fetched.bid_count, 0);
}

#[tokio::test]
async fn missing_auctions_are_none() {
    let (db, _dir) = open_db().await;
    assert!(
        db.get_auction(AuctionId(Uuid::new_v4()))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn listing_excludes_expired_auctions_and_orders_newest_first() {
    let (db, _dir) = open_db().await;
    let creator = BidderId(Uuid::new_v4());

    let mut make = async |title: &str, deadline_minutes: i64, created_minutes: i64| {
        db.create_auction(
            AuctionId(Uuid::new_v4()),
            creator,
            AuctionData {
                title: title.into(),
                description: None,
                image_url: None,
                base_price: 1.0,
                deadline: minutes_from_now(deadline_minutes),
            },
            minutes_from_now(created_minutes),
        )
        .await
        .unwrap()
    };

    make("older", 60, -10).await;
    make("newer", 60, -5).await;
    make("expired", -1, -20).await;

    let listed = db.query_auctions(now()).await.unwrap();
    let titles: Vec<&str> = listed.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["newer", "older"]);
}

#[tokio::test]
async fn profile_uniqueness() {
    let (db, _dir) = open_db().await;
    let bidder = BidderId(Uuid::new_v4());

    let profile = db
        .create_profile(bidder, "grace".into(), now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.username, "grace");

    // Same bidder, second profile
    let refused = db
        .create_profile(bidder, "grace2".into(), now())
        .await
        .unwrap();
    assert_eq!(refused, Err(ProfileFailure::AlreadyExists));

    // Different bidder, same username
    let refused = db
        .create_profile(BidderId(Uuid::new_v4()), "grace".into(), now())
        .await
        .unwrap();
    assert_eq!(refused, Err(ProfileFailure::UsernameTaken));

    // Reads
    assert_eq!(db.get_profile(bidder).await.unwrap(), Some(profile));
    assert_eq!(
        db.get_profile(BidderId(Uuid::new_v4())).await.unwrap(),
        None
    );
}

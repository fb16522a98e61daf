//! REST API endpoints for auction listings.
//!
//! Listings can be created and browsed by any authenticated bidder. The
//! per-auction change feed is also served from here as server-sent events,
//! so a bidding page can re-read state whenever something lands.

use crate::{ApiApplication, AuctionIdOf, BidderIdOf, DateTimeOf, bid_routes, voice_routes};
use aide::axum::{ApiRouter, routing::get};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use axum_extra::TypedHeader;
use futures::stream::{self, Stream};
use headers::{Authorization, authorization::Bearer};
use std::convert::Infallible;
use tracing::{Level, event};
use vbid_core::{
    models::{AuctionData, AuctionRecord},
    ports::{Application, AuctionRepository as _, ChangeNotifier as _, Subscription as _},
};

/// Creates a router with auction-related endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with(
            "/",
            get(query_auctions::<T>).post(create_auction::<T>),
            |route| route.security_requirement("jwt").tag("auction"),
        )
        .api_route_with("/{auction_id}", get(get_auction::<T>), |route| {
            route.security_requirement("jwt").tag("auction")
        })
        .route(
            "/{auction_id}/events",
            axum::routing::get(auction_events::<T>),
        )
        .merge(bid_routes::router())
        .merge(voice_routes::router())
}

/// Path parameter for auction-specific endpoints.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
pub(crate) struct Id<T> {
    /// The unique identifier of the auction
    pub auction_id: T,
}

/// List the auctions currently accepting bids, newest first.
///
/// # Authorization
///
/// Requires an authenticated bidder.
///
/// # Returns
///
/// - `200 OK`: Active, unexpired auctions with their derived current bids
/// - `401 Unauthorized`: No authenticated identity
/// - `500 Internal Server Error`: Database query failed
async fn query_auctions<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Vec<AuctionRecord<DateTimeOf<T>, BidderIdOf<T>, AuctionIdOf<T>>>>, StatusCode> {
    app.authenticate(&auth)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let db = app.database();
    let auctions = db.query_auctions(app.now()).await.map_err(|err| {
        event!(Level::ERROR, err = err.to_string());
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(auctions))
}

/// Create a new auction listing.
///
/// The image, if any, is referenced by URL; file upload is not part of this
/// API.
///
/// # Authorization
///
/// Requires an authenticated bidder, who becomes the listing's creator.
///
/// # Returns
///
/// - `201 Created`: The new listing
/// - `401 Unauthorized`: No authenticated identity
/// - `500 Internal Server Error`: Database operation failed
async fn create_auction<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(body): Json<AuctionData<DateTimeOf<T>>>,
) -> Result<
    (
        StatusCode,
        Json<AuctionRecord<DateTimeOf<T>, BidderIdOf<T>, AuctionIdOf<T>>>,
    ),
    StatusCode,
> {
    let creator_id = app
        .authenticate(&auth)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let db = app.database();
    let auction_id = app.generate_auction_id();
    db.create_auction(auction_id, creator_id, body, app.now())
        .await
        .map(|auction| (StatusCode::CREATED, Json(auction)))
        .map_err(|err| {
            event!(Level::ERROR, err = err.to_string());
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

/// Retrieve a single auction with its derived current bid and bid count.
///
/// # Authorization
///
/// Requires an authenticated bidder.
///
/// # Returns
///
/// - `200 OK`: The listing
/// - `401 Unauthorized`: No authenticated identity
/// - `404 Not Found`: No such auction
/// - `500 Internal Server Error`: Database query failed
async fn get_auction<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(Id { auction_id }): Path<Id<AuctionIdOf<T>>>,
) -> Result<Json<AuctionRecord<DateTimeOf<T>, BidderIdOf<T>, AuctionIdOf<T>>>, StatusCode> {
    app.authenticate(&auth)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let db = app.database();
    let auction = db
        .get_auction(auction_id)
        .await
        .map_err(|err| {
            event!(Level::ERROR, err = err.to_string());
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(auction))
}

/// Stream change events for one auction as server-sent events.
///
/// Each event's data is the JSON change notification; consumers re-read
/// auction state on receipt rather than expecting a delta. The stream stays
/// open until the client disconnects.
async fn auction_events<T: ApiApplication>(
    State(app): State<T>,
    Path(Id { auction_id }): Path<Id<AuctionIdOf<T>>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let feed = app.database().subscribe(Some(auction_id));

    let stream = stream::unfold(feed, |mut feed| async move {
        loop {
            let change = feed.next().await?;
            match serde_json::to_string(&change) {
                Ok(json) => {
                    let event = Ok::<_, Infallible>(Event::default().event("change").data(json));
                    return Some((event, feed));
                }
                Err(err) => {
                    event!(Level::ERROR, err = err.to_string());
                    continue;
                }
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

//! REST API endpoints for placing bids and reading bid history.
//!
//! This is the manual half of the bidding surface; the voice flow in
//! `voice_routes` funnels into the same gateway, so both paths share the
//! compare-and-set semantics and the rejection taxonomy.

use crate::{
    ApiApplication, AuctionIdOf, BidIdOf, BidderIdOf, DateTimeOf, auction_routes::Id,
    config::AxumConfig,
};
use aide::axum::{ApiRouter, routing::get};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use std::sync::Arc;
use tracing::{Level, event};
use vbid_core::{
    models::{BidRecord, DateTimeRangeQuery, DateTimeRangeResponse},
    ports::{Application, BidFailure, BidRepository as _, Repository},
};
use vbid_voice::{BidGateway, Rejection, validate_amount};

/// Creates a router with bid-related endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new().api_route_with(
        "/{auction_id}/bids",
        get(get_bid_history::<T>).post(place_bid::<T>),
        |route| route.security_requirement("jwt").tag("bid"),
    )
}

/// A bid record as the API returns it.
pub(crate) type Bid<T> = BidRecord<DateTimeOf<T>, BidderIdOf<T>, AuctionIdOf<T>, BidIdOf<T>>;

/// The submission gateway over the repository, scoped to one auction and
/// one authenticated bidder.
///
/// The session machine (or the manual route) asks this to persist exactly
/// one bid; the baseline re-check happens inside the store's write path.
pub(crate) struct RepoGateway<'a, T: ApiApplication> {
    pub app: &'a T,
    pub auction_id: AuctionIdOf<T>,
    pub bidder_id: BidderIdOf<T>,
}

impl<'a, T: ApiApplication> BidGateway for RepoGateway<'a, T> {
    type Receipt = Bid<T>;
    type Error = <T::Repository as Repository>::Error;

    async fn submit(&self, amount: f64) -> Result<Result<Self::Receipt, Rejection>, Self::Error> {
        if let Err(rejection) = validate_amount(amount) {
            return Ok(Err(rejection));
        }

        let db = self.app.database();
        let result = db
            .insert_bid(
                self.app.generate_bid_id(),
                self.auction_id.clone(),
                self.bidder_id.clone(),
                amount,
                self.app.now(),
            )
            .await?;

        Ok(result.map_err(|failure| match failure {
            BidFailure::AuctionNotFound => Rejection::AuctionNotFound,
            BidFailure::AuctionClosed => Rejection::AuctionClosed,
            BidFailure::TooLow { baseline } => Rejection::TooLow { baseline },
        }))
    }
}

/// The domain outcome of a bid placement, manual or voice-confirmed.
///
/// Travels in a `200 OK` body; transport-level failures (auth, missing
/// auction, store errors) use status codes instead.
#[derive(Debug, serde::Serialize, schemars::JsonSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub(crate) enum BidOutcome<B> {
    /// The bid landed
    Placed {
        /// The persisted bid
        bid: B,
    },
    /// The amount does not strictly exceed the baseline
    TooLow {
        /// The attempted amount
        amount: f64,
        /// The fresh baseline it lost against
        baseline: f64,
    },
    /// The amount is not a positive, finite number
    Invalid,
    /// The auction is closed or past its deadline
    AuctionClosed,
}

/// Request body for the manual bid form.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
struct PlaceBidDto {
    /// The bid amount, in dollars
    amount: f64,
}

/// Place a bid the ordinary way.
///
/// # Authorization
///
/// Requires an authenticated bidder.
///
/// # Returns
///
/// - `200 OK`: The domain outcome: placed, too low (with the fresh
///   baseline), invalid amount, or auction closed
/// - `401 Unauthorized`: No authenticated identity
/// - `404 Not Found`: No such auction
/// - `500 Internal Server Error`: The store failed; the bid may not have
///   landed
async fn place_bid<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(Id { auction_id }): Path<Id<AuctionIdOf<T>>>,
    Json(body): Json<PlaceBidDto>,
) -> Result<Json<BidOutcome<Bid<T>>>, StatusCode> {
    let bidder_id = app
        .authenticate(&auth)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let gateway = RepoGateway {
        app: &app,
        auction_id,
        bidder_id,
    };

    let result = gateway.submit(body.amount).await.map_err(|err| {
        event!(Level::ERROR, err = err.to_string());
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    match result {
        Ok(bid) => Ok(Json(BidOutcome::Placed { bid })),
        Err(Rejection::TooLow { baseline }) => Ok(Json(BidOutcome::TooLow {
            amount: body.amount,
            baseline,
        })),
        Err(Rejection::Invalid) => Ok(Json(BidOutcome::Invalid)),
        Err(Rejection::AuctionClosed) => Ok(Json(BidOutcome::AuctionClosed)),
        Err(Rejection::AuctionNotFound) => Err(StatusCode::NOT_FOUND),
        Err(Rejection::NotAuthenticated) => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Retrieve the bid history for an auction, newest first.
///
/// # Authorization
///
/// Requires an authenticated bidder.
///
/// # Returns
///
/// - `200 OK`: A page of bids; `more` holds the query for the next page
/// - `401 Unauthorized`: No authenticated identity
/// - `404 Not Found`: No such auction
/// - `500 Internal Server Error`: Database query failed
async fn get_bid_history<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(Id { auction_id }): Path<Id<AuctionIdOf<T>>>,
    Extension(config): Extension<Arc<AxumConfig>>,
    Query(query): Query<DateTimeRangeQuery<DateTimeOf<T>>>,
) -> Result<Json<DateTimeRangeResponse<Bid<T>, DateTimeOf<T>>>, StatusCode> {
    app.authenticate(&auth)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let db = app.database();

    // 404 for a history request against nothing at all
    db.current_baseline(auction_id.clone())
        .await
        .map_err(|err| {
            event!(Level::ERROR, err = err.to_string());
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let history = db
        .get_bid_history(auction_id, query, config.page_limit)
        .await
        .map_err(|err| {
            event!(Level::ERROR, err = err.to_string());
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(history))
}

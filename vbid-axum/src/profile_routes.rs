//! REST API endpoints for bidder profiles.

use crate::{ApiApplication, BidderIdOf, DateTimeOf};
use aide::axum::{ApiRouter, routing::get};
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use tracing::{Level, event};
use vbid_core::{
    models::ProfileRecord,
    ports::{Application, ProfileFailure, ProfileRepository as _},
};

/// Creates a router with profile endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new().api_route_with(
        "/",
        get(get_profile::<T>).post(create_profile::<T>),
        |route| route.security_requirement("jwt").tag("profile"),
    )
}

/// Request body for creating a profile.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
struct CreateProfileDto {
    /// The desired display name; unique across bidders
    username: String,
}

/// Create the caller's profile.
///
/// # Authorization
///
/// Requires an authenticated bidder; the profile belongs to them.
///
/// # Returns
///
/// - `201 Created`: The new profile
/// - `401 Unauthorized`: No authenticated identity
/// - `409 Conflict`: The bidder already has a profile, or the username is
///   taken
/// - `500 Internal Server Error`: Database operation failed
async fn create_profile<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(body): Json<CreateProfileDto>,
) -> Result<(StatusCode, Json<ProfileRecord<DateTimeOf<T>, BidderIdOf<T>>>), StatusCode> {
    let bidder_id = app
        .authenticate(&auth)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let db = app.database();
    let result = db
        .create_profile(bidder_id, body.username, app.now())
        .await
        .map_err(|err| {
            event!(Level::ERROR, err = err.to_string());
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    match result {
        Ok(profile) => Ok((StatusCode::CREATED, Json(profile))),
        Err(ProfileFailure::AlreadyExists | ProfileFailure::UsernameTaken) => {
            Err(StatusCode::CONFLICT)
        }
    }
}

/// Retrieve the caller's profile.
///
/// # Authorization
///
/// Requires an authenticated bidder.
///
/// # Returns
///
/// - `200 OK`: The profile
/// - `401 Unauthorized`: No authenticated identity
/// - `404 Not Found`: The bidder has not created a profile
/// - `500 Internal Server Error`: Database query failed
async fn get_profile<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<ProfileRecord<DateTimeOf<T>, BidderIdOf<T>>>, StatusCode> {
    let bidder_id = app
        .authenticate(&auth)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let db = app.database();
    let profile = db
        .get_profile(bidder_id)
        .await
        .map_err(|err| {
            event!(Level::ERROR, err = err.to_string());
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(profile))
}

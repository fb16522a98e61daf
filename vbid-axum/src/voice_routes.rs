//! REST API endpoints for the voice-bidding session.
//!
//! One session exists per (bidder, auction) pair, held in an in-process
//! registry and guarded by an async mutex so the machine's listening and
//! submitting gates compose with HTTP concurrency. Domain outcomes travel
//! in `200 OK` bodies as tagged enums; status codes are reserved for auth,
//! missing auctions, and store failures.

use crate::{
    ApiApplication, AuctionIdOf, BidderIdOf,
    auction_routes::Id,
    bid_routes::{Bid, RepoGateway},
};
use aide::axum::{
    ApiRouter,
    routing::{get, post},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use base64::Engine as _;
use dashmap::DashMap;
use headers::{Authorization, authorization::Bearer};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Level, event};
use vbid_core::ports::{Application, BidRepository as _, SpokenInput};
use vbid_voice::{ConfirmOutcome, ListenOutcome, Rejection, SessionState, VoiceBidSession};

/// Creates a router with the voice-session endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with(
            "/{auction_id}/voice",
            get(get_session::<T>)
                .post(submit_voice::<T>)
                .delete(cancel_session::<T>),
            |route| route.security_requirement("jwt").tag("voice"),
        )
        .api_route_with(
            "/{auction_id}/voice/confirm",
            post(confirm_bid::<T>),
            |route| route.security_requirement("jwt").tag("voice"),
        )
}

type SessionKey<T> = (BidderIdOf<T>, AuctionIdOf<T>);

/// The in-process registry of live voice sessions.
///
/// Entries are created on first use and removed when a bid lands or the
/// bidder cancels; an abandoned entry is just an `Idle` machine.
pub(crate) struct VoiceSessions<T: ApiApplication> {
    sessions: DashMap<SessionKey<T>, Arc<Mutex<VoiceBidSession>>>,
}

impl<T: ApiApplication> VoiceSessions<T> {
    pub(crate) fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// The session for this bidder and auction, created if absent. The
    /// shard guard is released before returning, so callers can hold the
    /// session lock across awaits.
    fn get_or_create(&self, key: SessionKey<T>) -> Arc<Mutex<VoiceBidSession>> {
        let entry = self
            .sessions
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(VoiceBidSession::new())));
        Arc::clone(entry.value())
    }

    fn get(&self, key: &SessionKey<T>) -> Option<Arc<Mutex<VoiceBidSession>>> {
        self.sessions.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn remove(&self, key: &SessionKey<T>) {
        self.sessions.remove(key);
    }
}

/// A snapshot of the session for UI re-hydration.
#[derive(Debug, serde::Serialize, schemars::JsonSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
enum SessionSnapshot {
    /// Nothing in progress
    Idle,
    /// A capture attempt is running
    Listening,
    /// An amount awaits confirmation
    Recognized {
        /// What the bidder said
        transcript: String,
        /// The recognized whole-dollar amount
        amount: f64,
    },
    /// A submission is in flight
    Submitting {
        /// What the bidder said
        transcript: String,
        /// The amount being submitted
        amount: f64,
    },
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        match state {
            SessionState::Idle => Self::Idle,
            SessionState::Listening => Self::Listening,
            SessionState::Recognized { transcript, amount } => Self::Recognized {
                transcript: transcript.clone(),
                amount: *amount,
            },
            SessionState::Submitting { transcript, amount } => Self::Submitting {
                transcript: transcript.clone(),
                amount: *amount,
            },
        }
    }
}

/// Request body for a spoken input.
///
/// Exactly one of the fields should be set: `transcript` when the client
/// transcribed locally, `audio` (base64 WAV) for server-side transcription.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
struct SpokenInputDto {
    /// An already-transcribed utterance
    #[serde(default)]
    transcript: Option<String>,
    /// Base64-encoded WAV bytes of a single utterance
    #[serde(default)]
    audio: Option<String>,
}

impl SpokenInputDto {
    fn into_input(self) -> Result<SpokenInput, StatusCode> {
        match (self.transcript, self.audio) {
            (Some(text), None) => Ok(SpokenInput::Transcript(text)),
            (None, Some(encoded)) => base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map(SpokenInput::Audio)
                .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY),
            _ => Err(StatusCode::UNPROCESSABLE_ENTITY),
        }
    }
}

/// The domain outcome of one listen attempt.
#[derive(Debug, serde::Serialize, schemars::JsonSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum VoiceOutcome {
    /// An amount was recognized and awaits confirmation
    Recognized {
        /// What the bidder said
        transcript: String,
        /// The recognized whole-dollar amount
        amount: f64,
        /// The baseline the amount will be confirmed against
        baseline: f64,
    },
    /// Capture completed but no amount could be extracted, or capture
    /// failed; retry by speaking again
    NotRecognized {
        /// The transcript, when capture succeeded but parsing did not
        #[serde(skip_serializing_if = "Option::is_none")]
        transcript: Option<String>,
    },
    /// The deployment cannot process this input; use the manual bid form
    Unsupported,
    /// A capture or submission is already in progress for this session
    Busy,
}

/// Submit a spoken input for this auction.
///
/// Runs the capture backend and the amount extractor, parking the result
/// in the session for a subsequent confirm.
///
/// # Authorization
///
/// Requires an authenticated bidder; the session is theirs alone.
///
/// # Returns
///
/// - `200 OK`: The recognition outcome
/// - `401 Unauthorized`: No authenticated identity
/// - `404 Not Found`: No such auction
/// - `422 Unprocessable Entity`: Neither transcript nor decodable audio
/// - `500 Internal Server Error`: Database query failed
async fn submit_voice<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(Id { auction_id }): Path<Id<AuctionIdOf<T>>>,
    Extension(sessions): Extension<Arc<VoiceSessions<T>>>,
    Json(body): Json<SpokenInputDto>,
) -> Result<Json<VoiceOutcome>, StatusCode> {
    let bidder_id = app
        .authenticate(&auth)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let baseline = app
        .database()
        .current_baseline(auction_id.clone())
        .await
        .map_err(|err| {
            event!(Level::ERROR, err = err.to_string());
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let input = body.into_input()?;

    let session = sessions.get_or_create((bidder_id, auction_id));
    let mut session = session.lock().await;

    let outcome = match vbid_voice::listen(&mut session, app.capture(), input).await {
        ListenOutcome::Recognized { transcript, amount } => VoiceOutcome::Recognized {
            transcript,
            amount,
            baseline,
        },
        ListenOutcome::NotRecognized { transcript } => VoiceOutcome::NotRecognized { transcript },
        ListenOutcome::Unsupported => VoiceOutcome::Unsupported,
        ListenOutcome::Busy => VoiceOutcome::Busy,
    };

    Ok(Json(outcome))
}

/// The domain outcome of a voice confirm.
#[derive(Debug, serde::Serialize, schemars::JsonSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum VoiceConfirmOutcome<B> {
    /// The bid landed and the session was cleared
    Placed {
        /// The persisted bid
        bid: B,
    },
    /// The recognized amount does not exceed the baseline; the amount is
    /// retained, so the bidder can speak again or cancel
    TooLow {
        /// The recognized amount
        amount: f64,
        /// The fresh baseline it lost against
        baseline: f64,
    },
    /// The recognized amount failed validation
    Invalid,
    /// The auction closed while the session was open
    AuctionClosed,
    /// There is nothing recognized to confirm
    NothingRecognized,
    /// A submission is already in flight
    InFlight,
}

/// Confirm the recognized amount, placing the bid.
///
/// The session's guard runs first (no submission is attempted unless the
/// recognized amount exceeds the baseline); the store then re-checks
/// atomically, so a concurrent higher bid turns into a fresh `too_low`
/// with the amount retained for retry.
///
/// # Authorization
///
/// Requires an authenticated bidder.
///
/// # Returns
///
/// - `200 OK`: The confirmation outcome
/// - `401 Unauthorized`: No authenticated identity
/// - `404 Not Found`: No such auction
/// - `500 Internal Server Error`: The store failed; the recognized amount
///   is retained for a retry
async fn confirm_bid<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(Id { auction_id }): Path<Id<AuctionIdOf<T>>>,
    Extension(sessions): Extension<Arc<VoiceSessions<T>>>,
) -> Result<Json<VoiceConfirmOutcome<Bid<T>>>, StatusCode> {
    let bidder_id = app
        .authenticate(&auth)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let key = (bidder_id.clone(), auction_id.clone());
    let Some(session) = sessions.get(&key) else {
        return Ok(Json(VoiceConfirmOutcome::NothingRecognized));
    };

    let baseline = app
        .database()
        .current_baseline(auction_id.clone())
        .await
        .map_err(|err| {
            event!(Level::ERROR, err = err.to_string());
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let gateway = RepoGateway {
        app: &app,
        auction_id,
        bidder_id,
    };

    let mut guard = session.lock().await;
    let pending_amount = match guard.state() {
        SessionState::Recognized { amount, .. } => Some(*amount),
        _ => None,
    };
    let outcome = vbid_voice::confirm(&mut guard, baseline, &gateway)
        .await
        .map_err(|err| {
            event!(Level::ERROR, err = err.to_string());
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    drop(guard);

    let response = match outcome {
        ConfirmOutcome::Placed(bid) => {
            sessions.remove(&key);
            VoiceConfirmOutcome::Placed { bid }
        }
        ConfirmOutcome::TooLow { amount, baseline } => {
            VoiceConfirmOutcome::TooLow { amount, baseline }
        }
        ConfirmOutcome::Rejected(Rejection::TooLow { baseline }) => {
            // lost the race inside the store; surface the fresh baseline,
            // amount retained in the session for a retry
            VoiceConfirmOutcome::TooLow {
                amount: pending_amount.unwrap_or(baseline),
                baseline,
            }
        }
        ConfirmOutcome::Rejected(Rejection::Invalid) => VoiceConfirmOutcome::Invalid,
        ConfirmOutcome::Rejected(Rejection::AuctionClosed) => VoiceConfirmOutcome::AuctionClosed,
        ConfirmOutcome::Rejected(Rejection::AuctionNotFound) => {
            return Err(StatusCode::NOT_FOUND);
        }
        ConfirmOutcome::Rejected(Rejection::NotAuthenticated) => {
            return Err(StatusCode::UNAUTHORIZED);
        }
        ConfirmOutcome::InFlight => VoiceConfirmOutcome::InFlight,
        ConfirmOutcome::NothingRecognized => VoiceConfirmOutcome::NothingRecognized,
    };

    Ok(Json(response))
}

/// Inspect the session (for UI re-hydration after a reload).
///
/// # Returns
///
/// - `200 OK`: The session snapshot; `idle` when no session exists
/// - `401 Unauthorized`: No authenticated identity
async fn get_session<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(Id { auction_id }): Path<Id<AuctionIdOf<T>>>,
    Extension(sessions): Extension<Arc<VoiceSessions<T>>>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    let bidder_id = app
        .authenticate(&auth)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let snapshot = match sessions.get(&(bidder_id, auction_id)) {
        Some(session) => SessionSnapshot::from(session.lock().await.state()),
        None => SessionSnapshot::Idle,
    };
    Ok(Json(snapshot))
}

/// Cancel the session, discarding any recognized amount.
///
/// Idempotent: cancelling a session that does not exist (or is already
/// idle) succeeds. A submission already in flight is not interrupted; the
/// returned snapshot says so.
///
/// # Returns
///
/// - `200 OK`: The post-cancel session snapshot
/// - `401 Unauthorized`: No authenticated identity
async fn cancel_session<T: ApiApplication>(
    State(app): State<T>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(Id { auction_id }): Path<Id<AuctionIdOf<T>>>,
    Extension(sessions): Extension<Arc<VoiceSessions<T>>>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    let bidder_id = app
        .authenticate(&auth)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let key = (bidder_id, auction_id);
    let Some(session) = sessions.get(&key) else {
        return Ok(Json(SessionSnapshot::Idle));
    };

    let mut guard = session.lock().await;
    let cancelled = guard.cancel();
    let snapshot = SessionSnapshot::from(guard.state());
    drop(guard);

    if cancelled {
        sessions.remove(&key);
    }
    Ok(Json(snapshot))
}

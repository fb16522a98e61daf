//! Application implementation with JWT-based authorization.
//!
//! This module provides the concrete implementation of the `Application`
//! trait, integrating the SQLite repositories and the speech capture
//! backend with JWT-based authorization.

use std::time::Duration;

use headers::{Authorization, authorization::Bearer};
use jwt_simple::{
    claims::{JWTClaims, NoCustomClaims},
    prelude::{HS256Key, MACLike},
};
use uuid::Uuid;
use vbid_core::ports::{
    Application, CaptureSession, CaptureUnsupported, SpeechCapture, SpokenInput,
};
use vbid_sqlite::{
    Db,
    types::{AuctionId, BidId, BidderId, DateTime},
};
use vbid_voice::{TranscriptCapture, WhisperCapture, WhisperConfig};

use crate::VoiceConfig;

/// The deployment's speech backend: Whisper when an API key is configured,
/// the transcript passthrough otherwise.
#[derive(Clone)]
pub enum DemoCapture {
    /// Server-side transcription through the OpenAI API
    Whisper(WhisperCapture),
    /// Client-side transcripts only; audio is refused
    Transcript(TranscriptCapture),
}

impl SpeechCapture for DemoCapture {
    fn start(&self, input: SpokenInput) -> Result<CaptureSession, CaptureUnsupported> {
        match self {
            Self::Whisper(capture) => capture.start(input),
            Self::Transcript(capture) => capture.start(input),
        }
    }
}

/// Main application implementation combining all system components.
///
/// Uses JWT bearer tokens for authorization: the standard `sub` claim is
/// the bidder id.
#[derive(Clone)]
pub struct DemoApp {
    /// Database connection for persistent storage
    pub db: Db,
    /// HMAC key for JWT token verification
    pub key: HS256Key,
    capture: DemoCapture,
}

impl DemoApp {
    /// Assemble the application from its parts.
    pub fn new(db: Db, key: HS256Key, voice: &VoiceConfig) -> Self {
        let capture = match voice.whisper_api_key.as_deref() {
            Some(api_key) if !api_key.is_empty() => {
                let config = WhisperConfig {
                    api_key: api_key.to_owned(),
                    model: voice.whisper_model.clone(),
                    request_timeout: Duration::from_secs(voice.request_timeout_secs),
                };
                match WhisperCapture::new(config) {
                    Ok(whisper) => DemoCapture::Whisper(whisper),
                    Err(_) => {
                        tracing::warn!(
                            "whisper backend unavailable, falling back to transcripts only"
                        );
                        DemoCapture::Transcript(TranscriptCapture::new())
                    }
                }
            }
            _ => DemoCapture::Transcript(TranscriptCapture::new()),
        };

        Self { db, key, capture }
    }

    /// Extract and verify JWT claims from the authorization header.
    fn claims(&self, context: &Authorization<Bearer>) -> Option<JWTClaims<NoCustomClaims>> {
        let token = context.token();
        self.key.verify_token::<NoCustomClaims>(token, None).ok()
    }
}

impl Application for DemoApp {
    type Context = Authorization<Bearer>;
    type Repository = Db;
    type Capture = DemoCapture;

    fn database(&self) -> &Db {
        &self.db
    }

    fn capture(&self) -> &DemoCapture {
        &self.capture
    }

    fn now(&self) -> DateTime {
        time::OffsetDateTime::now_utc().into()
    }

    fn generate_auction_id(&self) -> AuctionId {
        Uuid::new_v4().into()
    }

    fn generate_bid_id(&self) -> BidId {
        Uuid::new_v4().into()
    }

    async fn authenticate(&self, context: &Self::Context) -> Option<BidderId> {
        // The standard sub: claim is the bidder id
        self.claims(context)?.subject?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jwt_simple::prelude::{Claims, Duration as JwtDuration};
    use vbid_sqlite::config::SqliteConfig;

    async fn app_with_key(key: HS256Key) -> DemoApp {
        let db = Db::open(&SqliteConfig::default()).await.unwrap();
        DemoApp::new(db, key, &VoiceConfig::default())
    }

    #[tokio::test]
    async fn valid_tokens_resolve_to_their_subject() {
        let key = HS256Key::generate();
        let app = app_with_key(key.clone()).await;

        let bidder = Uuid::new_v4();
        let claims = Claims::create(JwtDuration::from_days(1)).with_subject(bidder);
        let token = key.authenticate(claims).unwrap();

        let auth = Authorization::bearer(&token).unwrap();
        assert_eq!(app.authenticate(&auth).await, Some(bidder.into()));
    }

    #[tokio::test]
    async fn foreign_and_malformed_tokens_are_anonymous() {
        let app = app_with_key(HS256Key::generate()).await;

        // signed by someone else
        let other_key = HS256Key::generate();
        let claims = Claims::create(JwtDuration::from_days(1)).with_subject(Uuid::new_v4());
        let token = other_key.authenticate(claims).unwrap();
        let auth = Authorization::bearer(&token).unwrap();
        assert_eq!(app.authenticate(&auth).await, None);

        // not a token at all
        let auth = Authorization::bearer("garbage").unwrap();
        assert_eq!(app.authenticate(&auth).await, None);
    }

    #[tokio::test]
    async fn tokens_without_a_subject_are_anonymous() {
        let key = HS256Key::generate();
        let app = app_with_key(key.clone()).await;

        let claims = Claims::create(JwtDuration::from_days(1));
        let token = key.authenticate(claims).unwrap();
        let auth = Authorization::bearer(&token).unwrap();
        assert_eq!(app.authenticate(&auth).await, None);
    }
}

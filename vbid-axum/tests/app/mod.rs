//! The application implementation the API tests run against.
//!
//! Authorization is deliberately thin: the bearer token *is* the bidder id,
//! so tests can mint identities without a signing key.

use headers::{Authorization, authorization::Bearer};
use vbid_core::ports::Application;
use vbid_sqlite::{
    Db,
    types::{AuctionId, BidId, BidderId, DateTime},
};
use vbid_voice::TranscriptCapture;

#[derive(Clone)]
pub struct TestApp {
    pub db: Db,
    capture: TranscriptCapture,
}

impl TestApp {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            capture: TranscriptCapture::new(),
        }
    }
}

impl Application for TestApp {
    type Context = Authorization<Bearer>;
    type Repository = Db;
    type Capture = TranscriptCapture;

    fn database(&self) -> &Db {
        &self.db
    }

    fn capture(&self) -> &TranscriptCapture {
        &self.capture
    }

    fn now(&self) -> DateTime {
        time::OffsetDateTime::now_utc().into()
    }

    fn generate_auction_id(&self) -> AuctionId {
        uuid::Uuid::new_v4().into()
    }

    fn generate_bid_id(&self) -> BidId {
        uuid::Uuid::new_v4().into()
    }

    async fn authenticate(&self, context: &Self::Context) -> Option<BidderId> {
        context.token().parse().ok()
    }
}

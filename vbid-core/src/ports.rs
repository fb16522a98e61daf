mod application;
mod auction;
mod bid;
mod capture;
mod notifier;
mod profile;

pub use application::Application;
pub use auction::AuctionRepository;
pub use bid::{BidFailure, BidRepository};
pub use capture::{
    CaptureEvent, CaptureSession, CaptureUnsupported, SpeechCapture, SpokenInput,
};
pub use notifier::{ChangeNotifier, Subscription};
pub use profile::{ProfileFailure, ProfileRepository};

/// The base trait for every storage adapter.
///
/// Adapters choose their own concrete identifier, timestamp, and error
/// types; the rest of the system is written against these associated types
/// so it never has to care how a particular store represents them.
pub trait Repository: Clone + Send + Sync + 'static {
    /// Infrastructure error type (connection failures, I/O, corrupt rows).
    ///
    /// Domain rejections are *not* errors: operations that can be refused
    /// return a nested `Result<Result<T, Failure>, Self::Error>`.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The adapter's timestamp representation
    type DateTime: Clone + Send + Sync + 'static;

    /// Unique identifier for a bidder
    type BidderId: Clone + Send + Sync + 'static;

    /// Unique identifier for an auction listing
    type AuctionId: Clone + Send + Sync + 'static;

    /// Unique identifier for a bid
    type BidId: Clone + Send + Sync + 'static;
}

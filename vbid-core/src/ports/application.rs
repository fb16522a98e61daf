use super::{BidRepository, ChangeNotifier, ProfileRepository, Repository, SpeechCapture};

/// The application trait ties the ports together and owns every decision
/// that is neither storage nor transport: who the caller is, what ids new
/// records get, what time it is, and which capture backend is wired in.
///
/// Each server/page declares its dependency on an `Application` value
/// explicitly; there is no ambient session state. Implementations live at
/// the outermost layer (see `vbdemo` for the JWT-backed one).
pub trait Application: Clone + Send + Sync + 'static {
    /// The request context authorization decisions are made from
    /// (typically a bearer token header)
    type Context: Send + Sync;

    /// The storage adapter
    type Repository: BidRepository + ProfileRepository + ChangeNotifier;

    /// The speech-recognition backend
    type Capture: SpeechCapture;

    /// The repository handle
    fn database(&self) -> &Self::Repository;

    /// The capture backend handle
    fn capture(&self) -> &Self::Capture;

    /// The current instant, in the repository's representation
    fn now(&self) -> <Self::Repository as Repository>::DateTime;

    /// Mint an identifier for a new auction
    fn generate_auction_id(&self) -> <Self::Repository as Repository>::AuctionId;

    /// Mint an identifier for a new bid
    fn generate_bid_id(&self) -> <Self::Repository as Repository>::BidId;

    /// Resolve the caller's identity, or `None` for an anonymous caller.
    ///
    /// Every mutating operation requires an identity; an anonymous caller
    /// is refused with a not-authenticated failure before any port is
    /// touched.
    fn authenticate(
        &self,
        context: &Self::Context,
    ) -> impl Future<Output = Option<<Self::Repository as Repository>::BidderId>> + Send;
}

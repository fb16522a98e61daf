use super::Repository;
use crate::models::AuctionEvent;

/// A live feed of change events.
///
/// `next` resolves to `None` when the feed is closed (the store shut down).
/// A slow consumer may miss events rather than block writers; since events
/// only carry identifiers and consumers re-read on notification, a missed
/// event at worst delays a refresh until the next one.
pub trait Subscription: Send {
    /// The event type the feed yields
    type Event;

    /// Wait for the next event.
    fn next(&mut self) -> impl Future<Output = Option<Self::Event>> + Send;
}

/// The change-notification port.
///
/// The store publishes an [`AuctionEvent`] after every successful write;
/// subscribers fold the events into their own state by re-reading whatever
/// they display. This decouples the submission contract from any particular
/// transport: the HTTP adapter surfaces the feed as server-sent events,
/// tests consume it directly.
pub trait ChangeNotifier: Repository {
    /// The feed handed to each subscriber
    type Subscription: Subscription<
            Event = AuctionEvent<Self::DateTime, Self::AuctionId, Self::BidId>,
        > + 'static;

    /// Subscribe to change events, optionally filtered to a single auction.
    fn subscribe(&self, auction_id: Option<Self::AuctionId>) -> Self::Subscription;
}

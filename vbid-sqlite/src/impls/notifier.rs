use crate::{Db, Event, types::AuctionId};
use tokio::sync::broadcast;
use vbid_core::ports::{ChangeNotifier, Subscription};

/// A live feed of change events, optionally filtered to one auction.
///
/// Backed by the database's broadcast channel. A subscriber that falls too
/// far behind misses events rather than blocking writers; since consumers
/// re-read on notification, the next event catches them up.
pub struct EventFeed {
    rx: broadcast::Receiver<Event>,
    filter: Option<AuctionId>,
}

impl Subscription for EventFeed {
    type Event = Event;

    async fn next(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await {
                Ok(event) => match &self.filter {
                    Some(id) if event.auction_id() != id => continue,
                    _ => return Some(event),
                },
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "change feed subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl ChangeNotifier for Db {
    type Subscription = EventFeed;

    fn subscribe(&self, auction_id: Option<AuctionId>) -> EventFeed {
        EventFeed {
            rx: self.events.subscribe(),
            filter: auction_id,
        }
    }
}

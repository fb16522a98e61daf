#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

use sqlx::sqlite;
use std::{str::FromStr, time::Duration};
use tokio::{sync::broadcast, try_join};
use vbid_core::models::AuctionEvent;

pub mod config;
mod impls;
pub mod types;

pub use impls::EventFeed;

use config::SqliteConfig;
use types::{AuctionId, BidId, DateTime};

/// How many change events a slow subscriber may fall behind before it
/// starts missing them.
const EVENT_BUFFER: usize = 256;

pub(crate) type Event = AuctionEvent<DateTime, AuctionId, BidId>;

/// SQLite database implementation of the VoiceBid repositories.
///
/// This struct provides separate reader and writer connection pools,
/// implementing all the repository traits defined in `vbid-core`. The
/// separation of read and write connections allows for better concurrency
/// control and follows SQLite best practices for Write-Ahead Logging (WAL)
/// mode.
///
/// # Connection Management
///
/// - `reader`: A connection pool for read operations, allowing concurrent reads
/// - `writer`: A single-connection pool for write operations, ensuring
///   serialized writes, which is also what makes the bid insert's baseline
///   check atomic
///
/// # Example
///
/// ```no_run
/// # use vbid_sqlite::{Db, config::SqliteConfig};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SqliteConfig::default();
/// let db = Db::open(&config).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Db {
    /// Connection pool for read operations
    pub reader: sqlx::Pool<sqlx::Sqlite>,
    /// Connection pool for write operations (limited to 1 connection)
    pub writer: sqlx::Pool<sqlx::Sqlite>,
    events: broadcast::Sender<Event>,
}

impl Db {
    /// Open a connection to the specified SQLite database.
    ///
    /// Creates a new database if one doesn't exist (when `create_if_missing`
    /// is true) and applies all pending migrations.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection fails or migrations fail to
    /// apply.
    pub async fn open(config: &SqliteConfig) -> Result<Self, sqlx::Error> {
        let db_path = config
            .database_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        let mut options =
            sqlite::SqliteConnectOptions::from_str(db_path.as_deref().unwrap_or(":memory:"))?
                .busy_timeout(Duration::from_secs(5))
                .foreign_keys(true)
                .journal_mode(sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlite::SqliteSynchronous::Normal)
                .pragma("journal_size_limit", "27103364")
                .pragma("mmap_size", "134217728")
                .pragma("temp_store", "memory")
                .create_if_missing(config.create_if_missing);

        // In-memory databases are per-connection unless the cache is
        // shared; the reader pool must see the writer's tables.
        if db_path.is_none() {
            options = options.shared_cache(true);
        }

        let reader = sqlite::SqlitePoolOptions::new().connect_with(options.clone());
        let writer = sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options);

        let (reader, writer) = try_join!(reader, writer)?;

        // Run any pending migrations before returning
        sqlx::migrate!("./migrations").run(&writer).await?;

        let (events, _) = broadcast::channel(EVENT_BUFFER);

        Ok(Self {
            reader,
            writer,
            events,
        })
    }

    /// Publish a change event. No subscribers is not an error.
    pub(crate) fn publish(&self, event: Event) {
        let _ = self.events.send(event);
    }
}

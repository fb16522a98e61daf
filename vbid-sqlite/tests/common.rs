use tempfile::TempDir;
use time::OffsetDateTime;
use vbid_sqlite::{Db, config::SqliteConfig, types::DateTime};

/// Open a database backed by a fresh temporary file.
///
/// The TempDir must be held for the life of the test: dropping it deletes
/// the database.
pub async fn open_db() -> (Db, TempDir) {
    let dir = tempfile::tempdir().expect("create tempdir");
    let config = SqliteConfig {
        database_path: Some(dir.path().join("test.db")),
        create_if_missing: true,
    };
    let db = Db::open(&config).await.expect("open database");
    (db, dir)
}

pub fn now() -> DateTime {
    OffsetDateTime::now_utc().into()
}

pub fn minutes_from_now(minutes: i64) -> DateTime {
    (OffsetDateTime::now_utc() + time::Duration::minutes(minutes)).into()
}

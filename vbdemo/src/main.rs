use std::fs::File;

use jwt_simple::prelude::{Claims, Duration, HS256Key, MACLike};
use uuid::Uuid;
use vbdemo::{AppConfig, Cli, Commands, impls::DemoApp};
use vbid_axum::{router, start_server};
use vbid_sqlite::Db;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // By convention, we leverage `tracing` to instrument and log various
    // operations throughout this project.
    // Accordingly, we likely want to subscribe to these events so we can
    // write them to stdio and possibly some durable location.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI args and extract the JWT key
    let cli = Cli::import()?;
    let key = HS256Key::from_bytes(cli.secret.as_bytes());

    // Auxiliary commands run and exit before any server machinery starts.
    if let Some(Commands::Token { bidder, days }) = &cli.command {
        let bidder = bidder.unwrap_or_else(Uuid::new_v4);
        let claims = Claims::create(Duration::from_days(*days)).with_subject(bidder);
        let token = key
            .authenticate(claims)
            .map_err(|e| anyhow::anyhow!("failed to sign token: {e}"))?;
        println!("bidder: {bidder}");
        println!("token:  {token}");
        return Ok(());
    }

    // Create config with proper layering of CLI args
    let AppConfig {
        server,
        database,
        voice,
    } = AppConfig::load(&cli)?;

    // Open database with config
    let db = Db::open(&database).await?;
    let app = DemoApp::new(db, key, &voice);

    // If requested, dump the schema and exit.
    if let Some(path) = cli.schema {
        let schema = router(app, server).1;
        serde_json::to_writer_pretty(File::create(path)?, &schema)?;
        return Ok(());
    }

    start_server(server, app).await?;

    Ok(())
}

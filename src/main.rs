//! startup-insights - reporting API over startup, mentor and session records

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use startup_insights::{
    config::Args,
    db::{ConnectSettings, SourceHandle},
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("startup_insights={},info", args.log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if let Err(e) = args.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  startup-insights");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("MongoDB: {}", args.redacted_database_url());
    info!("Database: {}", args.database_name);
    info!(
        "Collections: startups={} mentors={} sessions={}",
        args.collections.startups, args.collections.mentors, args.collections.sessions
    );
    info!("Cache TTL: {}s (max {} entries)", args.cache_ttl_secs, args.cache_max_entries);
    info!("Seeding: {}", if args.seed_enabled { "enabled" } else { "disabled" });
    info!("======================================");

    let source = SourceHandle::lazy(ConnectSettings {
        uri: args.database_url.clone(),
        db_name: args.database_name.clone(),
        collections: args.collections.clone(),
        display_uri: args.redacted_database_url(),
    });

    // Connect eagerly so a bad DATABASE_URL shows up at startup; the server
    // still runs and serves empty reports without a database
    if source.get().await.is_none() {
        warn!("Continuing without a database, every report will be empty");
    }

    let state = Arc::new(AppState::new(args, source));
    server::run(state).await?;

    Ok(())
}

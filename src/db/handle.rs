//! Lazily-initialized shared source handle
//!
//! The first caller that needs data triggers the connection attempt; its
//! outcome (a source, or nothing) is kept for the life of the process.
//! Reconnecting after a failed attempt means restarting the process.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::config::CollectionArgs;
use crate::db::mongo::MongoSource;
use crate::db::source::RecordSource;

/// Connection parameters for the lazy MongoDB connection
#[derive(Debug, Clone)]
pub struct ConnectSettings {
    pub uri: String,
    pub db_name: String,
    pub collections: CollectionArgs,
    /// Password-masked URI for log lines
    pub display_uri: String,
}

/// Shared, read-only handle to the record source
pub struct SourceHandle {
    cell: OnceCell<Option<Arc<dyn RecordSource>>>,
    settings: Option<ConnectSettings>,
}

impl SourceHandle {
    /// Connect to MongoDB on first use
    pub fn lazy(settings: ConnectSettings) -> Self {
        Self {
            cell: OnceCell::new(),
            settings: Some(settings),
        }
    }

    /// Handle over an already-connected source
    pub fn ready(source: Arc<dyn RecordSource>) -> Self {
        Self {
            cell: OnceCell::new_with(Some(Some(source))),
            settings: None,
        }
    }

    /// Handle that never yields a source
    pub fn unavailable() -> Self {
        Self {
            cell: OnceCell::new_with(Some(None)),
            settings: None,
        }
    }

    /// The source, connecting first if nobody has tried yet
    pub async fn get(&self) -> Option<Arc<dyn RecordSource>> {
        self.cell
            .get_or_init(|| async {
                let settings = self.settings.as_ref()?;
                match MongoSource::connect(
                    &settings.uri,
                    &settings.db_name,
                    settings.collections.clone(),
                )
                .await
                {
                    Ok(source) => {
                        info!(uri = %settings.display_uri, "Record source connected");
                        Some(Arc::new(source) as Arc<dyn RecordSource>)
                    }
                    Err(e) => {
                        error!(
                            uri = %settings.display_uri,
                            "Database connection failed, reports will be empty: {}", e
                        );
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// The source if a connection attempt already succeeded, without connecting
    pub fn current(&self) -> Option<Arc<dyn RecordSource>> {
        self.cell.get().and_then(|source| source.clone())
    }

    /// Whether a connection attempt has been made
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

//! MongoDB client and record source
//!
//! Connects with the stable server API (v1) and short selection timeouts so an
//! unreachable cluster fails fast instead of hanging the first request.

use bson::{doc, Bson, Document};
use futures::StreamExt;
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};
use std::time::Duration;
use tracing::{error, info};

use crate::config::CollectionArgs;
use crate::db::source::{CollectionKind, RecordSource};
use crate::types::{InsightsError, Result};

const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(3);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify the connection with a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| InsightsError::Unavailable(format!("Invalid DATABASE_URL: {}", e)))?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
        options.connect_timeout = Some(CONNECT_TIMEOUT);
        options.app_name.get_or_insert_with(|| "startup-insights".to_string());

        let client = Client::with_options(options).map_err(|e| {
            InsightsError::Unavailable(format!("Failed to create MongoDB client: {}", e))
        })?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| InsightsError::Unavailable(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Untyped collection handle
    pub fn documents(&self, name: &str) -> Collection<Document> {
        self.client.database(&self.db_name).collection::<Document>(name)
    }

    /// Get the raw MongoDB client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// [`RecordSource`] over a MongoDB database
pub struct MongoSource {
    client: MongoClient,
    collections: CollectionArgs,
}

impl MongoSource {
    pub fn new(client: MongoClient, collections: CollectionArgs) -> Self {
        Self {
            client,
            collections,
        }
    }

    /// Connect using a connection string and database name
    pub async fn connect(uri: &str, db_name: &str, collections: CollectionArgs) -> Result<Self> {
        let client = MongoClient::new(uri, db_name).await?;
        Ok(Self::new(client, collections))
    }

    /// Physical collection name for a logical collection
    pub fn collection_name(&self, collection: CollectionKind) -> &str {
        match collection {
            CollectionKind::Startups => &self.collections.startups,
            CollectionKind::Mentors => &self.collections.mentors,
            CollectionKind::Sessions => &self.collections.sessions,
        }
    }
}

#[async_trait::async_trait]
impl RecordSource for MongoSource {
    async fn fetch_all(&self, collection: CollectionKind) -> Result<Vec<Document>> {
        let name = self.collection_name(collection);
        let cursor = self
            .client
            .documents(name)
            .find(doc! {})
            .await
            .map_err(|e| InsightsError::Database(format!("Find on '{}' failed: {}", name, e)))?;

        // A single unreadable document is skipped rather than failing the report
        let docs: Vec<Document> = cursor
            .filter_map(|doc| async move {
                match doc {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!(collection = name, "Error reading document: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(docs)
    }

    async fn insert_many(
        &self,
        collection: CollectionKind,
        docs: Vec<Document>,
    ) -> Result<Vec<String>> {
        let name = self.collection_name(collection);
        let result = self
            .client
            .documents(name)
            .insert_many(docs)
            .await
            .map_err(|e| InsightsError::Database(format!("Insert into '{}' failed: {}", name, e)))?;

        let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(index, _)| *index);

        Ok(ids
            .into_iter()
            .map(|(_, id)| match id {
                Bson::ObjectId(oid) => oid.to_hex(),
                other => other.to_string(),
            })
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .inner()
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| InsightsError::Unavailable(format!("MongoDB ping failed: {}", e)))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "mongodb:{} ({}, {}, {})",
            self.client.db_name(),
            self.collections.startups,
            self.collections.mentors,
            self.collections.sessions
        )
    }
}


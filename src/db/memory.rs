//! In-memory record source

use bson::{oid::ObjectId, Bson, Document};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::db::source::{CollectionKind, RecordSource};
use crate::types::{InsightsError, Result};

/// [`RecordSource`] holding documents in memory
///
/// `set_failing(true)` makes every call fail like a broken query, which is how
/// the degraded paths are exercised.
#[derive(Default)]
pub struct MemorySource {
    collections: DashMap<CollectionKind, Vec<Document>>,
    failing: AtomicBool,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper to preload a collection
    pub fn with(self, collection: CollectionKind, docs: Vec<Document>) -> Self {
        self.collections.insert(collection, docs);
        self
    }

    /// Replace the contents of a collection
    pub fn replace(&self, collection: CollectionKind, docs: Vec<Document>) {
        self.collections.insert(collection, docs);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: CollectionKind) -> usize {
        self.collections
            .get(&collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    fn check(&self, op: &str, collection: CollectionKind) -> Result<()> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(InsightsError::Database(format!(
                "{} on '{}' failed: simulated failure",
                op, collection
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordSource for MemorySource {
    async fn fetch_all(&self, collection: CollectionKind) -> Result<Vec<Document>> {
        self.check("Find", collection)?;
        Ok(self
            .collections
            .get(&collection)
            .map(|docs| docs.value().clone())
            .unwrap_or_default())
    }

    async fn insert_many(
        &self,
        collection: CollectionKind,
        docs: Vec<Document>,
    ) -> Result<Vec<String>> {
        self.check("Insert", collection)?;

        let mut ids = Vec::with_capacity(docs.len());
        let mut entry = self.collections.entry(collection).or_default();
        for mut doc in docs {
            let id = match doc.get("_id") {
                Some(Bson::ObjectId(oid)) => oid.to_hex(),
                Some(other) => other.to_string(),
                None => {
                    let oid = ObjectId::new();
                    doc.insert("_id", oid);
                    oid.to_hex()
                }
            };
            ids.push(id);
            entry.push(doc);
        }
        Ok(ids)
    }

    async fn ping(&self) -> Result<()> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(InsightsError::Unavailable("simulated failure".into()));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        let counts: Vec<String> = CollectionKind::ALL
            .iter()
            .map(|c| format!("{}={}", c, self.len(*c)))
            .collect();
        format!("memory ({})", counts.join(", "))
    }
}

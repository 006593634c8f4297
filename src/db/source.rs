//! Record source abstraction
//!
//! Three logical collections, read whole. Documents come back untyped because
//! their shape drifts between dataset versions; typing happens in
//! `crate::records` after normalization.

use bson::Document;
use serde::Serialize;
use std::fmt;

use crate::types::Result;

/// The three logical collections the pipeline reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Startups,
    Mentors,
    Sessions,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [Self::Startups, Self::Mentors, Self::Sessions];

    /// Stable identifier used in cache keys and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Startups => "startups",
            Self::Mentors => "mentors",
            Self::Sessions => "sessions",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read access to the record collections, plus insert for seed data
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Every document in a collection
    async fn fetch_all(&self, collection: CollectionKind) -> Result<Vec<Document>>;

    /// Insert documents, returning their ids as hex strings
    async fn insert_many(&self, collection: CollectionKind, docs: Vec<Document>)
        -> Result<Vec<String>>;

    /// Round-trip check against the backing store
    async fn ping(&self) -> Result<()>;

    /// Short description for logs and status output
    fn describe(&self) -> String;
}

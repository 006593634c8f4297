//! Database layer for startup-insights
//!
//! The reporting pipeline only sees the [`RecordSource`] trait. MongoDB is the
//! production implementation; [`MemorySource`] backs tests and embedding.

pub mod handle;
pub mod memory;
pub mod mongo;
pub mod source;

pub use handle::{ConnectSettings, SourceHandle};
pub use memory::MemorySource;
pub use mongo::{MongoClient, MongoSource};
pub use source::{CollectionKind, RecordSource};

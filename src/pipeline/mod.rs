//! Normalization, join and aggregation over fetched records
//!
//! Everything here is pure: records go in, serializable rows come out.

pub mod aggregate;
pub mod export;
pub mod sessions;
pub mod startups;

pub use export::sessions_to_csv;
pub use sessions::{Overview, SessionRow, SignatureRow, StatusCount};
pub use startups::{
    ContactRow, SectorAwards, SectorCount, StageCount, StartupRow, SuggestionRow, TopAward,
};

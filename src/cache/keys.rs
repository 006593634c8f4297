//! Cache key definitions
//!
//! A query is identified by the collection it reads, the report shape built
//! from it and the request parameters.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::db::CollectionKind;

/// Identity of a cached report
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub collection: CollectionKind,
    /// Report name ("sector-distribution", "enriched", ...)
    pub shape: &'static str,
    /// Short hash of the parameters, "none" without any
    pub params_hash: String,
}

impl QueryKey {
    /// Key for a parameterless report
    pub fn new(collection: CollectionKind, shape: &'static str) -> Self {
        Self::with_params(collection, shape, "")
    }

    /// Key for a report with parameters, given in a canonical text form
    pub fn with_params(collection: CollectionKind, shape: &'static str, params: &str) -> Self {
        let params_hash = if params.is_empty() {
            "none".to_string()
        } else {
            let digest = Sha256::digest(params.as_bytes());
            hex::encode(&digest[..8])
        };

        Self {
            collection,
            shape,
            params_hash,
        }
    }

    pub fn to_storage_key(&self) -> String {
        format!("{}:{}:{}", self.collection, self.shape, self.params_hash)
    }

    /// Prefix matching every cached report over a collection
    pub fn collection_pattern(collection: CollectionKind) -> String {
        format!("{}:", collection)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}({})", self.collection, self.shape, self.params_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_layout() {
        let key = QueryKey::new(CollectionKind::Startups, "top-awards");
        assert_eq!(key.to_storage_key(), "startups:top-awards:none");
        assert!(key
            .to_storage_key()
            .starts_with(&QueryKey::collection_pattern(CollectionKind::Startups)));
    }

    #[test]
    fn test_params_distinguish_keys() {
        let a = QueryKey::with_params(CollectionKind::Sessions, "enriched", "status=signed");
        let b = QueryKey::with_params(CollectionKind::Sessions, "enriched", "status=pending");
        let c = QueryKey::with_params(CollectionKind::Sessions, "enriched", "status=signed");

        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.params_hash.len(), 16);
    }
}

//! Field fallback chains
//!
//! A logical field that was renamed between dataset versions is described as
//! an ordered list of candidate source fields plus a default. The first
//! candidate holding a non-empty value wins.

use bson::{Bson, Document};

/// Ordered candidate fields for one logical value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChain {
    /// Source field names, highest priority first
    pub candidates: &'static [&'static str],
    /// Value used when no candidate is present
    pub default: &'static str,
}

/// Contact person: current `contact`, legacy `contactPerson`
pub const CONTACT_PERSON: FieldChain = FieldChain::new(&["contact", "contactPerson"], "N/A");

/// Mentor display name: `name` in one generation, `company` in another
pub const MENTOR_DISPLAY_NAME: FieldChain =
    FieldChain::new(&["name", "company"], "Unknown mentor");

/// Startup display name
pub const STARTUP_DISPLAY_NAME: FieldChain =
    FieldChain::new(&["name", "company"], "Unknown startup");

impl FieldChain {
    pub const fn new(candidates: &'static [&'static str], default: &'static str) -> Self {
        Self {
            candidates,
            default,
        }
    }

    /// First non-empty candidate value, if any
    pub fn resolve_opt(&self, doc: &Document) -> Option<String> {
        self.candidates
            .iter()
            .find_map(|field| text_value(doc.get(*field)))
    }

    /// First non-empty candidate value, or the default
    pub fn resolve(&self, doc: &Document) -> String {
        self.resolve_opt(doc)
            .unwrap_or_else(|| self.default.to_string())
    }

    /// Whether any candidate holds a non-empty value
    pub fn is_present(&self, doc: &Document) -> bool {
        self.resolve_opt(doc).is_some()
    }
}

/// Text form of a scalar value
///
/// Strings are trimmed; blank strings, null and structured values count as
/// absent. Numbers are rendered so that a sector or stage stored as a number
/// still groups.
pub fn text_value(value: Option<&Bson>) -> Option<String> {
    match value? {
        Bson::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        Bson::Double(f) if f.is_finite() => Some(f.to_string()),
        Bson::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

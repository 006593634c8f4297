//! Mentor record

use bson::{oid::ObjectId, Document};

use crate::normalize::{coerce_object_id, MENTOR_DISPLAY_NAME};

/// A mentor; only identity and display name matter to the reports
#[derive(Debug, Clone, PartialEq)]
pub struct Mentor {
    pub id: Option<ObjectId>,
    pub display_name: String,
}

impl Mentor {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: coerce_object_id(doc.get("_id")),
            display_name: MENTOR_DISPLAY_NAME.resolve(doc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_name_generations() {
        assert_eq!(Mentor::from_document(&doc! { "name": "Marta" }).display_name, "Marta");
        assert_eq!(
            Mentor::from_document(&doc! { "company": "Mentoría SL" }).display_name,
            "Mentoría SL"
        );
        assert_eq!(Mentor::from_document(&doc! {}).display_name, "Unknown mentor");
    }

    #[test]
    fn test_string_id_is_coerced() {
        let m = Mentor::from_document(&doc! { "_id": "687dbc64a09e6c626f1bc7e4" });
        assert_eq!(m.id.map(|id| id.to_hex()).as_deref(), Some("687dbc64a09e6c626f1bc7e4"));
    }
}

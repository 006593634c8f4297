//! Startup record

use bson::{oid::ObjectId, Document};

use crate::normalize::{
    coerce_awards, coerce_object_id, text_value, CONTACT_PERSON, STARTUP_DISPLAY_NAME,
};

/// A startup as read from the `startup` collection
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Startup {
    pub id: Option<ObjectId>,
    /// Raw `company` field
    pub company: Option<String>,
    /// First of `name`, `company`, else a placeholder
    pub display_name: String,
    pub sector: Option<String>,
    /// Open enumeration ("idea", "seed", "growth", ...)
    pub stage: Option<String>,
    /// First non-empty of `contact`, `contactPerson`
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    /// Coerced award count, 0 when missing or malformed
    pub awards: i64,
    pub description: Option<String>,
}

impl Startup {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: coerce_object_id(doc.get("_id")),
            company: text_value(doc.get("company")),
            display_name: STARTUP_DISPLAY_NAME.resolve(doc),
            sector: text_value(doc.get("sector")),
            stage: text_value(doc.get("stage")),
            contact_person: CONTACT_PERSON.resolve_opt(doc),
            email: text_value(doc.get("email")),
            website: text_value(doc.get("website")),
            awards: coerce_awards(doc.get("awards")),
            description: text_value(doc.get("description")),
        }
    }

    /// Company label for tables: the raw company, else the display name
    pub fn company_label(&self) -> &str {
        self.company.as_deref().unwrap_or(&self.display_name)
    }

    /// Resolved contact person or "N/A"
    pub fn contact_label(&self) -> &str {
        self.contact_person.as_deref().unwrap_or(CONTACT_PERSON.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_from_current_schema() {
        let s = Startup::from_document(&doc! {
            "_id": ObjectId::parse_str("687dbba6a09e6c626f1bc7e3").unwrap(),
            "company": "Agrotech Sur",
            "sector": "Agro",
            "stage": "seed",
            "contact": "Ana",
            "email": "ana@agrotech.example",
            "website": "https://agrotech.example",
            "awards": "12",
            "description": "Sensores para riego",
        });

        assert_eq!(s.display_name, "Agrotech Sur");
        assert_eq!(s.company_label(), "Agrotech Sur");
        assert_eq!(s.contact_label(), "Ana");
        assert_eq!(s.awards, 12);
        assert_eq!(s.stage.as_deref(), Some("seed"));
    }

    #[test]
    fn test_from_sparse_legacy_document() {
        let s = Startup::from_document(&doc! {
            "name": "Old Co",
            "contactPerson": "Luis",
            "awards": null,
            "website": "",
        });

        assert_eq!(s.id, None);
        assert_eq!(s.company, None);
        assert_eq!(s.company_label(), "Old Co");
        assert_eq!(s.contact_label(), "Luis");
        assert_eq!(s.awards, 0);
        assert_eq!(s.website, None);
        assert_eq!(s.sector, None);
    }
}

//! Mentoring session record

use bson::{oid::ObjectId, Bson, Document};
use chrono::{DateTime, Utc};

use crate::normalize::{
    coerce_bool, coerce_comments, coerce_datetime, coerce_duration, coerce_object_id, text_value,
};

/// Signing state for one party of a session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub signed: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Signature {
    /// From `{ signed: bool, timestamp?: date }`; a bare boolean is accepted too
    pub fn from_bson(value: Option<&Bson>) -> Self {
        match value {
            Some(Bson::Document(doc)) => Self {
                signed: coerce_bool(doc.get("signed")),
                timestamp: coerce_datetime(doc.get("timestamp")),
            },
            other => Self {
                signed: coerce_bool(other),
                timestamp: None,
            },
        }
    }
}

/// A session as stored, with references coerced but not yet joined
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub id: Option<ObjectId>,
    pub mentor_ref: Option<ObjectId>,
    pub startup_ref: Option<ObjectId>,
    /// `date`, or `dateTime` in older documents
    pub date: Option<DateTime<Utc>>,
    pub topic: Option<String>,
    /// Hours
    pub duration: Option<f64>,
    pub summary: Option<String>,
    /// Open-ended ("pending", "signed", ...)
    pub status: Option<String>,
    pub comments: Vec<String>,
    pub pdf_url: Option<String>,
    pub mentor_signed: Signature,
    pub startup_signed: Signature,
}

impl Session {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: coerce_object_id(doc.get("_id")),
            mentor_ref: coerce_object_id(doc.get("mentor")),
            startup_ref: coerce_object_id(doc.get("startup")),
            date: coerce_datetime(doc.get("date")).or_else(|| coerce_datetime(doc.get("dateTime"))),
            topic: text_value(doc.get("topic")),
            duration: coerce_duration(doc.get("duration")),
            summary: text_value(doc.get("summary")),
            status: text_value(doc.get("status")),
            comments: coerce_comments(doc.get("comments")),
            pdf_url: text_value(doc.get("pdfUrl")),
            mentor_signed: Signature::from_bson(doc.get("mentorSigned")),
            startup_signed: Signature::from_bson(doc.get("startupSigned")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::TimeZone;

    #[test]
    fn test_seed_shaped_session() {
        let mentor = ObjectId::parse_str("687dbc7ba09e6c626f1bc7e5").unwrap();
        let when = Utc.with_ymd_and_hms(2025, 8, 10, 14, 0, 0).unwrap();
        let s = Session::from_document(&doc! {
            "mentor": mentor,
            "startup": "687dbc94a09e6c626f1bc7e6",
            "date": bson::DateTime::from_chrono(when),
            "duration": 1.0,
            "topic": "Estrategias de Crecimiento y Escalado",
            "status": "signed",
            "comments": ["Revisar métricas de usuario."],
            "pdfUrl": "",
            "mentorSigned": { "signed": true, "timestamp": bson::DateTime::from_chrono(when) },
            "startupSigned": { "signed": false },
        });

        assert_eq!(s.mentor_ref, Some(mentor));
        assert_eq!(
            s.startup_ref.map(|id| id.to_hex()).as_deref(),
            Some("687dbc94a09e6c626f1bc7e6")
        );
        assert_eq!(s.date, Some(when));
        assert_eq!(s.duration, Some(1.0));
        assert_eq!(s.comments.len(), 1);
        assert_eq!(s.pdf_url, None);
        assert!(s.mentor_signed.signed);
        assert_eq!(s.mentor_signed.timestamp, Some(when));
        assert!(!s.startup_signed.signed);
    }

    #[test]
    fn test_legacy_shapes() {
        let s = Session::from_document(&doc! {
            "mentor": "garbage",
            "dateTime": "2025-07-28T10:00:00Z",
            "comments": "Foco en cliente potencial.",
            "mentorSigned": true,
        });

        assert_eq!(s.mentor_ref, None);
        assert_eq!(s.startup_ref, None);
        assert!(s.date.is_some());
        assert_eq!(s.comments, vec!["Foco en cliente potencial.".to_string()]);
        assert!(s.mentor_signed.signed);
        assert!(!s.startup_signed.signed);
    }
}

//! BSON to JSON rendering for the HTTP boundary
//!
//! Identifiers and timestamps leave the service as strings, never as
//! extended-JSON wrappers (`{"$oid": ...}`).

use bson::{Bson, Document};
use chrono::SecondsFormat;
use serde_json::{Map, Value as JsonValue};

/// Render a document as a flat-as-possible JSON object
pub fn document_to_json(doc: &Document) -> JsonValue {
    let map: Map<String, JsonValue> = doc
        .iter()
        .map(|(key, value)| (key.clone(), bson_to_json(value)))
        .collect();
    JsonValue::Object(map)
}

/// Render a single BSON value
pub fn bson_to_json(value: &Bson) -> JsonValue {
    match value {
        Bson::ObjectId(oid) => JsonValue::String(oid.to_hex()),
        Bson::DateTime(dt) => JsonValue::String(
            dt.to_chrono()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => JsonValue::Array(items.iter().map(bson_to_json).collect()),
        Bson::String(s) => JsonValue::String(s.clone()),
        Bson::Boolean(b) => JsonValue::Bool(*b),
        Bson::Int32(n) => JsonValue::from(*n),
        Bson::Int64(n) => JsonValue::from(*n),
        Bson::Double(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Bson::Null | Bson::Undefined => JsonValue::Null,
        Bson::Binary(bin) => JsonValue::String(hex::encode(&bin.bytes)),
        other => JsonValue::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_identifiers_and_dates_become_strings() {
        let oid = ObjectId::parse_str("687dbba6a09e6c626f1bc7e3").unwrap();
        let when = Utc.with_ymd_and_hms(2025, 8, 10, 14, 0, 0).unwrap();
        let d = doc! {
            "_id": oid,
            "startup": oid,
            "date": bson::DateTime::from_chrono(when),
            "mentorSigned": { "signed": true, "timestamp": bson::DateTime::from_chrono(when) },
            "comments": ["one"],
            "duration": 1.0,
        };

        let json = document_to_json(&d);
        assert_eq!(json["_id"], "687dbba6a09e6c626f1bc7e3");
        assert_eq!(json["startup"], "687dbba6a09e6c626f1bc7e3");
        assert_eq!(json["date"], "2025-08-10T14:00:00.000Z");
        assert_eq!(json["mentorSigned"]["signed"], true);
        assert_eq!(json["mentorSigned"]["timestamp"], "2025-08-10T14:00:00.000Z");
        assert_eq!(json["comments"][0], "one");
        assert_eq!(json["duration"], 1.0);
    }

    #[test]
    fn test_non_finite_double_is_null() {
        assert_eq!(bson_to_json(&Bson::Double(f64::INFINITY)), JsonValue::Null);
    }
}

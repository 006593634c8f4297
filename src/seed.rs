//! Demo session documents
//!
//! Two sessions between fixed example mentors and startups, one pending and
//! one signed. Used by `POST /api/v1/seed_sessions` to populate an empty
//! deployment.

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, TimeZone, Utc};

use crate::types::{InsightsError, Result};

const PENDING_MENTOR: &str = "687dbc64a09e6c626f1bc7e4";
const PENDING_STARTUP: &str = "687dbba6a09e6c626f1bc7e3";
const SIGNED_MENTOR: &str = "687dbc7ba09e6c626f1bc7e5";
const SIGNED_STARTUP: &str = "687dbc94a09e6c626f1bc7e6";

fn oid(hex: &str) -> Result<ObjectId> {
    ObjectId::parse_str(hex).map_err(|e| InsightsError::Internal(format!("bad seed id {}: {}", hex, e)))
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> Result<bson::DateTime> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .map(bson::DateTime::from_chrono)
        .ok_or_else(|| InsightsError::Internal("bad seed date".to_string()))
}

/// The demo sessions; `now` stamps the signatures of the signed one
pub fn demo_sessions(now: DateTime<Utc>) -> Result<Vec<Document>> {
    let signed_at = bson::DateTime::from_chrono(now);
    let first = at(2025, 7, 28, 10)?;
    let second = at(2025, 8, 10, 14)?;

    Ok(vec![
        doc! {
            "mentor": oid(PENDING_MENTOR)?,
            "startup": oid(PENDING_STARTUP)?,
            "date": first,
            "dateTime": first,
            "duration": 1.0,
            "topic": "Diseño de la Propuesta de Valor",
            "summary": "Sesión inicial para definir el valor principal de la startup.",
            "mentorSigned": { "signed": false },
            "startupSigned": { "signed": false },
            "status": "pending",
            "comments": ["Foco en cliente potencial."],
            "pdfUrl": "",
        },
        doc! {
            "mentor": oid(SIGNED_MENTOR)?,
            "startup": oid(SIGNED_STARTUP)?,
            "date": second,
            "dateTime": second,
            "duration": 1.0,
            "topic": "Estrategias de Crecimiento y Escalado",
            "summary": "Discusión sobre próximos pasos para escalar el negocio.",
            "mentorSigned": { "signed": true, "timestamp": signed_at },
            "startupSigned": { "signed": true, "timestamp": signed_at },
            "status": "signed",
            "comments": ["Revisar métricas de usuario."],
            "pdfUrl": "http://tuempresa.com/informe_crecimiento.pdf",
        },
    ])
}

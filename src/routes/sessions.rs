//! Mentoring session routes (/api/v1/sessions*, /api/v1/mentors/signed)

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use serde::Deserialize;

use crate::routes::response::{csv_response, error_response, parse_query, report_response};
use crate::service::Dashboard;
use crate::types::InsightsError;

const CSV_FILENAME: &str = "sessions.csv";

#[derive(Debug, Default, Deserialize)]
struct StatusQuery {
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MentorQuery {
    mentor: Option<String>,
}

/// Enriched session rows, `?status=` filters
pub async fn list(dashboard: &Dashboard, query: Option<&str>) -> Response<Full<Bytes>> {
    match parse_query::<StatusQuery>(query) {
        Ok(q) => {
            let status = q.status.as_deref().map(str::trim).filter(|s| !s.is_empty());
            report_response(&dashboard.sessions(status).await)
        }
        Err(e) => error_response(e),
    }
}

pub async fn raw(dashboard: &Dashboard) -> Response<Full<Bytes>> {
    report_response(&dashboard.raw_sessions().await)
}

pub async fn status_distribution(dashboard: &Dashboard) -> Response<Full<Bytes>> {
    report_response(&dashboard.session_status_distribution().await)
}

pub async fn export_csv(dashboard: &Dashboard) -> Response<Full<Bytes>> {
    csv_response(dashboard.sessions_csv().await, CSV_FILENAME)
}

pub async fn signed_mentors(dashboard: &Dashboard) -> Response<Full<Bytes>> {
    report_response(&dashboard.signed_mentors().await)
}

pub async fn signed_sessions(dashboard: &Dashboard, query: Option<&str>) -> Response<Full<Bytes>> {
    let mentor = match parse_query::<MentorQuery>(query) {
        Ok(MentorQuery { mentor: Some(m) }) if !m.trim().is_empty() => m,
        Ok(_) => {
            return error_response(InsightsError::BadRequest(
                "mentor query parameter is required".into(),
            ))
        }
        Err(e) => return error_response(e),
    };
    report_response(&dashboard.signed_sessions(mentor.trim()).await)
}

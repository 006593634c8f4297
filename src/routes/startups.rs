//! Startup statistics routes (/api/startups/*)

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use serde::Deserialize;

use crate::routes::response::{error_response, parse_query, report_response};
use crate::service::Dashboard;
use crate::types::InsightsError;

#[derive(Debug, Default, Deserialize)]
struct SectorQuery {
    /// Fold the sector tail into "Otros" beyond this many slices
    slices: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct TopAwardsQuery {
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct StageQuery {
    stage: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SuggestionQuery {
    company: Option<String>,
}

pub async fn sector_distribution(dashboard: &Dashboard, query: Option<&str>) -> Response<Full<Bytes>> {
    match parse_query::<SectorQuery>(query) {
        Ok(q) => report_response(&dashboard.sector_distribution(q.slices).await),
        Err(e) => error_response(e),
    }
}

pub async fn stage_distribution(dashboard: &Dashboard) -> Response<Full<Bytes>> {
    report_response(&dashboard.stage_distribution().await)
}

pub async fn awards_by_sector(dashboard: &Dashboard) -> Response<Full<Bytes>> {
    report_response(&dashboard.awards_by_sector().await)
}

pub async fn top_awards(dashboard: &Dashboard, query: Option<&str>) -> Response<Full<Bytes>> {
    match parse_query::<TopAwardsQuery>(query) {
        Ok(TopAwardsQuery { limit: Some(0) }) => {
            error_response(InsightsError::BadRequest("limit must be greater than zero".into()))
        }
        Ok(q) => report_response(&dashboard.top_awards(q.limit).await),
        Err(e) => error_response(e),
    }
}

pub async fn contact_web_status(dashboard: &Dashboard) -> Response<Full<Bytes>> {
    report_response(&dashboard.contact_web_status().await)
}

pub async fn contacts(dashboard: &Dashboard) -> Response<Full<Bytes>> {
    report_response(&dashboard.contacts().await)
}

/// Processed startups, `?stage=` filters ("Todas" keeps all)
pub async fn list(dashboard: &Dashboard, query: Option<&str>) -> Response<Full<Bytes>> {
    match parse_query::<StageQuery>(query) {
        Ok(q) => report_response(&dashboard.startups(q.stage.as_deref()).await),
        Err(e) => error_response(e),
    }
}

pub async fn suggestions(dashboard: &Dashboard, query: Option<&str>) -> Response<Full<Bytes>> {
    let company = match parse_query::<SuggestionQuery>(query) {
        Ok(SuggestionQuery { company: Some(c) }) if !c.trim().is_empty() => c,
        Ok(_) => {
            return error_response(InsightsError::BadRequest(
                "company query parameter is required".into(),
            ))
        }
        Err(e) => return error_response(e),
    };
    report_response(&dashboard.suggestions(company.trim()).await)
}

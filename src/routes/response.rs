//! Response builders shared by the route handlers
//!
//! Every response allows any origin. Report responses add `X-Report-Status`
//! so callers can tell an empty dataset from a degraded read.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_DISPOSITION, CONTENT_TYPE, ETAG,
};
use hyper::{Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::cache::store::compute_etag;
use crate::service::Report;
use crate::types::InsightsError;

pub const REPORT_STATUS_HEADER: HeaderName = HeaderName::from_static("x-report-status");

const JSON: &str = "application/json";
const CSV: &str = "text/csv; charset=utf-8";

/// Response with a body, content type and CORS header
pub fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

/// Serialize `value` as a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => respond(status, JSON, body),
        Err(e) => error_response(InsightsError::from(e)),
    }
}

pub fn error_response(err: InsightsError) -> Response<Full<Bytes>> {
    let (status, body) = err.into_status_code_and_body();
    respond(status, JSON, body)
}

fn with_report_headers(
    mut response: Response<Full<Bytes>>,
    status: &'static str,
    etag: Option<String>,
) -> Response<Full<Bytes>> {
    let headers = response.headers_mut();
    headers.insert(REPORT_STATUS_HEADER, HeaderValue::from_static(status));
    if let Some(value) = etag.and_then(|e| HeaderValue::from_str(&e).ok()) {
        headers.insert(ETAG, value);
    }
    response
}

/// JSON report: always 200, data possibly empty
pub fn report_response<T: Serialize>(report: &Report<T>) -> Response<Full<Bytes>> {
    match serde_json::to_vec(&report.data) {
        Ok(body) => {
            let etag = report.status.is_ok().then(|| compute_etag(&body));
            with_report_headers(respond(StatusCode::OK, JSON, body), report.status.as_str(), etag)
        }
        Err(e) => error_response(InsightsError::from(e)),
    }
}

/// CSV download of a rendered report
pub fn csv_response(report: Report<String>, filename: &str) -> Response<Full<Bytes>> {
    let status = report.status.as_str();
    let mut response = respond(StatusCode::OK, CSV, report.data);
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename)) {
        response.headers_mut().insert(CONTENT_DISPOSITION, value);
    }
    with_report_headers(response, status, None)
}

/// Parse a query string into `T`; a missing query parses as empty
pub fn parse_query<T: DeserializeOwned>(query: Option<&str>) -> Result<T, InsightsError> {
    serde_urlencoded::from_str(query.unwrap_or(""))
        .map_err(|e| InsightsError::BadRequest(format!("invalid query string: {}", e)))
}

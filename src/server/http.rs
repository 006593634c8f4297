//! HTTP server implementation
//!
//! hyper http1 with TokioIo, one task per connection. Routing is a match on
//! method and path; query strings are handed to the route handlers.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::cache::{self, CacheConfig, QueryCache};
use crate::config::Args;
use crate::db::SourceHandle;
use crate::routes::{self, admin, respond, sessions, startups};
use crate::service::{Dashboard, DashboardConfig};
use crate::types::InsightsError;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Report service over the shared source handle and cache
    pub dashboard: Dashboard,
}

impl AppState {
    /// Build state around a source handle, sizing the cache from `args`
    pub fn new(args: Args, source: SourceHandle) -> Self {
        let cache = Arc::new(QueryCache::new(CacheConfig::from_args(&args)));
        let dashboard = Dashboard::new(
            Arc::new(source),
            cache,
            DashboardConfig {
                top_awards_limit: args.top_awards_limit,
                seed_enabled: args.seed_enabled,
            },
        );
        Self { args, dashboard }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), InsightsError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "startup-insights listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    cache::spawn_cleanup_task(state.dashboard.cache_handle());
    info!(
        "Query cache enabled (max {} entries, ttl {}s)",
        state.dashboard.cache().config().max_entries,
        state.dashboard.cache().config().ttl.as_secs()
    );

    if state.args.seed_enabled {
        info!("Seeding enabled at POST /api/v1/seed_sessions");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Handle one request; the body is never read
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    let response = route(state, method.clone(), &path, query.as_deref()).await;

    info!(
        peer = %addr,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "{} {}",
        method,
        path
    );

    Ok(to_boxed(response))
}

/// Dispatch by method and path
pub async fn route(
    state: Arc<AppState>,
    method: Method,
    path: &str,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    let dashboard = &state.dashboard;

    match (method, path) {
        (Method::OPTIONS, _) => preflight_response(),

        (Method::GET, "/") => respond(
            StatusCode::OK,
            "text/plain; charset=utf-8",
            "startup-insights: startup, mentor and session reports. See /health and /api/*.",
        ),

        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state)).await
        }
        (Method::GET, "/ready") | (Method::GET, "/readyz") => {
            routes::readiness_check(Arc::clone(&state)).await
        }
        (Method::GET, "/version") => routes::version_info(),

        // Startups
        (Method::GET, "/api/startups") => startups::list(dashboard, query).await,
        (Method::GET, "/api/startups/sector-distribution") => {
            startups::sector_distribution(dashboard, query).await
        }
        (Method::GET, "/api/startups/stage-distribution") => {
            startups::stage_distribution(dashboard).await
        }
        (Method::GET, "/api/startups/awards-by-sector") => startups::awards_by_sector(dashboard).await,
        (Method::GET, "/api/startups/top-awards") => startups::top_awards(dashboard, query).await,
        (Method::GET, "/api/startups/contact-web-status") => {
            startups::contact_web_status(dashboard).await
        }
        (Method::GET, "/api/startups/contacts") => startups::contacts(dashboard).await,
        (Method::GET, "/api/startups/suggestions") => startups::suggestions(dashboard, query).await,

        // Sessions
        (Method::GET, "/api/v1/sessions") => sessions::list(dashboard, query).await,
        (Method::GET, "/api/v1/sessions/raw") => sessions::raw(dashboard).await,
        (Method::GET, "/api/v1/sessions/status-distribution") => {
            sessions::status_distribution(dashboard).await
        }
        (Method::GET, "/api/v1/sessions/export.csv") => sessions::export_csv(dashboard).await,
        (Method::GET, "/api/v1/sessions/signed") => sessions::signed_sessions(dashboard, query).await,
        (Method::GET, "/api/v1/mentors/signed") => sessions::signed_mentors(dashboard).await,

        // Overview and administration
        (Method::GET, "/api/v1/overview") => admin::overview(dashboard).await,
        (Method::POST, "/api/v1/cache/clear") => admin::clear_cache(dashboard),
        (Method::POST, "/api/v1/seed_sessions") => admin::seed_sessions(dashboard).await,

        (_, path) => not_found_response(path),
    }
}

/// Convert a Full<Bytes> body to BoxBody
fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    response
}

fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    routes::error_response(InsightsError::NotFound(path.to_string()))
}

#[cfg(test)]
pub(crate) fn test_state(source: SourceHandle, seed_enabled: bool) -> Arc<AppState> {
    use clap::Parser;

    let mut args = Args::parse_from(["startup-insights", "--database-url", "mongodb://localhost:27017"]);
    args.seed_enabled = seed_enabled;
    Arc::new(AppState::new(args, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CollectionKind, MemorySource};
    use bson::doc;

    fn state() -> Arc<AppState> {
        let source = MemorySource::new().with(
            CollectionKind::Startups,
            vec![doc! { "company": "a", "sector": "Agro", "awards": 2 }],
        );
        test_state(SourceHandle::ready(Arc::new(source)), true)
    }

    #[tokio::test]
    async fn test_routes_dispatch() {
        let state = state();

        let response = route(state.clone(), Method::GET, "/api/startups/top-awards", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-report-status"], "ok");

        let response = route(state.clone(), Method::GET, "/version", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = route(state.clone(), Method::POST, "/api/v1/seed_sessions", None).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = route(state, Method::GET, "/api/unknown", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Not found: /api/unknown");
    }

    #[tokio::test]
    async fn test_preflight_and_method_mismatch() {
        let state = state();

        let response = route(state.clone(), Method::OPTIONS, "/api/v1/sessions", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-methods"], "GET, POST, OPTIONS");

        let response = route(state, Method::GET, "/api/v1/seed_sessions", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unavailable_database_still_answers() {
        let state = test_state(SourceHandle::unavailable(), false);
        let response = route(state, Method::GET, "/api/v1/sessions", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-report-status"], "unavailable");
    }
}

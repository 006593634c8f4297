//! Dashboard service
//!
//! Each report fetches the collections it needs through the shared
//! [`SourceHandle`], runs the pure pipeline over them and caches successful
//! results. Reads never fail outright: a missing handle or a failed query
//! yields an empty result tagged with a [`ReportStatus`].

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::cache::{QueryCache, QueryKey};
use crate::db::{CollectionKind, RecordSource, SourceHandle};
use crate::normalize::document_to_json;
use crate::pipeline::{
    self, sessions, startups, ContactRow, Overview, SectorAwards, SectorCount, SessionRow,
    StageCount, StartupRow, StatusCount, SuggestionRow, TopAward,
};
use crate::records::{Mentor, Session, Startup};
use crate::seed::demo_sessions;
use crate::types::{InsightsError, Result};

/// Outcome of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    Ok,
    /// No database handle
    Unavailable,
    /// The query ran and failed
    Failed(String),
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Unavailable => "unavailable",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// A report result; degraded reports carry `T::default()`
#[derive(Debug, Clone, PartialEq)]
pub struct Report<T> {
    pub data: T,
    pub status: ReportStatus,
}

impl<T: Default> Report<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            status: ReportStatus::Ok,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            data: T::default(),
            status: ReportStatus::Unavailable,
        }
    }

    pub fn failed(err: &InsightsError) -> Self {
        Self {
            data: T::default(),
            status: ReportStatus::Failed(err.to_string()),
        }
    }
}

impl<T> Report<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Report<U> {
        Report {
            data: f(self.data),
            status: self.status,
        }
    }
}

/// Tunables for the dashboard service
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub top_awards_limit: usize,
    pub seed_enabled: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_awards_limit: 5,
            seed_enabled: false,
        }
    }
}

/// Report service shared by all request handlers
pub struct Dashboard {
    source: Arc<SourceHandle>,
    cache: Arc<QueryCache>,
    config: DashboardConfig,
}

async fn load_startups(source: &dyn RecordSource) -> Result<Vec<Startup>> {
    let docs = source.fetch_all(CollectionKind::Startups).await?;
    Ok(docs.iter().map(Startup::from_document).collect())
}

async fn load_mentors(source: &dyn RecordSource) -> Result<Vec<Mentor>> {
    let docs = source.fetch_all(CollectionKind::Mentors).await?;
    Ok(docs.iter().map(Mentor::from_document).collect())
}

async fn load_sessions(source: &dyn RecordSource) -> Result<Vec<Session>> {
    let docs = source.fetch_all(CollectionKind::Sessions).await?;
    Ok(docs.iter().map(Session::from_document).collect())
}

/// All three collections, joined into session rows
async fn load_enriched(source: &dyn RecordSource) -> Result<Vec<SessionRow>> {
    let (session_rows, mentor_rows, startup_rows) = tokio::try_join!(
        load_sessions(source),
        load_mentors(source),
        load_startups(source)
    )?;
    Ok(sessions::enrich_sessions(&session_rows, &mentor_rows, &startup_rows))
}

impl Dashboard {
    pub fn new(source: Arc<SourceHandle>, cache: Arc<QueryCache>, config: DashboardConfig) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    pub fn source(&self) -> &SourceHandle {
        &self.source
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Shared handle for background tasks
    pub fn cache_handle(&self) -> Arc<QueryCache> {
        Arc::clone(&self.cache)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Serve from cache or compute against the source
    async fn cached<T, F, Fut>(&self, key: QueryKey, compute: F) -> Report<T>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(Arc<dyn RecordSource>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.cache.get(&key) {
            match serde_json::from_slice(&hit.data) {
                Ok(data) => return Report::ok(data),
                Err(e) => warn!(key = %key, "Discarding unreadable cache entry: {}", e),
            }
        }

        let Some(source) = self.source.get().await else {
            return Report::unavailable();
        };

        let generation = self.cache.generation();
        match compute(source).await {
            Ok(data) => {
                match serde_json::to_vec(&data) {
                    Ok(bytes) => {
                        self.cache.set_if_current(&key, bytes, generation);
                    }
                    Err(e) => warn!(key = %key, "Report not cached: {}", e),
                }
                Report::ok(data)
            }
            Err(e) => {
                error!(key = %key, "Report query failed: {}", e);
                Report::failed(&e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Startups

    pub async fn sector_distribution(&self, max_slices: Option<usize>) -> Report<Vec<SectorCount>> {
        let params = max_slices.map(|n| format!("slices={}", n)).unwrap_or_default();
        let key = QueryKey::with_params(CollectionKind::Startups, "sector-distribution", &params);
        self.cached(key, |source| async move {
            let rows = load_startups(source.as_ref()).await?;
            Ok(startups::sector_distribution(&rows, max_slices))
        })
        .await
    }

    pub async fn stage_distribution(&self) -> Report<Vec<StageCount>> {
        let key = QueryKey::new(CollectionKind::Startups, "stage-distribution");
        self.cached(key, |source| async move {
            let rows = load_startups(source.as_ref()).await?;
            Ok(startups::stage_distribution(&rows))
        })
        .await
    }

    pub async fn awards_by_sector(&self) -> Report<Vec<SectorAwards>> {
        let key = QueryKey::new(CollectionKind::Startups, "awards-by-sector");
        self.cached(key, |source| async move {
            let rows = load_startups(source.as_ref()).await?;
            Ok(startups::awards_by_sector(&rows))
        })
        .await
    }

    /// Top startups by awards; `None` uses the configured limit
    pub async fn top_awards(&self, limit: Option<usize>) -> Report<Vec<TopAward>> {
        let limit = limit.unwrap_or(self.config.top_awards_limit);
        let key = QueryKey::with_params(
            CollectionKind::Startups,
            "top-awards",
            &format!("limit={}", limit),
        );
        self.cached(key, |source| async move {
            let rows = load_startups(source.as_ref()).await?;
            Ok(startups::top_awards(&rows, limit))
        })
        .await
    }

    pub async fn contact_web_status(&self) -> Report<Vec<StatusCount>> {
        let key = QueryKey::new(CollectionKind::Startups, "contact-web-status");
        self.cached(key, |source| async move {
            let rows = load_startups(source.as_ref()).await?;
            Ok(startups::contact_web_status(&rows))
        })
        .await
    }

    pub async fn contacts(&self) -> Report<Vec<ContactRow>> {
        let key = QueryKey::new(CollectionKind::Startups, "contacts");
        self.cached(key, |source| async move {
            let rows = load_startups(source.as_ref()).await?;
            Ok(startups::contacts(&rows))
        })
        .await
    }

    pub async fn startups(&self, stage: Option<&str>) -> Report<Vec<StartupRow>> {
        let stage = stage.map(str::to_string);
        let params = stage.as_deref().map(|s| format!("stage={}", s)).unwrap_or_default();
        let key = QueryKey::with_params(CollectionKind::Startups, "rows", &params);
        self.cached(key, |source| async move {
            let rows = load_startups(source.as_ref()).await?;
            Ok(startups::startups_by_stage(&rows, stage.as_deref()))
        })
        .await
    }

    pub async fn suggestions(&self, company: &str) -> Report<Vec<SuggestionRow>> {
        let company = company.to_string();
        let key = QueryKey::with_params(
            CollectionKind::Startups,
            "suggestions",
            &format!("company={}", company),
        );
        self.cached(key, |source| async move {
            let rows = load_startups(source.as_ref()).await?;
            Ok(startups::suggestions(&rows, &company))
        })
        .await
    }

    // ------------------------------------------------------------------
    // Sessions

    /// Enriched session rows, optionally restricted to one status
    pub async fn sessions(&self, status: Option<&str>) -> Report<Vec<SessionRow>> {
        let status = status.map(str::to_string);
        let params = status.as_deref().map(|s| format!("status={}", s)).unwrap_or_default();
        let key = QueryKey::with_params(CollectionKind::Sessions, "enriched", &params);
        self.cached(key, |source| async move {
            let rows = load_enriched(source.as_ref()).await?;
            Ok(match status {
                Some(status) => sessions::filter_by_status(rows, &status),
                None => rows,
            })
        })
        .await
    }

    /// Session documents as stored, ids and dates rendered as strings
    pub async fn raw_sessions(&self) -> Report<Vec<serde_json::Value>> {
        let key = QueryKey::new(CollectionKind::Sessions, "raw");
        self.cached(key, |source| async move {
            let docs = source.fetch_all(CollectionKind::Sessions).await?;
            Ok(docs.iter().map(document_to_json).collect())
        })
        .await
    }

    pub async fn session_status_distribution(&self) -> Report<Vec<StatusCount>> {
        let key = QueryKey::new(CollectionKind::Sessions, "status-distribution");
        self.cached(key, |source| async move {
            let rows = load_sessions(source.as_ref()).await?;
            Ok(sessions::status_distribution(&rows))
        })
        .await
    }

    /// All enriched rows as CSV; degraded reports render the header only
    pub async fn sessions_csv(&self) -> Report<String> {
        self.sessions(None)
            .await
            .map(|rows| pipeline::sessions_to_csv(&rows))
    }

    pub async fn signed_mentors(&self) -> Report<Vec<String>> {
        let key = QueryKey::new(CollectionKind::Sessions, "signed-mentors");
        self.cached(key, |source| async move {
            let rows = load_enriched(source.as_ref()).await?;
            Ok(sessions::signed_mentor_names(&rows))
        })
        .await
    }

    pub async fn signed_sessions(&self, mentor: &str) -> Report<Vec<SessionRow>> {
        let mentor = mentor.to_string();
        let key = QueryKey::with_params(
            CollectionKind::Sessions,
            "signed",
            &format!("mentor={}", mentor),
        );
        self.cached(key, |source| async move {
            let rows = load_enriched(source.as_ref()).await?;
            Ok(sessions::signed_sessions_for(rows, &mentor))
        })
        .await
    }

    /// Headline counters; keyed under sessions so seeding refreshes them
    pub async fn overview(&self) -> Report<Overview> {
        let key = QueryKey::new(CollectionKind::Sessions, "overview");
        self.cached(key, |source| async move {
            let (startup_docs, mentor_docs, session_rows) = tokio::try_join!(
                source.fetch_all(CollectionKind::Startups),
                source.fetch_all(CollectionKind::Mentors),
                load_sessions(source.as_ref())
            )?;
            Ok(Overview {
                total_startups: startup_docs.len() as u64,
                total_mentors: mentor_docs.len() as u64,
                signed_sessions: sessions::count_signed(&session_rows),
            })
        })
        .await
    }

    // ------------------------------------------------------------------
    // Administration

    /// Drop every cached report, returning how many were removed
    pub fn clear_cache(&self) -> usize {
        self.cache.clear()
    }

    /// Insert the demo sessions and drop cached session reports
    pub async fn seed_sessions(&self) -> Result<Vec<String>> {
        if !self.config.seed_enabled {
            return Err(InsightsError::Forbidden(
                "seeding is disabled (set SEED_ENABLED=true)".to_string(),
            ));
        }

        let source = self
            .source
            .get()
            .await
            .ok_or_else(|| InsightsError::Unavailable("no database connection".to_string()))?;

        let docs = demo_sessions(chrono::Utc::now())?;
        let ids = source.insert_many(CollectionKind::Sessions, docs).await?;

        let dropped = self
            .cache
            .invalidate_pattern(&QueryKey::collection_pattern(CollectionKind::Sessions));
        info!(inserted = ids.len(), invalidated = dropped, "Seeded demo sessions");

        Ok(ids)
    }

    /// Ping the source if one was connected
    pub async fn ping(&self) -> Result<()> {
        match self.source.current() {
            Some(source) => source.ping().await,
            None => Err(InsightsError::Unavailable("no database connection".to_string())),
        }
    }
}

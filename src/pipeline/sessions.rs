//! Session enrichment
//!
//! Left-joins mentors and startups into sessions by coerced identifier and
//! produces display-ready rows plus the session summaries built on them.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::normalize::{format_session_date, MENTOR_DISPLAY_NAME, STARTUP_DISPLAY_NAME};
use crate::pipeline::aggregate::{group_count, UNKNOWN_SENTINEL};
use crate::records::{Mentor, Session, Signature, Startup};

/// Status value marking a fully signed session
pub const SIGNED_STATUS: &str = "signed";

/// Signing state as rendered in a row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignatureRow {
    pub signed: bool,
    pub timestamp: Option<String>,
}

impl From<&Signature> for SignatureRow {
    fn from(sig: &Signature) -> Self {
        Self {
            signed: sig.signed,
            timestamp: sig.timestamp.as_ref().map(format_session_date),
        }
    }
}

/// A session with its mentor and startup resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRow {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    /// Joined mentor id, null when the reference did not resolve
    pub mentor_id: Option<String>,
    pub mentor_name: String,
    pub startup_id: Option<String>,
    pub startup_company: String,
    /// `YYYY-MM-DD HH:MM`
    pub date: Option<String>,
    pub topic: Option<String>,
    pub duration: Option<f64>,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub comments: Vec<String>,
    #[serde(rename = "pdfUrl", default)]
    pub pdf_url: String,
    #[serde(rename = "mentorSigned", default)]
    pub mentor_signed: SignatureRow,
    #[serde(rename = "startupSigned", default)]
    pub startup_signed: SignatureRow,
}

impl SessionRow {
    pub fn is_signed(&self) -> bool {
        is_signed_status(self.status.as_deref())
    }
}

/// `{status, count}` pair, shared by the session and contact summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// Headline counters for the dashboard landing view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Overview {
    pub total_startups: u64,
    pub total_mentors: u64,
    pub signed_sessions: u64,
}

fn is_signed_status(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case(SIGNED_STATUS))
}

/// Index records by id; the first record wins when ids repeat
fn index_by_id<'a, T>(items: &'a [T], id: impl Fn(&T) -> Option<ObjectId>) -> HashMap<ObjectId, &'a T> {
    let mut index = HashMap::with_capacity(items.len());
    for item in items {
        if let Some(oid) = id(item) {
            index.entry(oid).or_insert(item);
        }
    }
    index
}

/// Join mentors and startups into sessions
///
/// Produces exactly one row per session. Unresolved references keep the row
/// with a null joined id and a placeholder name. Rows are ordered by date,
/// newest first; undated rows go last in their original order.
pub fn enrich_sessions(sessions: &[Session], mentors: &[Mentor], startups: &[Startup]) -> Vec<SessionRow> {
    let mentors_by_id = index_by_id(mentors, |m| m.id);
    let startups_by_id = index_by_id(startups, |s| s.id);

    let mut rows: Vec<SessionRow> = sessions
        .iter()
        .map(|session| {
            let mentor = session.mentor_ref.and_then(|id| mentors_by_id.get(&id).copied());
            let startup = session.startup_ref.and_then(|id| startups_by_id.get(&id).copied());

            SessionRow {
                id: session.id.map(|id| id.to_hex()),
                mentor_id: mentor.and_then(|m| m.id).map(|id| id.to_hex()),
                mentor_name: mentor
                    .map(|m| m.display_name.clone())
                    .unwrap_or_else(|| MENTOR_DISPLAY_NAME.default.to_string()),
                startup_id: startup.and_then(|s| s.id).map(|id| id.to_hex()),
                startup_company: startup
                    .map(|s| s.display_name.clone())
                    .unwrap_or_else(|| STARTUP_DISPLAY_NAME.default.to_string()),
                date: session.date.as_ref().map(format_session_date),
                topic: session.topic.clone(),
                duration: session.duration,
                summary: session.summary.clone(),
                status: session.status.clone(),
                comments: session.comments.clone(),
                pdf_url: session.pdf_url.clone().unwrap_or_default(),
                mentor_signed: SignatureRow::from(&session.mentor_signed),
                startup_signed: SignatureRow::from(&session.startup_signed),
            }
        })
        .collect();

    // The date format is fixed-width, so string order is chronological
    rows.sort_by(|a, b| match (&a.date, &b.date) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    rows
}

/// Rows whose status equals `status`, ignoring ASCII case; "Unknown" selects
/// rows without one
pub fn filter_by_status(rows: Vec<SessionRow>, status: &str) -> Vec<SessionRow> {
    rows.into_iter()
        .filter(|row| match row.status.as_deref() {
            Some(s) => s.eq_ignore_ascii_case(status),
            None => status.eq_ignore_ascii_case(UNKNOWN_SENTINEL),
        })
        .collect()
}

/// Session counts per status, missing status grouped as "Unknown"
pub fn status_distribution(sessions: &[Session]) -> Vec<StatusCount> {
    group_count(sessions, |s| s.status.as_deref(), UNKNOWN_SENTINEL)
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

/// A resolved mentor with a real name, not the placeholder
fn has_named_mentor(row: &SessionRow) -> bool {
    row.mentor_id.is_some() && row.mentor_name != MENTOR_DISPLAY_NAME.default
}

/// Sorted, unique names of mentors with at least one signed session
///
/// Rows whose mentor did not resolve, or resolved without a name, are
/// skipped so the placeholder never shows up as a selectable mentor.
pub fn signed_mentor_names(rows: &[SessionRow]) -> Vec<String> {
    rows.iter()
        .filter(|row| row.is_signed() && has_named_mentor(row))
        .map(|row| row.mentor_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Signed sessions of one mentor, by display name
pub fn signed_sessions_for(rows: Vec<SessionRow>, mentor_name: &str) -> Vec<SessionRow> {
    rows.into_iter()
        .filter(|row| row.is_signed() && has_named_mentor(row) && row.mentor_name == mentor_name)
        .collect()
}

/// Number of sessions with a signed status
pub fn count_signed(sessions: &[Session]) -> u64 {
    sessions
        .iter()
        .filter(|s| is_signed_status(s.status.as_deref()))
        .count() as u64
}

//! Startup statistics and listings

use serde::{Deserialize, Serialize};

use crate::pipeline::aggregate::{
    completeness, fold_tail, group_count, sum_by_category, top_n_by, SECTOR_SENTINEL,
    UNKNOWN_SENTINEL,
};
use crate::pipeline::sessions::StatusCount;
use crate::records::Startup;

/// Stage filter value selecting every startup
pub const ALL_STAGES: &str = "Todas";

/// Maximum number of suggestions returned for a startup
pub const SUGGESTION_LIMIT: usize = 5;

/// Placeholder for missing text columns in listings
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorCount {
    pub sector: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    pub stage: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorAwards {
    pub sector: String,
    pub total_awards: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopAward {
    pub company: String,
    pub awards: i64,
}

/// Contact directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRow {
    pub company: String,
    #[serde(rename = "contactPerson")]
    pub contact_person: String,
    pub email: String,
    pub sector: String,
    pub website: String,
}

/// Processed startup for the filterable table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupRow {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub company: String,
    pub sector: String,
    pub stage: String,
    #[serde(rename = "contactPerson")]
    pub contact_person: String,
    pub email: String,
    pub website: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRow {
    pub company: String,
    pub sector: String,
    pub stage: String,
    pub description: String,
    pub website: String,
    pub email: String,
}

fn or_na(value: &Option<String>) -> String {
    value.as_deref().unwrap_or(NOT_AVAILABLE).to_string()
}

/// Startups per sector
///
/// With `max_slices`, categories past the first `max_slices - 1` fold into
/// "Otros".
pub fn sector_distribution(startups: &[Startup], max_slices: Option<usize>) -> Vec<SectorCount> {
    let counts = group_count(startups, |s| s.sector.as_deref(), SECTOR_SENTINEL);
    let counts = match max_slices {
        Some(n) => fold_tail(counts, n, SECTOR_SENTINEL),
        None => counts,
    };
    counts
        .into_iter()
        .map(|(sector, count)| SectorCount { sector, count })
        .collect()
}

pub fn stage_distribution(startups: &[Startup]) -> Vec<StageCount> {
    group_count(startups, |s| s.stage.as_deref(), UNKNOWN_SENTINEL)
        .into_iter()
        .map(|(stage, count)| StageCount { stage, count })
        .collect()
}

/// Total coerced awards per sector
pub fn awards_by_sector(startups: &[Startup]) -> Vec<SectorAwards> {
    sum_by_category(startups, |s| s.sector.as_deref(), SECTOR_SENTINEL, |s| s.awards)
        .into_iter()
        .map(|(sector, total_awards)| SectorAwards { sector, total_awards })
        .collect()
}

/// The `limit` startups with the most awards
pub fn top_awards(startups: &[Startup], limit: usize) -> Vec<TopAward> {
    top_n_by(startups, limit, |s| s.awards)
        .into_iter()
        .map(|s| TopAward {
            company: s.company_label().to_string(),
            awards: s.awards,
        })
        .collect()
}

/// Contact and website completeness, four labelled counts
///
/// Empty input yields no rows.
pub fn contact_web_status(startups: &[Startup]) -> Vec<StatusCount> {
    if startups.is_empty() {
        return Vec::new();
    }

    let contact = completeness(startups, |s| s.contact_person.is_some());
    let website = completeness(startups, |s| s.website.is_some());

    [
        ("Con contacto", contact.with),
        ("Sin contacto", contact.without),
        ("Con web", website.with),
        ("Sin web", website.without),
    ]
    .into_iter()
    .map(|(status, count)| StatusCount {
        status: status.to_string(),
        count,
    })
    .collect()
}

/// Startups with a resolved contact person
pub fn contacts(startups: &[Startup]) -> Vec<ContactRow> {
    startups
        .iter()
        .filter_map(|s| {
            let contact = s.contact_person.as_ref()?;
            Some(ContactRow {
                company: s.company_label().to_string(),
                contact_person: contact.clone(),
                email: or_na(&s.email),
                sector: or_na(&s.sector),
                website: or_na(&s.website),
            })
        })
        .collect()
}

fn startup_row(s: &Startup) -> StartupRow {
    StartupRow {
        id: s.id.map(|id| id.to_hex()),
        company: s.company_label().to_string(),
        sector: s.sector.clone().unwrap_or_else(|| SECTOR_SENTINEL.to_string()),
        stage: s.stage.clone().unwrap_or_else(|| UNKNOWN_SENTINEL.to_string()),
        contact_person: s.contact_label().to_string(),
        email: or_na(&s.email),
        website: or_na(&s.website),
    }
}

/// Processed startups, optionally filtered by stage
///
/// `None` or "Todas" keeps everything; "Unknown" selects startups without a
/// stage.
pub fn startups_by_stage(startups: &[Startup], stage: Option<&str>) -> Vec<StartupRow> {
    let stage = stage.map(str::trim).filter(|s| !s.is_empty() && *s != ALL_STAGES);
    startups
        .iter()
        .map(startup_row)
        .filter(|row| stage.map_or(true, |wanted| row.stage == wanted))
        .collect()
}

/// Other startups sharing the selected startup's sector or stage
///
/// The selected startup is the last record whose company label matches; only
/// that record (and any record with the same id) is left out. An unknown
/// company, or one with neither sector nor stage, has no suggestions.
pub fn suggestions(startups: &[Startup], company: &str) -> Vec<SuggestionRow> {
    let Some(selected) = startups.iter().rposition(|s| s.company_label() == company) else {
        return Vec::new();
    };
    let target = &startups[selected];

    let shares = |a: &Option<String>, b: &Option<String>| matches!((a, b), (Some(x), Some(y)) if x == y);
    let is_target = |i: usize, s: &Startup| i == selected || (target.id.is_some() && s.id == target.id);

    startups
        .iter()
        .enumerate()
        .filter(|(i, s)| {
            !is_target(*i, s) && (shares(&s.sector, &target.sector) || shares(&s.stage, &target.stage))
        })
        .take(SUGGESTION_LIMIT)
        .map(|(_, s)| SuggestionRow {
            company: s.company_label().to_string(),
            sector: or_na(&s.sector),
            stage: or_na(&s.stage),
            description: s.description.clone().unwrap_or_default(),
            website: or_na(&s.website),
            email: or_na(&s.email),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId, Bson, Document};

    fn startup(company: &str, sector: Option<&str>, stage: Option<&str>) -> Startup {
        let mut d: Document = doc! { "company": company };
        if let Some(sector) = sector {
            d.insert("sector", sector);
        }
        if let Some(stage) = stage {
            d.insert("stage", stage);
        }
        Startup::from_document(&d)
    }

    fn with_awards(company: &str, awards: Bson) -> Startup {
        Startup::from_document(&doc! { "company": company, "awards": awards })
    }

    #[test]
    fn test_top_awards_coerces_and_ranks() {
        let rows = vec![
            with_awards("a", Bson::Int32(3)),
            with_awards("b", Bson::String("10".into())),
            with_awards("c", Bson::Null),
            with_awards("d", Bson::Int32(7)),
            with_awards("e", Bson::String("x".into())),
        ];
        let awards: Vec<i64> = top_awards(&rows, 3).into_iter().map(|t| t.awards).collect();
        assert_eq!(awards, vec![10, 7, 3]);

        let top = top_awards(&rows, 3);
        assert_eq!(top[0].company, "b");
    }

    #[test]
    fn test_contact_web_status() {
        let rows: Vec<Startup> = vec![
            Startup::from_document(&doc! { "company": "a", "website": "a.io", "contact": "Ana" }),
            Startup::from_document(&doc! { "company": "b", "website": "b.io", "contactPerson": "Luis" }),
            Startup::from_document(&doc! { "company": "c", "website": "c.io" }),
            Startup::from_document(&doc! { "company": "d", "website": "" }),
            Startup::from_document(&doc! { "company": "e", "website": null }),
        ];

        let status = contact_web_status(&rows);
        let pairs: Vec<(&str, u64)> = status.iter().map(|s| (s.status.as_str(), s.count)).collect();
        assert_eq!(
            pairs,
            vec![("Con contacto", 2), ("Sin contacto", 3), ("Con web", 3), ("Sin web", 2)]
        );
    }

    #[test]
    fn test_sector_counts_sum_to_total() {
        let rows = vec![
            startup("a", Some("Agro"), None),
            startup("b", None, None),
            startup("c", Some("Fintech"), None),
            startup("d", Some("Agro"), None),
        ];
        let dist = sector_distribution(&rows, None);
        assert_eq!(dist[0], SectorCount { sector: "Agro".into(), count: 2 });
        assert!(dist.iter().any(|d| d.sector == "Otros" && d.count == 1));
        assert_eq!(dist.iter().map(|d| d.count).sum::<u64>(), rows.len() as u64);

        let folded = sector_distribution(&rows, Some(2));
        assert_eq!(folded.len(), 2);
        assert_eq!(folded.iter().map(|d| d.count).sum::<u64>(), rows.len() as u64);
    }

    #[test]
    fn test_awards_by_sector() {
        let rows = vec![
            Startup::from_document(&doc! { "company": "a", "sector": "Agro", "awards": "4" }),
            Startup::from_document(&doc! { "company": "b", "awards": 2 }),
            Startup::from_document(&doc! { "company": "c", "sector": "Agro", "awards": 5 }),
        ];
        assert_eq!(
            awards_by_sector(&rows),
            vec![
                SectorAwards { sector: "Agro".into(), total_awards: 9 },
                SectorAwards { sector: "Otros".into(), total_awards: 2 },
            ]
        );
    }

    #[test]
    fn test_contacts_and_stage_filter() {
        let rows = vec![
            Startup::from_document(&doc! { "company": "a", "contact": "Ana", "stage": "seed" }),
            Startup::from_document(&doc! { "company": "b", "stage": "growth" }),
            Startup::from_document(&doc! { "company": "c", "contactPerson": "Luis" }),
        ];

        let listed = contacts(&rows);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].contact_person, "Luis");
        assert_eq!(listed[1].email, "N/A");

        assert_eq!(startups_by_stage(&rows, None).len(), 3);
        assert_eq!(startups_by_stage(&rows, Some("Todas")).len(), 3);
        assert_eq!(startups_by_stage(&rows, Some("seed"))[0].contact_person, "Ana");
        assert_eq!(startups_by_stage(&rows, Some("Unknown"))[0].company, "c");
        assert_eq!(startups_by_stage(&rows, Some("growth"))[0].contact_person, "N/A");
    }

    #[test]
    fn test_suggestions() {
        let mut rows = vec![startup("target", Some("Agro"), Some("seed"))];
        rows.push(startup("same-sector", Some("Agro"), Some("growth")));
        rows.push(startup("same-stage", Some("Health"), Some("seed")));
        rows.push(startup("unrelated", Some("Health"), Some("growth")));
        rows.push(startup("no-fields", None, None));
        for i in 0..6 {
            rows.push(startup(&format!("agro-{}", i), Some("Agro"), None));
        }

        let found = suggestions(&rows, "target");
        assert_eq!(found.len(), SUGGESTION_LIMIT);
        assert_eq!(found[0].company, "same-sector");
        assert_eq!(found[1].company, "same-stage");
        assert!(found.iter().all(|s| s.company != "target" && s.company != "unrelated"));

        assert!(suggestions(&rows, "missing").is_empty());
        assert!(suggestions(&rows, "no-fields").is_empty());
    }

    #[test]
    fn test_suggestions_with_duplicate_company_names() {
        let id = ObjectId::new();
        let mut first = startup("twin", Some("Agro"), Some("seed"));
        first.id = Some(ObjectId::new());
        let mut second = startup("twin", Some("Agro"), Some("growth"));
        second.id = Some(id);
        let mut copy = startup("twin-copy", Some("Agro"), None);
        copy.id = Some(id);
        let other = startup("other", None, Some("growth"));

        let rows = vec![first, second, copy, other];
        let found: Vec<String> = suggestions(&rows, "twin").into_iter().map(|s| s.company).collect();

        // The last "twin" is selected; the earlier one is a regular candidate
        assert_eq!(found, vec!["twin".to_string(), "other".to_string()]);
    }

    #[test]
    fn test_awards_by_sector_clamps_huge_values() {
        let rows = vec![
            Startup::from_document(&doc! { "company": "a", "sector": "Agro", "awards": 1e19 }),
            Startup::from_document(&doc! { "company": "b", "sector": "Agro", "awards": 5 }),
        ];
        assert_eq!(rows[0].awards, i64::MAX);
        assert_eq!(
            awards_by_sector(&rows),
            vec![SectorAwards { sector: "Agro".into(), total_awards: i64::MAX }]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(sector_distribution(&[], Some(8)).is_empty());
        assert!(stage_distribution(&[]).is_empty());
        assert!(awards_by_sector(&[]).is_empty());
        assert!(top_awards(&[], 5).is_empty());
        assert!(contact_web_status(&[]).is_empty());
        assert!(contacts(&[]).is_empty());
        assert!(startups_by_stage(&[], None).is_empty());
    }
}

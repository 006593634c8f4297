//! Generic aggregate building blocks
//!
//! All functions work over the whole input, accept empty input and are
//! deterministic: ties keep the order in which categories (or records) were
//! first seen.

use std::collections::HashMap;

/// Totals that clamp at their bounds instead of overflowing
pub trait Tally: Copy + Ord + Default {
    fn tally(self, other: Self) -> Self;
}

impl Tally for u64 {
    fn tally(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

impl Tally for i64 {
    fn tally(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

/// Grouping key used when a record has no sector
pub const SECTOR_SENTINEL: &str = "Otros";

/// Grouping key used when a record has no stage or status
pub const UNKNOWN_SENTINEL: &str = "Unknown";

/// Count records per category
///
/// Records without a category are counted under `sentinel`. Output is sorted
/// by count, descending, with ties in first-encounter order.
pub fn group_count<'a, T, F>(items: &'a [T], category: F, sentinel: &str) -> Vec<(String, u64)>
where
    F: Fn(&'a T) -> Option<&'a str>,
{
    group_fold(items, category, sentinel, |_| 1u64)
}

/// Sum a per-record value per category, same grouping rules as [`group_count`]
pub fn sum_by_category<'a, T, F, V>(
    items: &'a [T],
    category: F,
    sentinel: &str,
    value: V,
) -> Vec<(String, i64)>
where
    F: Fn(&'a T) -> Option<&'a str>,
    V: Fn(&'a T) -> i64,
{
    group_fold(items, category, sentinel, value)
}

fn group_fold<'a, T, F, V, N>(items: &'a [T], category: F, sentinel: &str, value: V) -> Vec<(String, N)>
where
    F: Fn(&'a T) -> Option<&'a str>,
    V: Fn(&'a T) -> N,
    N: Tally,
{
    let mut groups: Vec<(String, N)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = category(item).unwrap_or(sentinel);
        match index.get(key) {
            Some(&i) => groups[i].1 = groups[i].1.tally(value(item)),
            None => {
                let total = N::default().tally(value(item));
                index.insert(key.to_string(), groups.len());
                groups.push((key.to_string(), total));
            }
        }
    }

    // sort_by is stable, so equal totals keep first-encounter order
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
}

/// The first `n` records ranked by `score`, descending
///
/// Stable: records with equal scores keep their dataset order.
pub fn top_n_by<T, F>(items: &[T], n: usize, score: F) -> Vec<&T>
where
    F: Fn(&T) -> i64,
{
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by(|a, b| score(b).cmp(&score(a)));
    ranked.truncate(n);
    ranked
}

/// Records with and without a value, counted independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Completeness {
    pub with: u64,
    pub without: u64,
}

/// Count records where `present` holds vs where it does not
pub fn completeness<T, F>(items: &[T], present: F) -> Completeness
where
    F: Fn(&T) -> bool,
{
    items.iter().fold(Completeness::default(), |mut acc, item| {
        if present(item) {
            acc.with += 1;
        } else {
            acc.without += 1;
        }
        acc
    })
}

/// Collapse the tail of a sorted count list into the sentinel category
///
/// With more than `max_slices` categories, the first `max_slices - 1` are kept
/// and the rest are summed into `sentinel` (merged with an existing sentinel
/// entry if one is kept). `max_slices == 0` disables folding.
pub fn fold_tail(counts: Vec<(String, u64)>, max_slices: usize, sentinel: &str) -> Vec<(String, u64)> {
    if max_slices == 0 || counts.len() <= max_slices {
        return counts;
    }

    let mut kept = counts;
    let tail = kept.split_off(max_slices - 1);
    let tail_total = tail
        .iter()
        .fold(0u64, |acc, (_, count)| acc.saturating_add(*count));

    if tail_total > 0 {
        match kept.iter_mut().find(|(key, _)| key == sentinel) {
            Some(entry) => entry.1 = entry.1.saturating_add(tail_total),
            None => kept.push((sentinel.to_string(), tail_total)),
        }
    }

    kept.sort_by(|a, b| b.1.cmp(&a.1));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sectors(values: &[Option<&'static str>]) -> Vec<Option<&'static str>> {
        values.to_vec()
    }

    #[test]
    fn test_group_count_with_sentinel() {
        let rows = sectors(&[Some("Fintech"), None, Some("Agro"), Some("Fintech"), None, None]);
        let counts = group_count(&rows, |s| *s, SECTOR_SENTINEL);

        assert_eq!(
            counts,
            vec![
                ("Otros".to_string(), 3),
                ("Fintech".to_string(), 2),
                ("Agro".to_string(), 1),
            ]
        );
        let total: u64 = counts.iter().map(|(_, c)| c).sum();
        assert_eq!(total, rows.len() as u64);
    }

    #[test]
    fn test_group_count_ties_keep_first_encounter() {
        let rows = sectors(&[Some("B"), Some("A"), Some("A"), Some("B"), Some("C")]);
        let counts = group_count(&rows, |s| *s, SECTOR_SENTINEL);
        let keys: Vec<&str> = counts.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_group_count_permutation_keeps_counts() {
        let rows = sectors(&[Some("Fintech"), None, Some("Agro"), Some("Fintech")]);
        let mut reversed = rows.clone();
        reversed.reverse();

        let mut a = group_count(&rows, |s| *s, SECTOR_SENTINEL);
        let mut b = group_count(&reversed, |s| *s, SECTOR_SENTINEL);
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sum_by_category() {
        let rows = vec![(Some("Agro"), 3), (None, 4), (Some("Agro"), 10), (Some("Health"), 0)];
        let sums = sum_by_category(&rows, |r| r.0, SECTOR_SENTINEL, |r| r.1);
        assert_eq!(
            sums,
            vec![
                ("Agro".to_string(), 13),
                ("Otros".to_string(), 4),
                ("Health".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_sum_clamps_instead_of_overflowing() {
        let rows = vec![
            (Some("Agro"), i64::MAX - 1),
            (Some("Agro"), 5),
            (Some("Agro"), i64::MAX),
            (Some("Debt"), i64::MIN),
            (Some("Debt"), -5),
        ];
        let sums = sum_by_category(&rows, |r| r.0, SECTOR_SENTINEL, |r| r.1);
        assert_eq!(
            sums,
            vec![("Agro".to_string(), i64::MAX), ("Debt".to_string(), i64::MIN)]
        );
    }

    #[test]
    fn test_top_n_is_stable() {
        let rows = vec![("a", 3), ("b", 10), ("c", 0), ("d", 7), ("e", 0), ("f", 7)];
        let top: Vec<&str> = top_n_by(&rows, 4, |r| r.1).into_iter().map(|r| r.0).collect();
        assert_eq!(top, vec!["b", "d", "f", "a"]);

        assert_eq!(top_n_by(&rows, 100, |r| r.1).len(), rows.len());
    }

    #[test]
    fn test_completeness() {
        let sites = vec![Some("a.io"), None, Some("b.io"), Some(""), Some("c.io")];
        let c = completeness(&sites, |s| s.map(|v| !v.is_empty()).unwrap_or(false));
        assert_eq!(c, Completeness { with: 3, without: 2 });
    }

    #[test]
    fn test_empty_input() {
        let rows: Vec<Option<&str>> = Vec::new();
        assert!(group_count(&rows, |s| *s, SECTOR_SENTINEL).is_empty());
        assert!(sum_by_category(&rows, |s| *s, SECTOR_SENTINEL, |_| 1).is_empty());
        assert!(top_n_by(&rows, 5, |_| 0).is_empty());
        assert_eq!(completeness(&rows, |s| s.is_some()), Completeness::default());
        assert!(fold_tail(Vec::new(), 8, SECTOR_SENTINEL).is_empty());
    }

    #[test]
    fn test_fold_tail() {
        let counts: Vec<(String, u64)> = vec![
            ("A".into(), 9),
            ("B".into(), 5),
            ("C".into(), 2),
            ("D".into(), 1),
            ("E".into(), 1),
        ];

        let folded = fold_tail(counts.clone(), 3, SECTOR_SENTINEL);
        assert_eq!(
            folded,
            vec![("A".into(), 9), ("B".into(), 5), ("Otros".into(), 4)]
        );

        assert_eq!(fold_tail(counts.clone(), 0, SECTOR_SENTINEL), counts);
        assert_eq!(fold_tail(counts.clone(), 5, SECTOR_SENTINEL), counts);
    }

    #[test]
    fn test_fold_tail_merges_existing_sentinel() {
        let counts: Vec<(String, u64)> = vec![
            ("Otros".into(), 4),
            ("A".into(), 3),
            ("B".into(), 2),
            ("C".into(), 2),
        ];
        let folded = fold_tail(counts, 3, SECTOR_SENTINEL);
        assert_eq!(folded, vec![("Otros".into(), 8), ("A".into(), 3)]);
    }
}

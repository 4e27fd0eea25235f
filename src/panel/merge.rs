//! Joining one keyword's long table into the panel.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::JoinPolicy;
use crate::panel::table::{LongTable, Panel, PanelRow};

type Key<'a> = (&'a str, NaiveDate);

/// Join `long` into `panel` on (geography, date) as column `keyword`.
///
/// Row order follows the driving side: the long table for `Right`/`Inner`,
/// the panel for `Left`/`Full` (with unmatched long rows appended for `Full`).
/// Duplicate keys on either side fan out, one output row per matching pair.
///
/// If `keyword` is already a column its values are replaced rather than a
/// second column being added. A fresh panel (no keyword columns yet) adopts
/// the long table's rows whatever the policy; a panel that has columns but no
/// rows joins like any other, so `Inner`/`Left` keep it empty.
pub fn merge_keyword(panel: &Panel, long: &LongTable, keyword: &str, policy: JoinPolicy) -> Panel {
    let mut keywords = panel.keywords().to_vec();
    let col = match panel.column_index(keyword) {
        Some(idx) => idx,
        None => {
            keywords.push(keyword.to_string());
            keywords.len() - 1
        }
    };
    let width = keywords.len();

    let policy = if panel.keywords().is_empty() { JoinPolicy::Right } else { policy };

    let combine = |prior: Option<&PanelRow>, geography: &str, date: NaiveDate, value: Option<f64>| {
        let mut values = match prior {
            Some(row) => {
                let mut v = row.values.clone();
                v.resize(width, None);
                v
            }
            None => vec![None; width],
        };
        values[col] = value;
        PanelRow::new(geography, date, values)
    };

    let panel_index = index_by_key(panel.rows().iter().map(|r| (r.geography.as_str(), r.date)));
    let mut rows = Vec::new();

    match policy {
        JoinPolicy::Right | JoinPolicy::Inner => {
            for l in long.rows() {
                match panel_index.get(&(l.geography.as_str(), l.date)) {
                    Some(matches) => {
                        for &i in matches {
                            rows.push(combine(Some(&panel.rows()[i]), &l.geography, l.date, l.value));
                        }
                    }
                    None if policy == JoinPolicy::Right => {
                        rows.push(combine(None, &l.geography, l.date, l.value));
                    }
                    None => {}
                }
            }
        }
        JoinPolicy::Left | JoinPolicy::Full => {
            let long_index = index_by_key(long.rows().iter().map(|r| (r.geography.as_str(), r.date)));
            for p in panel.rows() {
                match long_index.get(&(p.geography.as_str(), p.date)) {
                    Some(matches) => {
                        for &j in matches {
                            rows.push(combine(Some(p), &p.geography, p.date, long.rows()[j].value));
                        }
                    }
                    None => rows.push(combine(Some(p), &p.geography, p.date, None)),
                }
            }
            if policy == JoinPolicy::Full {
                for l in long.rows() {
                    if !panel_index.contains_key(&(l.geography.as_str(), l.date)) {
                        rows.push(combine(None, &l.geography, l.date, l.value));
                    }
                }
            }
        }
    }

    Panel::from_trusted_parts(panel.key_column(), keywords, rows)
}

fn index_by_key<'a>(keys: impl Iterator<Item = Key<'a>>) -> HashMap<Key<'a>, Vec<usize>> {
    let mut index: HashMap<Key<'a>, Vec<usize>> = HashMap::new();
    for (i, key) in keys.enumerate() {
        index.entry(key).or_default().push(i);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::table::LongRow;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 3, day).unwrap()
    }

    fn long(keyword: &str, rows: &[(&str, u32, Option<f64>)]) -> LongTable {
        LongTable::from_rows(
            keyword,
            rows.iter()
                .map(|&(g, day, v)| LongRow {
                    geography: g.to_string(),
                    date: d(day),
                    value: v,
                })
                .collect(),
        )
    }

    fn keys(panel: &Panel) -> Vec<(String, u32)> {
        use chrono::Datelike;
        panel.rows().iter().map(|r| (r.geography.clone(), r.date.day())).collect()
    }

    /// Panel with `a` for US 1..=2 and UK 1.
    fn base() -> Panel {
        let empty = Panel::new("country");
        let a = long("a", &[("US", 1, Some(1.0)), ("US", 2, Some(2.0)), ("UK", 1, Some(3.0))]);
        merge_keyword(&empty, &a, "a", JoinPolicy::Right)
    }

    #[test]
    fn empty_panel_adopts_long_rows_for_every_policy() {
        for policy in [JoinPolicy::Inner, JoinPolicy::Left, JoinPolicy::Right, JoinPolicy::Full] {
            let empty = Panel::new("country");
            let a = long("a", &[("US", 1, Some(1.0)), ("UK", 1, None)]);
            let merged = merge_keyword(&empty, &a, "a", policy);
            assert_eq!(merged.len(), 2, "{policy:?}");
            assert_eq!(merged.keywords(), &["a".to_string()]);
            assert_eq!(merged.rows()[1].values, vec![None]);
        }
    }

    #[test]
    fn collapsed_panel_stays_empty_under_inner_and_left() {
        let collapsed = merge_keyword(&base(), &LongTable::new("b"), "b", JoinPolicy::Inner);
        assert!(collapsed.is_empty());
        assert_eq!(collapsed.keywords().len(), 2);

        let c = long("c", &[("US", 1, Some(7.0)), ("UK", 1, Some(8.0))]);
        for policy in [JoinPolicy::Inner, JoinPolicy::Left] {
            let merged = merge_keyword(&collapsed, &c, "c", policy);
            assert!(merged.is_empty(), "{policy:?}");
            assert_eq!(merged.keywords(), &["a".to_string(), "b".to_string(), "c".to_string()]);
        }

        let full = merge_keyword(&collapsed, &c, "c", JoinPolicy::Full);
        assert_eq!(full.len(), 2);
        assert_eq!(full.column("a").unwrap(), vec![None, None]);
    }

    #[test]
    fn right_join_follows_long_rows() {
        let b = long("b", &[("US", 2, Some(20.0)), ("US", 3, Some(30.0))]);
        let merged = merge_keyword(&base(), &b, "b", JoinPolicy::Right);

        assert_eq!(keys(&merged), vec![("US".into(), 2), ("US".into(), 3)]);
        assert_eq!(merged.rows()[0].values, vec![Some(2.0), Some(20.0)]);
        assert_eq!(merged.rows()[1].values, vec![None, Some(30.0)]);
    }

    #[test]
    fn right_join_with_empty_table_collapses() {
        let merged = merge_keyword(&base(), &LongTable::new("b"), "b", JoinPolicy::Right);
        assert!(merged.is_empty());
        assert_eq!(merged.keywords().len(), 2);
    }

    #[test]
    fn inner_join_keeps_shared_keys() {
        let b = long("b", &[("US", 2, Some(20.0)), ("US", 3, Some(30.0))]);
        let merged = merge_keyword(&base(), &b, "b", JoinPolicy::Inner);
        assert_eq!(keys(&merged), vec![("US".into(), 2)]);
    }

    #[test]
    fn left_join_keeps_panel_rows() {
        let b = long("b", &[("US", 2, Some(20.0)), ("US", 3, Some(30.0))]);
        let merged = merge_keyword(&base(), &b, "b", JoinPolicy::Left);
        assert_eq!(keys(&merged), vec![("US".into(), 1), ("US".into(), 2), ("UK".into(), 1)]);
        assert_eq!(merged.column("b").unwrap(), vec![None, Some(20.0), None]);
    }

    #[test]
    fn full_join_appends_unmatched_long_rows() {
        let b = long("b", &[("US", 2, Some(20.0)), ("US", 3, Some(30.0))]);
        let merged = merge_keyword(&base(), &b, "b", JoinPolicy::Full);
        assert_eq!(
            keys(&merged),
            vec![("US".into(), 1), ("US".into(), 2), ("UK".into(), 1), ("US".into(), 3)]
        );
        assert_eq!(merged.column("a").unwrap(), vec![Some(1.0), Some(2.0), Some(3.0), None]);
        assert_eq!(merged.column("b").unwrap(), vec![None, Some(20.0), None, Some(30.0)]);
    }

    #[test]
    fn duplicate_long_keys_fan_out() {
        let b = long("b", &[("US", 1, Some(5.0)), ("US", 1, Some(6.0))]);
        let merged = merge_keyword(&base(), &b, "b", JoinPolicy::Right);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.rows()[0].values, vec![Some(1.0), Some(5.0)]);
        assert_eq!(merged.rows()[1].values, vec![Some(1.0), Some(6.0)]);
    }

    #[test]
    fn remerging_same_keyword_replaces_column() {
        let a = long("a", &[("US", 1, Some(1.0)), ("US", 2, Some(2.0)), ("UK", 1, Some(3.0))]);
        let once = base();
        let twice = merge_keyword(&once, &a, "a", JoinPolicy::Right);
        assert_eq!(twice, once);
    }

    #[test]
    fn monthly_is_derived_for_every_row() {
        let b = long("b", &[("US", 20, Some(1.0))]);
        let merged = merge_keyword(&base(), &b, "b", JoinPolicy::Full);
        assert!(merged.rows().iter().all(|r| r.monthly == d(1)));
    }
}

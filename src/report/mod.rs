//! Reporting utilities: per-geography panel summaries and terminal output.

pub mod format;

pub use format::*;

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::panel::Panel;

/// Descriptive numbers for one geography's rows of the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoSummary {
    pub geography: String,
    pub rows: usize,
    pub first: NaiveDate,
    pub last: NaiveDate,
    /// Distinct `monthly` keys seen.
    pub months: usize,
    /// Mean of the non-missing values, per keyword column.
    pub means: Vec<Option<f64>>,
    /// Count of missing values, per keyword column.
    pub missing: Vec<usize>,
}

/// Summarize each geography of the panel, in first-appearance order.
pub fn summarize_panel(panel: &Panel) -> Vec<GeoSummary> {
    let width = panel.keywords().len();
    let mut out = Vec::new();

    for geo in panel.geographies() {
        let rows: Vec<_> = panel.rows_for(geo).collect();
        let (Some(first), Some(last)) = (
            rows.iter().map(|r| r.date).min(),
            rows.iter().map(|r| r.date).max(),
        ) else {
            continue;
        };
        let months: BTreeSet<NaiveDate> = rows.iter().map(|r| r.monthly).collect();

        let mut sums = vec![0.0; width];
        let mut counts = vec![0usize; width];
        let mut missing = vec![0usize; width];
        for row in &rows {
            for (i, v) in row.values.iter().enumerate() {
                match v {
                    Some(x) => {
                        sums[i] += x;
                        counts[i] += 1;
                    }
                    None => missing[i] += 1,
                }
            }
        }
        let means = sums
            .iter()
            .zip(&counts)
            .map(|(s, &n)| (n > 0).then(|| s / n as f64))
            .collect();

        out.push(GeoSummary {
            geography: geo.to_string(),
            rows: rows.len(),
            first,
            last,
            months: months.len(),
            means,
            missing,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::PanelRow;

    #[test]
    fn summarizes_per_geography() {
        let d = |m, day| NaiveDate::from_ymd_opt(2022, m, day).unwrap();
        let rows = vec![
            PanelRow::new("US", d(3, 6), vec![Some(10.0), None]),
            PanelRow::new("UK", d(3, 6), vec![Some(1.0), Some(2.0)]),
            PanelRow::new("US", d(4, 3), vec![Some(20.0), None]),
        ];
        let panel = Panel::from_parts("country", vec!["a".into(), "b".into()], rows).unwrap();

        let summary = summarize_panel(&panel);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].geography, "US");
        assert_eq!(summary[0].rows, 2);
        assert_eq!(summary[0].months, 2);
        assert_eq!(summary[0].first, d(3, 6));
        assert_eq!(summary[0].last, d(4, 3));
        assert_eq!(summary[0].means, vec![Some(15.0), None]);
        assert_eq!(summary[0].missing, vec![0, 2]);
        assert_eq!(summary[1].means, vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn empty_panel_has_no_summary() {
        assert!(summarize_panel(&Panel::new("country")).is_empty());
    }
}

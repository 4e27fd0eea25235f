//! Post-processing of a finished panel.

use crate::error::AppError;
use crate::panel::table::Panel;

/// Divide each numerator column by `denominator`, row by row.
///
/// A row's ratio is missing when the denominator is zero or missing, or when
/// the numerator is missing. The denominator column itself is left as is.
pub fn normalize_ratio(panel: &Panel, numerators: &[String], denominator: &str) -> Result<Panel, AppError> {
    let denom_idx = require_column(panel, denominator)?;
    let num_idxs = numerators
        .iter()
        .map(|k| require_column(panel, k))
        .collect::<Result<Vec<_>, _>>()?;

    let (key_column, keywords, mut rows) = panel.clone().into_parts();
    for row in &mut rows {
        let denom = row.values[denom_idx];
        for &idx in &num_idxs {
            if idx == denom_idx {
                continue;
            }
            row.values[idx] = ratio(row.values[idx], denom);
        }
    }

    Ok(Panel::from_trusted_parts(&key_column, keywords, rows))
}

/// Remove rows whose `keyword` value is missing.
pub fn drop_missing(panel: &Panel, keyword: &str) -> Result<Panel, AppError> {
    let idx = require_column(panel, keyword)?;
    let (key_column, keywords, mut rows) = panel.clone().into_parts();
    rows.retain(|r| r.values[idx].is_some());
    Ok(Panel::from_trusted_parts(&key_column, keywords, rows))
}

fn ratio(num: Option<f64>, denom: Option<f64>) -> Option<f64> {
    match (num, denom) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d).filter(|v| v.is_finite()),
        _ => None,
    }
}

fn require_column(panel: &Panel, keyword: &str) -> Result<usize, AppError> {
    panel.column_index(keyword).ok_or_else(|| {
        AppError::invalid_input(format!(
            "Column '{keyword}' is not in the panel (columns: {}).",
            panel.keywords().join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::panel::table::PanelRow;

    fn panel() -> Panel {
        let d = |day| NaiveDate::from_ymd_opt(2022, 3, day).unwrap();
        let keywords = vec!["inflation".to_string(), "unemployment".to_string(), "economy".to_string()];
        let rows = vec![
            PanelRow::new("US", d(1), vec![Some(50.0), Some(20.0), Some(25.0)]),
            PanelRow::new("US", d(2), vec![Some(40.0), Some(10.0), Some(0.0)]),
            PanelRow::new("US", d(3), vec![None, Some(10.0), None]),
        ];
        Panel::from_parts("country", keywords, rows).unwrap()
    }

    #[test]
    fn divides_element_wise() {
        let nums = vec!["inflation".to_string(), "unemployment".to_string()];
        let out = normalize_ratio(&panel(), &nums, "economy").unwrap();

        assert_eq!(out.column("inflation").unwrap(), vec![Some(2.0), None, None]);
        assert_eq!(out.column("unemployment").unwrap(), vec![Some(0.8), None, None]);
        assert_eq!(out.column("economy").unwrap(), vec![Some(25.0), Some(0.0), None]);
    }

    #[test]
    fn unknown_columns_are_errors() {
        let nums = vec!["inflation".to_string()];
        assert_eq!(normalize_ratio(&panel(), &nums, "gdp").unwrap_err().exit_code(), 2);
        let nums = vec!["gdp".to_string()];
        assert!(normalize_ratio(&panel(), &nums, "economy").is_err());
    }

    #[test]
    fn drop_missing_filters_rows() {
        let out = drop_missing(&panel(), "economy").unwrap();
        assert_eq!(out.len(), 2);
        assert!(drop_missing(&panel(), "gdp").is_err());
    }
}

//! Shared domain types.
//!
//! Geographies and keywords are fixed before a run starts; raw and normalized
//! points live only for the duration of one keyword × geography query.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::DateWindow;
use crate::error::AppError;

/// Scope that geography codes are interpreted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoScope {
    /// Codes are country codes (`US`, `UK`) queried as-is.
    Country,
    /// Codes are sub-national codes (`AL`) queried as `<country>-<code>`.
    State { country: String },
}

impl GeoScope {
    /// Name of the panel column that holds the geography label.
    pub fn key_column(&self) -> &'static str {
        match self {
            GeoScope::Country => "country",
            GeoScope::State { .. } => "state",
        }
    }

    /// Build a geography for `code` under this scope.
    pub fn geography(&self, code: &str) -> Result<Geography, AppError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::invalid_input("Geography codes must be non-empty."));
        }
        let query_code = match self {
            GeoScope::Country => code.to_string(),
            GeoScope::State { country } => format!("{}-{code}", country.trim()),
        };
        Ok(Geography {
            code: code.to_string(),
            query_code,
        })
    }

    pub fn geographies<S: AsRef<str>>(&self, codes: &[S]) -> Result<Vec<Geography>, AppError> {
        codes.iter().map(|c| self.geography(c.as_ref())).collect()
    }
}

/// A query scope: the label written to the panel plus the code sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Geography {
    pub code: String,
    pub query_code: String,
}

/// How a new keyword's long table is joined into the accumulated panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum JoinPolicy {
    /// Keep only (geography, date) pairs present in both.
    Inner,
    /// Keep the panel's rows; the new keyword is missing where it has no data.
    Left,
    /// Keep the new table's rows, dropping panel rows it lacks.
    ///
    /// This reproduces the historical output: the final row set follows the
    /// last-merged keyword.
    Right,
    /// Keep every row from either side, with missing markers where a side lacks data.
    Full,
}

/// What the fold does when a keyword comes back with no rows at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmptyResultPolicy {
    /// Run the join anyway (a right or inner join then empties the panel).
    Merge,
    /// Keep the panel's rows and add the keyword as an all-missing column.
    Skip,
    /// Stop the run with an error.
    Abort,
}

/// One observation point as returned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoint {
    /// Unix seconds (UTC) of the start of the sampled period.
    pub timestamp: i64,
    /// One value per entry of `RawSeries::columns`.
    pub values: Vec<Option<f64>>,
    /// The service marks the trailing, still-accumulating period as partial.
    pub is_partial: bool,
}

/// Unnormalized service response for one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSeries {
    pub columns: Vec<String>,
    pub points: Vec<RawPoint>,
}

impl RawSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A single keyword value for one geography at one native date.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPoint {
    pub geography: String,
    pub date: NaiveDate,
    pub keyword: String,
    pub value: Option<f64>,
}

/// A full collection run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct CollectConfig {
    pub scope: GeoScope,
    pub geographies: Vec<Geography>,
    pub keywords: Vec<String>,
    pub window: DateWindow,
    pub join: JoinPolicy,
    pub on_empty: EmptyResultPolicy,
    /// Divide every other keyword by this one after assembly.
    pub ratio_denominator: Option<String>,
    /// After a ratio pass, drop rows whose denominator is missing.
    pub drop_missing_denominator: bool,
}

impl CollectConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.keywords.is_empty() {
            return Err(AppError::invalid_input("At least one keyword is required."));
        }
        if let Some(bad) = self.keywords.iter().find(|k| k.trim().is_empty()) {
            return Err(AppError::invalid_input(format!(
                "Keywords must be non-empty (got {bad:?})."
            )));
        }
        if self.geographies.is_empty() {
            return Err(AppError::invalid_input("At least one geography is required."));
        }
        if self.window.is_empty() {
            return Err(AppError::invalid_input(format!(
                "Date window {} is empty.",
                self.window.timeframe()
            )));
        }
        if let Some(denom) = &self.ratio_denominator {
            if !self.keywords.iter().any(|k| k == denom) {
                return Err(AppError::invalid_input(format!(
                    "Ratio denominator '{denom}' is not one of the collected keywords."
                )));
            }
        }
        Ok(())
    }

    /// Keywords divided by the denominator in a ratio pass.
    pub fn ratio_numerators(&self) -> Vec<String> {
        match &self.ratio_denominator {
            Some(denom) => self.keywords.iter().filter(|k| *k != denom).cloned().collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(keywords: &[&str]) -> CollectConfig {
        let scope = GeoScope::Country;
        CollectConfig {
            geographies: scope.geographies(&["US"]).unwrap(),
            scope,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2022, 4, 1).unwrap(),
            )
            .unwrap(),
            join: JoinPolicy::Full,
            on_empty: EmptyResultPolicy::Skip,
            ratio_denominator: None,
            drop_missing_denominator: true,
        }
    }

    #[test]
    fn state_scope_prefixes_country() {
        let scope = GeoScope::State {
            country: "US".to_string(),
        };
        let geo = scope.geography(" AL ").unwrap();
        assert_eq!(geo.code, "AL");
        assert_eq!(geo.query_code, "US-AL");
        assert_eq!(scope.key_column(), "state");
    }

    #[test]
    fn country_scope_queries_code_verbatim() {
        let geo = GeoScope::Country.geography("UK").unwrap();
        assert_eq!(geo.query_code, "UK");
        assert_eq!(GeoScope::Country.key_column(), "country");
        assert!(GeoScope::Country.geography("  ").is_err());
    }

    #[test]
    fn denominator_must_be_collected() {
        let mut cfg = config(&["inflation", "economy"]);
        cfg.ratio_denominator = Some("gdp".to_string());
        assert!(cfg.validate().is_err());

        cfg.ratio_denominator = Some("economy".to_string());
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.ratio_numerators(), vec!["inflation".to_string()]);
    }

    #[test]
    fn blank_keyword_is_rejected() {
        assert!(config(&["inflation", " "]).validate().is_err());
        assert!(config(&[]).validate().is_err());
    }
}

//! Long-form and wide panel tables.

use chrono::NaiveDate;

use crate::domain::{NormalizedPoint, month_start};
use crate::error::AppError;

/// One observation of a single keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub geography: String,
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// One keyword's observations across all geographies, in query order.
#[derive(Debug, Clone, PartialEq)]
pub struct LongTable {
    keyword: String,
    rows: Vec<LongRow>,
    /// `(geography, row count)` per query, including zero-row queries.
    blocks: Vec<(String, usize)>,
}

impl LongTable {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            rows: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Build a table from rows; consecutive rows of the same geography form a block.
    pub fn from_rows(keyword: impl Into<String>, rows: Vec<LongRow>) -> Self {
        let mut blocks: Vec<(String, usize)> = Vec::new();
        for row in &rows {
            match blocks.last_mut() {
                Some((geo, n)) if *geo == row.geography => {
                    *n += 1;
                    continue;
                }
                _ => {}
            }
            blocks.push((row.geography.clone(), 1));
        }
        Self {
            keyword: keyword.into(),
            rows,
            blocks,
        }
    }

    /// Append one geography's points. No deduplication is done.
    pub fn push_block(&mut self, geography: &str, points: Vec<NormalizedPoint>) {
        self.blocks.push((geography.to_string(), points.len()));
        self.rows.extend(points.into_iter().map(|p| LongRow {
            geography: geography.to_string(),
            date: p.date,
            value: p.value,
        }));
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn rows(&self) -> &[LongRow] {
        &self.rows
    }

    pub fn blocks(&self) -> &[(String, usize)] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One (geography, date) row of the wide panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow {
    pub geography: String,
    pub date: NaiveDate,
    /// One entry per panel keyword, in column order.
    pub values: Vec<Option<f64>>,
    /// `date` truncated to its month. A grouping/display key only.
    pub monthly: NaiveDate,
}

impl PanelRow {
    pub fn new(geography: impl Into<String>, date: NaiveDate, values: Vec<Option<f64>>) -> Self {
        Self {
            geography: geography.into(),
            date,
            values,
            monthly: month_start(date),
        }
    }
}

/// The wide table: one row per (geography, date), one column per keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    key_column: String,
    keywords: Vec<String>,
    rows: Vec<PanelRow>,
}

impl Panel {
    /// A panel with no keywords and no rows.
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            keywords: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Assemble a panel from parts, checking that every row has one value per keyword.
    pub fn from_parts(
        key_column: impl Into<String>,
        keywords: Vec<String>,
        rows: Vec<PanelRow>,
    ) -> Result<Self, AppError> {
        if let Some(bad) = rows.iter().find(|r| r.values.len() != keywords.len()) {
            return Err(AppError::invalid_input(format!(
                "Panel row for {} on {} has {} values, expected {}.",
                bad.geography,
                bad.date,
                bad.values.len(),
                keywords.len()
            )));
        }
        Ok(Self {
            key_column: key_column.into(),
            keywords,
            rows,
        })
    }

    /// Every row must already hold exactly one value per keyword.
    pub(crate) fn from_trusted_parts(key_column: &str, keywords: Vec<String>, rows: Vec<PanelRow>) -> Self {
        debug_assert!(rows.iter().all(|r| r.values.len() == keywords.len()));
        Self {
            key_column: key_column.to_string(),
            keywords,
            rows,
        }
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, keyword: &str) -> Option<usize> {
        self.keywords.iter().position(|k| k == keyword)
    }

    /// All values of one keyword column, in row order.
    pub fn column(&self, keyword: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(keyword)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Value of `keyword` at the first row matching (geography, date).
    pub fn value(&self, geography: &str, date: NaiveDate, keyword: &str) -> Option<f64> {
        let idx = self.column_index(keyword)?;
        self.rows
            .iter()
            .find(|r| r.geography == geography && r.date == date)
            .and_then(|r| r.values[idx])
    }

    /// Distinct geographies in first-appearance order.
    pub fn geographies(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !out.contains(&row.geography.as_str()) {
                out.push(&row.geography);
            }
        }
        out
    }

    /// Rows belonging to one geography.
    pub fn rows_for<'a>(&'a self, geography: &'a str) -> impl Iterator<Item = &'a PanelRow> + 'a {
        self.rows.iter().filter(move |r| r.geography == geography)
    }

    /// Add `keyword` as an all-missing column; a no-op if it already exists.
    pub fn with_missing_column(mut self, keyword: &str) -> Self {
        if self.column_index(keyword).is_none() {
            self.keywords.push(keyword.to_string());
            for row in &mut self.rows {
                row.values.push(None);
            }
        }
        self
    }

    pub(crate) fn into_parts(self) -> (String, Vec<String>, Vec<PanelRow>) {
        (self.key_column, self.keywords, self.rows)
    }
}

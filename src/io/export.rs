//! Panel CSV export and re-import.
//!
//! Layout: `<key>,date,<keyword...>,monthly`. Dates are ISO `YYYY-MM-DD`,
//! missing values are empty cells. The file is meant to be easy to consume in
//! spreadsheets, plotting scripts, or regression tools.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::error::AppError;
use crate::panel::{Panel, PanelRow};

const DATE_COLUMN: &str = "date";
const MONTHLY_COLUMN: &str = "monthly";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Write the panel to a CSV file.
pub fn write_panel_csv(path: &Path, panel: &Panel) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::invalid_input(format!("Failed to create panel CSV '{}': {e}", path.display()))
    })?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec![panel.key_column().to_string(), DATE_COLUMN.to_string()];
    header.extend(panel.keywords().iter().cloned());
    header.push(MONTHLY_COLUMN.to_string());
    writer
        .write_record(&header)
        .map_err(|e| AppError::invalid_input(format!("Failed to write panel CSV header: {e}")))?;

    for row in panel.rows() {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.geography.clone());
        record.push(row.date.format(DATE_FORMAT).to_string());
        record.extend(row.values.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
        record.push(row.monthly.format(DATE_FORMAT).to_string());
        writer
            .write_record(&record)
            .map_err(|e| AppError::invalid_input(format!("Failed to write panel CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::invalid_input(format!("Failed to flush panel CSV: {e}")))?;
    Ok(())
}

/// Read a panel CSV produced by `write_panel_csv`.
///
/// `monthly` is re-derived from `date` rather than trusted from the file.
pub fn read_panel_csv(path: &Path) -> Result<Panel, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::invalid_input(format!("Failed to open panel CSV '{}': {e}", path.display()))
    })?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::invalid_input(format!("Failed to read panel CSV headers: {e}")))?
        .clone();
    let (key_column, keywords) = parse_header(&headers)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: header line, 1-based numbering.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::invalid_input(format!("Panel CSV line {line}: {e}")))?;
        rows.push(parse_row(&record, keywords.len(), line)?);
    }

    Panel::from_parts(key_column, keywords, rows)
}

fn parse_header(headers: &StringRecord) -> Result<(String, Vec<String>), AppError> {
    let names: Vec<&str> = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}'))
        .collect();

    let well_formed = names.len() >= 3
        && names[1] == DATE_COLUMN
        && names[names.len() - 1] == MONTHLY_COLUMN;
    if !well_formed {
        return Err(AppError::invalid_input(format!(
            "Panel CSV header must be '<key>,date,<keywords...>,monthly' (got '{}').",
            names.join(",")
        )));
    }

    let keywords = names[2..names.len() - 1].iter().map(|s| s.to_string()).collect();
    Ok((names[0].to_string(), keywords))
}

fn parse_row(record: &StringRecord, n_keywords: usize, line: usize) -> Result<PanelRow, AppError> {
    let expected = n_keywords + 3;
    if record.len() != expected {
        return Err(AppError::invalid_input(format!(
            "Panel CSV line {line}: expected {expected} fields, found {}.",
            record.len()
        )));
    }

    let geography = record.get(0).unwrap_or_default().to_string();
    let raw_date = record.get(1).unwrap_or_default();
    let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
        .map_err(|e| AppError::invalid_input(format!("Panel CSV line {line}: invalid date '{raw_date}': {e}")))?;

    let mut values = Vec::with_capacity(n_keywords);
    for field in record.iter().skip(2).take(n_keywords) {
        if field.is_empty() {
            values.push(None);
            continue;
        }
        let v = field
            .parse::<f64>()
            .map_err(|e| AppError::invalid_input(format!("Panel CSV line {line}: invalid value '{field}': {e}")))?;
        values.push(v.is_finite().then_some(v));
    }

    Ok(PanelRow::new(geography, date, values))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn sample() -> Panel {
        let d = |m, day| NaiveDate::from_ymd_opt(2022, m, day).unwrap();
        let rows = vec![
            PanelRow::new("AL", d(3, 6), vec![Some(47.0), None]),
            PanelRow::new("AL", d(4, 3), vec![Some(0.125), Some(100.0)]),
        ];
        Panel::from_parts("state", vec!["inflation".into(), "economy".into()], rows).unwrap()
    }

    #[test]
    fn writes_header_and_missing_cells() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_panel_csv(file.path(), &sample()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "state,date,inflation,economy,monthly");
        assert_eq!(lines[1], "AL,2022-03-06,47,,2022-03-01");
        assert_eq!(lines[2], "AL,2022-04-03,0.125,100,2022-04-01");
    }

    #[test]
    fn reads_back_what_it_wrote() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let panel = sample();
        write_panel_csv(file.path(), &panel).unwrap();
        assert_eq!(read_panel_csv(file.path()).unwrap(), panel);
    }

    #[test]
    fn rejects_foreign_layout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ",country,date,inflation").unwrap();
        writeln!(file, "0,US,2022-03-01,10").unwrap();
        let err = read_panel_csv(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn reports_bad_values_with_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "country,date,inflation,monthly").unwrap();
        writeln!(file, "US,2022-03-01,high,2022-03-01").unwrap();
        let err = read_panel_csv(file.path()).unwrap_err();
        assert!(err.message().contains("line 2"), "{}", err.message());
    }
}

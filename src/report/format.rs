//! Formatted terminal output.
//!
//! We keep formatting code in one place so the pipeline stays free of
//! presentation concerns and output changes are localized.

use clap::ValueEnum;

use crate::domain::CollectConfig;
use crate::panel::{Assembly, Panel};
use crate::report::summarize_panel;

/// Format the collection run summary: configuration, per-keyword merge steps, final shape.
pub fn format_run_summary(config: &CollectConfig, assembly: &Assembly, requests: usize) -> String {
    let mut out = String::new();

    out.push_str("=== trends - search interest panel ===\n");
    out.push_str(&format!(
        "Window: {} ({} months)\n",
        config.window.timeframe(),
        config.window.months().len()
    ));
    let codes: Vec<&str> = config.geographies.iter().map(|g| g.query_code.as_str()).collect();
    out.push_str(&format!("Geographies: {}\n", codes.join(", ")));
    out.push_str(&format!("Keywords: {}\n", config.keywords.join(", ")));
    out.push_str(&format!(
        "Join: {} | on empty: {} | requests: {requests}\n",
        flag_value(&config.join),
        flag_value(&config.on_empty)
    ));

    out.push_str("\nMerge steps:\n");
    for step in &assembly.steps {
        let blocks: Vec<String> = step.blocks.iter().map(|(g, n)| format!("{g}={n}")).collect();
        let note = if step.skipped { " (skipped: no data)" } else { "" };
        out.push_str(&format!(
            "- {:<16} long={:<5} rows {} -> {}{note}\n",
            truncate(&step.keyword, 16),
            step.long_rows,
            step.rows_before,
            step.rows_after,
        ));
        out.push_str(&format!("  blocks: {}\n", blocks.join(" ")));
    }

    out.push_str(&format!(
        "\nPanel: {} rows x {} keyword columns\n",
        assembly.panel.len(),
        assembly.panel.keywords().len()
    ));
    out
}

/// Format a per-geography table of row counts, month coverage, and keyword means.
///
/// `window_months` is the size of the month grid the panel was collected over, if known.
pub fn format_panel_summary(panel: &Panel, window_months: Option<usize>) -> String {
    let mut out = String::new();
    if panel.is_empty() {
        out.push_str("(panel has no rows)\n");
        return out;
    }

    let summaries = summarize_panel(panel);

    let mut header = format!(
        "{:<10} {:>6} {:<10} {:<10} {:>7}",
        truncate(panel.key_column(), 10),
        "rows",
        "first",
        "last",
        "months"
    );
    for kw in panel.keywords() {
        header.push_str(&format!(" {:>14}", truncate(kw, 14)));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&"-".repeat(header.trim_end().len()));
    out.push('\n');

    for s in &summaries {
        let months = match window_months {
            Some(total) => format!("{}/{total}", s.months),
            None => s.months.to_string(),
        };
        let mut line = format!(
            "{:<10} {:>6} {:<10} {:<10} {:>7}",
            truncate(&s.geography, 10),
            s.rows,
            s.first,
            s.last,
            months
        );
        for (mean, missing) in s.means.iter().zip(&s.missing) {
            let cell = match mean {
                Some(m) if *missing > 0 => format!("{m:.2} ({missing}na)"),
                Some(m) => format!("{m:.2}"),
                None => "-".to_string(),
            };
            line.push_str(&format!(" {:>14}", cell));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// The value as it is spelled on the command line.
fn flag_value<T: ValueEnum>(value: &T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{DateWindow, EmptyResultPolicy, GeoScope, JoinPolicy};
    use crate::panel::{MergeStep, PanelRow};

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("unemployment", 6), "unemp.");
        assert_eq!(truncate("cpi", 6), "cpi");
    }

    #[test]
    fn panel_summary_lists_each_geography() {
        let d = NaiveDate::from_ymd_opt(2022, 3, 6).unwrap();
        let rows = vec![
            PanelRow::new("US", d, vec![Some(10.0)]),
            PanelRow::new("UK", d, vec![None]),
        ];
        let panel = Panel::from_parts("country", vec!["inflation".into()], rows).unwrap();
        let text = format_panel_summary(&panel, Some(1));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("country"));
        assert!(lines[0].ends_with("inflation"));
        assert!(lines[2].starts_with("US"));
        assert!(lines[2].contains("1/1"));
        assert!(lines[2].ends_with("10.00"));
        assert!(lines[3].ends_with("-"));
    }

    #[test]
    fn run_summary_echoes_cli_spelling() {
        let scope = GeoScope::Country;
        let config = CollectConfig {
            geographies: scope.geographies(&["US"]).unwrap(),
            scope,
            keywords: vec!["inflation".into()],
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2022, 4, 1).unwrap(),
            )
            .unwrap(),
            join: JoinPolicy::Full,
            on_empty: EmptyResultPolicy::Skip,
            ratio_denominator: None,
            drop_missing_denominator: true,
        };
        let assembly = Assembly {
            panel: Panel::new("country").with_missing_column("inflation"),
            steps: vec![MergeStep {
                keyword: "inflation".into(),
                blocks: vec![("US".into(), 0)],
                long_rows: 0,
                rows_before: 0,
                rows_after: 0,
                skipped: true,
            }],
        };
        let text = format_run_summary(&config, &assembly, 1);

        assert!(text.contains("Window: 2022-03-01 2022-03-31 (1 months)"));
        assert!(text.contains("Join: full | on empty: skip | requests: 1"));
        assert!(text.contains("(skipped: no data)"));
        assert!(text.contains("blocks: US=0"));
    }

    #[test]
    fn empty_panel_summary() {
        assert_eq!(format_panel_summary(&Panel::new("state"), None), "(panel has no rows)\n");
    }
}

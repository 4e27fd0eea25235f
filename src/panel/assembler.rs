//! The keyword-by-keyword fold that builds the panel.

use tracing::{info, warn};

use crate::data::{QueryPacer, TrendsSource};
use crate::domain::{CollectConfig, DateWindow, EmptyResultPolicy, GeoScope, Geography, JoinPolicy};
use crate::error::AppError;
use crate::panel::merge::merge_keyword;
use crate::panel::table::{LongTable, Panel};

/// What one keyword contributed to the fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeStep {
    pub keyword: String,
    /// `(geography, rows)` in query order.
    pub blocks: Vec<(String, usize)>,
    pub long_rows: usize,
    pub rows_before: usize,
    pub rows_after: usize,
    /// The long table was empty and the join was skipped.
    pub skipped: bool,
}

/// Output of a full assembly run.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub panel: Panel,
    pub steps: Vec<MergeStep>,
}

#[derive(Debug, Clone)]
pub struct PanelAssembler {
    scope: GeoScope,
    geographies: Vec<Geography>,
    window: DateWindow,
    join: JoinPolicy,
    on_empty: EmptyResultPolicy,
}

impl PanelAssembler {
    /// An assembler with the default policies (`full` join, `skip` empty results).
    pub fn new(scope: GeoScope, geographies: Vec<Geography>, window: DateWindow) -> Self {
        Self {
            scope,
            geographies,
            window,
            join: JoinPolicy::Full,
            on_empty: EmptyResultPolicy::Skip,
        }
    }

    pub fn from_config(config: &CollectConfig) -> Self {
        Self::new(config.scope.clone(), config.geographies.clone(), config.window)
            .with_join(config.join)
            .with_empty_policy(config.on_empty)
    }

    pub fn with_join(mut self, join: JoinPolicy) -> Self {
        self.join = join;
        self
    }

    pub fn with_empty_policy(mut self, on_empty: EmptyResultPolicy) -> Self {
        self.on_empty = on_empty;
        self
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    pub fn geographies(&self) -> &[Geography] {
        &self.geographies
    }

    pub fn empty_panel(&self) -> Panel {
        Panel::new(self.scope.key_column())
    }

    /// Query every geography for `keyword`, in order, and concatenate the results.
    pub fn collect_long<S: TrendsSource>(
        &self,
        pacer: &mut QueryPacer<S>,
        keyword: &str,
    ) -> Result<LongTable, AppError> {
        let mut table = LongTable::new(keyword);
        for geo in &self.geographies {
            let points = pacer.fetch(keyword, geo, &self.window)?;
            table.push_block(&geo.code, points);
        }
        Ok(table)
    }

    /// Join `long` into `panel` with this assembler's join policy.
    pub fn merge_keyword(&self, panel: &Panel, long: &LongTable, keyword: &str) -> Panel {
        merge_keyword(panel, long, keyword, self.join)
    }

    /// One fold step: apply the empty-result policy, then merge.
    pub fn fold_keyword(&self, panel: Panel, long: &LongTable, keyword: &str) -> Result<(Panel, MergeStep), AppError> {
        let rows_before = panel.len();
        let mut skipped = false;

        let next = if long.is_empty() {
            match self.on_empty {
                EmptyResultPolicy::Abort => {
                    return Err(AppError::empty_result(format!(
                        "No data for keyword '{keyword}' in any geography ({}).",
                        self.window.timeframe()
                    )));
                }
                EmptyResultPolicy::Skip => {
                    warn!(
                        action = "skip",
                        component = "panel_assembler",
                        keyword = keyword,
                        "Keyword returned no rows; adding it as an empty column"
                    );
                    skipped = true;
                    panel.with_missing_column(keyword)
                }
                EmptyResultPolicy::Merge => self.merge_keyword(&panel, long, keyword),
            }
        } else {
            self.merge_keyword(&panel, long, keyword)
        };

        if next.len() < rows_before {
            warn!(
                action = "merge",
                component = "panel_assembler",
                keyword = keyword,
                dropped = rows_before - next.len(),
                join = ?self.join,
                "Merge dropped panel rows"
            );
        }
        info!(
            action = "merge",
            component = "panel_assembler",
            keyword = keyword,
            long_rows = long.len(),
            rows_before = rows_before,
            rows_after = next.len(),
            "Merged keyword into panel"
        );

        let step = MergeStep {
            keyword: keyword.to_string(),
            blocks: long.blocks().to_vec(),
            long_rows: long.len(),
            rows_before,
            rows_after: next.len(),
            skipped,
        };
        Ok((next, step))
    }

    /// Left fold over `keywords`: collect each keyword, then merge it in.
    pub fn assemble<S: TrendsSource>(
        &self,
        pacer: &mut QueryPacer<S>,
        keywords: &[String],
    ) -> Result<Assembly, AppError> {
        info!(
            action = "start",
            component = "panel_assembler",
            keywords = keywords.len(),
            geographies = self.geographies.len(),
            months = self.window.months().len(),
            timeframe = %self.window.timeframe(),
            "Assembling panel"
        );

        let mut panel = self.empty_panel();
        let mut steps = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let long = self.collect_long(pacer, keyword)?;
            let (next, step) = self.fold_keyword(panel, &long, keyword)?;
            panel = next;
            steps.push(step);
        }

        Ok(Assembly { panel, steps })
    }
}

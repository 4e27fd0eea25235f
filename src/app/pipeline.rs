//! Shared "collect pipeline" logic.
//!
//! Keeping this in one place means the binary and the integration tests drive
//! exactly the same workflow:
//! keyword × geography fetch -> long tables -> panel fold -> optional ratio pass
//!
//! The source is injected so tests can replay canned responses without a network.

use tracing::info;

use crate::data::{QueryPacer, TrendsSource};
use crate::domain::CollectConfig;
use crate::error::AppError;
use crate::panel::{Assembly, PanelAssembler, drop_missing, normalize_ratio};

/// All computed outputs of a single `trends collect` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub assembly: Assembly,
    pub requests: usize,
}

/// Execute the full collection pipeline against `pacer`'s source.
pub fn run_collect<S: TrendsSource>(config: &CollectConfig, pacer: &mut QueryPacer<S>) -> Result<RunOutput, AppError> {
    config.validate()?;

    // 1) Collect and fold every keyword into the panel.
    let assembler = PanelAssembler::from_config(config);
    let mut assembly = assembler.assemble(pacer, &config.keywords)?;

    // 2) Optional ratio normalization against a denominator keyword.
    if let Some(denominator) = &config.ratio_denominator {
        let numerators = config.ratio_numerators();
        let mut panel = normalize_ratio(&assembly.panel, &numerators, denominator)?;
        if config.drop_missing_denominator {
            let before = panel.len();
            panel = drop_missing(&panel, denominator)?;
            info!(
                action = "drop_missing",
                component = "pipeline",
                keyword = denominator.as_str(),
                dropped = before - panel.len(),
                "Dropped rows without a denominator"
            );
        }
        assembly.panel = panel;
    }

    Ok(RunOutput {
        assembly,
        requests: pacer.requests_issued(),
    })
}

//! Compounding plan command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::warn;

use super::load;
use crate::cli::{output, CompoundArgs, OutputFormat};
use signal_engine::{CompoundPlan, PlanInput, PlanSummary, TradeStep};

#[derive(Serialize)]
struct PlanReport<'a> {
    input: &'a PlanInput,
    steps: &'a [TradeStep],
    summary: PlanSummary,
}

pub async fn run(args: CompoundArgs, config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    let defaults = config.calculator.plan_input();

    let input = PlanInput {
        investment: args.investment.unwrap_or(defaults.investment),
        margin_pct: args.margin.unwrap_or(defaults.margin_pct),
        trades: args.trades.unwrap_or(defaults.trades),
    };
    let mut plan = CompoundPlan::build(input).context("Invalid compounding plan")?;

    for id in &args.complete {
        if !plan.toggle(*id) {
            warn!(trade = *id, "No such trade, ignoring");
        }
    }

    match args.output {
        OutputFormat::Json => {
            let report = PlanReport {
                input: plan.input(),
                steps: plan.steps(),
                summary: plan.summary(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print!("{}", output::plan_report(&plan)),
    }

    Ok(())
}

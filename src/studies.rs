//! Analysis studies run from the command line.
//!
//! Per-case studies write under `<output_dir>/<case_id>/`, studies that
//! span several cases write under `<output_dir>/analysis/`.

use crate::output::{write_rows, write_table};
use crate::runner::{case_output_dir, write_analysis};
use anyhow::Result;
use bunkeropt_analysis::breakeven::{
    compare_cases, default_distances, default_large_shares, default_start_vessels, BreakEvenAnalyzer,
    DEFAULT_MIX_VOLUMES,
};
use bunkeropt_analysis::demand_scenarios::{default_scenarios, run_demand_scenarios};
use bunkeropt_analysis::sensitivity::{tornado_table, DEFAULT_TORNADO_RANGE, DEFAULT_VARIATIONS};
use bunkeropt_analysis::stochastic::StochasticResult;
use bunkeropt_analysis::{
    BreakEvenResult, CandidateChoice, SensitivityAnalyzer, StochasticConfig, StochasticOptimizer, VariationMode,
};
use bunkeropt_core::verify::verify_top_candidates;
use bunkeropt_core::{run_sweep, BunkerError, Parameters};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Folder for studies that compare several cases.
pub const CROSS_CASE_DIR: &str = "analysis";

/// Sensitivity study of one case.
///
/// Writes a tornado over `parameters`, one table per parameter, a two-way
/// grid of the first two parameters and the pump-rate table.
pub fn sensitivity(params: &Parameters, choice: CandidateChoice, parameters: &[String]) -> Result<Vec<PathBuf>> {
    let analyzer = SensitivityAnalyzer::new(params, choice)?;
    let paths: Vec<&str> = parameters.iter().map(String::as_str).collect();
    let mut files = Vec::new();

    let tornado = analyzer.tornado(&paths, DEFAULT_TORNADO_RANGE)?;
    if let Some(top) = tornado.first() {
        info!(parameter = %top.parameter, swing = top.swing, "Most influential parameter");
    }
    files.push(write_analysis(params, "sensitivity_tornado", &tornado_table(&tornado)?)?);

    for path in &paths {
        let result = analyzer.single_parameter(path, &DEFAULT_VARIATIONS, VariationMode::Relative)?;
        let name = format!("sensitivity_{}", path.replace('.', "_"));
        files.push(write_analysis(params, &name, &result.to_table()?)?);
    }

    if let [first, second, ..] = paths.as_slice() {
        let grid = analyzer.two_way(
            (*first, &DEFAULT_VARIATIONS[..]),
            (*second, &DEFAULT_VARIATIONS[..]),
            VariationMode::Relative,
        )?;
        files.push(write_analysis(params, "sensitivity_two_way", &grid.to_table()?)?);
    }

    files.push(write_analysis(
        params,
        "sensitivity_pump_rate",
        &analyzer.pump_rate_sensitivity()?,
    )?);
    Ok(files)
}

/// Axis swept by the break-even study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BreakEvenAxis {
    Distance,
    Demand,
    VesselMix,
    /// Distance with each case pinned to its own optimal shuttle.
    Heterogeneous,
}

/// Break-even between two cases along `axis`, plus a side-by-side comparison.
pub fn breakeven(case_a: &Parameters, case_b: &Parameters, axis: BreakEvenAxis, output_dir: &Path) -> Result<BreakEvenResult> {
    let analyzer = BreakEvenAnalyzer::new(case_a, case_b);
    let result = match axis {
        BreakEvenAxis::Distance => analyzer.distance(&default_distances(), None)?,
        BreakEvenAxis::Demand => analyzer.demand(&default_start_vessels())?,
        BreakEvenAxis::VesselMix => analyzer.vessel_mix(&default_large_shares(), DEFAULT_MIX_VOLUMES)?,
        BreakEvenAxis::Heterogeneous => analyzer.heterogeneous_distance(&default_distances(), None, None, None)?,
    };

    match result.crossover {
        Some(value) => info!(
            parameter = %result.parameter,
            value,
            cheaper_below = ?result.cheaper_below,
            "Break-even found"
        ),
        None => info!(parameter = %result.parameter, "No break-even in range"),
    }

    let dir = output_dir.join(CROSS_CASE_DIR);
    let stem = format!("breakeven_{}_{}_{}", result.parameter.to_lowercase(), case_a.case_id, case_b.case_id);
    write_table(&dir.join(format!("{stem}.csv")), &result.to_table()?)?;
    write_table(
        &dir.join(format!("case_comparison_{}_{}.csv", case_a.case_id, case_b.case_id)),
        &compare_cases(&[case_a.clone(), case_b.clone()])?,
    )?;
    Ok(result)
}

/// Optimal configuration of every case under the default demand trajectories.
pub fn demand_scenarios(cases: &[Parameters], output_dir: &Path) -> Result<PathBuf> {
    let rows = run_demand_scenarios(cases, &default_scenarios())?;
    if rows.is_empty() {
        warn!("No demand scenario produced a feasible plan");
    }
    write_rows(&output_dir.join(CROSS_CASE_DIR).join("demand_scenarios.csv"), &rows)
}

/// Monte-Carlo optimisation of one case.
///
/// Writes the summary, the per-scenario NPC of the optimum, the candidate
/// ranking and the per-distribution comparison of the optimum.
pub fn stochastic(params: &Parameters, config: &StochasticConfig) -> Result<(StochasticResult, Vec<PathBuf>)> {
    let optimizer = StochasticOptimizer::new(params, config)?;
    let result = optimizer.solve()?;
    info!(
        case = %params.case_id,
        shuttle = result.optimal_shuttle_size,
        pump = result.optimal_pump_size,
        expected_npc = result.expected_npc,
        vss = result.vss,
        evpi = result.evpi,
        "Stochastic optimum"
    );

    let dir = case_output_dir(params);
    let comparison =
        optimizer.compare_distribution_scenarios(result.optimal_shuttle_size, result.optimal_pump_size)?;
    let files = vec![
        write_rows(&dir.join("stochastic_summary.csv"), &[result.summary()])?,
        write_analysis(params, "stochastic_scenarios", &optimizer.detail_table(&result)?)?,
        write_analysis(params, "stochastic_ranking", &result.ranking_table()?)?,
        write_rows(&dir.join("stochastic_distributions.csv"), &comparison)?,
    ];
    Ok((result, files))
}

/// Sweep a case and verify its best `n` candidates.
///
/// Returns whether every check passed.
pub fn verify(params: &Parameters, n: usize) -> Result<bool> {
    let sweep = run_sweep(params)?;
    if sweep.is_empty() {
        return Err(BunkerError::NoFeasibleSolution(params.case_id.clone()).into());
    }
    let reports = verify_top_candidates(params, &sweep, n)?;
    let passed = reports.iter().all(|r| r.passed());
    for report in &reports {
        let failed = report.failures().count();
        if failed == 0 {
            info!(shuttle = report.shuttle_size, pump = report.pump_size, "All checks passed");
        } else {
            warn!(shuttle = report.shuttle_size, pump = report.pump_size, failed, "Checks failed");
        }
    }
    let records: Vec<_> = reports.iter().flat_map(|r| r.records()).collect();
    write_rows(&case_output_dir(params).join("verification.csv"), &records)?;
    Ok(passed)
}

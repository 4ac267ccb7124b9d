//! Run-mode dispatch for planning cases.
//!
//! Every mode loads its case bundle, calls the matching core entry point
//! and writes the results under `<output_dir>/<case_id>/`.

use crate::output::{write_rows, write_table};
use anyhow::{bail, Context, Result};
use bunkeropt_core::simulate::{simulate_year, simulate_yearly};
use bunkeropt_core::table::Table;
use bunkeropt_core::verify::verify_top_candidates;
use bunkeropt_core::{run_sweep, BunkerError, Parameters, RunMode};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Candidates verified after a sweep.
pub const VERIFIED_CANDIDATES: usize = 3;

/// Some run found no feasible candidate.
pub const EXIT_INFEASIBLE: u8 = 1;
/// Configuration, I/O or solver fault.
pub const EXIT_FAULT: u8 = 2;

/// Whether `err` only reports that nothing was feasible.
pub fn is_infeasible(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<BunkerError>(),
        Some(BunkerError::NoFeasibleSolution(_))
    )
}

/// Exit code of a finished command that reports whether every run was feasible.
pub fn exit_code(result: &Result<bool>) -> u8 {
    match result {
        Ok(true) => 0,
        Ok(false) => EXIT_INFEASIBLE,
        Err(e) if is_infeasible(e) => EXIT_INFEASIBLE,
        Err(_) => EXIT_FAULT,
    }
}

/// What one case run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseOutcome {
    pub case_id: String,
    pub mode: RunMode,
    /// At least one feasible candidate was found.
    pub feasible: bool,
    pub files: Vec<PathBuf>,
}

/// Values given on the command line that take precedence over `[execution]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionOverrides {
    pub run_mode: Option<RunMode>,
    pub cases: Option<Vec<String>>,
    pub shuttle_size: Option<f64>,
    pub pump_size: Option<f64>,
    pub year: Option<i32>,
    pub output_dir: Option<PathBuf>,
}

impl ExecutionOverrides {
    pub fn apply(&self, params: &mut Parameters) {
        if let Some(mode) = self.run_mode {
            params.execution.run_mode = mode;
        }
        if let Some(cases) = &self.cases {
            params.execution.cases = cases.clone();
        }
        if self.shuttle_size.is_some() {
            params.execution.shuttle_size = self.shuttle_size;
        }
        if self.pump_size.is_some() {
            params.execution.pump_size = self.pump_size;
        }
        if self.year.is_some() {
            params.execution.year = self.year;
        }
        if let Some(dir) = &self.output_dir {
            params.execution.output_dir = dir.display().to_string();
        }
    }
}

/// Load a case and layer the overrides on top.
pub fn load_case(config_dir: &Path, case_id: &str, overrides: &ExecutionOverrides) -> Result<Parameters> {
    let mut params = Parameters::load_case(config_dir, case_id)
        .with_context(|| format!("Failed to load case {case_id} from {}", config_dir.display()))?;
    overrides.apply(&mut params);
    Ok(params)
}

/// Run `case_id` in the mode its configuration selects.
///
/// `all`/`multiple` fan out over `execution.cases` in parallel; results
/// are returned in case order.
pub fn run(config_dir: &Path, case_id: &str, overrides: &ExecutionOverrides) -> Result<Vec<CaseOutcome>> {
    let params = load_case(config_dir, case_id, overrides)?;
    let mode = params.execution.run_mode;
    info!(case = case_id, %mode, "Starting run");

    if mode != RunMode::All {
        return Ok(vec![run_case(&params)?]);
    }

    params
        .execution
        .cases
        .par_iter()
        .map(|case| -> Result<CaseOutcome> {
            let mut case_params = load_case(config_dir, case, overrides)?;
            case_params.execution.run_mode = RunMode::Single;
            let mut outcome = run_case(&case_params)?;
            outcome.mode = RunMode::All;
            Ok(outcome)
        })
        .collect()
}

/// Directory receiving the files of one case.
pub fn case_output_dir(params: &Parameters) -> PathBuf {
    Path::new(&params.execution.output_dir).join(&params.case_id)
}

/// Run one already loaded case.
pub fn run_case(params: &Parameters) -> Result<CaseOutcome> {
    let mode = params.execution.run_mode;
    let dir = case_output_dir(params);
    match mode {
        RunMode::Single | RunMode::All => run_single(params, &dir),
        RunMode::SingleScenario => {
            let (shuttle, pump) = fixed_candidate(params)?;
            let solution = simulate_yearly(params, shuttle, pump)?;
            let files = vec![
                write_rows(&dir.join("single_scenario.csv"), &[solution.scenario])?,
                write_rows(&dir.join("single_scenario_yearly.csv"), &solution.yearly)?,
            ];
            Ok(outcome(params, true, files))
        }
        RunMode::YearlySimulation => {
            let (shuttle, pump) = fixed_candidate(params)?;
            let solution = simulate_yearly(params, shuttle, pump)?;
            let files = vec![
                write_rows(&dir.join("yearly_simulation.csv"), &solution.yearly)?,
                write_rows(&dir.join("single_scenario.csv"), &[solution.scenario])?,
            ];
            Ok(outcome(params, true, files))
        }
        RunMode::AnnualSimulation => {
            let (shuttle, pump) = fixed_candidate(params)?;
            let year = params.execution.year.unwrap_or(params.time_period.end_year);
            let simulation = simulate_year(params, shuttle, pump, year)?;
            info!(
                year,
                cycle = simulation.cycle_time.cycle,
                required = simulation.requirement.required,
                binding = ?simulation.requirement.binding,
                "Annual simulation"
            );
            let files = vec![write_rows(&dir.join("annual_simulation.csv"), &[simulation.row])?];
            Ok(outcome(params, true, files))
        }
    }
}

fn run_single(params: &Parameters, dir: &Path) -> Result<CaseOutcome> {
    let sweep = run_sweep(params)?;
    if sweep.is_empty() {
        warn!(case = %params.case_id, "No feasible candidate");
        return Ok(outcome(params, false, Vec::new()));
    }

    let mut files = vec![
        write_rows(&dir.join("scenarios.csv"), &sweep.scenarios)?,
        write_rows(&dir.join("yearly.csv"), &sweep.yearly)?,
    ];

    let reports = verify_top_candidates(params, &sweep, VERIFIED_CANDIDATES)?;
    let failed: usize = reports.iter().map(|r| r.failures().count()).sum();
    if failed > 0 {
        warn!(case = %params.case_id, failed, "Verification checks failed");
    }
    let records: Vec<_> = reports.iter().flat_map(|r| r.records()).collect();
    files.push(write_rows(&dir.join("verification.csv"), &records)?);

    if let Some(best) = sweep.optimal() {
        info!(
            case = %params.case_id,
            shuttle = best.shuttle_size,
            pump = best.pump_size,
            npc = best.npc_total,
            lco = best.lco_usd_per_ton,
            "Optimal configuration"
        );
    }
    Ok(outcome(params, true, files))
}

fn fixed_candidate(params: &Parameters) -> Result<(f64, f64)> {
    match (params.execution.shuttle_size, params.execution.pump_size) {
        (Some(shuttle), Some(pump)) => Ok((shuttle, pump)),
        _ => bail!(
            "Run mode {} needs execution.shuttle_size and execution.pump_size",
            params.execution.run_mode
        ),
    }
}

fn outcome(params: &Parameters, feasible: bool, files: Vec<PathBuf>) -> CaseOutcome {
    CaseOutcome {
        case_id: params.case_id.clone(),
        mode: params.execution.run_mode,
        feasible,
        files,
    }
}

/// Write an analysis table under the output directory of `params`.
pub fn write_analysis(params: &Parameters, name: &str, table: &Table) -> Result<PathBuf> {
    write_table(&case_output_dir(params).join(format!("{name}.csv")), table)
}

//! Exhaustive sweep of the (shuttle size, pump rate) catalogue.

use crate::candidate::Infeasible;
use crate::errors::{BunkerError, BunkerResult};
use crate::milp::MilpEngine;
use crate::parameters::Parameters;
use crate::results::{CandidateSolution, ScenarioRow, YearlyRow};
use tracing::{debug, info};

const PROGRESS_INTERVAL: usize = 10;

/// Every feasible candidate of one case.
///
/// Rows keep sweep order: shuttle sizes outermost, pump rates innermost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepResult {
    pub case_id: String,
    pub scenarios: Vec<ScenarioRow>,
    pub yearly: Vec<YearlyRow>,
    /// Candidates attempted.
    pub evaluated: usize,
    /// Candidates dropped as infeasible.
    pub skipped: usize,
}

impl SweepResult {
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Candidate with the lowest NPC. Ties keep the first in sweep order.
    pub fn optimal(&self) -> Option<&ScenarioRow> {
        self.scenarios.iter().fold(None, |best: Option<&ScenarioRow>, row| match best {
            Some(current) if current.npc_total <= row.npc_total => Some(current),
            _ => Some(row),
        })
    }

    /// Scenario rows sorted by ascending NPC.
    pub fn ranked(&self) -> Vec<&ScenarioRow> {
        let mut rows: Vec<&ScenarioRow> = self.scenarios.iter().collect();
        rows.sort_by(|a, b| a.npc_total.total_cmp(&b.npc_total));
        rows
    }

    pub fn yearly_for(&self, shuttle_size: f64, pump_size: f64) -> Vec<&YearlyRow> {
        self.yearly
            .iter()
            .filter(|r| r.shuttle_size == shuttle_size && r.pump_size == pump_size)
            .collect()
    }

    /// Scenario row plus yearly rows of one candidate, if it was feasible.
    pub fn solution_for(&self, shuttle_size: f64, pump_size: f64) -> Option<CandidateSolution> {
        let scenario = self
            .scenarios
            .iter()
            .find(|r| r.is_candidate(shuttle_size, pump_size))?
            .clone();
        let yearly = self
            .yearly_for(shuttle_size, pump_size)
            .into_iter()
            .cloned()
            .collect();
        Some(CandidateSolution { scenario, yearly })
    }

    fn push(&mut self, solution: CandidateSolution) {
        self.scenarios.push(solution.scenario);
        self.yearly.extend(solution.yearly);
    }
}

/// Solve every candidate in the catalogues of `params`.
///
/// Infeasible candidates are skipped with a debug message. An empty result
/// is not an error here; callers decide how to report it.
pub fn run_sweep(params: &Parameters) -> BunkerResult<SweepResult> {
    let engine = MilpEngine::new(params)?;
    let shuttles = &params.shuttle.available_sizes;
    let pumps = &params.pumps.available_flow_rates;
    let total = shuttles.len() * pumps.len();

    info!(
        case = %params.case_id,
        topology = params.topology().label(),
        candidates = total,
        "Starting candidate sweep"
    );

    let mut result = SweepResult {
        case_id: params.case_id.clone(),
        ..SweepResult::default()
    };
    for &shuttle_size in shuttles {
        for &pump_size in pumps {
            result.evaluated += 1;
            match engine.solve(shuttle_size, pump_size) {
                Ok(solution) => result.push(solution),
                Err(reason) => {
                    result.skipped += 1;
                    debug!(shuttle_size, pump_size, %reason, "Skipping candidate");
                }
            }
            if result.evaluated % PROGRESS_INTERVAL == 0 {
                info!("Evaluated {}/{} candidates", result.evaluated, total);
            }
        }
    }

    match result.optimal() {
        Some(best) => info!(
            case = %params.case_id,
            feasible = result.scenarios.len(),
            shuttle_size = best.shuttle_size,
            pump_size = best.pump_size,
            npc_musd = best.npc_total,
            "Sweep finished"
        ),
        None => info!(case = %params.case_id, "Sweep finished without a feasible candidate"),
    }
    Ok(result)
}

/// Solve a single candidate, turning infeasibility into an error.
pub fn solve_candidate(
    params: &Parameters,
    shuttle_size: f64,
    pump_size: f64,
) -> BunkerResult<CandidateSolution> {
    let engine = MilpEngine::new(params)?;
    engine
        .solve(shuttle_size, pump_size)
        .map_err(|reason| infeasible_error(params, shuttle_size, pump_size, &reason))
}

pub(crate) fn infeasible_error(
    params: &Parameters,
    shuttle_size: f64,
    pump_size: f64,
    reason: &Infeasible,
) -> BunkerError {
    BunkerError::NoFeasibleSolution(format!(
        "{} with {shuttle_size} m3 shuttle and {pump_size} m3/h pump: {reason}",
        params.case_id
    ))
}

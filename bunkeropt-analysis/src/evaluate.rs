//! Re-solving a parameter bundle for the analysis drivers.

use bunkeropt_core::errors::BunkerResult;
use bunkeropt_core::{run_sweep, MilpEngine, Parameters, ScenarioRow};
use tracing::debug;

/// Which candidate an analysis re-solves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateChoice {
    /// Full sweep, keep the cheapest candidate.
    Optimal,
    /// A frozen (shuttle, pump) pair.
    Fixed { shuttle_size: f64, pump_size: f64 },
}

impl CandidateChoice {
    pub fn fixed(shuttle_size: f64, pump_size: f64) -> Self {
        CandidateChoice::Fixed {
            shuttle_size,
            pump_size,
        }
    }
}

/// Scenario row of the chosen candidate, or `None` if nothing is feasible.
pub fn evaluate(params: &Parameters, choice: CandidateChoice) -> BunkerResult<Option<ScenarioRow>> {
    match choice {
        CandidateChoice::Optimal => Ok(run_sweep(params)?.optimal().cloned()),
        CandidateChoice::Fixed {
            shuttle_size,
            pump_size,
        } => {
            let engine = MilpEngine::new(params)?;
            match engine.solve(shuttle_size, pump_size) {
                Ok(solution) => Ok(Some(solution.scenario)),
                Err(reason) => {
                    debug!(shuttle_size, pump_size, %reason, "Candidate infeasible");
                    Ok(None)
                }
            }
        }
    }
}

/// NPC of a result, `+∞` when infeasible.
pub fn npc_or_infinity(row: Option<&ScenarioRow>) -> f64 {
    row.map_or(f64::INFINITY, |r| r.npc_total)
}

pub fn lco_or_infinity(row: Option<&ScenarioRow>) -> f64 {
    row.map_or(f64::INFINITY, |r| r.lco_usd_per_ton)
}

//! Replay of the yearly accounting for a fixed candidate, without a solver.
//!
//! Each year the fleet grows to the smallest integer count satisfying both
//! working time and the daily peak, and never shrinks. Tanks follow the fleet
//! the same way. With non-negative unit costs this is also the cost-minimal
//! plan, so the replay reproduces the MILP figures for the same candidate.

use crate::candidate::{CandidateModel, FleetPlan};
use crate::cycle_time::CycleTime;
use crate::errors::{BunkerError, BunkerResult};
use crate::fleet::{tanks_required, FleetRequirement};
use crate::milp::MilpEngine;
use crate::parameters::Parameters;
use crate::results::{CandidateSolution, ScenarioRow, YearlyRow};
use crate::sweep::infeasible_error;
use tracing::warn;

/// Greedy fleet plan for a prepared candidate.
pub fn plan_fleet(model: &CandidateModel) -> FleetPlan {
    let mut plan = FleetPlan::default();
    let mut shuttles = 0u32;
    let mut tanks = 0u32;

    for demand in &model.demand_m3 {
        let activity = model.fleet.annual_activity(*demand);
        let required = model.fleet.with_daily_peak(activity).required;
        let total = shuttles.max(required);
        plan.new_shuttles.push(total - shuttles);
        plan.total_shuttles.push(total);
        plan.activity.push(activity);
        shuttles = total;

        if model.unit_costs.tank_enabled {
            let needed = tanks_required(
                total,
                model.shuttle_size(),
                model.tank_safety_factor,
                model.unit_costs.tank_volume_m3,
            );
            let total_tanks = tanks.max(needed);
            plan.new_tanks.push(total_tanks - tanks);
            plan.total_tanks.push(total_tanks);
            tanks = total_tanks;
        } else {
            plan.new_tanks.push(0);
            plan.total_tanks.push(0);
        }
    }
    plan
}

fn prepare(params: &Parameters, shuttle_size: f64, pump_size: f64) -> BunkerResult<CandidateModel> {
    let engine = MilpEngine::new(params)?;
    let model = engine
        .candidate(shuttle_size, pump_size)
        .map_err(|reason| infeasible_error(params, shuttle_size, pump_size, &reason))?;
    if let Err(reason) = model.check_call_limit() {
        warn!(case = %params.case_id, shuttle_size, pump_size, %reason, "Simulating an over-long call");
    }
    Ok(model)
}

/// Full-horizon replay for one candidate.
pub fn simulate_yearly(
    params: &Parameters,
    shuttle_size: f64,
    pump_size: f64,
) -> BunkerResult<CandidateSolution> {
    let model = prepare(params, shuttle_size, pump_size)?;
    Ok(model.account(&plan_fleet(&model)))
}

/// Scenario summary of one candidate without optimisation.
pub fn single_scenario(params: &Parameters, shuttle_size: f64, pump_size: f64) -> BunkerResult<ScenarioRow> {
    Ok(simulate_yearly(params, shuttle_size, pump_size)?.scenario)
}

/// One simulated year with the fleet carried over from earlier years.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualSimulation {
    pub cycle_time: CycleTime,
    /// Fleet that demand in this year alone would require.
    pub requirement: FleetRequirement,
    pub row: YearlyRow,
}

/// Replay the horizon and report `year`.
pub fn simulate_year(
    params: &Parameters,
    shuttle_size: f64,
    pump_size: f64,
    year: i32,
) -> BunkerResult<AnnualSimulation> {
    let model = prepare(params, shuttle_size, pump_size)?;
    let index = usize::try_from(year - model.start_year)
        .ok()
        .filter(|i| *i < model.years())
        .ok_or_else(|| {
            BunkerError::Error(format!(
                "Year {year} is outside the planning window {}-{}",
                params.time_period.start_year, params.time_period.end_year
            ))
        })?;

    let solution = model.account(&plan_fleet(&model));
    let requirement = model.fleet.for_demand(model.demand_m3[index]);
    let row = solution.yearly[index].clone();
    Ok(AnnualSimulation {
        cycle_time: model.cycle_time,
        requirement,
        row,
    })
}

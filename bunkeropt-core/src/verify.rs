//! Consistency checks over produced results.
//!
//! A failed check is recorded and logged, never raised: verification does
//! not change the primary outputs.

use crate::errors::BunkerResult;
use crate::parameters::{Parameters, Topology};
use crate::results::{CandidateSolution, ScenarioRow, YearlyRow};
use crate::simulate::simulate_yearly;
use crate::sweep::SweepResult;
use serde::Serialize;
use tracing::{info, warn};

/// Relative tolerance for time checks.
pub const TIME_TOLERANCE: f64 = 0.01;
/// Relative tolerance for cost checks.
pub const COST_TOLERANCE: f64 = 0.005;
/// Relative tolerance between the sweep and simulator LCO.
pub const LCO_TOLERANCE: f64 = 0.02;

/// Absolute slack for per-year feasibility checks.
const YEAR_EPSILON: f64 = 1e-6;

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    #[serde(rename = "Check")]
    pub name: String,
    #[serde(rename = "Passed")]
    pub passed: bool,
    #[serde(rename = "Expected")]
    pub expected: f64,
    #[serde(rename = "Actual")]
    pub actual: f64,
    #[serde(rename = "Tolerance")]
    pub tolerance: f64,
    #[serde(rename = "Difference")]
    pub difference: f64,
    #[serde(rename = "Message")]
    pub message: String,
}

impl VerificationResult {
    /// Compare `actual` to `expected` with a relative tolerance.
    fn relative(name: &str, expected: f64, actual: f64, tolerance: f64) -> Self {
        let difference = relative_difference(expected, actual);
        let passed = difference <= tolerance;
        let message = if passed {
            "OK".to_string()
        } else {
            format!(
                "Relative difference {:.4}% exceeds {:.2}%",
                difference * 100.0,
                tolerance * 100.0
            )
        };
        Self {
            name: name.to_string(),
            passed,
            expected,
            actual,
            tolerance,
            difference,
            message,
        }
    }

    /// Per-year check: `failing` lists the years that broke the rule.
    fn yearly(name: &str, years: usize, failing: &[i32], label: &str) -> Self {
        let passed = failing.is_empty();
        Self {
            name: name.to_string(),
            passed,
            expected: years as f64,
            actual: (years - failing.len().min(years)) as f64,
            tolerance: 0.0,
            difference: failing.len() as f64,
            message: if passed {
                "OK".to_string()
            } else {
                format!("{label} in years: {failing:?}")
            },
        }
    }
}

/// All checks run for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub case_id: String,
    pub shuttle_size: f64,
    pub pump_size: f64,
    pub results: Vec<VerificationResult>,
}

/// Flat row for tabular output.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationRecord<'a> {
    #[serde(rename = "Case")]
    pub case_id: &'a str,
    #[serde(rename = "Shuttle_Size_cbm")]
    pub shuttle_size: f64,
    #[serde(rename = "Pump_Size_m3ph")]
    pub pump_size: f64,
    #[serde(rename = "Check")]
    pub name: &'a str,
    #[serde(rename = "Passed")]
    pub passed: bool,
    #[serde(rename = "Expected")]
    pub expected: f64,
    #[serde(rename = "Actual")]
    pub actual: f64,
    #[serde(rename = "Tolerance")]
    pub tolerance: f64,
    #[serde(rename = "Difference")]
    pub difference: f64,
    #[serde(rename = "Message")]
    pub message: &'a str,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn get(&self, name: &str) -> Option<&VerificationResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn records(&self) -> Vec<VerificationRecord<'_>> {
        self.results
            .iter()
            .map(|result| VerificationRecord {
                case_id: &self.case_id,
                shuttle_size: self.shuttle_size,
                pump_size: self.pump_size,
                name: &result.name,
                passed: result.passed,
                expected: result.expected,
                actual: result.actual,
                tolerance: result.tolerance,
                difference: result.difference,
                message: &result.message,
            })
            .collect()
    }
}

fn relative_difference(expected: f64, actual: f64) -> f64 {
    if expected == 0.0 {
        actual.abs()
    } else {
        ((actual - expected) / expected).abs()
    }
}

/// Nine NPC components sum to the total.
pub fn check_npc_breakdown(row: &ScenarioRow) -> VerificationResult {
    VerificationResult::relative("NPC Breakdown", row.npc_total, row.component_sum(), COST_TOLERANCE)
}

/// NPC equals the annualized-CAPEX view plus OPEX.
pub fn check_annualized_npc(row: &ScenarioRow) -> VerificationResult {
    VerificationResult::relative(
        "Annualized NPC",
        row.npc_total,
        row.npc_annualized_total_capex + row.npc_total_opex,
        COST_TOLERANCE,
    )
}

/// Yearly discounted costs add up to the scenario NPC.
pub fn check_yearly_cost_sum(row: &ScenarioRow, yearly: &[YearlyRow]) -> VerificationResult {
    let sum = yearly.iter().map(|r| r.total_year_cost).sum();
    VerificationResult::relative("Yearly Cost Sum", row.npc_total, sum, COST_TOLERANCE)
}

/// Reported cycle duration against the closed-form expression.
pub fn check_cycle_time(params: &Parameters, row: &ScenarioRow) -> VerificationResult {
    VerificationResult::relative(
        "Cycle Time",
        manual_cycle_time(params, row.shuttle_size, row.pump_size),
        row.cycle_duration,
        TIME_TOLERANCE,
    )
}

fn manual_cycle_time(params: &Parameters, shuttle_size: f64, pump_size: f64) -> f64 {
    let ops = &params.operations;
    let t = ops.travel_time_hours;
    let setup = ops.setup_time_hours;
    let volume = params.bunkering.bunker_volume_per_call;
    let shore = if params.shore_supply.enabled {
        shuttle_size / params.shore_supply.pump_rate_m3ph + params.shore_supply.loading_time_fixed_hours
    } else {
        0.0
    };
    match params.topology() {
        Topology::PortStorage => shore + 2.0 * t + 2.0 * setup + 2.0 * shuttle_size / pump_size,
        Topology::RemoteSupply => {
            let vessels = (shuttle_size / volume + 1e-9).floor().max(1.0);
            let per_vessel = ops.vessel_movement_hours + 2.0 * setup + volume / pump_size;
            shore + 2.0 * t + ops.port_entry_hours + ops.port_exit_hours + vessels * per_vessel
        }
    }
}

/// `supply ≥ demand` every year.
pub fn check_demand_satisfaction(yearly: &[YearlyRow]) -> VerificationResult {
    let failing: Vec<i32> = yearly
        .iter()
        .filter(|r| r.supply_m3 < r.demand_m3 * (1.0 - YEAR_EPSILON) - YEAR_EPSILON)
        .map(|r| r.year)
        .collect();
    VerificationResult::yearly("Demand Satisfaction", yearly.len(), &failing, "Shortage")
}

/// `hours_used ≤ N · H_max` every year.
pub fn check_working_hours(yearly: &[YearlyRow], max_annual_hours: f64) -> VerificationResult {
    let failing: Vec<i32> = yearly
        .iter()
        .filter(|r| {
            let capacity = f64::from(r.total_shuttles) * max_annual_hours;
            r.hours_used > capacity * (1.0 + YEAR_EPSILON) + YEAR_EPSILON
        })
        .map(|r| r.year)
        .collect();
    VerificationResult::yearly(
        "Working Hours Constraint",
        yearly.len(),
        &failing,
        "Working hours exceeded",
    )
}

/// Utilization in `(0, 1]` for every year with demand.
pub fn check_utilization(yearly: &[YearlyRow]) -> VerificationResult {
    let failing: Vec<i32> = yearly
        .iter()
        .filter(|r| r.demand_m3 > 0.0)
        .filter(|r| !(r.utilization > 0.0 && r.utilization <= 1.0 + YEAR_EPSILON))
        .map(|r| r.year)
        .collect();
    VerificationResult::yearly(
        "Utilization Range",
        yearly.len(),
        &failing,
        "Utilization outside (0, 1]",
    )
}

pub fn check_lco(sweep_lco: f64, simulated_lco: f64) -> VerificationResult {
    VerificationResult::relative("LCO Consistency", sweep_lco, simulated_lco, LCO_TOLERANCE)
}

/// Run every check for one solved candidate.
///
/// The LCO check replays the candidate with the yearly simulator.
pub fn verify_solution(params: &Parameters, solution: &CandidateSolution) -> BunkerResult<VerificationReport> {
    let row = &solution.scenario;
    let yearly = &solution.yearly;
    let simulated = simulate_yearly(params, row.shuttle_size, row.pump_size)?;

    let results = vec![
        check_cycle_time(params, row),
        check_npc_breakdown(row),
        check_annualized_npc(row),
        check_yearly_cost_sum(row, yearly),
        check_demand_satisfaction(yearly),
        check_working_hours(yearly, params.operations.max_annual_hours_per_vessel),
        check_utilization(yearly),
        check_lco(row.lco_usd_per_ton, simulated.scenario.lco_usd_per_ton),
    ];

    let report = VerificationReport {
        case_id: row.case_id.clone(),
        shuttle_size: row.shuttle_size,
        pump_size: row.pump_size,
        results,
    };
    for failure in report.failures() {
        warn!(
            case = %report.case_id,
            shuttle_size = report.shuttle_size,
            pump_size = report.pump_size,
            check = %failure.name,
            "Verification failed: {}",
            failure.message
        );
    }
    Ok(report)
}

/// Verify the `n` cheapest candidates of a sweep.
pub fn verify_top_candidates(
    params: &Parameters,
    sweep: &SweepResult,
    n: usize,
) -> BunkerResult<Vec<VerificationReport>> {
    let mut reports = Vec::with_capacity(n);
    for row in sweep.ranked().into_iter().take(n) {
        if let Some(solution) = sweep.solution_for(row.shuttle_size, row.pump_size) {
            reports.push(verify_solution(params, &solution)?);
        }
    }
    let passed = reports.iter().filter(|r| r.passed()).count();
    info!(case = %sweep.case_id, "{passed}/{} verified candidates passed", reports.len());
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution() -> (Parameters, CandidateSolution) {
        let params = Parameters::default();
        let solution = simulate_yearly(&params, 5000.0, 1000.0).unwrap();
        (params, solution)
    }

    #[test]
    fn simulated_solution_passes() {
        let (params, solution) = solution();
        let report = verify_solution(&params, &solution).unwrap();
        assert!(report.passed(), "{:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(report.records().len(), report.results.len());
    }

    #[test]
    fn shortage_lists_years() {
        let (_, mut solution) = solution();
        solution.yearly[5].supply_m3 = solution.yearly[5].demand_m3 * 0.5;
        let check = check_demand_satisfaction(&solution.yearly);
        assert!(!check.passed);
        assert_eq!(check.message, "Shortage in years: [2035]");
    }

    #[test]
    fn broken_breakdown_is_flagged() {
        let (_, mut solution) = solution();
        solution.scenario.npc_shuttle_capex *= 1.5;
        assert!(!check_npc_breakdown(&solution.scenario).passed);
    }

    #[test]
    fn over_utilization_is_flagged() {
        let (_, mut solution) = solution();
        solution.yearly[0].utilization = 1.2;
        let check = check_utilization(&solution.yearly);
        assert!(!check.passed);
        assert!(check.message.contains("2030"));
    }

    #[test]
    fn manual_cycle_matches_remote_supply() {
        let mut params = Parameters::default();
        params.operations.has_storage_at_busan = false;
        params.operations.travel_time_hours = 1.67;
        assert!((manual_cycle_time(&params, 25_000.0, 1000.0) - (25_000.0 / 1500.0 + 55.34)).abs() < 1e-9);
    }
}

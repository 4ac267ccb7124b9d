//! Per-candidate model data and the accounting shared by every solver.
//!
//! A [`CandidateModel`] fixes everything that does not depend on fleet
//! decisions: cycle time, unit costs, demand and discount factors. A
//! [`FleetPlan`] holds the decisions themselves. [`CandidateModel::account`]
//! turns the pair into result rows, so the MILP and the yearly simulator
//! report identical figures for identical plans.

use crate::costs::{CostCalculator, UnitCosts};
use crate::cycle_time::CycleTime;
use crate::demand::DemandProjection;
use crate::fleet::FleetSizer;
use crate::interpolate::McrCurve;
use crate::parameters::Parameters;
use crate::results::{CandidateSolution, ScenarioRow, YearlyRow};
use thiserror::Error;

const USD_PER_MUSD: f64 = 1e6;

/// Why a candidate produced no solution.
///
/// These are expected outcomes of a sweep, not errors: the sweep drops the
/// candidate and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Infeasible {
    #[error("MCR of {mcr_kw:.1} kW for a {shuttle_size} m3 shuttle is not positive")]
    NonPositiveMcr { shuttle_size: f64, mcr_kw: f64 },
    #[error("call duration {call_duration:.2} h exceeds the {limit:.2} h limit")]
    CallDurationExceeded { call_duration: f64, limit: f64 },
    #[error("solver finished with status {0}")]
    SolverStatus(String),
}

/// Fleet decisions per planning year.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FleetPlan {
    pub new_shuttles: Vec<u32>,
    pub total_shuttles: Vec<u32>,
    /// Calls (C1) or trips (C2/C3) per year.
    pub activity: Vec<f64>,
    pub new_tanks: Vec<u32>,
    pub total_tanks: Vec<u32>,
}

/// Fleet-independent data of one (shuttle, pump) candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateModel {
    pub case_id: String,
    pub start_year: i32,
    pub cycle_time: CycleTime,
    pub unit_costs: UnitCosts,
    pub fleet: FleetSizer,
    pub demand_m3: Vec<f64>,
    pub discount_factors: Vec<f64>,
    pub annuity_factor: f64,
    /// Volume delivered per unit of activity (m³).
    pub delivery_volume: f64,
    pub density: f64,
    pub max_annual_hours: f64,
    pub tank_safety_factor: f64,
    pub daily_peak_factor: f64,
    pub max_call_duration: f64,
}

impl CandidateModel {
    /// Prepare a candidate.
    ///
    /// Only the MCR gate is applied here. The call-duration gate is left to
    /// the optimiser so fixed-candidate simulations can still report
    /// over-long calls.
    pub fn new(
        params: &Parameters,
        demand: &DemandProjection,
        mcr: &McrCurve,
        shuttle_size: f64,
        pump_size: f64,
    ) -> Result<Self, Infeasible> {
        let mcr_kw = mcr.mcr(shuttle_size);
        if mcr_kw <= 0.0 {
            return Err(Infeasible::NonPositiveMcr {
                shuttle_size,
                mcr_kw,
            });
        }

        let cycle_time = CycleTime::calculate(params, shuttle_size, pump_size);
        let costs = CostCalculator::new(params);
        let discount_factors = params
            .time_period
            .years()
            .map(|year| costs.discount_factor(year))
            .collect();

        Ok(Self {
            case_id: params.case_id.clone(),
            start_year: params.time_period.start_year,
            cycle_time,
            unit_costs: costs.unit_costs(shuttle_size, pump_size, mcr_kw),
            fleet: FleetSizer::new(params, &cycle_time),
            demand_m3: demand.demand_m3.clone(),
            discount_factors,
            annuity_factor: costs.annuity_factor(),
            delivery_volume: params
                .topology()
                .delivery_volume(params.bunkering.bunker_volume_per_call, shuttle_size),
            density: params.ammonia.density_storage,
            max_annual_hours: params.operations.max_annual_hours_per_vessel,
            tank_safety_factor: params.operations.tank_safety_factor,
            daily_peak_factor: params.operations.daily_peak_factor,
            max_call_duration: params.constraints.max_call_duration_hours,
        })
    }

    pub fn shuttle_size(&self) -> f64 {
        self.cycle_time.shuttle_size
    }

    pub fn pump_size(&self) -> f64 {
        self.cycle_time.pump_size
    }

    pub fn years(&self) -> usize {
        self.demand_m3.len()
    }

    pub fn check_call_limit(&self) -> Result<(), Infeasible> {
        if self.cycle_time.within_call_limit(self.max_call_duration) {
            Ok(())
        } else {
            Err(Infeasible::CallDurationExceeded {
                call_duration: self.cycle_time.call_duration,
                limit: self.max_call_duration,
            })
        }
    }

    /// Undiscounted variable cost of one call or trip (USD).
    pub fn variable_cost_per_activity(&self) -> f64 {
        self.unit_costs.shuttle_fuel_cost_per_cycle * self.cycle_time.trips_per_call
            + self.unit_costs.pump_fuel_cost_per_event
    }

    /// Tank fixed and variable cost per tank in service per year (USD).
    pub fn tank_cost_per_year(&self) -> f64 {
        self.unit_costs.tank_fixed_opex + self.unit_costs.tank_variable_opex
    }

    /// Build scenario and yearly rows for `plan`.
    pub fn account(&self, plan: &FleetPlan) -> CandidateSolution {
        let ct = &self.cycle_time;
        let unit = &self.unit_costs;
        let musd = |usd: f64| usd / USD_PER_MUSD;

        let mut yearly = Vec::with_capacity(self.years());
        let mut cumulative_cost = 0.0;
        let mut cumulative_tons = 0.0;

        for t in 0..self.years() {
            let delta = self.discount_factors[t];
            let new_shuttles = plan.new_shuttles[t];
            let total_shuttles = plan.total_shuttles[t];
            let new_tanks = plan.new_tanks.get(t).copied().unwrap_or(0);
            let total_tanks = plan.total_tanks.get(t).copied().unwrap_or(0);
            let activity = plan.activity[t];
            let x = f64::from(new_shuttles);
            let n = f64::from(total_shuttles);
            let xt = f64::from(new_tanks);
            let nt = f64::from(total_tanks);

            let cycles = activity * ct.trips_per_call;
            let supply_m3 = activity * self.delivery_volume;
            let cycles_available = n * ct.annual_cycles(self.max_annual_hours);
            let utilization = if cycles_available > 0.0 {
                cycles / cycles_available
            } else {
                0.0
            };

            let capex_shuttle = delta * unit.shuttle_capex * x;
            let capex_bunkering = delta * unit.bunkering_capex * x;
            let capex_tank = delta * unit.tank_capex * xt;
            let fopex_shuttle = delta * unit.shuttle_fixed_opex * n;
            let fopex_bunkering = delta * unit.bunkering_fixed_opex * n;
            let fopex_tank = delta * unit.tank_fixed_opex * nt;
            let vopex_shuttle = delta * unit.shuttle_fuel_cost_per_cycle * cycles;
            let vopex_bunkering = delta * unit.pump_fuel_cost_per_event * activity;
            let vopex_tank = delta * unit.tank_variable_opex * nt;

            let capex_total = capex_shuttle + capex_bunkering + capex_tank;
            let fopex_total = fopex_shuttle + fopex_bunkering + fopex_tank;
            let vopex_total = vopex_shuttle + vopex_bunkering + vopex_tank;
            let year_cost = capex_total + fopex_total + vopex_total;
            let supply_ton = supply_m3 * self.density;

            cumulative_cost += year_cost;
            cumulative_tons += delta * supply_ton;

            let annualized = |unit_capex: f64, count: f64| musd(unit_capex * count / self.annuity_factor);
            let annualized_capex_shuttle = annualized(unit.shuttle_capex, n);
            let annualized_capex_bunkering = annualized(unit.bunkering_capex, n);
            let annualized_capex_tank = annualized(unit.tank_capex, nt);

            yearly.push(YearlyRow {
                case_id: self.case_id.clone(),
                shuttle_size: ct.shuttle_size,
                pump_size: ct.pump_size,
                year: self.start_year + t as i32,
                new_shuttles,
                total_shuttles,
                new_tanks,
                total_tanks,
                annual_calls: activity,
                annual_cycles: cycles,
                hours_used: cycles * ct.cycle,
                supply_m3,
                demand_m3: self.demand_m3[t],
                cycles_available,
                utilization,
                discount_factor: delta,
                capex_shuttle: musd(capex_shuttle),
                capex_bunkering: musd(capex_bunkering),
                capex_tank: musd(capex_tank),
                capex_total: musd(capex_total),
                fopex_shuttle: musd(fopex_shuttle),
                fopex_bunkering: musd(fopex_bunkering),
                fopex_tank: musd(fopex_tank),
                fopex_total: musd(fopex_total),
                vopex_shuttle: musd(vopex_shuttle),
                vopex_bunkering: musd(vopex_bunkering),
                vopex_tank: musd(vopex_tank),
                vopex_total: musd(vopex_total),
                annualized_capex_shuttle,
                annualized_capex_bunkering,
                annualized_capex_tank,
                annualized_capex_total: annualized_capex_shuttle
                    + annualized_capex_bunkering
                    + annualized_capex_tank,
                total_opex: musd(fopex_total + vopex_total),
                total_year_cost: musd(year_cost),
                supply_ton,
                lco_cumulative: ratio_or_zero(cumulative_cost, cumulative_tons),
            });
        }

        let scenario = self.scenario_row(&yearly, cumulative_cost, cumulative_tons);
        CandidateSolution { scenario, yearly }
    }

    fn scenario_row(&self, yearly: &[YearlyRow], npc_usd: f64, discounted_tons: f64) -> ScenarioRow {
        let ct = &self.cycle_time;
        let sum = |f: fn(&YearlyRow) -> f64| yearly.iter().map(f).sum::<f64>();

        let npc_shuttle_capex = sum(|r| r.capex_shuttle);
        let npc_bunkering_capex = sum(|r| r.capex_bunkering);
        let npc_terminal_capex = sum(|r| r.capex_tank);
        let npc_shuttle_fopex = sum(|r| r.fopex_shuttle);
        let npc_bunkering_fopex = sum(|r| r.fopex_bunkering);
        let npc_terminal_fopex = sum(|r| r.fopex_tank);
        let npc_shuttle_vopex = sum(|r| r.vopex_shuttle);
        let npc_bunkering_vopex = sum(|r| r.vopex_bunkering);
        let npc_terminal_vopex = sum(|r| r.vopex_tank);

        let npc_total_capex = npc_shuttle_capex + npc_bunkering_capex + npc_terminal_capex;
        let npc_total_fopex = npc_shuttle_fopex + npc_bunkering_fopex + npc_terminal_fopex;
        let npc_total_vopex = npc_shuttle_vopex + npc_bunkering_vopex + npc_terminal_vopex;

        // Annual capital charge spread over the horizon, and its NPC equivalent
        let af = self.annuity_factor;
        let per_year = |npc: f64| npc / af;
        let annualized_shuttle_capex = per_year(npc_shuttle_capex);
        let annualized_bunkering_capex = per_year(npc_bunkering_capex);
        let annualized_terminal_capex = per_year(npc_terminal_capex);
        let annualized_total_capex =
            annualized_shuttle_capex + annualized_bunkering_capex + annualized_terminal_capex;

        ScenarioRow {
            case_id: self.case_id.clone(),
            shuttle_size: ct.shuttle_size,
            pump_size: ct.pump_size,
            call_duration: ct.call_duration,
            cycle_duration: ct.cycle,
            trips_per_call: ct.trips_per_call,
            vessels_per_trip: ct.vessels_per_trip,
            shore_loading: ct.shore_loading,
            travel_outbound: ct.travel_outbound,
            travel_return: ct.travel_return,
            setup_inbound: ct.setup_inbound,
            setup_outbound: ct.setup_outbound,
            pumping_per_vessel: ct.pumping_per_vessel,
            pumping_total: ct.pumping_total,
            basic_cycle: ct.basic_cycle,
            annual_cycles_max: ct.annual_cycles(self.max_annual_hours),
            mcr_kw: self.unit_costs.mcr_kw,
            npc_total: npc_usd / USD_PER_MUSD,
            npc_shuttle_capex,
            npc_bunkering_capex,
            npc_terminal_capex,
            npc_shuttle_fopex,
            npc_bunkering_fopex,
            npc_terminal_fopex,
            npc_shuttle_vopex,
            npc_bunkering_vopex,
            npc_terminal_vopex,
            npc_total_capex,
            npc_total_fopex,
            npc_total_vopex,
            npc_total_opex: npc_total_fopex + npc_total_vopex,
            annuity_factor: af,
            annualized_shuttle_capex,
            annualized_bunkering_capex,
            annualized_terminal_capex,
            annualized_total_capex,
            npc_annualized_shuttle_capex: annualized_shuttle_capex * af,
            npc_annualized_bunkering_capex: annualized_bunkering_capex * af,
            npc_annualized_terminal_capex: annualized_terminal_capex * af,
            npc_annualized_total_capex: annualized_total_capex * af,
            total_supply_ton: sum(|r| r.supply_ton),
            lco_usd_per_ton: ratio_or_zero(npc_usd, discounted_tons),
        }
    }
}

fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn model(params: &Parameters, shuttle: f64, pump: f64) -> CandidateModel {
        let demand = DemandProjection::from_parameters(params);
        let mcr = McrCurve::new(&params.shuttle.mcr_map).unwrap();
        CandidateModel::new(params, &demand, &mcr, shuttle, pump).unwrap()
    }

    fn flat_plan(years: usize, shuttles: u32, tanks: u32, activity: f64) -> FleetPlan {
        let mut plan = FleetPlan::default();
        for t in 0..years {
            plan.new_shuttles.push(if t == 0 { shuttles } else { 0 });
            plan.total_shuttles.push(shuttles);
            plan.new_tanks.push(if t == 0 { tanks } else { 0 });
            plan.total_tanks.push(tanks);
            plan.activity.push(activity);
        }
        plan
    }

    #[test]
    fn non_positive_mcr_is_infeasible() {
        let mut params = Parameters::default();
        params.shuttle.mcr_map = vec![(1000.0, 100.0), (2000.0, 1000.0)];
        let demand = DemandProjection::from_parameters(&params);
        let mcr = McrCurve::new(&params.shuttle.mcr_map).unwrap();
        let result = CandidateModel::new(&params, &demand, &mcr, 500.0, 1000.0);
        assert!(matches!(result, Err(Infeasible::NonPositiveMcr { .. })));
    }

    #[test]
    fn components_add_up_to_npc() {
        let params = Parameters::default();
        let m = model(&params, 5000.0, 1000.0);
        let solution = m.account(&flat_plan(m.years(), 3, 1, 200.0));
        let s = &solution.scenario;

        assert!(is_close!(s.component_sum(), s.npc_total));
        let yearly_total: f64 = solution.yearly.iter().map(|r| r.total_year_cost).sum();
        assert!(is_close!(yearly_total, s.npc_total));
        assert!(is_close!(s.npc_annualized_total_capex, s.npc_total_capex));
        assert!(is_close!(
            s.npc_total_opex,
            s.npc_total_fopex + s.npc_total_vopex
        ));
    }

    #[test]
    fn capex_is_charged_only_when_added() {
        let params = Parameters::default();
        let m = model(&params, 5000.0, 1000.0);
        let solution = m.account(&flat_plan(m.years(), 2, 1, 100.0));
        assert!(solution.yearly[0].capex_shuttle > 0.0);
        assert_eq!(solution.yearly[1].capex_shuttle, 0.0);
        assert!(solution.yearly[1].fopex_shuttle > 0.0);
        assert!(is_close!(
            solution.yearly[0].fopex_shuttle,
            solution.yearly[20].fopex_shuttle
        ));
    }

    #[test]
    fn lco_is_npc_per_discounted_ton() {
        let mut params = Parameters::default();
        params.economy.discount_rate = 0.05;
        let m = model(&params, 5000.0, 1000.0);
        let solution = m.account(&flat_plan(m.years(), 2, 1, 100.0));

        let tons: f64 = solution
            .yearly
            .iter()
            .map(|r| r.discount_factor * r.supply_ton)
            .sum();
        let expected = solution.scenario.npc_total * 1e6 / tons;
        assert!(is_close!(solution.scenario.lco_usd_per_ton, expected));
        let last = solution.yearly.last().unwrap();
        assert!(is_close!(last.lco_cumulative, solution.scenario.lco_usd_per_ton));
    }

    #[test]
    fn remote_supply_activity_counts_trips() {
        let mut params = Parameters::default();
        params.operations.has_storage_at_busan = false;
        params.tank_storage.enabled = false;
        let m = model(&params, 10_000.0, 1000.0);
        let solution = m.account(&flat_plan(m.years(), 1, 0, 10.0));
        let first = &solution.yearly[0];
        assert_eq!(first.supply_m3, 100_000.0);
        // two vessels per trip, half a trip per call
        assert!(is_close!(first.annual_cycles, 5.0));
        assert_eq!(first.capex_tank, 0.0);
    }
}

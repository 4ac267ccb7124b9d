//! Mixed-integer fleet plan for one (shuttle, pump) candidate.
//!
//! For every planning year the problem carries new and cumulative shuttles
//! (integer), annual calls or trips (continuous) and, with port storage
//! enabled, new and cumulative tanks (integer). The objective is the
//! discounted sum of capital, fixed and variable costs.

use crate::candidate::{CandidateModel, FleetPlan, Infeasible};
use crate::demand::DemandProjection;
use crate::errors::BunkerResult;
use crate::interpolate::McrCurve;
use crate::parameters::Parameters;
use crate::results::CandidateSolution;
use highs::{Col, HighsModelStatus, RowProblem, Sense};

const DAYS_PER_YEAR: f64 = 365.0;

/// Relative MIP gap; fleets are small enough for the solver to close it.
const MIP_REL_GAP: f64 = 1e-6;

/// Reusable solver for every candidate of one parameter bundle.
///
/// Demand and the MCR curve are shared by all candidates, so they are
/// computed once.
#[derive(Debug, Clone)]
pub struct MilpEngine<'a> {
    params: &'a Parameters,
    demand: DemandProjection,
    mcr: McrCurve,
}

/// Column handles for one planning year.
struct YearColumns {
    new_shuttles: Col,
    total_shuttles: Col,
    activity: Col,
    tanks: Option<(Col, Col)>,
}

impl<'a> MilpEngine<'a> {
    pub fn new(params: &'a Parameters) -> BunkerResult<Self> {
        Ok(Self {
            params,
            demand: DemandProjection::from_parameters(params),
            mcr: McrCurve::new(&params.shuttle.mcr_map)?,
        })
    }

    pub fn params(&self) -> &Parameters {
        self.params
    }

    pub fn demand(&self) -> &DemandProjection {
        &self.demand
    }

    pub fn mcr_curve(&self) -> &McrCurve {
        &self.mcr
    }

    /// Fleet-independent model of a candidate, without the call-duration gate.
    pub fn candidate(&self, shuttle_size: f64, pump_size: f64) -> Result<CandidateModel, Infeasible> {
        CandidateModel::new(self.params, &self.demand, &self.mcr, shuttle_size, pump_size)
    }

    /// Gate, optimise and account one candidate.
    pub fn solve(&self, shuttle_size: f64, pump_size: f64) -> Result<CandidateSolution, Infeasible> {
        let model = self.candidate(shuttle_size, pump_size)?;
        model.check_call_limit()?;
        let plan = optimise(&model)?;
        Ok(model.account(&plan))
    }
}

/// Build and solve the MILP for a prepared candidate.
pub fn optimise(model: &CandidateModel) -> Result<FleetPlan, Infeasible> {
    let unit = &model.unit_costs;
    let ct = &model.cycle_time;
    let h_max = model.max_annual_hours;
    let tank_enabled = unit.tank_enabled;

    let mut problem = RowProblem::default();
    let mut columns: Vec<YearColumns> = Vec::with_capacity(model.years());

    for t in 0..model.years() {
        let delta = model.discount_factors[t];
        let new_shuttles = problem.add_integer_column(
            delta * (unit.shuttle_capex + unit.bunkering_capex),
            0.0..,
        );
        let total_shuttles = problem.add_integer_column(
            delta * (unit.shuttle_fixed_opex + unit.bunkering_fixed_opex),
            0.0..,
        );
        let activity = problem.add_column(delta * model.variable_cost_per_activity(), 0.0..);
        let tanks = if tank_enabled {
            let new_tanks = problem.add_integer_column(delta * unit.tank_capex, 0.0..);
            let total_tanks = problem.add_integer_column(delta * model.tank_cost_per_year(), 0.0..);
            Some((new_tanks, total_tanks))
        } else {
            None
        };
        columns.push(YearColumns {
            new_shuttles,
            total_shuttles,
            activity,
            tanks,
        });
    }

    for (t, year) in columns.iter().enumerate() {
        // Fleet accumulation: N[t] = N[t-1] + x[t]
        let mut accumulation = vec![(year.total_shuttles, 1.0), (year.new_shuttles, -1.0)];
        if let Some(previous) = t.checked_sub(1).map(|p| &columns[p]) {
            accumulation.push((previous.total_shuttles, -1.0));
        }
        problem.add_row(0.0..=0.0, &accumulation);

        problem.add_row(
            model.demand_m3[t]..,
            &[(year.activity, model.delivery_volume)],
        );

        problem.add_row(
            ..=0.0,
            &[
                (year.activity, ct.trips_per_call * ct.cycle),
                (year.total_shuttles, -h_max),
            ],
        );

        // Peak-day deliverable volume must cover the peak-day demand
        problem.add_row(
            0.0..,
            &[
                (
                    year.total_shuttles,
                    h_max / ct.cycle / DAYS_PER_YEAR * ct.shuttle_size,
                ),
                (
                    year.activity,
                    -model.delivery_volume * model.daily_peak_factor / DAYS_PER_YEAR,
                ),
            ],
        );

        if let Some((new_tanks, total_tanks)) = year.tanks {
            let mut accumulation = vec![(total_tanks, 1.0), (new_tanks, -1.0)];
            if let Some((_, previous)) = t.checked_sub(1).and_then(|p| columns[p].tanks) {
                accumulation.push((previous, -1.0));
            }
            problem.add_row(0.0..=0.0, &accumulation);

            problem.add_row(
                ..=0.0,
                &[
                    (year.total_shuttles, ct.shuttle_size * model.tank_safety_factor),
                    (total_tanks, -unit.tank_volume_m3),
                ],
            );
        }
    }

    let mut solver = problem.optimise(Sense::Minimise);
    solver.set_option("output_flag", false);
    solver.set_option("mip_rel_gap", MIP_REL_GAP);

    let solved = solver
        .try_solve()
        .map_err(|status| Infeasible::SolverStatus(format!("{status:?}")))?;
    let status = solved.status();
    if status != HighsModelStatus::Optimal {
        return Err(Infeasible::SolverStatus(format!("{status:?}")));
    }

    let solution = solved.get_solution();
    let values = solution.columns();
    let per_year = if tank_enabled { 5 } else { 3 };
    let mut plan = FleetPlan::default();
    for chunk in values.chunks(per_year) {
        plan.new_shuttles.push(to_count(chunk[0]));
        plan.total_shuttles.push(to_count(chunk[1]));
        plan.activity.push(chunk[2].max(0.0));
        if tank_enabled {
            plan.new_tanks.push(to_count(chunk[3]));
            plan.total_tanks.push(to_count(chunk[4]));
        } else {
            plan.new_tanks.push(0);
            plan.total_tanks.push(0);
        }
    }
    Ok(plan)
}

/// Integer solver values come back with round-off.
fn to_count(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

//! Optimal infrastructure under alternative fleet-growth trajectories.

use bunkeropt_core::errors::BunkerResult;
use bunkeropt_core::{run_sweep, Parameters};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Vessel counts at the ends of the planning window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandScenario {
    pub start_vessels: u32,
    pub end_vessels: u32,
}

impl DemandScenario {
    pub fn new(start_vessels: u32, end_vessels: u32) -> Self {
        Self {
            start_vessels,
            end_vessels,
        }
    }

    /// Copy of `params` with this trajectory.
    pub fn apply(&self, params: &Parameters) -> Parameters {
        let mut params = params.clone();
        params.shipping.start_vessels = self.start_vessels;
        params.shipping.end_vessels = self.end_vessels;
        params
    }
}

/// `Low`, `Base`, `High` and `VeryHigh`, all starting from 50 vessels.
pub fn default_scenarios() -> IndexMap<String, DemandScenario> {
    [
        ("Low", DemandScenario::new(50, 250)),
        ("Base", DemandScenario::new(50, 500)),
        ("High", DemandScenario::new(50, 750)),
        ("VeryHigh", DemandScenario::new(50, 1000)),
    ]
    .into_iter()
    .map(|(name, scenario)| (name.to_string(), scenario))
    .collect()
}

/// Sweep optimum of one case under one trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandScenarioRow {
    #[serde(rename = "Case")]
    pub case_id: String,
    #[serde(rename = "Scenario")]
    pub scenario: String,
    #[serde(rename = "Start_Vessels")]
    pub start_vessels: u32,
    #[serde(rename = "End_Vessels")]
    pub end_vessels: u32,
    #[serde(rename = "Optimal_Shuttle_cbm")]
    pub shuttle_size: f64,
    #[serde(rename = "Optimal_Pump_m3ph")]
    pub pump_size: f64,
    #[serde(rename = "NPC_Total_USDm")]
    pub npc_total: f64,
    #[serde(rename = "LCO_USD_per_ton")]
    pub lco_usd_per_ton: f64,
    #[serde(rename = "NPC_Annualized_Shuttle_CAPEX_USDm")]
    pub npc_annualized_shuttle_capex: f64,
    #[serde(rename = "NPC_Annualized_Bunkering_CAPEX_USDm")]
    pub npc_annualized_bunkering_capex: f64,
    #[serde(rename = "NPC_Shuttle_fOPEX_USDm")]
    pub npc_shuttle_fopex: f64,
    #[serde(rename = "NPC_Bunkering_fOPEX_USDm")]
    pub npc_bunkering_fopex: f64,
    #[serde(rename = "NPC_Shuttle_vOPEX_USDm")]
    pub npc_shuttle_vopex: f64,
    #[serde(rename = "NPC_Bunkering_vOPEX_USDm")]
    pub npc_bunkering_vopex: f64,
}

/// Run the sweep for one case under one trajectory.
///
/// Returns `None` when no candidate is feasible.
pub fn run_demand_scenario(
    params: &Parameters,
    name: &str,
    scenario: &DemandScenario,
) -> BunkerResult<Option<DemandScenarioRow>> {
    let adjusted = scenario.apply(params);
    adjusted.validate()?;
    let sweep = run_sweep(&adjusted)?;
    let Some(best) = sweep.optimal() else {
        warn!(case = %params.case_id, scenario = name, "No feasible solution");
        return Ok(None);
    };
    info!(
        case = %params.case_id,
        scenario = name,
        npc = best.npc_total,
        shuttle = best.shuttle_size,
        "Demand scenario solved"
    );
    Ok(Some(DemandScenarioRow {
        case_id: params.case_id.clone(),
        scenario: name.to_string(),
        start_vessels: scenario.start_vessels,
        end_vessels: scenario.end_vessels,
        shuttle_size: best.shuttle_size,
        pump_size: best.pump_size,
        npc_total: best.npc_total,
        lco_usd_per_ton: best.lco_usd_per_ton,
        npc_annualized_shuttle_capex: best.npc_annualized_shuttle_capex,
        npc_annualized_bunkering_capex: best.npc_annualized_bunkering_capex,
        npc_shuttle_fopex: best.npc_shuttle_fopex,
        npc_bunkering_fopex: best.npc_bunkering_fopex,
        npc_shuttle_vopex: best.npc_shuttle_vopex,
        npc_bunkering_vopex: best.npc_bunkering_vopex,
    }))
}

/// Summary across every case and trajectory, case-major.
///
/// Infeasible combinations are left out of the summary.
pub fn run_demand_scenarios(
    cases: &[Parameters],
    scenarios: &IndexMap<String, DemandScenario>,
) -> BunkerResult<Vec<DemandScenarioRow>> {
    let jobs: Vec<(&Parameters, &String, &DemandScenario)> = cases
        .iter()
        .flat_map(|params| scenarios.iter().map(move |(name, s)| (params, name, s)))
        .collect();

    let rows = jobs
        .into_par_iter()
        .map(|(params, name, scenario)| run_demand_scenario(params, name, scenario))
        .collect::<BunkerResult<Vec<_>>>()?;
    Ok(rows.into_iter().flatten().collect())
}

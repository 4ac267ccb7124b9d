//! Result rows emitted by the planner.
//!
//! Field names follow Rust conventions; the serialised names are the column
//! names of the output tables and carry their units. Monetary columns are in
//! millions of USD. Values are stored unrounded.

use serde::{Deserialize, Serialize};

/// One feasible (shuttle, pump) candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRow {
    #[serde(rename = "Case")]
    pub case_id: String,
    #[serde(rename = "Shuttle_Size_cbm")]
    pub shuttle_size: f64,
    #[serde(rename = "Pump_Size_m3ph")]
    pub pump_size: f64,
    #[serde(rename = "Call_Duration_hr")]
    pub call_duration: f64,
    #[serde(rename = "Cycle_Duration_hr")]
    pub cycle_duration: f64,
    #[serde(rename = "Trips_per_Call")]
    pub trips_per_call: f64,
    #[serde(rename = "Vessels_per_Trip")]
    pub vessels_per_trip: u32,
    #[serde(rename = "Shore_Loading_hr")]
    pub shore_loading: f64,
    #[serde(rename = "Travel_Outbound_hr")]
    pub travel_outbound: f64,
    #[serde(rename = "Travel_Return_hr")]
    pub travel_return: f64,
    #[serde(rename = "Setup_Inbound_hr")]
    pub setup_inbound: f64,
    #[serde(rename = "Setup_Outbound_hr")]
    pub setup_outbound: f64,
    #[serde(rename = "Pumping_Per_Vessel_hr")]
    pub pumping_per_vessel: f64,
    #[serde(rename = "Pumping_Total_hr")]
    pub pumping_total: f64,
    #[serde(rename = "Basic_Cycle_Duration_hr")]
    pub basic_cycle: f64,
    #[serde(rename = "Annual_Cycles_Max")]
    pub annual_cycles_max: f64,
    #[serde(rename = "MCR_kW")]
    pub mcr_kw: f64,

    #[serde(rename = "NPC_Total_USDm")]
    pub npc_total: f64,
    #[serde(rename = "NPC_Shuttle_CAPEX_USDm")]
    pub npc_shuttle_capex: f64,
    #[serde(rename = "NPC_Bunkering_CAPEX_USDm")]
    pub npc_bunkering_capex: f64,
    #[serde(rename = "NPC_Terminal_CAPEX_USDm")]
    pub npc_terminal_capex: f64,
    #[serde(rename = "NPC_Shuttle_fOPEX_USDm")]
    pub npc_shuttle_fopex: f64,
    #[serde(rename = "NPC_Bunkering_fOPEX_USDm")]
    pub npc_bunkering_fopex: f64,
    #[serde(rename = "NPC_Terminal_fOPEX_USDm")]
    pub npc_terminal_fopex: f64,
    #[serde(rename = "NPC_Shuttle_vOPEX_USDm")]
    pub npc_shuttle_vopex: f64,
    #[serde(rename = "NPC_Bunkering_vOPEX_USDm")]
    pub npc_bunkering_vopex: f64,
    #[serde(rename = "NPC_Terminal_vOPEX_USDm")]
    pub npc_terminal_vopex: f64,
    #[serde(rename = "NPC_Total_CAPEX_USDm")]
    pub npc_total_capex: f64,
    #[serde(rename = "NPC_Total_fOPEX_USDm")]
    pub npc_total_fopex: f64,
    #[serde(rename = "NPC_Total_vOPEX_USDm")]
    pub npc_total_vopex: f64,
    #[serde(rename = "NPC_Total_OPEX_USDm")]
    pub npc_total_opex: f64,

    #[serde(rename = "Annuity_Factor")]
    pub annuity_factor: f64,
    #[serde(rename = "Annualized_Shuttle_CAPEX_USDm_per_year")]
    pub annualized_shuttle_capex: f64,
    #[serde(rename = "Annualized_Bunkering_CAPEX_USDm_per_year")]
    pub annualized_bunkering_capex: f64,
    #[serde(rename = "Annualized_Terminal_CAPEX_USDm_per_year")]
    pub annualized_terminal_capex: f64,
    #[serde(rename = "Annualized_Total_CAPEX_USDm_per_year")]
    pub annualized_total_capex: f64,
    #[serde(rename = "NPC_Annualized_Shuttle_CAPEX_USDm")]
    pub npc_annualized_shuttle_capex: f64,
    #[serde(rename = "NPC_Annualized_Bunkering_CAPEX_USDm")]
    pub npc_annualized_bunkering_capex: f64,
    #[serde(rename = "NPC_Annualized_Terminal_CAPEX_USDm")]
    pub npc_annualized_terminal_capex: f64,
    #[serde(rename = "NPC_Annualized_Total_CAPEX_USDm")]
    pub npc_annualized_total_capex: f64,

    #[serde(rename = "Total_Supply_ton")]
    pub total_supply_ton: f64,
    #[serde(rename = "LCOAmmonia_USD_per_ton")]
    pub lco_usd_per_ton: f64,
}

impl ScenarioRow {
    /// Sum of the nine NPC components (USDm).
    pub fn component_sum(&self) -> f64 {
        self.npc_shuttle_capex
            + self.npc_bunkering_capex
            + self.npc_terminal_capex
            + self.npc_shuttle_fopex
            + self.npc_bunkering_fopex
            + self.npc_terminal_fopex
            + self.npc_shuttle_vopex
            + self.npc_bunkering_vopex
            + self.npc_terminal_vopex
    }

    pub fn is_candidate(&self, shuttle_size: f64, pump_size: f64) -> bool {
        self.shuttle_size == shuttle_size && self.pump_size == pump_size
    }
}

/// One planning year of one candidate.
///
/// Cost columns are discounted to the first planning year, except the
/// `Annualized_CAPEX_*` columns which give the undiscounted annual capital
/// charge of the assets in service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRow {
    #[serde(rename = "Case")]
    pub case_id: String,
    #[serde(rename = "Shuttle_Size_cbm")]
    pub shuttle_size: f64,
    #[serde(rename = "Pump_Size_m3ph")]
    pub pump_size: f64,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "New_Shuttles")]
    pub new_shuttles: u32,
    #[serde(rename = "Total_Shuttles")]
    pub total_shuttles: u32,
    #[serde(rename = "New_Tanks")]
    pub new_tanks: u32,
    #[serde(rename = "Total_Tanks")]
    pub total_tanks: u32,
    /// Calls on port storage, trips on remote supply.
    #[serde(rename = "Annual_Calls")]
    pub annual_calls: f64,
    #[serde(rename = "Annual_Cycles")]
    pub annual_cycles: f64,
    #[serde(rename = "Hours_Used")]
    pub hours_used: f64,
    #[serde(rename = "Supply_m3")]
    pub supply_m3: f64,
    #[serde(rename = "Demand_m3")]
    pub demand_m3: f64,
    #[serde(rename = "Cycles_Available")]
    pub cycles_available: f64,
    #[serde(rename = "Utilization_Rate")]
    pub utilization: f64,
    #[serde(rename = "Discount_Factor")]
    pub discount_factor: f64,

    #[serde(rename = "CAPEX_Shuttle_USDm")]
    pub capex_shuttle: f64,
    #[serde(rename = "CAPEX_Bunkering_USDm")]
    pub capex_bunkering: f64,
    #[serde(rename = "CAPEX_Tank_USDm")]
    pub capex_tank: f64,
    #[serde(rename = "CAPEX_Total_USDm")]
    pub capex_total: f64,
    #[serde(rename = "FixedOPEX_Shuttle_USDm")]
    pub fopex_shuttle: f64,
    #[serde(rename = "FixedOPEX_Bunkering_USDm")]
    pub fopex_bunkering: f64,
    #[serde(rename = "FixedOPEX_Tank_USDm")]
    pub fopex_tank: f64,
    #[serde(rename = "FixedOPEX_Total_USDm")]
    pub fopex_total: f64,
    #[serde(rename = "VariableOPEX_Shuttle_USDm")]
    pub vopex_shuttle: f64,
    #[serde(rename = "VariableOPEX_Bunkering_USDm")]
    pub vopex_bunkering: f64,
    #[serde(rename = "VariableOPEX_Tank_USDm")]
    pub vopex_tank: f64,
    #[serde(rename = "VariableOPEX_Total_USDm")]
    pub vopex_total: f64,
    #[serde(rename = "Annualized_CAPEX_Shuttle_USDm")]
    pub annualized_capex_shuttle: f64,
    #[serde(rename = "Annualized_CAPEX_Bunkering_USDm")]
    pub annualized_capex_bunkering: f64,
    #[serde(rename = "Annualized_CAPEX_Tank_USDm")]
    pub annualized_capex_tank: f64,
    #[serde(rename = "Annualized_CAPEX_Total_USDm")]
    pub annualized_capex_total: f64,
    #[serde(rename = "Total_OPEX_USDm")]
    pub total_opex: f64,
    #[serde(rename = "Total_Year_Cost_USDm")]
    pub total_year_cost: f64,
    #[serde(rename = "Supply_ton")]
    pub supply_ton: f64,
    /// Levelized cost over the years up to and including this one.
    #[serde(rename = "LCO_Cumulative_USD_per_ton")]
    pub lco_cumulative: f64,
}

/// Scenario row plus its yearly rows for one solved candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSolution {
    pub scenario: ScenarioRow,
    pub yearly: Vec<YearlyRow>,
}

//! Shuttle, pump and tank catalogues.

use serde::{Deserialize, Serialize};

/// Propulsion and cargo-pump characteristics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PropulsionParameters {
    /// Specific fuel-oil consumption (g/kWh).
    ///
    /// Default: 379.0
    pub sfoc: f64,

    /// Differential pressure across the cargo pump (bar).
    ///
    /// Default: 4.0
    pub pump_delta_pressure: f64,

    /// Pump efficiency, in (0, 1].
    ///
    /// Default: 0.7
    pub pump_efficiency: f64,

    /// Installed pump cost (USD/kW).
    ///
    /// Default: 2000.0
    pub pump_power_cost: f64,
}

impl Default for PropulsionParameters {
    fn default() -> Self {
        Self {
            sfoc: 379.0,
            pump_delta_pressure: 4.0,
            pump_efficiency: 0.7,
            pump_power_cost: 2000.0,
        }
    }
}

/// Shuttle tanker catalogue and cost scaling.
///
/// CAPEX follows the scaling law
///
/// $$C(S) = C_{ref} \left(\frac{S}{S_{ref}}\right)^{\alpha}$$
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShuttleParameters {
    /// Candidate shuttle capacities (m³), visited in this order.
    pub available_sizes: Vec<f64>,

    /// Known `[size_m3, mcr_kw]` pairs of the propulsion plant.
    ///
    /// Sizes in between are interpolated, sizes outside are extrapolated.
    pub mcr_map: Vec<(f64, f64)>,

    /// CAPEX of the reference shuttle (USD).
    ///
    /// Default: 61.5 M USD
    pub ref_capex: f64,

    /// Capacity of the reference shuttle (m³).
    ///
    /// Default: 40 000 m³
    pub ref_size: f64,

    /// Economy-of-scale exponent.
    ///
    /// Default: 0.75
    pub capex_scaling_exponent: f64,

    /// Shuttle fixed OPEX as a share of shuttle CAPEX.
    ///
    /// Default: 0.05
    pub fixed_opex_ratio: f64,

    /// Bunkering equipment cost as a share of shuttle CAPEX.
    ///
    /// Default: 0.03
    pub equipment_ratio: f64,
}

impl Default for ShuttleParameters {
    fn default() -> Self {
        Self {
            available_sizes: (1..=10).map(|i| f64::from(i) * 500.0).collect(),
            mcr_map: vec![
                (500.0, 1296.0),
                (1000.0, 1341.0),
                (1500.0, 1385.0),
                (2000.0, 1429.0),
                (2500.0, 1473.0),
                (3000.0, 1517.0),
                (3500.0, 1562.0),
                (4000.0, 1606.0),
            ],
            ref_capex: 61_500_000.0,
            ref_size: 40_000.0,
            capex_scaling_exponent: 0.75,
            fixed_opex_ratio: 0.05,
            equipment_ratio: 0.03,
        }
    }
}

/// Cargo pump catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PumpParameters {
    /// Candidate pump flow rates (m³/h), visited in this order.
    ///
    /// Default: 400 to 2000 in steps of 200
    pub available_flow_rates: Vec<f64>,
}

impl Default for PumpParameters {
    fn default() -> Self {
        Self {
            available_flow_rates: (2..=10).map(|i| f64::from(i) * 200.0).collect(),
        }
    }
}

/// Port-resident refrigerated storage, used by the port-storage topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TankStorageParameters {
    /// Whether tanks are part of the plan.
    ///
    /// Default: true
    pub enabled: bool,

    /// Capacity of one tank (ton).
    ///
    /// Default: 30 000 t
    pub size_tons: f64,

    /// Tank CAPEX per kg of capacity (USD/kg).
    ///
    /// Default: 1.215
    pub cost_per_kg: f64,

    /// Refrigeration energy per kg stored per year (kWh/kg).
    ///
    /// Default: 0.0378
    pub cooling_energy_kwh_per_kg: f64,

    /// Tank fixed OPEX as a share of tank CAPEX.
    ///
    /// Default: 0.03
    pub fixed_opex_ratio: f64,
}

impl Default for TankStorageParameters {
    fn default() -> Self {
        Self {
            enabled: true,
            size_tons: 30_000.0,
            cost_per_kg: 1.215,
            cooling_energy_kwh_per_kg: 0.0378,
            fixed_opex_ratio: 0.03,
        }
    }
}

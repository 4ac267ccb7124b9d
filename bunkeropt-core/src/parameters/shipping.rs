//! Demand-side parameters: fleet growth, fuel per voyage and call volume.

use serde::{Deserialize, Serialize};

/// Ammonia-fuelled vessel fleet calling at the port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShippingParameters {
    /// Vessels in service in the first planning year.
    ///
    /// Default: 50
    pub start_vessels: u32,

    /// Vessels in service in the last planning year.
    ///
    /// Default: 500
    pub end_vessels: u32,

    /// Voyages per vessel per year.
    ///
    /// Default: 12.0
    pub voyages_per_year: f64,

    /// Ammonia consumed per voyage (kg).
    ///
    /// Default: 2 158 995 kg
    pub kg_per_voyage: f64,
}

impl Default for ShippingParameters {
    fn default() -> Self {
        Self {
            start_vessels: 50,
            end_vessels: 500,
            voyages_per_year: 12.0,
            kg_per_voyage: 2_158_995.0,
        }
    }
}

/// Physical properties of the stored product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AmmoniaParameters {
    /// Density of refrigerated ammonia in storage (ton/m³).
    ///
    /// Default: 0.680
    pub density_storage: f64,
}

impl Default for AmmoniaParameters {
    fn default() -> Self {
        Self {
            density_storage: 0.680,
        }
    }
}

/// A single bunkering call and the ship-side transfer equipment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BunkeringParameters {
    /// Volume delivered to one receiving vessel per call (m³).
    ///
    /// Default: 5000.0
    pub bunker_volume_per_call: f64,

    /// Fixed OPEX of the bunkering equipment as a share of its CAPEX.
    ///
    /// Default: 0.05
    pub fixed_opex_ratio: f64,
}

impl Default for BunkeringParameters {
    fn default() -> Self {
        Self {
            bunker_volume_per_call: 5000.0,
            fixed_opex_ratio: 0.05,
        }
    }
}
